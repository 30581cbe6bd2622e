use std::process::Stdio;

use tokio::process::Command;
use tokio::task::AbortHandle;

use crate::app::SessionSink;
use crate::command::{expand_args, first_line, split_program};
use crate::error::CaptureError;

/// Recognition settings for one capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSettings {
    /// BCP-47 tag, e.g. "en-US".
    pub lang: String,
    /// Always false: only the final transcript is consumed.
    pub interim_results: bool,
    pub max_alternatives: u32,
}

impl CaptureSettings {
    pub fn new(lang: impl Into<String>) -> Self {
        Self {
            lang: lang.into(),
            interim_results: false,
            max_alternatives: 1,
        }
    }
}

/// A running recognition. Aborting must suppress any further reports;
/// reports that slip through anyway are dropped as stale.
pub trait CaptureHandle {
    fn abort(&mut self);
}

/// Speech-to-text engine.
///
/// `start` begins listening and returns at once. The engine reports
/// through `sink`: `started`, then one `result` or `error`, then `ended`.
pub trait SpeechCapture {
    fn start(
        &mut self,
        settings: &CaptureSettings,
        sink: SessionSink,
    ) -> Result<Box<dyn CaptureHandle>, CaptureError>;
}

/// Runs an external speech-to-text command per capture and takes the first
/// line it prints as the transcript.
#[derive(Debug, Clone)]
pub struct CommandCapture {
    argv: Vec<String>,
}

impl CommandCapture {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }
}

struct CommandCaptureHandle {
    task: AbortHandle,
}

impl CaptureHandle for CommandCaptureHandle {
    fn abort(&mut self) {
        // Dropping the task drops the child, which kills it.
        self.task.abort();
    }
}

impl SpeechCapture for CommandCapture {
    fn start(
        &mut self,
        settings: &CaptureSettings,
        sink: SessionSink,
    ) -> Result<Box<dyn CaptureHandle>, CaptureError> {
        let argv = expand_args(&self.argv, &[("lang", settings.lang.as_str())]);
        let (program, args) = split_program(argv).ok_or_else(|| {
            CaptureError::ServiceNotAllowed("no capture_command configured".into())
        })?;

        let task = tokio::spawn(async move {
            let child = Command::new(&program)
                .args(&args)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::null())
                .kill_on_drop(true)
                .spawn();
            let child = match child {
                Ok(child) => child,
                Err(e) => {
                    sink.error(CaptureError::AudioCapture(format!(
                        "failed to spawn {program}: {e}"
                    )));
                    sink.ended();
                    return;
                }
            };
            sink.started();

            match child.wait_with_output().await {
                Ok(output) if output.status.success() => match first_line(&output.stdout) {
                    Some(transcript) => sink.result(transcript),
                    None => sink.error(CaptureError::NoSpeech),
                },
                Ok(output) => sink.error(CaptureError::AudioCapture(format!(
                    "{program} exited with {}",
                    output.status
                ))),
                Err(e) => sink.error(CaptureError::AudioCapture(format!(
                    "waiting for {program}: {e}"
                ))),
            }
            sink.ended();
        });

        Ok(Box::new(CommandCaptureHandle {
            task: task.abort_handle(),
        }))
    }
}

use std::process::Stdio;

use tokio::process::Command;
use tokio::task::AbortHandle;

use crate::app::SessionSink;
use crate::command::{expand_args, split_program};
use crate::error::PlaybackError;
use crate::language::primary_subtag;

/// Text to speak and how to speak it.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    /// BCP-47 tag, e.g. "de-DE".
    pub lang: String,
    pub pitch: f32,
    pub rate: f32,
    pub volume: f32,
}

impl Utterance {
    /// Utterance at neutral pitch, rate and volume.
    pub fn new(text: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            lang: lang.into(),
            pitch: 1.0,
            rate: 1.0,
            volume: 1.0,
        }
    }
}

/// The utterance being spoken. Cancelling must silence it immediately.
pub trait PlaybackHandle {
    fn cancel(&mut self);
}

/// Text-to-speech engine. Reports `playback_finished` or `playback_failed`
/// through the sink.
pub trait SpeechPlayback {
    fn speak(
        &mut self,
        utterance: Utterance,
        sink: SessionSink,
    ) -> Result<Box<dyn PlaybackHandle>, PlaybackError>;
}

/// Speaks through an external text-to-speech command, e.g. `espeak-ng`.
#[derive(Debug, Clone)]
pub struct CommandPlayback {
    argv: Vec<String>,
}

impl CommandPlayback {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }
}

struct CommandPlaybackHandle {
    task: Option<AbortHandle>,
}

impl PlaybackHandle for CommandPlaybackHandle {
    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl SpeechPlayback for CommandPlayback {
    fn speak(
        &mut self,
        utterance: Utterance,
        sink: SessionSink,
    ) -> Result<Box<dyn PlaybackHandle>, PlaybackError> {
        let pitch = utterance.pitch.to_string();
        let rate = utterance.rate.to_string();
        let volume = utterance.volume.to_string();
        let argv = expand_args(
            &self.argv,
            &[
                ("text", utterance.text.as_str()),
                ("lang", utterance.lang.as_str()),
                ("voice", primary_subtag(&utterance.lang)),
                ("pitch", pitch.as_str()),
                ("rate", rate.as_str()),
                ("volume", volume.as_str()),
            ],
        );
        let Some((program, args)) = split_program(argv) else {
            log::info!("No playback_command configured, not speaking");
            sink.playback_finished();
            return Ok(Box::new(CommandPlaybackHandle { task: None }));
        };

        let mut child = Command::new(&program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| PlaybackError::Spawn {
                command: program.clone(),
                source,
            })?;

        let task = tokio::spawn(async move {
            match child.wait().await {
                Ok(status) if status.success() => sink.playback_finished(),
                Ok(status) => sink.playback_failed(format!("{program} exited with {status}")),
                Err(e) => sink.playback_failed(format!("waiting for {program}: {e}")),
            }
        });

        Ok(Box::new(CommandPlaybackHandle {
            task: Some(task.abort_handle()),
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::app::{Event, SessionEvent};

    fn playback(args: &[&str]) -> CommandPlayback {
        CommandPlayback::new(args.iter().map(|a| a.to_string()).collect())
    }

    async fn next_report(rx: &async_channel::Receiver<Event>) -> SessionEvent {
        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("playback never reported")
            .unwrap();
        match event {
            Event::Session { event, .. } => event,
            Event::Command(command) => panic!("unexpected command {command:?}"),
        }
    }

    #[tokio::test]
    async fn text_is_passed_as_one_argument() {
        let (tx, rx) = async_channel::unbounded();
        let check = r#"[ "$1" = "-5 degrees is cold" ] && [ "$2" = de ]"#;
        let _handle = playback(&["sh", "-c", check, "sh", "{text}", "{voice}"])
            .speak(Utterance::new("-5 degrees is cold", "de-DE"), SessionSink::new(1, tx))
            .unwrap();
        assert!(matches!(next_report(&rx).await, SessionEvent::PlaybackFinished));
    }

    #[tokio::test]
    async fn failing_command_reports_failure() {
        let (tx, rx) = async_channel::unbounded();
        let _handle = playback(&["sh", "-c", "exit 2"])
            .speak(Utterance::new("hi", "en-US"), SessionSink::new(1, tx))
            .unwrap();
        assert!(matches!(next_report(&rx).await, SessionEvent::PlaybackFailed(_)));
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let (tx, _rx) = async_channel::unbounded();
        let err = playback(&["voice-ask-no-such-program", "{text}"])
            .speak(Utterance::new("hi", "en-US"), SessionSink::new(1, tx))
            .err()
            .unwrap();
        assert!(matches!(err, PlaybackError::Spawn { .. }));
    }

    #[tokio::test]
    async fn empty_command_finishes_at_once() {
        let (tx, rx) = async_channel::unbounded();
        let _handle = playback(&[])
            .speak(Utterance::new("hi", "en-US"), SessionSink::new(1, tx))
            .unwrap();
        assert!(matches!(
            rx.try_recv(),
            Ok(Event::Session {
                event: SessionEvent::PlaybackFinished,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn cancel_kills_the_command() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("spoken");
        let script = format!("sleep 1; touch '{}'", marker.display());
        let (tx, rx) = async_channel::unbounded();
        let mut handle = playback(&["sh", "-c", &script])
            .speak(Utterance::new("hi", "en-US"), SessionSink::new(1, tx))
            .unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.cancel();
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert!(!marker.exists());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn utterance_defaults_are_neutral() {
        let u = Utterance::new("hi", "en-US");
        assert_eq!((u.pitch, u.rate, u.volume), (1.0, 1.0, 1.0));
    }
}

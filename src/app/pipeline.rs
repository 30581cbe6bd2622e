use tokio::task::AbortHandle;
use tokio_util::sync::CancellationToken;

use crate::error::AnswerError;
use crate::playback::Utterance;

use super::state::{Coordinator, RequestHandle, SessionEvent};

impl Coordinator {
    /// Send `question` to the answer service on a background task. The
    /// outcome comes back as `AnswerSettled` for the current generation.
    pub(crate) fn dispatch_answer(&mut self, question: String) {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let answers = self.services.answers.clone();
        let timeout = self.config.answer_timeout();
        let sink = self.sink();

        tokio::spawn(async move {
            let call = async {
                match timeout {
                    Some(limit) => tokio::time::timeout(limit, answers.ask(&question))
                        .await
                        .unwrap_or(Err(AnswerError::TimedOut(limit.as_secs()))),
                    None => answers.ask(&question).await,
                }
            };
            let result = tokio::select! {
                _ = cancelled.cancelled() => Err(AnswerError::Cancelled),
                result = call => result,
            };
            sink.send(SessionEvent::AnswerSettled(result));
        });

        if let Some(session) = self.session.as_mut() {
            session.request = Some(RequestHandle { token });
        }
    }

    /// Speak `text` in the language the current mode picks for it.
    pub(crate) fn speak(&mut self, text: &str) {
        let lang = self
            .config
            .language
            .playback_tag(text, &self.config.default_language)
            .to_string();
        log::info!("Speaking answer ({lang})");
        let sink = self.sink();
        match self.services.playback.speak(Utterance::new(text, lang), sink) {
            Ok(handle) => {
                if let Some(session) = self.session.as_mut() {
                    session.playback = Some(handle);
                }
            }
            Err(e) => {
                log::warn!("Playback failed: {e}");
                self.finish();
            }
        }
    }

    /// Open `url` after the configured delay, unless the session is
    /// stopped or superseded first. The delay keeps the new tab clear of
    /// popup blockers.
    pub(crate) fn schedule_navigation(&mut self, url: String) {
        let delay = self.config.navigation_delay();
        let sink = self.sink();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            sink.send(SessionEvent::NavigationDue(url));
        });
        self.navigation_timers.retain(|timer| !timer.is_finished());
        self.navigation_timers.push(task.abort_handle());
    }

    /// Report `CaptureTimedOut` if the current generation is still
    /// listening when the capture timeout expires.
    pub(crate) fn arm_capture_timeout(&self) -> Option<AbortHandle> {
        let limit = self.config.capture_timeout()?;
        let sink = self.sink();
        let task = tokio::spawn(async move {
            tokio::time::sleep(limit).await;
            sink.send(SessionEvent::CaptureTimedOut);
        });
        Some(task.abort_handle())
    }
}

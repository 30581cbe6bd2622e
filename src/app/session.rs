use crate::capture::CaptureSettings;
use crate::error::CaptureError;
use crate::language::LanguageMode;

use super::state::{Coordinator, Phase};

pub(crate) const STOPPED_STATUS: &str = "Stopped.";

impl Coordinator {
    /// Begin listening for a spoken question. Any live session is stopped
    /// first.
    pub fn start(&mut self) {
        self.reset();
        let generation = self.begin_session(Phase::Capturing).generation;
        log::info!("Starting session {generation}: listening");

        let presenter = &mut self.services.presenter;
        presenter.show_response("");
        presenter.set_loading(true);
        presenter.set_stop_enabled(true);

        let lang = self
            .config
            .language
            .capture_tag(&self.config.default_language)
            .to_string();
        let settings = CaptureSettings::new(lang);
        let sink = self.sink();
        match self.services.capture.start(&settings, sink) {
            Ok(handle) => {
                let timer = self.arm_capture_timeout();
                if let Some(session) = self.session.as_mut() {
                    session.capture = Some(handle);
                    session.capture_timer = timer;
                }
            }
            Err(e) => self.fail_capture(e),
        }
    }

    /// Ask a typed question. Blank input is ignored.
    pub fn submit(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        self.reset();
        let session = self.begin_session(Phase::Dispatching);
        session.transcript = Some(text.to_string());
        log::info!("Starting session {}: typed question", session.generation);

        let presenter = &mut self.services.presenter;
        presenter.show_transcript(text);
        presenter.show_response("");
        presenter.set_loading(true);
        presenter.set_stop_enabled(true);

        self.dispatch_answer(text.to_string());
    }

    /// Cancel whatever is in flight and go idle. Safe to call at any time,
    /// any number of times.
    pub fn stop(&mut self) {
        let was_live = self.session.is_some();
        let in_flight = self.reset();
        if in_flight {
            self.services.presenter.show_response(STOPPED_STATUS);
        }
        if was_live {
            self.services.presenter.set_loading(false);
            self.services.presenter.set_stop_enabled(false);
            log::info!("Session stopped");
        }
    }

    /// Language mode for the next capture and playback.
    pub fn set_language(&mut self, mode: LanguageMode) {
        log::info!("Language mode: {mode:?}");
        self.config.language = mode;
    }

    /// Drop the live session and every pending timer, and move to a new
    /// generation so their late reports are stale. Returns whether an
    /// answer request was cancelled.
    pub(crate) fn reset(&mut self) -> bool {
        let had_timers = !self.navigation_timers.is_empty();
        for timer in self.navigation_timers.drain(..) {
            timer.abort();
        }
        match self.session.take() {
            Some(mut session) => {
                self.generation += 1;
                session.release()
            }
            None => {
                if had_timers {
                    self.generation += 1;
                }
                false
            }
        }
    }

    /// End the live session after it ran its course. The generation stays,
    /// so pending navigation for this answer still fires.
    pub(crate) fn finish(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.release();
            log::debug!("Session {} finished", session.generation);
        }
        self.services.presenter.set_loading(false);
        self.services.presenter.set_stop_enabled(false);
    }

    pub(crate) fn fail_capture(&mut self, err: CaptureError) {
        match err.detail() {
            Some(detail) => log::error!("Speech recognition error: {err} ({detail})"),
            None => log::error!("Speech recognition error: {err}"),
        }
        self.finish();
        self.services
            .presenter
            .alert(&format!("Speech recognition error: {err}"));
    }
}

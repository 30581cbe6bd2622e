use crate::answer::Answer;
use crate::error::CaptureError;
use crate::search::{image_search_url, web_search_url};

use super::session::STOPPED_STATUS;
use super::state::{Command, Coordinator, Event, Phase, SessionEvent};

const REQUEST_FAILED_STATUS: &str = "Request failed.";

impl Coordinator {
    /// Run the event loop until `Command::Shutdown`.
    pub async fn run(mut self) {
        while self.step().await {}
        log::info!("Coordinator shut down");
    }

    /// Wait for one event and handle it. Returns false on shutdown.
    pub async fn step(&mut self) -> bool {
        // The coordinator holds a sender itself, so the channel never closes.
        match self.receiver.recv().await {
            Ok(event) => self.handle_event(event),
            Err(_) => false,
        }
    }

    /// Handle everything already queued without waiting. Returns the
    /// number of events handled.
    pub fn process_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.receiver.try_recv() {
            handled += 1;
            if !self.handle_event(event) {
                break;
            }
        }
        handled
    }

    /// Handle one event. This is the core state machine. Returns false on
    /// shutdown.
    pub fn handle_event(&mut self, event: Event) -> bool {
        match event {
            Event::Command(Command::Shutdown) => {
                self.stop();
                return false;
            }
            Event::Command(command) => self.handle_command(command),
            Event::Session { generation, event } => {
                if generation != self.generation {
                    log::debug!(
                        "Dropping stale {event:?} from session {generation} (current {})",
                        self.generation
                    );
                } else {
                    self.handle_session_event(event);
                }
            }
        }
        true
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Start => self.start(),
            Command::Stop => self.stop(),
            Command::Submit(text) => self.submit(&text),
            Command::SetLanguage(mode) => self.set_language(mode),
            Command::Shutdown => {}
        }
    }

    fn handle_session_event(&mut self, event: SessionEvent) {
        let phase = self.phase();
        match event {
            SessionEvent::CaptureStarted => {
                log::info!("Voice recognition started");
            }
            SessionEvent::CaptureResult(transcript) if phase == Phase::Capturing => {
                self.on_transcript(transcript);
            }
            SessionEvent::CaptureError(err) if phase == Phase::Capturing => {
                self.fail_capture(err);
            }
            SessionEvent::CaptureTimedOut if phase == Phase::Capturing => {
                log::warn!("No speech before the capture timeout");
                self.fail_capture(CaptureError::NoSpeech);
            }
            SessionEvent::CaptureEnded if phase == Phase::Capturing => {
                log::info!("Voice recognition ended without a result");
                self.finish();
            }
            SessionEvent::AnswerSettled(result) if phase == Phase::Dispatching => {
                if let Some(session) = self.session.as_mut() {
                    session.request = None;
                }
                match result {
                    Ok(answer) => self.on_answer(answer),
                    Err(e) if e.is_cancelled() => {
                        self.services.presenter.show_response(STOPPED_STATUS);
                        self.finish();
                    }
                    Err(e) => {
                        log::error!("Answer request failed: {e}");
                        self.services.presenter.show_response(REQUEST_FAILED_STATUS);
                        self.finish();
                    }
                }
            }
            SessionEvent::NavigationDue(url) => {
                self.services.navigator.open(&url);
            }
            SessionEvent::PlaybackFinished if phase == Phase::Speaking => {
                self.finish();
            }
            SessionEvent::PlaybackFailed(message) if phase == Phase::Speaking => {
                log::warn!("Playback failed: {message}");
                self.finish();
            }
            other => {
                log::debug!("Ignoring {other:?} while {phase:?}");
            }
        }
    }

    fn on_transcript(&mut self, transcript: String) {
        let transcript = transcript.trim().to_string();
        if transcript.is_empty() {
            self.fail_capture(CaptureError::NoSpeech);
            return;
        }
        log::info!("Transcript: {transcript}");
        if let Some(session) = self.session.as_mut() {
            // The engine is done with this utterance; release it.
            session.release();
            session.transcript = Some(transcript.clone());
            session.phase = Phase::Dispatching;
        }
        self.services.presenter.show_transcript(&transcript);
        self.dispatch_answer(transcript);
    }

    fn on_answer(&mut self, answer: Answer) {
        match answer {
            Answer::Reply {
                text,
                open_images,
                query,
            } => {
                log::info!("Answer received ({} chars)", text.len());
                self.services.presenter.set_loading(false);
                self.services.presenter.show_response(&text);
                if let Some(session) = self.session.as_mut() {
                    session.phase = Phase::Speaking;
                }
                let question = self.transcript().map(str::to_string);
                self.speak(&text);

                if open_images {
                    match query.as_deref().or(question.as_deref()) {
                        Some(term) => self.schedule_navigation(image_search_url(term)),
                        None => log::warn!("Image search requested without a query"),
                    }
                }
                if self.config.web_search {
                    if let Some(question) = question {
                        self.schedule_navigation(web_search_url(&question));
                    }
                }
            }
            Answer::ServiceError(message) => {
                log::warn!("Answer service reported an error: {message}");
                self.services
                    .presenter
                    .show_response(&format!("Error: {message}"));
                self.finish();
            }
        }
    }
}

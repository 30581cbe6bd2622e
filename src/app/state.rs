use std::sync::Arc;

use tokio::task::AbortHandle;
use tokio_util::sync::CancellationToken;

use crate::answer::{Answer, AnswerService};
use crate::capture::{CaptureHandle, SpeechCapture};
use crate::config::Config;
use crate::error::{AnswerError, CaptureError};
use crate::language::LanguageMode;
use crate::playback::{PlaybackHandle, SpeechPlayback};
use crate::search::Navigator;
use crate::ui::Presenter;

/// Session counter. Bumped whenever a session starts or is stopped, so
/// anything stamped with an older value is stale.
pub type Generation = u64;

/// Requests from the UI layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Stop,
    Submit(String),
    SetLanguage(LanguageMode),
    Shutdown,
}

/// Reports from external services about one session.
#[derive(Debug)]
pub enum SessionEvent {
    CaptureStarted,
    CaptureResult(String),
    CaptureError(CaptureError),
    CaptureEnded,
    CaptureTimedOut,
    AnswerSettled(Result<Answer, AnswerError>),
    NavigationDue(String),
    PlaybackFinished,
    PlaybackFailed(String),
}

/// Everything the coordinator's event loop receives.
#[derive(Debug)]
pub enum Event {
    Command(Command),
    Session {
        generation: Generation,
        event: SessionEvent,
    },
}

/// Where a service reports back for the session it was started for.
/// Every report is stamped with that session's generation.
#[derive(Debug, Clone)]
pub struct SessionSink {
    generation: Generation,
    sender: async_channel::Sender<Event>,
}

impl SessionSink {
    pub(crate) fn new(generation: Generation, sender: async_channel::Sender<Event>) -> Self {
        Self { generation, sender }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn send(&self, event: SessionEvent) {
        let _ = self.sender.try_send(Event::Session {
            generation: self.generation,
            event,
        });
    }

    pub fn started(&self) {
        self.send(SessionEvent::CaptureStarted);
    }

    pub fn result(&self, transcript: impl Into<String>) {
        self.send(SessionEvent::CaptureResult(transcript.into()));
    }

    pub fn error(&self, err: CaptureError) {
        self.send(SessionEvent::CaptureError(err));
    }

    pub fn ended(&self) {
        self.send(SessionEvent::CaptureEnded);
    }

    pub fn playback_finished(&self) {
        self.send(SessionEvent::PlaybackFinished);
    }

    pub fn playback_failed(&self, message: impl Into<String>) {
        self.send(SessionEvent::PlaybackFailed(message.into()));
    }
}

/// Cloneable handle the UI layer uses to drive a running coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorHandle {
    sender: async_channel::Sender<Event>,
}

impl CoordinatorHandle {
    pub fn send(&self, command: Command) -> bool {
        self.sender.try_send(Event::Command(command)).is_ok()
    }

    pub fn start(&self) -> bool {
        self.send(Command::Start)
    }

    pub fn stop(&self) -> bool {
        self.send(Command::Stop)
    }

    pub fn submit(&self, text: impl Into<String>) -> bool {
        self.send(Command::Submit(text.into()))
    }

    pub fn shutdown(&self) -> bool {
        self.send(Command::Shutdown)
    }
}

/// Session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Capturing,
    Dispatching,
    Speaking,
}

/// The in-flight answer request. Cancelling makes the request task
/// report `AnswerError::Cancelled`, which arrives stale and is dropped.
pub(crate) struct RequestHandle {
    pub token: CancellationToken,
}

impl RequestHandle {
    pub fn cancel(self) {
        self.token.cancel();
    }
}

/// One turn: utterance in, answer out. Owns every handle it started.
pub(crate) struct Session {
    pub generation: Generation,
    pub phase: Phase,
    pub transcript: Option<String>,
    pub capture: Option<Box<dyn CaptureHandle>>,
    pub capture_timer: Option<AbortHandle>,
    pub request: Option<RequestHandle>,
    pub playback: Option<Box<dyn PlaybackHandle>>,
}

impl Session {
    pub fn new(generation: Generation, phase: Phase) -> Self {
        Self {
            generation,
            phase,
            transcript: None,
            capture: None,
            capture_timer: None,
            request: None,
            playback: None,
        }
    }

    /// Release every handle. Returns whether a request was still in flight.
    pub fn release(&mut self) -> bool {
        if let Some(mut capture) = self.capture.take() {
            capture.abort();
        }
        if let Some(timer) = self.capture_timer.take() {
            timer.abort();
        }
        let in_flight = match self.request.take() {
            Some(request) => {
                request.cancel();
                true
            }
            None => false,
        };
        if let Some(mut playback) = self.playback.take() {
            playback.cancel();
        }
        in_flight
    }
}

/// External collaborators the coordinator drives.
pub struct Services {
    pub answers: Arc<dyn AnswerService>,
    pub capture: Box<dyn SpeechCapture>,
    pub playback: Box<dyn SpeechPlayback>,
    pub navigator: Box<dyn Navigator>,
    pub presenter: Box<dyn Presenter>,
}

/// Owns the live session and everything it touches. Single-threaded: all
/// mutation happens in `handle_event` and the UI entry points.
pub struct Coordinator {
    pub(crate) config: Config,
    pub(crate) generation: Generation,
    pub(crate) session: Option<Session>,
    pub(crate) navigation_timers: Vec<AbortHandle>,
    pub(crate) services: Services,
    pub(crate) sender: async_channel::Sender<Event>,
    pub(crate) receiver: async_channel::Receiver<Event>,
}

impl Coordinator {
    pub fn new(config: Config, services: Services) -> Self {
        let (sender, receiver) = async_channel::unbounded();
        Self {
            config,
            generation: 0,
            session: None,
            navigation_timers: Vec::new(),
            services,
            sender,
            receiver,
        }
    }

    pub fn handle(&self) -> CoordinatorHandle {
        CoordinatorHandle {
            sender: self.sender.clone(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.session.as_ref().map_or(Phase::Idle, |s| s.phase)
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn transcript(&self) -> Option<&str> {
        self.session.as_ref()?.transcript.as_deref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn sink(&self) -> SessionSink {
        SessionSink::new(self.generation, self.sender.clone())
    }

    /// Start a fresh session in `phase` under a new generation.
    pub(crate) fn begin_session(&mut self, phase: Phase) -> &mut Session {
        self.generation += 1;
        self.session.insert(Session::new(self.generation, phase))
    }
}

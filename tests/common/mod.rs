#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use voice_ask::answer::{Answer, AnswerService};
use voice_ask::capture::{CaptureHandle, CaptureSettings, SpeechCapture};
use voice_ask::error::{AnswerError, CaptureError, PlaybackError};
use voice_ask::playback::{PlaybackHandle, SpeechPlayback, Utterance};
use voice_ask::search::Navigator;
use voice_ask::ui::Presenter;
use voice_ask::{Config, Coordinator, Services, SessionSink};

/// Everything the coordinator did to the presentation layer, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Ui {
    Transcript(String),
    Response(String),
    Loading(bool),
    StopEnabled(bool),
    Alert(String),
}

#[derive(Clone, Default)]
pub struct RecordingPresenter {
    log: Rc<RefCell<Vec<Ui>>>,
}

impl Presenter for RecordingPresenter {
    fn show_transcript(&mut self, text: &str) {
        self.log.borrow_mut().push(Ui::Transcript(text.into()));
    }

    fn show_response(&mut self, text: &str) {
        self.log.borrow_mut().push(Ui::Response(text.into()));
    }

    fn set_loading(&mut self, visible: bool) {
        self.log.borrow_mut().push(Ui::Loading(visible));
    }

    fn set_stop_enabled(&mut self, enabled: bool) {
        self.log.borrow_mut().push(Ui::StopEnabled(enabled));
    }

    fn alert(&mut self, message: &str) {
        self.log.borrow_mut().push(Ui::Alert(message.into()));
    }
}

#[derive(Clone, Default)]
pub struct FakeCapture {
    starts: Rc<RefCell<Vec<(CaptureSettings, SessionSink)>>>,
    aborts: Rc<Cell<usize>>,
    refuse: Rc<RefCell<Option<CaptureError>>>,
}

struct FakeCaptureHandle {
    aborts: Rc<Cell<usize>>,
}

impl CaptureHandle for FakeCaptureHandle {
    fn abort(&mut self) {
        self.aborts.set(self.aborts.get() + 1);
    }
}

impl SpeechCapture for FakeCapture {
    fn start(
        &mut self,
        settings: &CaptureSettings,
        sink: SessionSink,
    ) -> Result<Box<dyn CaptureHandle>, CaptureError> {
        if let Some(err) = self.refuse.borrow_mut().take() {
            return Err(err);
        }
        self.starts.borrow_mut().push((settings.clone(), sink));
        Ok(Box::new(FakeCaptureHandle {
            aborts: self.aborts.clone(),
        }))
    }
}

#[derive(Clone, Default)]
pub struct FakePlayback {
    spoken: Rc<RefCell<Vec<(Utterance, SessionSink)>>>,
    cancels: Rc<Cell<usize>>,
    refuse: Rc<Cell<bool>>,
}

struct FakePlaybackHandle {
    cancels: Rc<Cell<usize>>,
}

impl PlaybackHandle for FakePlaybackHandle {
    fn cancel(&mut self) {
        self.cancels.set(self.cancels.get() + 1);
    }
}

impl SpeechPlayback for FakePlayback {
    fn speak(
        &mut self,
        utterance: Utterance,
        sink: SessionSink,
    ) -> Result<Box<dyn PlaybackHandle>, PlaybackError> {
        if self.refuse.take() {
            return Err(PlaybackError::Spawn {
                command: "fake-tts".into(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }
        self.spoken.borrow_mut().push((utterance, sink));
        Ok(Box::new(FakePlaybackHandle {
            cancels: self.cancels.clone(),
        }))
    }
}

#[derive(Clone, Default)]
pub struct FakeNavigator {
    opened: Rc<RefCell<Vec<String>>>,
}

impl Navigator for FakeNavigator {
    fn open(&mut self, url: &str) {
        self.opened.borrow_mut().push(url.to_string());
    }
}

/// A question the coordinator asked; the test decides the outcome.
pub struct PendingCall {
    pub question: String,
    responder: oneshot::Sender<Result<Answer, AnswerError>>,
}

impl PendingCall {
    /// Resolve the call. Returns false if the caller already gave up on it.
    pub fn resolve(self, result: Result<Answer, AnswerError>) -> bool {
        self.responder.send(result).is_ok()
    }

    pub fn reply(self, text: &str) -> bool {
        self.resolve(Ok(Answer::reply(text)))
    }
}

pub struct FakeAnswers {
    calls: mpsc::UnboundedSender<PendingCall>,
}

#[async_trait]
impl AnswerService for FakeAnswers {
    async fn ask(&self, question: &str) -> Result<Answer, AnswerError> {
        let (responder, rx) = oneshot::channel();
        let _ = self.calls.send(PendingCall {
            question: question.to_string(),
            responder,
        });
        rx.await.unwrap_or(Err(AnswerError::Cancelled))
    }
}

/// Config for tests: no timeouts unless a test asks for them.
pub fn test_config() -> Config {
    Config {
        answer_timeout_secs: 0,
        capture_timeout_secs: 0,
        ..Config::default()
    }
}

pub struct Harness {
    pub coordinator: Coordinator,
    presenter: RecordingPresenter,
    capture: FakeCapture,
    playback: FakePlayback,
    navigator: FakeNavigator,
    calls: mpsc::UnboundedReceiver<PendingCall>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let (calls_tx, calls) = mpsc::unbounded_channel();
        let presenter = RecordingPresenter::default();
        let capture = FakeCapture::default();
        let playback = FakePlayback::default();
        let navigator = FakeNavigator::default();
        let services = Services {
            answers: Arc::new(FakeAnswers { calls: calls_tx }),
            capture: Box::new(capture.clone()),
            playback: Box::new(playback.clone()),
            navigator: Box::new(navigator.clone()),
            presenter: Box::new(presenter.clone()),
        };
        Self {
            coordinator: Coordinator::new(config, services),
            presenter,
            capture,
            playback,
            navigator,
            calls,
        }
    }

    /// Let background tasks run, then handle whatever they reported.
    pub async fn settle(&mut self) {
        for _ in 0..16 {
            tokio::task::yield_now().await;
            self.coordinator.process_pending();
        }
    }

    /// Wait for the coordinator to call the answer service.
    pub async fn next_call(&mut self) -> PendingCall {
        tokio::time::timeout(Duration::from_secs(5), self.calls.recv())
            .await
            .expect("answer service was not called")
            .expect("answer channel closed")
    }

    /// Whether a call is waiting, without blocking.
    pub fn has_call(&mut self) -> bool {
        self.calls.try_recv().is_ok()
    }

    pub fn refuse_next_capture(&self, err: CaptureError) {
        *self.capture.refuse.borrow_mut() = Some(err);
    }

    pub fn refuse_next_speak(&self) {
        self.playback.refuse.set(true);
    }

    pub fn capture_settings(&self, index: usize) -> CaptureSettings {
        self.capture.starts.borrow()[index].0.clone()
    }

    pub fn capture_sink(&self, index: usize) -> SessionSink {
        self.capture.starts.borrow()[index].1.clone()
    }

    pub fn capture_count(&self) -> usize {
        self.capture.starts.borrow().len()
    }

    pub fn capture_aborts(&self) -> usize {
        self.capture.aborts.get()
    }

    pub fn spoken(&self) -> Vec<Utterance> {
        self.playback
            .spoken
            .borrow()
            .iter()
            .map(|(u, _)| u.clone())
            .collect()
    }

    pub fn playback_sink(&self, index: usize) -> SessionSink {
        self.playback.spoken.borrow()[index].1.clone()
    }

    pub fn playback_cancels(&self) -> usize {
        self.playback.cancels.get()
    }

    pub fn opened(&self) -> Vec<String> {
        self.navigator.opened.borrow().clone()
    }

    pub fn ui(&self) -> Vec<Ui> {
        self.presenter.log.borrow().clone()
    }

    pub fn clear_ui(&self) {
        self.presenter.log.borrow_mut().clear();
    }

    pub fn transcripts(&self) -> Vec<String> {
        self.ui()
            .into_iter()
            .filter_map(|u| match u {
                Ui::Transcript(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    /// Non-empty responses shown, in order.
    pub fn responses(&self) -> Vec<String> {
        self.ui()
            .into_iter()
            .filter_map(|u| match u {
                Ui::Response(t) if !t.is_empty() => Some(t),
                _ => None,
            })
            .collect()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.ui()
            .into_iter()
            .filter_map(|u| match u {
                Ui::Alert(t) => Some(t),
                _ => None,
            })
            .collect()
    }
}

mod event_handler;
mod pipeline;
mod session;
mod state;

pub use state::{
    Command, Coordinator, CoordinatorHandle, Event, Generation, Phase, Services, SessionEvent,
    SessionSink,
};

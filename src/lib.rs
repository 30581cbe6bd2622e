//! Voice question/answer assistant.
//!
//! The [`Coordinator`] runs one turn at a time: listen (or take typed
//! input), ask the answer service, show and speak the answer, and open a
//! search tab when the answer asks for one. Starting or stopping a turn
//! supersedes everything the previous one had in flight.

pub mod answer;
pub mod app;
pub mod capture;
pub mod command;
pub mod config;
pub mod error;
pub mod language;
pub mod playback;
pub mod search;
pub mod ui;

pub use app::{Command, Coordinator, CoordinatorHandle, Phase, Services, SessionSink};
pub use config::Config;

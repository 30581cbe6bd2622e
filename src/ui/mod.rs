pub mod console;

/// The presentation layer the coordinator writes to.
///
/// Only the live session's handlers ever call into it.
pub trait Presenter {
    fn show_transcript(&mut self, text: &str);
    /// Replace the response area. An empty string clears it.
    fn show_response(&mut self, text: &str);
    fn set_loading(&mut self, visible: bool);
    fn set_stop_enabled(&mut self, enabled: bool);
    /// Blocking notification, e.g. a capture failure.
    fn alert(&mut self, message: &str);
}

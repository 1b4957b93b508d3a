use std::time::Instant;

use crossterm::event::Event;
use ratatui::Frame;

use crate::Runtime;

/// Trait for TUI applications.
///
/// Applications executed by `Runtime::run()` must implement this trait.
pub trait App {
    /// Initializes the application.
    ///
    /// Called at the start of `Runtime::run()`. Use this to configure the tick
    /// interval and render mode and to schedule the first wakeups.
    fn init(&mut self, runtime: &mut Runtime);

    /// Returns whether the application should exit.
    fn should_exit(&self) -> bool;

    /// Handles terminal events (key input, mouse, resize, etc.).
    fn handle_event(&mut self, runtime: &mut Runtime, event: Event);

    /// Draws the screen (called on each `Event::Render`).
    fn draw(&self, frame: &mut Frame);

    /// Updates application state (called on each `Event::Tick`).
    fn update(&mut self, runtime: &mut Runtime);

    /// Handles a wakeup scheduled with [`Runtime::wake_at`].
    ///
    /// `deadline` is the requested time; the call happens at or after it.
    fn wake(&mut self, runtime: &mut Runtime, deadline: Instant) {
        let _ = (runtime, deadline);
    }
}

use std::time::Instant;

use crossterm::event::Event as CrosstermEvent;

/// Events processed by TUI applications.
#[derive(Debug, Clone, derive_more::IsVariant, derive_more::From)]
pub(super) enum TuiEvent {
    /// Periodic update timing (based on `tick_interval`).
    Tick,
    /// A deadline requested through `Runtime::wake_at` has passed.
    #[from(ignore)]
    Wakeup(Instant),
    /// Screen render timing.
    Render,
    /// Terminal events such as key input, mouse, and resize.
    Crossterm(CrosstermEvent),
}

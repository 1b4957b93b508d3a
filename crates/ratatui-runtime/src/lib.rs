//! Minimal event loop for ratatui applications.
//!
//! [`Runtime::run`] drives an [`App`] with periodic ticks, one-shot wakeups
//! at requested deadlines, renders and terminal events, all on the calling
//! thread.

pub use self::{app::App, event_loop::RenderMode, runtime::Runtime};

mod app;
mod event;
mod event_loop;
mod runtime;

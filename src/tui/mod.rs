//! Terminal User Interface for convo-edit.
//!
//! Provides an interactive editor over one imported file:
//! - Left: Conversation list (the current filtered view)
//! - Right: Messages of the selected conversation, with an optional
//!   parse error panel below
//! - Bottom: Status bar showing session notices
//!
//! Built with ratatui for cross-platform terminal support.

mod app;
mod components;
mod events;
mod state;
mod theme;

pub use app::{draw, run};
pub use components::Symbols;
pub use events::KeyBindings;
pub use state::{Action, AppState, Focus, Mode, TuiOptions};
pub use theme::{available_themes, Theme};

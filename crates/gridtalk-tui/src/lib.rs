//! gridtalk-tui: Terminal UI components
//!
//! Terminal lifecycle, input actions, theming, and the chat widgets used by
//! the gridtalk binary.

pub mod app;
pub mod input;
pub mod theme;
pub mod widgets;

pub use app::App;
pub use input::Action;
pub use theme::Theme;

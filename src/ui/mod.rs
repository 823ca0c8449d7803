//! UI rendering module for uexbot
//!
//! Draws a paged reply the way a chat client would show an embed with
//! navigation buttons, using ratatui.

pub mod help_overlay;
pub mod pager_view;

pub use help_overlay::render as render_help_overlay;
pub use pager_view::render as render_pager;

//! uexbot library
//!
//! Cache tiers, entity lookup, pagination and the command handlers of the
//! UEX trading bot. The binary and the integration tests build on these.

pub mod app;
pub mod bot;
pub mod cache;
pub mod cli;
pub mod commands;
pub mod data;
pub mod format;
pub mod i18n;
pub mod pager;
pub mod prefs;
pub mod resolve;
pub mod ui;

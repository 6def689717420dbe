//! CLI command handlers

pub mod commands;

pub use commands::{bookmarks, init, preview, run, wizard};

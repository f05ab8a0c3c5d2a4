//! Subcommand handlers.

pub mod config;
pub mod daemon;
pub mod render;
pub mod store;

//! I/O helpers for runner commands.

pub mod collaborator;
pub mod config;
pub mod output;
pub mod process;
pub mod prompt;

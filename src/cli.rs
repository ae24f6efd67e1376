//! CLI argument parsing and command dispatch

pub mod args;
pub mod audit;
pub mod batch;
pub mod common;
pub mod init;
pub mod list;

// Re-export types for convenient access
pub use args::{Cli, ColorChoice, Command, OutputFormat};
pub use audit::ReplySource;

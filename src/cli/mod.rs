//! CLI module for aftercare
//!
//! Command-line argument parsing and verbosity handling.

pub mod args;

pub use args::{parse_override, Args, Commands, Verbosity};

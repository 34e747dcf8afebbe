//! CLI command handlers
//!
//! - `args` - argument parsing structures
//! - `commands` - command implementations
//! - `router` - dispatch from parsed arguments to commands

pub mod args;
pub mod commands;
pub mod router;

pub use args::{Cli, Commands, RunMode};
pub use router::execute_command;

//! Command implementation modules
//!
//! Each command lives in its own module and exposes a `run_*_command`
//! function taking its parameters and the loaded settings.

pub mod config;
pub mod date_range;
pub mod quadratic;
pub mod unique_users;

pub use config::run_config_command;
pub use date_range::{run_date_range_command, DateRangeParams};
pub use quadratic::{run_quadratic_command, QuadraticParams};
pub use unique_users::{run_unique_users_command, UniqueUsersParams};

use anyhow::Result;
use serde::Serialize;

/// Print `value` as pretty JSON on stdout.
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

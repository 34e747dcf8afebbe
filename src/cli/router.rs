//! Command routing and execution
//!
//! Routes parsed CLI commands to their implementations. The work behind every
//! command is blocking file and CPU work, so it runs on tokio's blocking pool.

use crate::cli::args::Commands;
use crate::cli::commands::*;
use crate::config::Settings;
use anyhow::{Context, Result};

/// Execute a CLI command with the loaded settings
pub async fn execute_command(command: Commands, settings: Settings, json: bool) -> Result<()> {
    match command {
        Commands::DateRange {
            file,
            column,
            chunk_size,
            prefix_len,
            formats,
            preview,
        } => {
            let params = DateRangeParams {
                file,
                column,
                chunk_size,
                prefix_len,
                formats,
                preview,
            };
            run_blocking(move || run_date_range_command(params, settings, json)).await
        }
        Commands::Quadratic {
            max_exponent,
            workers,
            out_plot,
            out_csv,
            progress,
        } => {
            let params = QuadraticParams {
                max_exponent,
                workers,
                out_plot,
                out_csv,
                progress,
            };
            run_blocking(move || run_quadratic_command(params, settings, json)).await
        }
        Commands::UniqueUsers {
            dir,
            column,
            workers,
            extension,
            mode,
            best_effort,
        } => {
            let params = UniqueUsersParams {
                dir,
                column,
                workers,
                extension,
                mode,
                best_effort,
            };
            run_blocking(move || run_unique_users_command(params, settings, json)).await
        }
        Commands::Config => run_config_command(&settings, json),
    }
}

async fn run_blocking<F>(task: F) -> Result<()>
where
    F: FnOnce() -> Result<()> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .context("Command task failed to complete")?
}

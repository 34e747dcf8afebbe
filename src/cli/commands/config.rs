//! `bdp config`: show the effective configuration.

use anyhow::Result;

use super::print_json;
use crate::config::Settings;

pub fn run_config_command(settings: &Settings, json: bool) -> Result<()> {
    if json {
        print_json(settings)
    } else {
        print!("{}", settings.to_toml()?);
        Ok(())
    }
}

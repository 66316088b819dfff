//! Print rule presets

use crate::engine::RulePresets;
use crate::interfaces::cli::CliError;

pub fn preset_json(timezone: &str, country: &str) -> Result<String, CliError> {
    serde_json::to_string_pretty(&RulePresets::all(timezone, country))
        .map_err(|e| CliError::CommandError(format!("Failed to serialize presets: {}", e)))
}

pub fn print_presets(timezone: &str, country: &str) -> Result<(), CliError> {
    println!("{}", preset_json(timezone, country)?);
    Ok(())
}

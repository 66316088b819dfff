//! CLI interface module

pub mod commands;

use std::fmt;

use crate::cli::{Commands, ConfigCommands};

use colored::{Color, Colorize};

use crate::errors::LinkhubError;

/// CLI 失败的三种类别，决定前缀和颜色
#[derive(Debug)]
pub enum CliError {
    StorageError(String),
    ParseError(String),
    CommandError(String),
}

impl CliError {
    fn parts(&self) -> (&'static str, Color, &str) {
        match self {
            CliError::StorageError(msg) => ("Storage error:", Color::Red, msg),
            CliError::ParseError(msg) => ("Parse error:", Color::Yellow, msg),
            CliError::CommandError(msg) => ("Command error:", Color::Red, msg),
        }
    }

    pub fn format_simple(&self) -> String {
        let (label, _, msg) = self.parts();
        format!("{} {}", label, msg)
    }

    pub fn format_colored(&self) -> String {
        let (label, color, msg) = self.parts();
        format!("{} {}", label.color(color).bold(), msg)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<LinkhubError> for CliError {
    fn from(err: LinkhubError) -> Self {
        match err {
            LinkhubError::Validation(msg) | LinkhubError::DateParse(msg) => Self::ParseError(msg),
            LinkhubError::NotFound(msg) => Self::CommandError(msg),
            other => Self::StorageError(other.to_string()),
        }
    }
}

/// Run a CLI command from clap-parsed input
pub async fn run_cli_command(cmd: Commands) -> Result<(), CliError> {
    match cmd {
        Commands::Serve => Err(CliError::CommandError(
            "serve is handled by the server runtime".to_string(),
        )),
        Commands::Evaluate {
            slug,
            device,
            country,
            at,
            timezone,
        } => {
            commands::evaluate(commands::EvaluateArgs {
                slug,
                device,
                country,
                at,
                timezone,
            })
            .await
        }
        Commands::Presets { timezone, country } => commands::print_presets(&timezone, &country),
        Commands::Config { action } => match action {
            ConfigCommands::Generate { output_path, force } => {
                commands::config_generate(output_path, force)
            }
        },
    }
}

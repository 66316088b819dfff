//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// linkhub - link-in-bio hub with a per-visitor rules engine
#[derive(Parser)]
#[command(name = "linkhub")]
#[command(version)]
#[command(about = "Link-in-bio hub service with a per-visitor rules engine", long_about = None)]
pub struct Cli {
    /// Config file path (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// Evaluate a hub for a simulated visitor and print the result as JSON
    Evaluate {
        /// Hub slug
        #[arg(long)]
        slug: String,

        /// mobile, tablet or desktop
        #[arg(long, default_value = "desktop")]
        device: String,

        /// ISO 3166-1 alpha-2 country code (default: visitor.default_country)
        #[arg(long)]
        country: Option<String>,

        /// Evaluation instant, RFC3339 (default: now)
        #[arg(long)]
        at: Option<String>,

        /// Default timezone for time rules (default: visitor.default_timezone)
        #[arg(long)]
        timezone: Option<String>,
    },

    /// Print the built-in rule presets as JSON
    Presets {
        /// Timezone for the business hours preset
        #[arg(long, default_value = "UTC")]
        timezone: String,

        /// Country for the country boost preset
        #[arg(long, default_value = "US")]
        country: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

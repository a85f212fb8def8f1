//! Command-line interface.

use clap::{Parser, Subcommand};

/// User profile service: accounts, badges, preferences and password resets.
#[derive(Parser)]
#[command(name = "userservice")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API (default)
    #[command(alias = "daemon")]
    Serve,

    /// Create a default config file if none exists
    Init,

    /// Apply migrations and seed the badge and interest catalogs, then exit
    Migrate,

    /// Validate the effective configuration and print it
    CheckConfig,
}

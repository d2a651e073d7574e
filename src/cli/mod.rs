//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Mercator using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Mercator - Retail Warehouse ETL Tool
#[derive(Parser, Debug)]
#[command(name = "mercator")]
#[command(version, about, long_about = None)]
#[command(author = "Mercator Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "mercator.toml", env = "MERCATOR_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "MERCATOR_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the warehouse from the raw extracts or the staged tables
    Run(commands::run::RunArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Show warehouse table inventory and checksums
    Status(commands::status::StatusArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

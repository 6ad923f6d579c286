//! # Folio CLI Module
//!
//! This module implements the CLI interface for folio.
//!
//! ## Available Commands
//!
//! - `render` - Run the demo pipeline for one request and print the page
//! - `plan` - Show which systems the content stage would run
//! - `config` - Print the effective configuration

mod commands;

use crate::config::load_config;
use clap::{Parser, Subcommand};
use folio_core::FolioResult;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Folio - tag-based page pipeline
///
/// Attaches tags to a request, dispatches the systems whose families admit
/// them, and prints the rendered page.
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML pipeline configuration
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render one request through the demo pipeline
    Render {
        /// Request path
        #[arg(default_value = "/")]
        path: String,

        /// Tag to attach (database[=TABLE], readonly, form, login, title=TEXT)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },

    /// Show the dispatch plan for a request without rendering
    Plan {
        /// Request path
        #[arg(default_value = "/")]
        path: String,

        /// Tag to attach (database[=TABLE], readonly, form, login, title=TEXT)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },

    /// Print the effective configuration
    Config,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> FolioResult<()> {
    let config = load_config(cli.config.as_deref())?;
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Render { path, tags }) => cmd_render(config, json_mode, &path, &tags),
        Some(Commands::Plan { path, tags }) => cmd_plan(config, json_mode, &path, &tags),
        Some(Commands::Config) | None => cmd_config(&config, json_mode),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_repeated_tags() {
        let cli = Cli::try_parse_from([
            "folio", "render", "/users", "--tag", "database=users", "-t", "form",
        ])
        .expect("parse");

        assert!(matches!(
            cli.command,
            Some(Commands::Render { ref path, ref tags })
                if path == "/users" && *tags == ["database=users", "form"]
        ));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["folio", "plan", "--json-mode", "-q"]).expect("parse");

        assert!(cli.json_mode);
        assert!(cli.quiet);
        assert!(matches!(cli.command, Some(Commands::Plan { .. })));
    }
}

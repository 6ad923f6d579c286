//! # Folio - Page Pipeline Driver
//!
//! The main binary for the folio dispatch kernel.
//!
//! ## Usage
//!
//! ```bash
//! # Render a page with tags attached
//! folio render /users --tag database=users --tag form
//!
//! # Show the dispatch plan only
//! folio plan /users -t database=users -t readonly
//!
//! # Print the effective configuration
//! folio --config folio.toml config
//! ```

use clap::Parser;
use folio::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let cli = cli::Cli::parse();

    // FOLIO_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("FOLIO_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let default_filter = if cli.verbose {
        "folio=debug,folio_core=debug"
    } else {
        "folio=info,folio_core=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner to stderr, keeping stdout for page output.
fn print_banner() {
    eprintln!("folio v{} - tag dispatch kernel", env!("CARGO_PKG_VERSION"));
}

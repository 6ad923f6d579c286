//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::config::render_config;
use crate::demo::{demo_pipeline, demo_request};
use folio_core::{FolioError, FolioResult, PipelineConfig};
use serde::Serialize;

/// JSON shape of `folio plan`.
#[derive(Debug, Serialize)]
pub struct PlanOutput<'a> {
    /// Request path as given.
    pub path: &'a str,
    /// Tags as given.
    pub tags: &'a [String],
    /// Systems in dispatch order.
    pub systems: Vec<&'static str>,
}

fn print_json<T: Serialize>(value: &T) -> FolioResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| FolioError::Config(format!("Cannot serialize output: {}", e)))?;
    println!("{}", text);
    Ok(())
}

// =============================================================================
// RENDER COMMAND
// =============================================================================

/// Run the demo pipeline for one request.
pub fn cmd_render(
    config: PipelineConfig,
    json_mode: bool,
    path: &str,
    tags: &[String],
) -> FolioResult<()> {
    let request = demo_request(path, tags)?;
    let mut pipeline = demo_pipeline(config)?;

    let Some(page) = pipeline.run(&request)? else {
        return Ok(());
    };

    if json_mode {
        return print_json(&page);
    }

    println!("{}", page.body);
    Ok(())
}

// =============================================================================
// PLAN COMMAND
// =============================================================================

/// Print the systems the content stage would run.
pub fn cmd_plan(
    config: PipelineConfig,
    json_mode: bool,
    path: &str,
    tags: &[String],
) -> FolioResult<()> {
    let request = demo_request(path, tags)?;
    let pipeline = demo_pipeline(config)?;
    let systems = pipeline.plan(&request)?;

    if json_mode {
        return print_json(&PlanOutput {
            path,
            tags,
            systems,
        });
    }

    println!("Folio Dispatch Plan");
    println!("===================");
    println!("Path: {}", path);
    println!("Tags: {}", tags.join(", "));
    println!();
    if systems.is_empty() {
        println!("No system admits this request.");
    }
    for (position, name) in systems.iter().enumerate() {
        println!("  {}. {}", position + 1, name);
    }
    println!();
    println!("Systems registered by modules are not shown.");

    Ok(())
}

// =============================================================================
// CONFIG COMMAND
// =============================================================================

/// Print the effective configuration.
pub fn cmd_config(config: &PipelineConfig, json_mode: bool) -> FolioResult<()> {
    if json_mode {
        return print_json(config);
    }

    print!("{}", render_config(config)?);
    Ok(())
}

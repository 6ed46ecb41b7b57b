//! Output renderers for CLI commands.

use anyhow::anyhow;
use serde::Serialize;
use vfxpipe_api_models::{
    CreateWorkspaceResponse, FilesFoldersResponse, HealthResponse, IngestResponse, ListingEntry,
};

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

pub(crate) fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    println!("{text}");
    Ok(())
}

fn print_error_lines(error: Option<&str>) {
    for line in error.into_iter().flat_map(str::lines) {
        println!("error: {line}");
    }
}

pub(crate) fn render_health(health: &HealthResponse, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(health)?,
        OutputFormat::Table => {
            println!("status: {}", health.status);
            println!("build: {}", health.build);
            println!("files copied: {}", health.files_copied_total);
            println!("version collisions: {}", health.version_collisions_total);
        }
    }
    Ok(())
}

pub(crate) fn render_workspace(
    workspace: &CreateWorkspaceResponse,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(workspace)?,
        OutputFormat::Table => {
            println!("result: {}", outcome_label(workspace.result));
            if !workspace.destination.is_empty() {
                println!("destination: {}", workspace.destination);
            }
            println!("template: {}", workspace.template_used);
            print_error_lines(workspace.error.as_deref());
        }
    }
    Ok(())
}

pub(crate) fn render_listing(listing: &FilesFoldersResponse, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(listing)?,
        OutputFormat::Table => {
            println!("{}", listing.search_path);
            for entry in &listing.files_found {
                println!("  {}", listing_line(entry));
            }
        }
    }
    Ok(())
}

pub(crate) fn render_ingest(ingest: &IngestResponse, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(ingest)?,
        OutputFormat::Table => {
            println!("result: {}", outcome_label(ingest.result));
            println!("source: {}", ingest.source_path);
            if let Some(destination) = &ingest.destination_path {
                println!("destination: {destination}");
            }
            print_error_lines(ingest.error.as_deref());
        }
    }
    Ok(())
}

const fn outcome_label(success: bool) -> &'static str {
    if success { "ok" } else { "failed" }
}

fn listing_line(entry: &ListingEntry) -> String {
    match entry {
        ListingEntry::Single(name) => name.clone(),
        ListingEntry::Sequence(first, last) => format!("{first} .. {last}"),
    }
}

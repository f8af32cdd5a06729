//! Renderers for configuration and batch summaries.

use std::path::Path;

use anyhow::anyhow;
use serde_json::json;
use unspool_config::IngestConfig;
use unspool_ingest::BatchSummary;

use crate::cli::OutputFormat;
use crate::error::{CliError, CliResult};

pub(crate) fn render_config(
    path: &Path,
    config: &IngestConfig,
    format: OutputFormat,
) -> CliResult<()> {
    println!("{}", format_config(path, config, format)?);
    Ok(())
}

pub(crate) fn render_batch_summary(summary: &BatchSummary, format: OutputFormat) -> CliResult<()> {
    println!("{}", format_batch_summary(summary, format)?);
    Ok(())
}

pub(crate) fn format_config(
    path: &Path,
    config: &IngestConfig,
    format: OutputFormat,
) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_pretty_json(&json!({
            "settings_file": path,
            "config": config,
        })),
        OutputFormat::Table => {
            let policy = &config.policy;
            let filter = if policy.extension_filter_enabled {
                policy
                    .extension_filter()
                    .map_or_else(|| "all files".to_string(), ToString::to_string)
            } else {
                "off".to_string()
            };
            let priority = if policy.priority_active() {
                policy.priority_groups.to_string()
            } else {
                "off".to_string()
            };
            let rows = [
                ("settings file", path.display().to_string()),
                ("monitor folder", config.monitor_folder.display().to_string()),
                (
                    "destination folder",
                    config.destination_folder.display().to_string(),
                ),
                ("extension filter", filter),
                ("priority groups", priority),
                ("whole folder copy", yes_no(policy.whole_folder_copy)),
                ("delete archive", yes_no(policy.delete_archive_after_extract)),
                ("delete extracted", yes_no(policy.delete_extracted_after_copy)),
            ];
            Ok(table(&rows))
        }
    }
}

pub(crate) fn format_batch_summary(
    summary: &BatchSummary,
    format: OutputFormat,
) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_pretty_json(&json!({
            "found": summary.found,
            "processed": summary.processed,
            "failed": summary.failed,
            "skipped": summary.skipped,
            "cancelled": summary.cancelled,
        })),
        OutputFormat::Table => Ok(table(&[
            ("found", summary.found.to_string()),
            ("processed", summary.processed.to_string()),
            ("failed", summary.failed.to_string()),
            ("skipped", summary.skipped.to_string()),
            ("cancelled", yes_no(summary.cancelled)),
        ])),
    }
}

fn table(rows: &[(&str, String)]) -> String {
    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    rows.iter()
        .map(|(label, value)| format!("{label:<width$}  {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn yes_no(flag: bool) -> String {
    let label = if flag { "yes" } else { "no" };
    label.to_string()
}

fn to_pretty_json(value: &serde_json::Value) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to render JSON: {err}")))
}

//! Export resource initialization.
//!
//! This module contains `init_export_resources`, which handles all setup
//! before the dispatch loop begins.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use log::info;

use crate::config::Config;
use crate::error_handling::ProcessingStats;
use crate::export::{ExportLayout, Record, RecordExporter};
use crate::initialization::{init_base_dir, init_semaphore};
use crate::source::{RecordQuery, RecordSource};

use super::resources::{ExportResources, RunCounters};

/// Initialize all resources needed for an export run.
///
/// Steps:
/// 1. Validate configuration
/// 2. Create the base directory
/// 3. Connect to the source, read every record, close the source
/// 4. Set up the exporter, semaphore and counters
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the base directory
/// cannot be created or the source cannot be read. No record has been
/// written at that point.
pub async fn init_export_resources(config: Config) -> Result<ExportResources> {
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Configuration validation failed: {}", e))?;

    init_base_dir(&config.base_dir).context("Failed to prepare export directory")?;

    let records = load_records(&config).await?;
    info!(
        "Read {} record{} from '{}'",
        records.len(),
        if records.len() == 1 { "" } else { "s" },
        config.table
    );

    let start_time_epoch = Utc::now().timestamp_millis();
    let run_id = format!("run_{}", start_time_epoch);
    info!("Starting run: {}", run_id);

    let exporter = Arc::new(RecordExporter::new(ExportLayout::from(&config)));
    let semaphore = init_semaphore(config.max_concurrency);

    Ok(ExportResources {
        records,
        exporter,
        semaphore,
        error_stats: Arc::new(ProcessingStats::new()),
        counters: RunCounters::default(),
        run_id,
        start_time: std::time::Instant::now(),
        config,
    })
}

/// Reads the configured table, closing the source on both success and error.
async fn load_records(config: &Config) -> Result<Vec<Record>> {
    let source = RecordSource::connect(&config.database_url)
        .await
        .context("Failed to connect to source database")?;

    let query = RecordQuery {
        table: config.table.clone(),
        id_column: config.id_column.clone(),
        image_column: config.image_column.clone(),
        only: config.only.clone(),
    };
    let result = source.fetch_records(&query).await;
    source.close().await;

    result.with_context(|| format!("Failed to read records from '{}'", config.table))
}

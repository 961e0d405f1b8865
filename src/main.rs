//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `record_export` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - Ctrl-C handling
//! - Console output and exit codes
//!
//! All core functionality is implemented in the library crate.

use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;

use record_export::cli::Cli;
use record_export::initialization::init_logger_with;
use record_export::{evaluate_exit_code, run_export_with_cancel};

#[tokio::main]
async fn main() -> Result<()> {
    // .env in the working directory, then next to the executable
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let cli = Cli::parse();
    let fail_on = cli.fail_on;
    let pct_threshold = cli.fail_on_pct_threshold;

    let mut config = cli.into_config();
    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    config.progress_callback = Some(Arc::new(|identifier: &str| {
        println!("Done:{identifier}");
    }));

    let cancel = CancellationToken::new();
    let ctrl_c_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupt received, finishing in-flight records");
            ctrl_c_token.cancel();
        }
    });

    match run_export_with_cancel(config, cancel).await {
        Ok(report) => {
            println!("{}", report.decode_summary());
            for failure in &report.failures {
                println!("{}", failure.display_line());
            }
            if report.is_partial() {
                println!("Not dispatched:{} records", report.not_dispatched);
            }
            process::exit(evaluate_exit_code(fail_on, pct_threshold, &report));
        }
        Err(e) => {
            eprintln!("record_export error: {:#}", e);
            process::exit(1);
        }
    }
}

//! pruls — archive a directory, upload it to object storage, verify, clean up.
//!
//! Configured through `PRULS_*` environment variables; see `pruls_core::config`.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use pruls_cli::{
    connect_storage, describe_cleanup, init_tracing, load_env_file, stage_failure, LogFormat,
};
use pruls_core::BackupConfig;
use pruls_services::{BackupPipeline, TarGzArchiver};

#[derive(Parser)]
#[command(name = "pruls", about = "Single-run directory backup to object storage")]
struct Cli {
    /// Read environment defaults from this file instead of ./.env
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Keep the local archive after a successful upload
    #[arg(long)]
    keep_local: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Backup aborted: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    load_env_file(cli.env_file.as_deref()).context("Failed to load env file")?;

    let config = BackupConfig::from_env().context("Invalid configuration")?;
    let storage = connect_storage(&config).await?;

    let pipeline = BackupPipeline::new(config, storage, Arc::new(TarGzArchiver::default()))
        .keep_local(cli.keep_local);

    let report = pipeline.run().await.map_err(stage_failure)?;

    tracing::info!(
        archive = %report.archive_name,
        bucket = %report.bucket,
        size_bytes = report.bytes_uploaded,
        chunks = report.chunks,
        duration_ms = report.duration.as_secs_f64() * 1000.0,
        cleanup = %describe_cleanup(&report.cleanup),
        "Backup completed"
    );

    Ok(())
}

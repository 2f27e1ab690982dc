//! Batch entrypoint: one full publishing run, for CI schedules.
//!
//! Exits 0 when a post was published and recorded, 1 on any failure. The
//! optional markdown copy is written afterwards; failing to write it only
//! logs a warning.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, error, info, warn};

use dailydose_core::{build_pipeline, load_config, validate_config, PipelineOutcome, RunMode};
use dailydose_server::logging;

/// Environment variable naming the config file.
const CONFIG_ENV: &str = "DAILYDOSE_CONFIG";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    logging::init("info");

    let config_path = std::env::var(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    info!("Starting daily post generation...");
    let pipeline = build_pipeline(&config).context("Failed to set up pipeline")?;

    let outcome = match pipeline.run(RunMode::Publish).await {
        Ok(outcome) => outcome,
        Err(e) => {
            if let Some(raw) = e.raw_payload() {
                debug!("Raw upstream response: {}", raw);
            }
            return Err(anyhow::Error::new(e).context("Pipeline run failed"));
        }
    };

    info!("Topic: {}", outcome.topic);
    info!("Generated {} characters", outcome.document.char_len());
    if let Some(url) = outcome.url() {
        info!("Published: {}", url);
    }

    if let Some(dir) = &config.pipeline.output_dir {
        match write_output(dir, &outcome) {
            Ok(path) => info!("Saved post to {:?}", path),
            Err(e) => warn!("Post published but not saved locally: {:#}", e),
        }
    }

    info!("Done");
    Ok(())
}

/// Write the markdown to `<dir>/<YYYY-MM-DD>-<slug>.md`.
fn write_output(dir: &Path, outcome: &PipelineOutcome) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {:?}", dir))?;
    let path = dir.join(format!(
        "{}-{}.md",
        Utc::now().format("%Y-%m-%d"),
        outcome.topic.slug()
    ));
    std::fs::write(&path, &outcome.document.markdown)
        .with_context(|| format!("Failed to write {:?}", path))?;
    Ok(path)
}

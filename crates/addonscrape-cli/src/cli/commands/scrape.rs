//! `addonscrape scrape <addon>` – run the full pipeline for one addon.

use crate::cli::output::StatusEnvelope;
use addonscrape_core::config::ScraperConfig;
use addonscrape_core::{CancelToken, Pipeline, RunMode};
use anyhow::{Context, Result};

/// Runs the pipeline on a blocking thread and prints the status envelope.
/// Ctrl-C or the configured deadline cancels the run.
pub async fn run_scrape(cfg: &ScraperConfig, addon: &str, pure: bool) -> Result<()> {
    let mode = if pure { RunMode::Pure } else { RunMode::Full };
    let cancel = CancelToken::new();
    let mut task = tokio::task::spawn_blocking({
        let pipeline = Pipeline::new(cfg);
        let addon = addon.to_string();
        let cancel = cancel.clone();
        move || pipeline.run(&addon, mode, &cancel)
    });

    let deadline = tokio::time::sleep(cfg.deadline());
    tokio::pin!(deadline);
    let outcome = tokio::select! {
        joined = &mut task => joined.context("scrape task join")?,
        _ = &mut deadline => {
            tracing::warn!(deadline_secs = cfg.deadline_secs, "deadline reached, cancelling scrape");
            cancel.cancel();
            task.await.context("scrape task join")?
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted, cancelling scrape");
            cancel.cancel();
            task.await.context("scrape task join")?
        }
    };

    let envelope = StatusEnvelope::from_outcome(&outcome)?;
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    outcome.map(|_| ()).map_err(anyhow::Error::from)
}

//! `addonscrape extract <file>` – read addon metadata from a saved page.

use addonscrape_core::config::ScraperConfig;
use addonscrape_core::Pipeline;
use anyhow::{Context, Result};
use std::path::Path;

pub async fn run_extract(cfg: &ScraperConfig, path: &Path) -> Result<()> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("read page: {}", path.display()))?;
    let meta = Pipeline::new(cfg)
        .extract_page(&content)
        .with_context(|| format!("extract from {}", path.display()))?;
    println!("{}", serde_json::to_string_pretty(&meta)?);
    Ok(())
}

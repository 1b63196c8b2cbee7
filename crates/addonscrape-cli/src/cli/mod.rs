//! CLI for the addonscrape pipeline.

mod commands;
mod output;

use anyhow::Result;
use addonscrape_core::config::{self, ScraperConfig};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use commands::{run_config, run_extract, run_scrape};

/// Top-level CLI for addonscrape.
#[derive(Debug, Parser)]
#[command(name = "addonscrape")]
#[command(about = "addonscrape: addon metadata and download URL scraper", long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of the XDG config file.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Scrape addon metadata and resolve the final download URL.
    Scrape {
        /// Addon slug as used in the addon page URL (e.g. "deadly-boss-mods").
        addon: String,
        /// Print the embedded page data as found, without metadata projection or redirects.
        #[arg(long)]
        pure: bool,
    },

    /// Extract addon metadata from a saved addon page (no network).
    Extract {
        /// Path to the saved HTML page.
        path: PathBuf,
    },

    /// Show the config file path and the effective configuration.
    Config,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let cfg = load_config(self.config.as_deref())?;
        tracing::debug!("loaded config: {:?}", cfg);

        match self.command {
            CliCommand::Scrape { addon, pure } => run_scrape(&cfg, &addon, pure).await?,
            CliCommand::Extract { path } => run_extract(&cfg, &path).await?,
            CliCommand::Config => run_config(&cfg, self.config.as_deref())?,
        }

        Ok(())
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        Cli::parse().run().await
    }
}

fn load_config(path: Option<&Path>) -> Result<ScraperConfig> {
    match path {
        Some(p) => config::load_from(p),
        None => config::load_or_init(),
    }
}

#[cfg(test)]
mod tests;

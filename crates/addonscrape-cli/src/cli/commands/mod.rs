//! CLI command handlers. Each command is in its own file.

mod config;
mod extract;
mod scrape;

pub use config::run_config;
pub use extract::run_extract;
pub use scrape::run_scrape;

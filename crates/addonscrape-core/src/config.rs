use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings for the one call to the bypass intermediary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Intermediary command endpoint (FlareSolverr-compatible `/v1`).
    pub endpoint: String,
    /// Target page URL; `{slug}` is replaced by the addon slug.
    pub page_url_template: String,
    /// Timeout the intermediary itself may spend on the page, in milliseconds.
    pub max_timeout_ms: u64,
    /// Total timeout for our call to the intermediary. Must exceed `max_timeout_ms`.
    pub call_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://flaresolverr:8191/v1".to_string(),
            page_url_template: "https://www.curseforge.com/wow/addons/{slug}".to_string(),
            max_timeout_ms: 30_000,
            call_timeout_secs: 45,
            connect_timeout_secs: 10,
        }
    }
}

impl UpstreamConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Markers used to locate the embedded project record in page content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// `id` of the script element carrying the page's JSON data payload.
    pub data_script_id: String,
    /// Path from the payload root to the project object.
    pub project_path: Vec<String>,
    /// Opening markers of the flight chunk that carries the project (tried in order).
    pub chunk_start_markers: Vec<String>,
    pub chunk_end_marker: String,
    /// Key marker of the project object inside the escaped chunk, ending in `{`.
    pub project_marker: String,
    /// Present in the content of the client-rendered 404 page.
    pub not_found_marker: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            data_script_id: "__NEXT_DATA__".to_string(),
            project_path: vec![
                "props".to_string(),
                "pageProps".to_string(),
                "project".to_string(),
            ],
            chunk_start_markers: vec![
                r#"self.__next_f.push([1,""#.to_string(),
                r#"self.__next_f.push([1, ""#.to_string(),
            ],
            chunk_end_marker: "</script>".to_string(),
            project_marker: r#"\"project\":{"#.to_string(),
            not_found_marker: "NEXT_HTTP_ERROR_FALLBACK;404".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// Initial download URL; `{projectId}` and `{fileId}` are substituted.
    pub download_url_template: String,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            download_url_template:
                "https://www.curseforge.com/api/v1/mods/{projectId}/files/{fileId}/download"
                    .to_string(),
        }
    }
}

/// One fixed request header sent while following download redirects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderPair {
    pub name: String,
    pub value: String,
}

impl HeaderPair {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

/// Settings for following the download URL to the final artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedirectConfig {
    /// Total timeout for the redirect chain. Shorter than the scrape timeout.
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub max_redirects: u32,
    /// Reject a terminal response that does not look like a downloadable file.
    pub require_artifact: bool,
    /// Accepted file extensions of the final URL path (lowercase, no dot).
    pub artifact_extensions: Vec<String>,
    /// Accepted `Content-Type` values of the terminal response.
    pub artifact_content_types: Vec<String>,
    /// Browser-like headers sent in addition to `User-Agent` and `Cookie`.
    pub headers: Vec<HeaderPair>,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            connect_timeout_secs: 10,
            max_redirects: 10,
            require_artifact: true,
            artifact_extensions: ["zip", "rar", "7z", "jar", "gz", "tgz", "xz"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            artifact_content_types: [
                "application/zip",
                "application/x-zip-compressed",
                "application/octet-stream",
                "application/java-archive",
                "application/x-7z-compressed",
                "application/vnd.rar",
                "application/gzip",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            headers: vec![
                HeaderPair::new(
                    "Accept",
                    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8",
                ),
                HeaderPair::new("Accept-Language", "de-DE,de;q=0.9,en-US;q=0.8,en;q=0.7"),
                HeaderPair::new("Accept-Encoding", "gzip, deflate, br"),
                HeaderPair::new("Connection", "keep-alive"),
            ],
        }
    }
}

impl RedirectConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Global configuration loaded from `~/.config/addonscrape/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Overall deadline a caller imposes on one pipeline run, in seconds.
    pub deadline_secs: u64,
    pub upstream: UpstreamConfig,
    pub extract: ExtractConfig,
    pub metadata: MetadataConfig,
    pub redirect: RedirectConfig,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            deadline_secs: 75,
            upstream: UpstreamConfig::default(),
            extract: ExtractConfig::default(),
            metadata: MetadataConfig::default(),
            redirect: RedirectConfig::default(),
        }
    }
}

impl ScraperConfig {
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }

    /// Checks the timeout ordering and template placeholders the pipeline relies on.
    pub fn validate(&self) -> Result<()> {
        let up = &self.upstream;
        if up.call_timeout_secs.saturating_mul(1000) <= up.max_timeout_ms {
            anyhow::bail!(
                "upstream.call_timeout_secs ({}s) must exceed upstream.max_timeout_ms ({}ms)",
                up.call_timeout_secs,
                up.max_timeout_ms
            );
        }
        if up.call_timeout_secs >= self.deadline_secs {
            anyhow::bail!(
                "upstream.call_timeout_secs ({}) must be shorter than deadline_secs ({})",
                up.call_timeout_secs,
                self.deadline_secs
            );
        }
        if self.redirect.timeout_secs >= self.deadline_secs {
            anyhow::bail!(
                "redirect.timeout_secs ({}) must be shorter than deadline_secs ({})",
                self.redirect.timeout_secs,
                self.deadline_secs
            );
        }
        if !up.page_url_template.contains("{slug}") {
            anyhow::bail!("upstream.page_url_template must contain {{slug}}");
        }
        let tpl = &self.metadata.download_url_template;
        if !tpl.contains("{projectId}") || !tpl.contains("{fileId}") {
            anyhow::bail!("metadata.download_url_template must contain {{projectId}} and {{fileId}}");
        }
        if self.extract.chunk_start_markers.iter().all(|m| m.is_empty()) {
            anyhow::bail!("extract.chunk_start_markers must contain at least one marker");
        }
        if !self.extract.project_marker.ends_with('{') {
            anyhow::bail!("extract.project_marker must end with an opening brace");
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("addonscrape")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ScraperConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ScraperConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from(&path)
}

/// Load and validate configuration from an explicit path.
pub fn load_from(path: &Path) -> Result<ScraperConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    let cfg: ScraperConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config: {}", path.display()))?;
    Ok(cfg)
}

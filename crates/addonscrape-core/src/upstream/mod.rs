//! Upstream client: one POST to the anti-bot bypass intermediary.
//!
//! Sends `{cmd: "request.get", url, maxTimeout}` for the addon page and returns
//! the decoded envelope untouched; judging it is the validator's job. The call
//! timeout is strictly larger than `maxTimeout` so the intermediary can report
//! its own failure first. No retries.

pub mod envelope;

use crate::config::UpstreamConfig;
use crate::control::CancelToken;
use crate::slug::AddonSlug;
use serde::Serialize;
use url::Url;

pub use envelope::{Cookie, Solution, UpstreamEnvelope};

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("invalid target page URL {url:?}: {source}")]
    InvalidPageUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("could not encode intermediary command: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("intermediary request failed: {0}")]
    Transport(#[source] curl::Error),
    #[error("received error response from intermediary (HTTP {status})")]
    Http { status: u32 },
    #[error("intermediary response is not valid JSON: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("intermediary request cancelled by caller")]
    Cancelled,
}

impl From<curl::Error> for UpstreamError {
    fn from(e: curl::Error) -> Self {
        UpstreamError::Transport(e)
    }
}

/// Decoded reply of the intermediary. `envelope` is `None` for a JSON `null` body.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub http_status: u32,
    pub envelope: Option<UpstreamEnvelope>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Command<'a> {
    cmd: &'a str,
    url: &'a str,
    max_timeout: u64,
}

#[derive(Debug, Clone)]
pub struct UpstreamClient {
    cfg: UpstreamConfig,
}

impl UpstreamClient {
    pub fn new(cfg: UpstreamConfig) -> Self {
        Self { cfg }
    }

    /// Addon page URL for `slug`, from the configured template.
    pub fn page_url(&self, slug: &AddonSlug) -> Result<Url, UpstreamError> {
        let url = self.cfg.page_url_template.replace("{slug}", slug.as_str());
        Url::parse(&url).map_err(|source| UpstreamError::InvalidPageUrl { url, source })
    }

    /// Asks the intermediary to fetch the addon page for `slug`.
    ///
    /// Blocks the current thread; call from `spawn_blocking` if used from async code.
    /// Setting `cancel` aborts the in-flight transfer.
    pub fn fetch_page(
        &self,
        slug: &AddonSlug,
        cancel: &CancelToken,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let page_url = self.page_url(slug)?;
        let command = Command {
            cmd: "request.get",
            url: page_url.as_str(),
            max_timeout: self.cfg.max_timeout_ms,
        };
        let body = serde_json::to_vec(&command).map_err(UpstreamError::Encode)?;
        tracing::debug!(endpoint = %self.cfg.endpoint, url = %page_url, "posting request.get to intermediary");

        let mut easy = curl::easy::Easy::new();
        easy.url(&self.cfg.endpoint)?;
        easy.post(true)?;
        easy.post_fields_copy(&body)?;
        easy.connect_timeout(self.cfg.connect_timeout())?;
        easy.timeout(self.cfg.call_timeout())?;
        easy.progress(true)?;

        let mut list = curl::easy::List::new();
        list.append("Content-Type: application/json")?;
        list.append("Accept: application/json")?;
        easy.http_headers(list)?;

        let mut response: Vec<u8> = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                response.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.progress_function(|_, _, _, _| !cancel.is_cancelled())?;
            if let Err(e) = transfer.perform() {
                if e.is_aborted_by_callback() {
                    return Err(UpstreamError::Cancelled);
                }
                return Err(UpstreamError::Transport(e));
            }
        }

        let status = easy.response_code()?;
        if !(200..300).contains(&status) {
            return Err(UpstreamError::Http { status });
        }

        let envelope: Option<UpstreamEnvelope> =
            serde_json::from_slice(&response).map_err(UpstreamError::Decode)?;
        if let Some(env) = &envelope {
            tracing::debug!(
                version = env.version().unwrap_or("-"),
                elapsed_ms = env.elapsed_ms().unwrap_or(-1.0),
                "intermediary replied"
            );
        }

        Ok(UpstreamResponse {
            http_status: status,
            envelope,
        })
    }
}

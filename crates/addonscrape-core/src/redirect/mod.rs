//! Redirect resolution: follow the download URL to the artifact it points at.
//!
//! Replays the session that fetched the page (its `User-Agent` and cookies)
//! together with a browser-like header set, lets curl follow the redirect
//! chain, and stops reading as soon as the terminal response starts its body.
//! Only the headers and final URL of the terminal response are used.

pub mod artifact;

use crate::config::RedirectConfig;
use crate::control::CancelToken;
use crate::session::SessionContext;
use std::str;

pub use artifact::{ArtifactCheck, TerminalHeaders};

#[derive(Debug, thiserror::Error)]
pub enum RedirectError {
    #[error("download URL resolved to HTTP {status} ({url})")]
    RedirectHttpError { status: u32, url: String },
    #[error("download URL resolved to {url}, which does not look like a downloadable file (content type {content_type:?})")]
    UnexpectedArtifactType {
        url: String,
        content_type: Option<String>,
    },
    #[error("download URL request failed: {0}")]
    RedirectTransportError(#[source] curl::Error),
    #[error("download URL request cancelled by caller")]
    Cancelled,
}

impl From<curl::Error> for RedirectError {
    fn from(e: curl::Error) -> Self {
        RedirectError::RedirectTransportError(e)
    }
}

/// Terminal response of a resolved redirect chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub final_url: String,
    pub status: u32,
    pub redirects: u32,
    pub headers: TerminalHeaders,
}

#[derive(Debug, Clone)]
pub struct RedirectResolver {
    cfg: RedirectConfig,
    artifact: ArtifactCheck,
}

impl RedirectResolver {
    pub fn new(cfg: RedirectConfig) -> Self {
        let artifact = ArtifactCheck::from_config(&cfg);
        Self { cfg, artifact }
    }

    /// Final artifact URL for `initial_url`.
    pub fn resolve(
        &self,
        initial_url: &str,
        session: &SessionContext,
        cancel: &CancelToken,
    ) -> Result<String, RedirectError> {
        self.resolve_detailed(initial_url, session, cancel)
            .map(|r| r.final_url)
    }

    /// Like `resolve`, but returns status, hop count and terminal headers too.
    ///
    /// Blocks the current thread; call from `spawn_blocking` if used from async code.
    pub fn resolve_detailed(
        &self,
        initial_url: &str,
        session: &SessionContext,
        cancel: &CancelToken,
    ) -> Result<Resolved, RedirectError> {
        let mut easy = curl::easy::Easy::new();
        easy.url(initial_url)?;
        easy.get(true)?;
        easy.follow_location(true)?;
        easy.max_redirections(self.cfg.max_redirects)?;
        easy.connect_timeout(self.cfg.connect_timeout())?;
        easy.timeout(self.cfg.timeout())?;
        easy.progress(true)?;
        easy.http_headers(self.header_list(session)?)?;

        // Header lines of the latest response only; reset on each status line.
        let mut header_lines: Vec<String> = Vec::new();
        let mut body_started = false;
        let performed = {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(line) = str::from_utf8(data) {
                    let line = line.trim_end();
                    if line.starts_with("HTTP/") {
                        header_lines.clear();
                    }
                    header_lines.push(line.to_string());
                }
                true
            })?;
            transfer.write_function(|_| {
                body_started = true;
                Ok(0)
            })?;
            transfer.progress_function(|_, _, _, _| !cancel.is_cancelled())?;
            transfer.perform()
        };
        if let Err(e) = performed {
            if e.is_aborted_by_callback() {
                return Err(RedirectError::Cancelled);
            }
            // Refusing the body aborts with a write error; the headers are already in.
            if !(e.is_write_error() && body_started) {
                return Err(RedirectError::RedirectTransportError(e));
            }
        }

        let status = easy.response_code()?;
        let final_url = easy
            .effective_url()?
            .map(str::to_owned)
            .unwrap_or_else(|| initial_url.to_string());
        let redirects = easy.redirect_count()?;
        let headers = TerminalHeaders::from_lines(&header_lines);
        tracing::debug!(status, redirects, final_url = %final_url, "download URL resolved");

        if !(200..300).contains(&status) {
            return Err(RedirectError::RedirectHttpError {
                status,
                url: final_url,
            });
        }
        if self.cfg.require_artifact && !self.artifact.is_artifact(&final_url, &headers) {
            return Err(RedirectError::UnexpectedArtifactType {
                url: final_url,
                content_type: headers.content_type,
            });
        }

        Ok(Resolved {
            final_url,
            status,
            redirects,
            headers,
        })
    }

    fn header_list(&self, session: &SessionContext) -> Result<curl::easy::List, curl::Error> {
        let mut list = curl::easy::List::new();
        list.append(&format!("User-Agent: {}", session.user_agent()))?;
        if !session.cookie_header().is_empty() {
            list.append(&format!("Cookie: {}", session.cookie_header()))?;
        }
        for h in &self.cfg.headers {
            list.append(&format!("{}: {}", h.name.trim(), h.value.trim()))?;
        }
        Ok(list)
    }
}

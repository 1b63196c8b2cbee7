//! Pipeline error taxonomy.
//!
//! Stages return their own error types; the orchestrator tags them with the
//! failing stage. `kind()` and `classification()` give callers a stable, coarse
//! view while `Display` keeps the full diagnostic chain for logs.

use crate::control::Cancelled;
use crate::extract::ExtractionError;
use crate::redirect::RedirectError;
use crate::slug::SlugError;
use crate::upstream::UpstreamError;
use crate::validate::ValidationError;
use std::fmt;

/// Pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Input,
    Scrape,
    Validate,
    Extract,
    Project,
    Redirect,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Input => "input",
            Stage::Scrape => "scrape",
            Stage::Validate => "validate",
            Stage::Extract => "extract",
            Stage::Project => "project",
            Stage::Redirect => "redirect",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error(transparent)]
    Slug(#[from] SlugError),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Redirect(#[from] RedirectError),
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

/// Coarse error kind exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid or missing slug.
    Input,
    /// Network failure or non-2xx reply from the intermediary itself.
    UpstreamTransport,
    /// The intermediary reported failure, or the underlying fetch was neither 200 nor 404.
    UpstreamFailure,
    /// The intermediary's envelope is structurally unusable.
    InvalidEnvelope,
    /// The addon page does not exist.
    NotFound,
    /// Page content matches neither known shape.
    Extraction,
    /// Download URL could not be resolved to an artifact.
    Redirect,
    Cancelled,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Input => "input",
            ErrorKind::UpstreamTransport => "upstream_transport",
            ErrorKind::UpstreamFailure => "upstream_failure",
            ErrorKind::InvalidEnvelope => "invalid_envelope",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Extraction => "extraction",
            ErrorKind::Redirect => "redirect",
            ErrorKind::Cancelled => "cancelled",
        }
    }

    pub fn classification(&self) -> Classification {
        match self {
            ErrorKind::Input | ErrorKind::NotFound | ErrorKind::Cancelled => Classification::Client,
            ErrorKind::UpstreamTransport
            | ErrorKind::UpstreamFailure
            | ErrorKind::InvalidEnvelope
            | ErrorKind::Extraction
            | ErrorKind::Redirect => Classification::Server,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who caused the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Client,
    Server,
}

impl Classification {
    pub fn http_status(&self) -> u16 {
        match self {
            Classification::Client => 400,
            Classification::Server => 500,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{stage} stage failed: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: StageError,
}

impl PipelineError {
    pub fn new(stage: Stage, source: impl Into<StageError>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }

    pub fn cancelled(stage: Stage) -> Self {
        Self::new(stage, Cancelled)
    }

    pub fn kind(&self) -> ErrorKind {
        match &self.source {
            StageError::Slug(_) => ErrorKind::Input,
            StageError::Upstream(UpstreamError::Cancelled) => ErrorKind::Cancelled,
            StageError::Upstream(_) => ErrorKind::UpstreamTransport,
            StageError::Validation(e) => match e {
                ValidationError::NotFound(_) => ErrorKind::NotFound,
                ValidationError::UpstreamFailure { .. } | ValidationError::UpstreamHttpError(_) => {
                    ErrorKind::UpstreamFailure
                }
                _ => ErrorKind::InvalidEnvelope,
            },
            StageError::Extraction(_) => ErrorKind::Extraction,
            StageError::Redirect(RedirectError::Cancelled) => ErrorKind::Cancelled,
            StageError::Redirect(_) => ErrorKind::Redirect,
            StageError::Cancelled(_) => ErrorKind::Cancelled,
        }
    }

    pub fn classification(&self) -> Classification {
        self.kind().classification()
    }

    pub fn http_status(&self) -> u16 {
        self.classification().http_status()
    }

    /// Caller-facing message. Stable per kind; diagnostics stay in the logs.
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::Input => format!("Invalid addon slug: {}", self.source),
            ErrorKind::UpstreamTransport => {
                "Could not reach the scraping service. Please try again later.".to_string()
            }
            ErrorKind::UpstreamFailure => {
                "The scraping service could not load the addon page.".to_string()
            }
            ErrorKind::InvalidEnvelope => {
                "The scraping service returned an unusable response.".to_string()
            }
            ErrorKind::NotFound => "Addon page does not exist for the given addon slug.".to_string(),
            ErrorKind::Extraction => {
                "Could not read the addon data from the addon page.".to_string()
            }
            ErrorKind::Redirect => "Could not resolve the addon download URL.".to_string(),
            ErrorKind::Cancelled => "The request was cancelled.".to_string(),
        }
    }
}

//! Error types for envelope validation.

use std::fmt;

/// How a missing addon page was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundReason {
    /// The intermediary reported HTTP 404 for the underlying fetch.
    Status404,
    /// HTTP 200, but the content is the client-rendered 404 page.
    FallbackPage,
}

impl fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotFoundReason::Status404 => write!(f, "intermediary showed HTTP 404"),
            NotFoundReason::FallbackPage => write!(f, "intermediary received the 404 fallback page"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("the response object from the intermediary was null")]
    NullEnvelope,
    #[error("the \"status\" from the intermediary was missing or empty")]
    MissingStatus,
    #[error("the \"message\" from the intermediary was missing")]
    MissingMessage,
    #[error("the intermediary indicates that scraping was not successful (status {status:?}: {message})")]
    UpstreamFailure { status: String, message: String },
    #[error("the \"solution\" from the intermediary was missing")]
    MissingSolution,
    #[error("the \"solution\" from the intermediary is not an object: {0}")]
    MalformedSolution(#[source] serde_json::Error),
    #[error("the \"solution.{0}\" from the intermediary was missing or mistyped")]
    MissingSolutionField(&'static str),
    #[error("the \"solution.cookies\" from the intermediary is not a cookie sequence: {0}")]
    MalformedCookies(#[source] serde_json::Error),
    #[error("could not determine the addon page response status (got {0})")]
    MalformedStatus(String),
    #[error("addon page does not exist for the given addon slug ({0})")]
    NotFound(NotFoundReason),
    #[error("addon page response status was not OK (intermediary showed HTTP {0})")]
    UpstreamHttpError(u16),
    #[error("could not determine the addon page content (it was empty)")]
    EmptyContent,
}

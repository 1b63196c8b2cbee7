//! Envelope validation: decide whether the intermediary's reply can be trusted.
//!
//! Two layers detect a missing addon page. The numeric status of the
//! underlying fetch catches a real 404. The content sniff catches the
//! client-rendered 404 page, which the intermediary reports as HTTP 200.
//! Neither failure raises anything upstream, so both checks run on every envelope.

mod error;

use crate::session::SessionContext;
use crate::upstream::{Cookie, Solution, UpstreamEnvelope};
use serde_json::Value;

pub use error::{NotFoundReason, ValidationError};

/// Envelope that passed every check; the only shape later stages see.
#[derive(Debug, Clone)]
pub struct ValidatedEnvelope {
    /// Raw page content.
    pub content: String,
    pub session: SessionContext,
}

#[derive(Debug, Clone)]
pub struct EnvelopeValidator {
    not_found_marker: String,
}

impl EnvelopeValidator {
    pub fn new(not_found_marker: impl Into<String>) -> Self {
        Self {
            not_found_marker: not_found_marker.into(),
        }
    }

    /// Runs the envelope checks in order and stops at the first failure.
    pub fn validate(
        &self,
        envelope: Option<UpstreamEnvelope>,
    ) -> Result<ValidatedEnvelope, ValidationError> {
        let envelope = envelope.ok_or(ValidationError::NullEnvelope)?;

        let status = match envelope.status {
            Some(Value::String(s)) if !s.is_empty() => s,
            _ => return Err(ValidationError::MissingStatus),
        };
        let message = match envelope.message {
            None => return Err(ValidationError::MissingMessage),
            Some(Value::String(s)) => s,
            Some(other) => other.to_string(),
        };
        if !status.eq_ignore_ascii_case("ok") {
            tracing::warn!(status = %status, message = %message, "intermediary reported failure");
            return Err(ValidationError::UpstreamFailure { status, message });
        }

        let solution: Solution = match envelope.solution {
            None | Some(Value::Null) => return Err(ValidationError::MissingSolution),
            Some(v) => serde_json::from_value(v).map_err(ValidationError::MalformedSolution)?,
        };

        let fetch_status = solution
            .status
            .ok_or(ValidationError::MissingSolutionField("status"))?;
        if solution.headers.is_none() {
            return Err(ValidationError::MissingSolutionField("headers"));
        }
        let content = match solution.response {
            Some(Value::String(s)) => s,
            _ => return Err(ValidationError::MissingSolutionField("response")),
        };
        let cookies: Vec<Cookie> = match solution.cookies {
            Some(v) => serde_json::from_value(v).map_err(ValidationError::MalformedCookies)?,
            None => return Err(ValidationError::MissingSolutionField("cookies")),
        };
        let user_agent = match solution.user_agent {
            Some(Value::String(s)) if !s.is_empty() => s,
            _ => return Err(ValidationError::MissingSolutionField("userAgent")),
        };

        match fetch_status_code(&fetch_status)? {
            // Not reliable on its own: the 404 page may come back as 200, see below.
            404 => return Err(ValidationError::NotFound(NotFoundReason::Status404)),
            200 => {}
            other => return Err(ValidationError::UpstreamHttpError(other)),
        }

        if content.is_empty() {
            return Err(ValidationError::EmptyContent);
        }
        if self.is_not_found_page(&content) {
            return Err(ValidationError::NotFound(NotFoundReason::FallbackPage));
        }

        tracing::debug!(
            cookies = cookies.len(),
            content_len = content.len(),
            final_url = solution.url.as_deref().unwrap_or("-"),
            "envelope validated"
        );

        Ok(ValidatedEnvelope {
            session: SessionContext::new(user_agent, &cookies),
            content,
        })
    }

    /// True if `content` is the client-rendered 404 page.
    pub fn is_not_found_page(&self, content: &str) -> bool {
        !self.not_found_marker.is_empty() && content.contains(&self.not_found_marker)
    }
}

/// Numeric fetch status; numbers and numeric strings are accepted, range [1, 1024].
fn fetch_status_code(value: &Value) -> Result<u16, ValidationError> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match n {
        Some(n) if (1.0..=1024.0).contains(&n) && n.fract() == 0.0 => Ok(n as u16),
        _ => Err(ValidationError::MalformedStatus(value.to_string())),
    }
}

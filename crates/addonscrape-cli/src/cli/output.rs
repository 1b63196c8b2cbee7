//! Status envelope printed for every scrape: `{success, result, error, status}`.

use addonscrape_core::{Outcome, PipelineError};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct StatusEnvelope {
    pub success: bool,
    pub result: Value,
    pub error: String,
    pub status: String,
}

impl StatusEnvelope {
    pub fn success(result: Value) -> Self {
        Self {
            success: true,
            result,
            error: String::new(),
            status: pretty_status(200),
        }
    }

    pub fn failure(err: &PipelineError) -> Self {
        Self {
            success: false,
            result: Value::Null,
            error: err.user_message(),
            status: pretty_status(err.http_status()),
        }
    }

    pub fn from_outcome(outcome: &Result<Outcome, PipelineError>) -> serde_json::Result<Self> {
        match outcome {
            Ok(Outcome::Metadata(meta)) => Ok(Self::success(serde_json::to_value(meta)?)),
            // Valid JSON unless the extractor changes; keep it as text otherwise.
            Ok(Outcome::Raw(raw)) => Ok(Self::success(
                serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.clone())),
            )),
            Err(e) => Ok(Self::failure(e)),
        }
    }
}

pub fn pretty_status(code: u16) -> String {
    match code {
        200 => "HTTP 200 (OK)".to_string(),
        400 => "HTTP 400 (Bad Request)".to_string(),
        500 => "HTTP 500 (Internal Server Error)".to_string(),
        other => format!("HTTP {}", other),
    }
}

//! Content extraction: find the embedded project data in the fetched page.
//!
//! Pages come in two shapes. Older pages carry the whole data payload in one
//! `<script id="__NEXT_DATA__">` element. Newer pages stream it as escaped
//! string chunks pushed into `self.__next_f`. Strategies are tried in a fixed
//! order; the first success wins. When all fail, the most specific failure is
//! reported.

pub mod flight;
mod record;
pub mod scan;
pub mod script_tag;

use crate::config::ExtractConfig;
use serde_json::Value;
use std::fmt;

pub use flight::FlightChunkStrategy;
pub use record::{RawMainFile, RawProjectRecord};
pub use script_tag::ScriptTagStrategy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    ScriptTag,
    FlightChunk,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::ScriptTag => write!(f, "script tag"),
            StrategyKind::FlightChunk => write!(f, "flight chunk"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("could not find the {0:?} script element in the addon page content")]
    MissingDataElement(String),
    #[error("the {0:?} script element in the addon page content was empty")]
    EmptyDataElement(String),
    #[error("embedded {strategy} data is not valid JSON: {source}")]
    MalformedJson {
        strategy: StrategyKind,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not determine {0:?} in the embedded JSON data")]
    MissingField(String),
    #[error("could not find the start of the flight chunk in the addon page content")]
    MissingChunkStart,
    #[error("could not find the end of the flight chunk in the addon page content")]
    MissingChunkEnd,
    #[error("could not find the project data in any flight chunk")]
    MissingProjectMarker,
    #[error("project data in the flight chunk has no matching closing brace")]
    UnbalancedBraces,
    #[error("could not determine a positive {0:?} in the project data (necessary for the download URL)")]
    MissingRequiredIdentifier(&'static str),
    #[error("no extraction strategy configured")]
    NoStrategy,
}

impl ExtractionError {
    /// How far extraction got before failing. Higher means the page matched
    /// the strategy's shape more closely.
    pub fn specificity(&self) -> u8 {
        match self {
            ExtractionError::NoStrategy
            | ExtractionError::MissingDataElement(_)
            | ExtractionError::MissingChunkStart => 0,
            ExtractionError::EmptyDataElement(_)
            | ExtractionError::MissingChunkEnd
            | ExtractionError::MissingProjectMarker => 1,
            ExtractionError::MalformedJson { .. }
            | ExtractionError::MissingField(_)
            | ExtractionError::UnbalancedBraces => 2,
            ExtractionError::MissingRequiredIdentifier(_) => 3,
        }
    }
}

/// What a strategy found: the JSON text it parsed and the project object in it.
#[derive(Debug, Clone)]
pub struct Embedded {
    pub raw_json: String,
    pub project: Value,
}

#[derive(Debug, Clone)]
pub enum ExtractionStrategy {
    ScriptTag(ScriptTagStrategy),
    FlightChunk(FlightChunkStrategy),
}

impl ExtractionStrategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            ExtractionStrategy::ScriptTag(_) => StrategyKind::ScriptTag,
            ExtractionStrategy::FlightChunk(_) => StrategyKind::FlightChunk,
        }
    }

    pub fn try_extract(&self, content: &str) -> Result<Embedded, ExtractionError> {
        match self {
            ExtractionStrategy::ScriptTag(s) => s.try_extract(content),
            ExtractionStrategy::FlightChunk(s) => s.try_extract(content),
        }
    }
}

/// Successful extraction.
#[derive(Debug, Clone)]
pub struct ExtractedProject {
    pub strategy: StrategyKind,
    /// JSON text the record was read from: the whole data script for the
    /// script-tag shape, the unescaped project object for the flight shape.
    pub raw_json: String,
    pub record: RawProjectRecord,
}

#[derive(Debug, Clone)]
pub struct ContentExtractor {
    strategies: Vec<ExtractionStrategy>,
}

impl ContentExtractor {
    /// Script tag first, then flight chunks.
    pub fn new(cfg: &ExtractConfig) -> Self {
        Self::with_strategies(vec![
            ExtractionStrategy::ScriptTag(ScriptTagStrategy::from_config(cfg)),
            ExtractionStrategy::FlightChunk(FlightChunkStrategy::from_config(cfg)),
        ])
    }

    pub fn with_strategies(strategies: Vec<ExtractionStrategy>) -> Self {
        Self { strategies }
    }

    pub fn extract(&self, content: &str) -> Result<ExtractedProject, ExtractionError> {
        let mut best: Option<ExtractionError> = None;
        for strategy in &self.strategies {
            let kind = strategy.kind();
            let attempt = strategy.try_extract(content).and_then(|embedded| {
                let record = RawProjectRecord::from_value(&embedded.project)?;
                Ok(ExtractedProject {
                    strategy: kind,
                    raw_json: embedded.raw_json,
                    record,
                })
            });
            match attempt {
                Ok(found) => {
                    tracing::debug!(strategy = %kind, project_id = found.record.id, "project data extracted");
                    return Ok(found);
                }
                Err(e) => {
                    tracing::debug!(strategy = %kind, error = %e, "extraction strategy failed");
                    if best
                        .as_ref()
                        .map_or(true, |b| e.specificity() > b.specificity())
                    {
                        best = Some(e);
                    }
                }
            }
        }
        Err(best.unwrap_or(ExtractionError::NoStrategy))
    }
}

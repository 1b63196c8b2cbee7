//! Page data streamed as escaped string chunks pushed into the client-side buffer.
//!
//! The project object sits inside a JS string literal of one chunk, so it is
//! located with the string-aware scanner on the escaped text, then unescaped
//! and parsed.

use super::scan;
use super::{Embedded, ExtractionError, StrategyKind};
use crate::config::ExtractConfig;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct FlightChunkStrategy {
    start_markers: Vec<String>,
    end_marker: String,
    project_marker: String,
}

impl FlightChunkStrategy {
    pub fn new(start_markers: Vec<String>, end_marker: String, project_marker: String) -> Self {
        Self {
            start_markers,
            end_marker,
            project_marker,
        }
    }

    pub fn from_config(cfg: &ExtractConfig) -> Self {
        Self::new(
            cfg.chunk_start_markers.clone(),
            cfg.chunk_end_marker.clone(),
            cfg.project_marker.clone(),
        )
    }

    pub fn try_extract(&self, content: &str) -> Result<Embedded, ExtractionError> {
        let starts = self.chunk_starts(content);
        if starts.is_empty() {
            return Err(ExtractionError::MissingChunkStart);
        }

        let mut closed_chunk = false;
        for start in starts {
            let Some(len) = content[start..].find(&self.end_marker) else {
                continue;
            };
            closed_chunk = true;
            let chunk = &content[start..start + len];
            if let Some(open) = self.project_open_brace(chunk) {
                return self.parse_project(chunk, open);
            }
        }

        if closed_chunk {
            Err(ExtractionError::MissingProjectMarker)
        } else {
            Err(ExtractionError::MissingChunkEnd)
        }
    }

    /// Byte offsets just past every start marker, in page order.
    fn chunk_starts(&self, content: &str) -> Vec<usize> {
        let mut starts: Vec<usize> = self
            .start_markers
            .iter()
            .filter(|m| !m.is_empty())
            .flat_map(|m| content.match_indices(m.as_str()).map(|(i, m)| i + m.len()))
            .collect();
        starts.sort_unstable();
        starts.dedup();
        starts
    }

    /// Offset of the `{` that opens the project object inside `chunk`.
    fn project_open_brace(&self, chunk: &str) -> Option<usize> {
        if self.project_marker.is_empty() {
            return None;
        }
        let pos = chunk.find(&self.project_marker)?;
        let after = pos + self.project_marker.len();
        if self.project_marker.ends_with('{') {
            Some(after - 1)
        } else {
            chunk[after..].find('{').map(|i| after + i)
        }
    }

    fn parse_project(&self, chunk: &str, open: usize) -> Result<Embedded, ExtractionError> {
        let close = scan::find_closing_brace(chunk, open)
            .ok_or(ExtractionError::UnbalancedBraces)?;
        let raw_json = scan::unescape_js_string(&chunk[open..=close]);
        let project: Value =
            serde_json::from_str(&raw_json).map_err(|source| ExtractionError::MalformedJson {
                strategy: StrategyKind::FlightChunk,
                source,
            })?;
        Ok(Embedded { raw_json, project })
    }
}

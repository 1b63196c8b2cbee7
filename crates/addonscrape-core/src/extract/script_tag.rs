//! Page data carried whole in a dedicated `<script id="...">` element.

use super::{Embedded, ExtractionError, StrategyKind};
use crate::config::ExtractConfig;
use scraper::{Html, Selector};
use serde_json::Value;
use std::sync::LazyLock;

static SCRIPT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script").expect("static selector"));

#[derive(Debug, Clone)]
pub struct ScriptTagStrategy {
    script_id: String,
    project_path: Vec<String>,
}

impl ScriptTagStrategy {
    pub fn new(script_id: impl Into<String>, project_path: Vec<String>) -> Self {
        Self {
            script_id: script_id.into(),
            project_path,
        }
    }

    pub fn from_config(cfg: &ExtractConfig) -> Self {
        Self::new(cfg.data_script_id.clone(), cfg.project_path.clone())
    }

    pub fn try_extract(&self, content: &str) -> Result<Embedded, ExtractionError> {
        let text = self.script_text(content)?;
        let root: Value =
            serde_json::from_str(&text).map_err(|source| ExtractionError::MalformedJson {
                strategy: StrategyKind::ScriptTag,
                source,
            })?;
        let project = navigate(&root, &self.project_path)?.clone();
        Ok(Embedded {
            raw_json: text,
            project,
        })
    }

    fn script_text(&self, content: &str) -> Result<String, ExtractionError> {
        let document = Html::parse_document(content);
        let element = document
            .select(&SCRIPT)
            .find(|el| el.value().attr("id") == Some(self.script_id.as_str()))
            .ok_or_else(|| ExtractionError::MissingDataElement(self.script_id.clone()))?;
        let text: String = element.text().collect();
        if text.trim().is_empty() {
            return Err(ExtractionError::EmptyDataElement(self.script_id.clone()));
        }
        Ok(text)
    }
}

/// Follows `path` from `root`. A missing or `null` step fails with the dotted
/// path up to and including that step.
fn navigate<'a>(root: &'a Value, path: &[String]) -> Result<&'a Value, ExtractionError> {
    let mut current = root;
    for (i, segment) in path.iter().enumerate() {
        current = match current.get(segment.as_str()) {
            Some(v) if !v.is_null() => v,
            _ => return Err(ExtractionError::MissingField(path[..=i].join("."))),
        };
    }
    Ok(current)
}

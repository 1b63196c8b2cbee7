//! Projection of the extracted record into the caller-facing metadata shape.

use crate::config::MetadataConfig;
use crate::extract::RawProjectRecord;
use serde::{Deserialize, Serialize};

/// Canonical addon metadata. Optional fields serialize as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonMetadata {
    pub project_id: u64,
    pub project_name: Option<String>,
    pub project_slug: Option<String>,
    pub file_id: u64,
    pub file_name: Option<String>,
    pub file_length: Option<u64>,
    pub game_version: Option<String>,
    /// Download URL derived from the project and file ids.
    pub download_url: String,
    /// Artifact URL after redirects; empty until resolved.
    pub download_url_final: String,
}

impl AddonMetadata {
    pub fn with_final_url(self, url: impl Into<String>) -> Self {
        Self {
            download_url_final: url.into(),
            ..self
        }
    }
}

#[derive(Debug, Clone)]
pub struct MetadataProjector {
    download_url_template: String,
}

impl MetadataProjector {
    pub fn new(cfg: &MetadataConfig) -> Self {
        Self {
            download_url_template: cfg.download_url_template.clone(),
        }
    }

    pub fn download_url(&self, project_id: u64, file_id: u64) -> String {
        self.download_url_template
            .replace("{projectId}", &project_id.to_string())
            .replace("{fileId}", &file_id.to_string())
    }

    pub fn project(&self, record: RawProjectRecord) -> AddonMetadata {
        let download_url = self.download_url(record.id, record.main_file.id);
        AddonMetadata {
            project_id: record.id,
            project_name: record.name,
            project_slug: record.slug,
            file_id: record.main_file.id,
            file_name: record.main_file.file_name,
            file_length: record.main_file.file_length,
            game_version: record.main_file.primary_game_version,
            download_url,
            download_url_final: String::new(),
        }
    }
}

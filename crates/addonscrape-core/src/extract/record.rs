//! The project record read out of the embedded page data.

use super::ExtractionError;
use serde_json::Value;

/// Project fields the projector needs. `id` and `main_file.id` are always positive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProjectRecord {
    pub id: u64,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub main_file: RawMainFile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMainFile {
    pub id: u64,
    pub file_name: Option<String>,
    pub file_length: Option<u64>,
    pub primary_game_version: Option<String>,
}

impl RawProjectRecord {
    /// Reads the record from the parsed project object.
    ///
    /// Optional fields of the wrong type are treated as absent; only the two
    /// identifiers are required.
    pub fn from_value(project: &Value) -> Result<Self, ExtractionError> {
        let id = positive_id(project.get("id"))
            .ok_or(ExtractionError::MissingRequiredIdentifier("id"))?;
        let main_file = project.get("mainFile").unwrap_or(&Value::Null);
        let file_id = positive_id(main_file.get("id"))
            .ok_or(ExtractionError::MissingRequiredIdentifier("mainFile.id"))?;

        Ok(Self {
            id,
            name: string_field(project, "name"),
            slug: string_field(project, "slug"),
            main_file: RawMainFile {
                id: file_id,
                file_name: string_field(main_file, "fileName"),
                file_length: main_file.get("fileLength").and_then(Value::as_u64),
                primary_game_version: string_field(main_file, "primaryGameVersion"),
            },
        })
    }
}

fn positive_id(v: Option<&Value>) -> Option<u64> {
    v.and_then(Value::as_u64).filter(|n| *n > 0)
}

fn string_field(v: &Value, key: &str) -> Option<String> {
    v.get(key).and_then(Value::as_str).map(str::to_owned)
}

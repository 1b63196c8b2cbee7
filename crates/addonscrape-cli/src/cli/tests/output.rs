//! Tests for the status envelope.

use crate::cli::output::{pretty_status, StatusEnvelope};
use addonscrape_core::error::Stage;
use addonscrape_core::slug::SlugError;
use addonscrape_core::validate::{NotFoundReason, ValidationError};
use addonscrape_core::{AddonMetadata, Outcome, PipelineError};
use serde_json::json;

fn metadata() -> AddonMetadata {
    AddonMetadata {
        project_id: 111,
        project_name: Some("Foo".into()),
        project_slug: Some("foo".into()),
        file_id: 222,
        file_name: Some("foo.zip".into()),
        file_length: Some(1024),
        game_version: None,
        download_url: "https://www.curseforge.com/api/v1/mods/111/files/222/download".into(),
        download_url_final: "https://edge.example.com/foo.zip".into(),
    }
}

#[test]
fn success_envelope() {
    let env = StatusEnvelope::from_outcome(&Ok(Outcome::Metadata(metadata()))).unwrap();
    let v = serde_json::to_value(&env).unwrap();
    assert_eq!(v["success"], true);
    assert_eq!(v["error"], "");
    assert_eq!(v["status"], "HTTP 200 (OK)");
    assert_eq!(v["result"]["projectId"], 111);
    assert!(v["result"]["gameVersion"].is_null());
    assert_eq!(v["result"]["downloadUrlFinal"], "https://edge.example.com/foo.zip");
}

#[test]
fn pure_envelope_embeds_page_data() {
    let raw = r#"{"props":{"pageProps":{"project":{"id":1}}}}"#.to_string();
    let env = StatusEnvelope::from_outcome(&Ok(Outcome::Raw(raw))).unwrap();
    assert_eq!(env.result, json!({"props": {"pageProps": {"project": {"id": 1}}}}));
}

#[test]
fn not_found_is_bad_request() {
    let err = PipelineError::new(
        Stage::Validate,
        ValidationError::NotFound(NotFoundReason::FallbackPage),
    );
    let env = StatusEnvelope::from_outcome(&Err(err)).unwrap();
    assert!(!env.success);
    assert!(env.result.is_null());
    assert_eq!(env.status, "HTTP 400 (Bad Request)");
    assert_eq!(env.error, "Addon page does not exist for the given addon slug.");
}

#[test]
fn invalid_slug_is_bad_request() {
    let err = PipelineError::new(Stage::Input, SlugError::InvalidChar { ch: '/' });
    let env = StatusEnvelope::failure(&err);
    assert_eq!(env.status, "HTTP 400 (Bad Request)");
    assert!(env.error.contains("'/'"));
}

#[test]
fn server_side_failure() {
    let err = PipelineError::new(Stage::Validate, ValidationError::UpstreamHttpError(503));
    let env = StatusEnvelope::failure(&err);
    assert_eq!(env.status, "HTTP 500 (Internal Server Error)");
}

#[test]
fn pretty_status_strings() {
    assert_eq!(pretty_status(200), "HTTP 200 (OK)");
    assert_eq!(pretty_status(418), "HTTP 418");
}

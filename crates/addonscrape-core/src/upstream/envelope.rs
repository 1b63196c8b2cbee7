//! Serde model of the intermediary's response envelope.
//!
//! Fields are loose (`Option<Value>`): a missing or mistyped field is reported
//! by the validator, not as a decode error.
//!
//! ```text
//! {
//!     "solution": {
//!         "url": "https://www.curseforge.com/wow/addons/details",
//!         "status": 200,
//!         "headers": { ... },
//!         "response": "<!DOCTYPE html>...",
//!         "cookies": [ { "name": "cf_clearance", "value": "...", "domain": ".curseforge.com", ... } ],
//!         "userAgent": "Mozilla/5.0 ..."
//!     },
//!     "status": "ok",
//!     "message": "",
//!     "startTimestamp": 1594872947467,
//!     "endTimestamp": 1594872949617,
//!     "version": "1.0.0"
//! }
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Top-level intermediary response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamEnvelope {
    #[serde(default)]
    pub status: Option<Value>,
    /// `Some(Value::Null)` when the key is present with `null`; `None` when absent.
    #[serde(default, deserialize_with = "present")]
    pub message: Option<Value>,
    /// Kept raw; the validator decodes it into [`Solution`].
    #[serde(default)]
    pub solution: Option<Value>,
    /// Informational only; read with [`UpstreamEnvelope::elapsed_ms`] and [`UpstreamEnvelope::version`].
    #[serde(default)]
    pub start_timestamp: Option<Value>,
    #[serde(default)]
    pub end_timestamp: Option<Value>,
    #[serde(default)]
    pub version: Option<Value>,
}

impl UpstreamEnvelope {
    /// Milliseconds the intermediary spent, when both timestamps are numbers.
    pub fn elapsed_ms(&self) -> Option<f64> {
        let start = self.start_timestamp.as_ref()?.as_f64()?;
        let end = self.end_timestamp.as_ref()?.as_f64()?;
        Some(end - start)
    }

    /// Intermediary version, when reported as a string.
    pub fn version(&self) -> Option<&str> {
        self.version.as_ref()?.as_str()
    }
}

/// The intermediary's record of the underlying page fetch.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Solution {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(default)]
    pub headers: Option<Value>,
    #[serde(default)]
    pub response: Option<Value>,
    #[serde(default)]
    pub cookies: Option<Value>,
    #[serde(default)]
    pub user_agent: Option<Value>,
}

/// One browser cookie captured by the intermediary.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    pub name: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    /// Unix timestamp in seconds; absent for session cookies.
    #[serde(default, alias = "expires")]
    pub expiry: Option<f64>,
    #[serde(default)]
    pub http_only: Option<bool>,
    #[serde(default)]
    pub secure: Option<bool>,
    #[serde(default)]
    pub session: Option<bool>,
    #[serde(default)]
    pub same_site: Option<String>,
}

impl Cookie {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            ..Self::default()
        }
    }
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_null_is_distinct_from_absent() {
        let with_null: UpstreamEnvelope =
            serde_json::from_str(r#"{"status":"ok","message":null}"#).unwrap();
        assert_eq!(with_null.message, Some(Value::Null));

        let absent: UpstreamEnvelope = serde_json::from_str(r#"{"status":"ok"}"#).unwrap();
        assert_eq!(absent.message, None);
    }

    #[test]
    fn mistyped_fields_still_decode() {
        let env: UpstreamEnvelope = serde_json::from_str(
            r#"{"status":42,"message":"","solution":"nope","version":"3.3.21"}"#,
        )
        .unwrap();
        assert_eq!(env.status, Some(Value::from(42)));
        assert_eq!(env.solution, Some(Value::from("nope")));
        assert_eq!(env.version(), Some("3.3.21"));
    }

    #[test]
    fn mistyped_extras_still_decode() {
        let env: UpstreamEnvelope = serde_json::from_str(
            r#"{"status":"ok","message":"","version":3,"startTimestamp":"x","endTimestamp":10}"#,
        )
        .unwrap();
        assert_eq!(env.version, Some(Value::from(3)));
        assert_eq!(env.version(), None);
        assert_eq!(env.elapsed_ms(), None);

        let env: UpstreamEnvelope =
            serde_json::from_str(r#"{"startTimestamp":1000,"endTimestamp":3500}"#).unwrap();
        assert_eq!(env.elapsed_ms(), Some(2500.0));
    }

    #[test]
    fn cookie_decodes_camel_case() {
        let c: Cookie = serde_json::from_str(
            r#"{"name":"NID","value":"204=x","domain":".example.com","path":"/","expiry":1610684149.3,"size":178,"httpOnly":true,"secure":true,"session":false,"sameSite":"None"}"#,
        )
        .unwrap();
        assert_eq!(c.name, "NID");
        assert_eq!(c.expiry, Some(1610684149.3));
        assert_eq!(c.http_only, Some(true));
        assert_eq!(c.same_site.as_deref(), Some("None"));
    }

    #[test]
    fn cookie_accepts_devtools_expires_spelling() {
        let c: Cookie =
            serde_json::from_str(r#"{"name":"a","value":"b","expires":1700000000}"#).unwrap();
        assert_eq!(c.expiry, Some(1700000000.0));
    }
}

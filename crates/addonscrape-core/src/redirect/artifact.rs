//! Does the terminal response of the redirect chain look like a downloadable file?
//!
//! Any one hint is enough: the `Content-Type` base type, the extension of the
//! `Content-Disposition` filename, or the extension of the final URL path.

use crate::config::RedirectConfig;
use url::Url;

/// Headers of the terminal response that matter for the artifact check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TerminalHeaders {
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
}

impl TerminalHeaders {
    /// Collects from raw header lines of one response. Later duplicates win.
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut out = Self::default();
        for line in lines {
            let Some((name, value)) = line.as_ref().split_once(':') else {
                continue;
            };
            let name = name.trim();
            let value = value.trim().to_string();
            if name.eq_ignore_ascii_case("content-type") {
                out.content_type = Some(value);
            } else if name.eq_ignore_ascii_case("content-disposition") {
                out.content_disposition = Some(value);
            }
        }
        out
    }
}

#[derive(Debug, Clone)]
pub struct ArtifactCheck {
    extensions: Vec<String>,
    content_types: Vec<String>,
}

impl ArtifactCheck {
    pub fn new(extensions: &[String], content_types: &[String]) -> Self {
        Self {
            extensions: extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            content_types: content_types.iter().map(|t| t.to_ascii_lowercase()).collect(),
        }
    }

    pub fn from_config(cfg: &RedirectConfig) -> Self {
        Self::new(&cfg.artifact_extensions, &cfg.artifact_content_types)
    }

    pub fn is_artifact(&self, final_url: &str, headers: &TerminalHeaders) -> bool {
        if let Some(ct) = headers.content_type.as_deref() {
            if self.content_types.contains(&media_type(ct)) {
                return true;
            }
        }
        let disposition_name = headers
            .content_disposition
            .as_deref()
            .and_then(disposition_filename);
        if let Some(ext) = disposition_name.as_deref().and_then(extension) {
            if self.extensions.contains(&ext) {
                return true;
            }
        }
        url_extension(final_url).is_some_and(|ext| self.extensions.contains(&ext))
    }
}

/// `application/zip; charset=binary` -> `application/zip`.
fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

fn extension(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn url_extension(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    let last = url.path_segments()?.next_back()?.to_string();
    extension(&last)
}

/// Filename from a `Content-Disposition` value. `filename*=UTF-8''...` wins over `filename=`.
fn disposition_filename(value: &str) -> Option<String> {
    let mut plain: Option<String> = None;
    for param in value.split(';') {
        let Some((name, v)) = param.trim().split_once('=') else {
            continue;
        };
        let name = name.trim();
        let v = v.trim();
        if name.eq_ignore_ascii_case("filename*") {
            let encoded = v
                .split_once("''")
                .filter(|(charset, _)| charset.eq_ignore_ascii_case("utf-8"))
                .map(|(_, rest)| rest);
            if let Some(decoded) = encoded.map(percent_decode).filter(|s| !s.is_empty()) {
                return Some(decoded);
            }
        } else if name.eq_ignore_ascii_case("filename") {
            let unquoted = v
                .strip_prefix('"')
                .and_then(|s| s.strip_suffix('"'))
                .unwrap_or(v);
            if !unquoted.is_empty() {
                plain = Some(unquoted.replace("\\\"", "\""));
            }
        }
    }
    plain
}

fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes
                .get(i + 1..i + 3)
                .and_then(|h| std::str::from_utf8(h).ok())
                .and_then(|h| u8::from_str_radix(h, 16).ok());
            if let Some(b) = hex {
                out.push(b);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check() -> ArtifactCheck {
        ArtifactCheck::from_config(&RedirectConfig::default())
    }

    fn ct(v: &str) -> TerminalHeaders {
        TerminalHeaders {
            content_type: Some(v.to_string()),
            content_disposition: None,
        }
    }

    #[test]
    fn content_type_hint() {
        let c = check();
        assert!(c.is_artifact("https://edge.example.com/files/1", &ct("application/zip")));
        assert!(c.is_artifact(
            "https://edge.example.com/files/1",
            &ct("Application/Octet-Stream; charset=binary")
        ));
        assert!(!c.is_artifact("https://edge.example.com/files/1", &ct("text/html; charset=utf-8")));
    }

    #[test]
    fn url_extension_hint() {
        let c = check();
        assert!(c.is_artifact(
            "https://edge.example.com/files/DBM-10.2.zip?token=abc",
            &ct("text/plain")
        ));
        assert!(c.is_artifact("https://edge.example.com/a/B.ZIP", &TerminalHeaders::default()));
        assert!(!c.is_artifact("https://edge.example.com/a/page", &TerminalHeaders::default()));
        assert!(!c.is_artifact("https://edge.example.com/a/.zip", &TerminalHeaders::default()));
        assert!(!c.is_artifact("not a url", &TerminalHeaders::default()));
    }

    #[test]
    fn disposition_hint() {
        let c = check();
        let h = TerminalHeaders {
            content_type: Some("text/plain".into()),
            content_disposition: Some("attachment; filename=\"Foo-1.0.zip\"".into()),
        };
        assert!(c.is_artifact("https://edge.example.com/dl", &h));
    }

    #[test]
    fn disposition_filename_forms() {
        assert_eq!(
            disposition_filename("attachment; filename=report.zip").as_deref(),
            Some("report.zip")
        );
        assert_eq!(
            disposition_filename("attachment; filename=\"fallback.bin\"; filename*=UTF-8''caf%C3%A9.zip")
                .as_deref(),
            Some("café.zip")
        );
        assert_eq!(disposition_filename("inline"), None);
    }

    #[test]
    fn headers_from_lines() {
        let h = TerminalHeaders::from_lines(&[
            "HTTP/1.1 200 OK",
            "content-type: application/zip",
            "Content-Disposition: attachment; filename=a.zip",
            "",
        ]);
        assert_eq!(h.content_type.as_deref(), Some("application/zip"));
        assert_eq!(
            h.content_disposition.as_deref(),
            Some("attachment; filename=a.zip")
        );
    }
}

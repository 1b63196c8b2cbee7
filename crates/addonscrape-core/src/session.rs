//! Session artifacts captured by the intermediary and replayed on the download hop.

use crate::upstream::Cookie;

/// `User-Agent` and `Cookie` header values of the browsing session that fetched the page.
/// Built once from the validated envelope and never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    user_agent: String,
    cookie_header: String,
}

impl SessionContext {
    pub fn new(user_agent: impl Into<String>, cookies: &[Cookie]) -> Self {
        Self {
            user_agent: user_agent.into(),
            cookie_header: cookie_header(cookies),
        }
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// `name=value` pairs joined by `; `; empty when there were no cookies.
    pub fn cookie_header(&self) -> &str {
        &self.cookie_header
    }
}

/// Joins cookies into a `Cookie` header value. Empty input gives an empty string.
pub fn cookie_header(cookies: &[Cookie]) -> String {
    cookies
        .iter()
        .map(|c| format!("{}={}", c.name, c.value))
        .collect::<Vec<_>>()
        .join("; ")
}

//! Validated addon slug (`^[a-z0-9-]+$`, bounded length).

use std::fmt;

/// Longest slug accepted.
pub const MAX_SLUG_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlugError {
    #[error("addon slug is empty")]
    Empty,
    #[error("addon slug is {len} characters long (limit is {max})")]
    TooLong { len: usize, max: usize },
    #[error("addon slug contains {ch:?} (only a-z, 0-9 and '-' are allowed)")]
    InvalidChar { ch: char },
}

/// An addon identifier as used in the addon page URL. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AddonSlug(String);

impl AddonSlug {
    /// Trims and lower-cases `input`, then checks it against `[a-z0-9-]+`.
    pub fn parse(input: &str) -> Result<Self, SlugError> {
        let slug = input.trim().to_ascii_lowercase();
        if slug.is_empty() {
            return Err(SlugError::Empty);
        }
        let len = slug.chars().count();
        if len > MAX_SLUG_LEN {
            return Err(SlugError::TooLong {
                len,
                max: MAX_SLUG_LEN,
            });
        }
        if let Some(ch) = slug
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
        {
            return Err(SlugError::InvalidChar { ch });
        }
        Ok(Self(slug))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AddonSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AddonSlug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

//! Application version parsing.
//!
//! Versions are parsed loosely: a string with exactly three dot-separated
//! components becomes [`Version::Structured`], everything else is passed
//! through untouched as [`Version::Raw`]. Parsing never fails.

use serde::{Deserialize, Serialize};

/// Shortest input that can hold three dot-separated components ("x.y.z").
pub const MIN_VERSION_LEN: usize = 5;

/// A parsed application version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Version {
    /// Three dot-separated components, kept as written.
    Structured {
        /// First component.
        major: String,
        /// Second component.
        minor: String,
        /// Third component, including any pre-release suffix.
        patch: String,
    },
    /// Input that does not look like `x.y.z`.
    Raw(String),
}

impl Version {
    /// True when the input was split into components.
    pub fn is_structured(&self) -> bool {
        matches!(self, Version::Structured { .. })
    }
}

/// Parse a version string such as `"3.1.4"`.
///
/// Components are not checked for being numeric, so `"1.0.0-beta"` yields a
/// patch of `"0-beta"`. Inputs shorter than [`MIN_VERSION_LEN`] characters are
/// returned raw with a warning; other inputs without exactly three components
/// are returned raw silently.
pub fn parse_version(input: &str) -> Version {
    if input.chars().count() < MIN_VERSION_LEN {
        tracing::warn!(
            version = input,
            "could not parse version, it doesn't look like major.minor.patch"
        );
        return Version::Raw(input.to_string());
    }

    let parts: Vec<&str> = input.split('.').collect();
    match parts.as_slice() {
        [major, minor, patch] => Version::Structured {
            major: (*major).to_string(),
            minor: (*minor).to_string(),
            patch: (*patch).to_string(),
        },
        _ => Version::Raw(input.to_string()),
    }
}

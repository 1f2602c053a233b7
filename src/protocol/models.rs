//! License terms and the loosely-typed values they carry.

use crate::LicenseSealError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Keys that may not appear among extra fields.
///
/// The first three are fixed terms; the last two would collide with the
/// fields of a flattened validation result.
pub const RESERVED_KEYS: [&str; 5] = ["major", "minor", "expire", "success", "appVersion"];

/// A single extra license attribute.
///
/// Serialized as plain JSON without a tag, so payloads stay readable and
/// older validators can carry attributes they don't understand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TermValue {
    /// Boolean flag.
    Bool(bool),
    /// Whole number.
    Integer(i64),
    /// Fractional number.
    Float(f64),
    /// Text value.
    Text(String),
    /// Ordered list of values.
    List(Vec<TermValue>),
    /// Nested mapping, kept key-sorted for deterministic encoding.
    Map(BTreeMap<String, TermValue>),
}

impl From<bool> for TermValue {
    fn from(value: bool) -> Self {
        TermValue::Bool(value)
    }
}

impl From<i64> for TermValue {
    fn from(value: i64) -> Self {
        TermValue::Integer(value)
    }
}

impl From<f64> for TermValue {
    fn from(value: f64) -> Self {
        TermValue::Float(value)
    }
}

impl From<&str> for TermValue {
    fn from(value: &str) -> Self {
        TermValue::Text(value.to_string())
    }
}

impl From<String> for TermValue {
    fn from(value: String) -> Self {
        TermValue::Text(value)
    }
}

impl TermValue {
    /// Interpret a command-line style value: JSON when it parses as JSON,
    /// plain text otherwise.
    ///
    /// A bare integer outside the `i64` range stays text instead of being
    /// rounded into a float. Integers nested inside a JSON list or object
    /// are not checked and may still lose precision.
    pub fn parse_lenient(raw: &str) -> Self {
        let trimmed = raw.trim();
        if is_integer_literal(trimmed) && trimmed.parse::<i64>().is_err() {
            return TermValue::Text(raw.to_string());
        }
        serde_json::from_str(raw).unwrap_or_else(|_| TermValue::Text(raw.to_string()))
    }

    /// Find a float JSON cannot represent, returning the path to it.
    fn non_finite_path(&self, at: &str) -> Option<String> {
        match self {
            TermValue::Float(f) if !f.is_finite() => Some(at.to_string()),
            TermValue::List(items) => items
                .iter()
                .enumerate()
                .find_map(|(i, item)| item.non_finite_path(&format!("{}[{}]", at, i))),
            TermValue::Map(entries) => entries
                .iter()
                .find_map(|(key, value)| value.non_finite_path(&format!("{}.{}", at, key))),
            _ => None,
        }
    }

    /// The text content, if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TermValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

fn is_integer_literal(raw: &str) -> bool {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Issuer-defined license terms.
///
/// `major`, `minor` and `expire` are always present; anything else lives in
/// `extra`. Field order plus the sorted map make the JSON encoding
/// deterministic, which is what gets signed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseTerms {
    /// Licensed major version (feature tier).
    pub major: String,

    /// Licensed minor version.
    pub minor: String,

    /// Expiry as written by the issuer. Advisory; see [`crate::policy::expiry`].
    pub expire: String,

    /// Additional attributes.
    #[serde(flatten)]
    pub extra: BTreeMap<String, TermValue>,
}

impl LicenseTerms {
    /// Create terms without extra fields.
    pub fn new(
        major: impl Into<String>,
        minor: impl Into<String>,
        expire: impl Into<String>,
    ) -> Self {
        Self {
            major: major.into(),
            minor: minor.into(),
            expire: expire.into(),
            extra: BTreeMap::new(),
        }
    }

    /// Add an extra attribute, builder style.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<TermValue>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Look up an extra attribute.
    pub fn field(&self, key: &str) -> Option<&TermValue> {
        self.extra.get(key)
    }

    /// Reject extra fields that shadow reserved keys.
    pub fn check_reserved(&self) -> Result<(), LicenseSealError> {
        if let Some(key) = RESERVED_KEYS.iter().find(|k| self.extra.contains_key(**k)) {
            return Err(LicenseSealError::InvalidTerms(format!(
                "extra field '{}' is reserved",
                key
            )));
        }
        Ok(())
    }

    /// Reject NaN and infinite floats anywhere in the extra fields.
    ///
    /// JSON has no encoding for them; `serde_json` writes `null`, which
    /// would produce a payload that no longer decodes as license terms.
    pub fn check_finite(&self) -> Result<(), LicenseSealError> {
        match self
            .extra
            .iter()
            .find_map(|(key, value)| value.non_finite_path(key))
        {
            Some(path) => Err(LicenseSealError::InvalidTerms(format!(
                "extra field '{}' is not a finite number",
                path
            ))),
            None => Ok(()),
        }
    }

    /// Canonical payload bytes.
    pub fn to_canonical_bytes(&self) -> Result<Vec<u8>, LicenseSealError> {
        self.check_reserved()?;
        self.check_finite()?;
        serde_json::to_vec(self)
            .map_err(|e| LicenseSealError::InvalidTerms(format!("Failed to serialize terms: {}", e)))
    }

    /// Decode terms from payload bytes.
    pub fn from_payload(payload: &[u8]) -> Result<Self, LicenseSealError> {
        let terms: LicenseTerms = serde_json::from_slice(payload)
            .map_err(|e| LicenseSealError::MalformedPayload(e.to_string()))?;
        terms
            .check_reserved()
            .map_err(|e| LicenseSealError::MalformedPayload(e.to_string()))?;
        Ok(terms)
    }
}

//! Signed license record and its on-disk envelope.
//!
//! The envelope is a small JSON document:
//! ```text
//! {
//!   "format": 1,
//!   "algorithm": "ed25519",
//!   "key_id": "<first 16 hex chars of the signer's key fingerprint>",
//!   "payload": "<base64 canonical terms>",
//!   "signature": "<base64 signature over the payload bytes>"
//! }
//! ```
//!
//! Nothing in the envelope besides `payload` and `signature` is trusted.
//! `key_id` only helps diagnose "signed with a different key" failures.

use crate::config::KeyAlgorithm;
use crate::LicenseSealError;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

/// Current envelope format version.
pub const ENVELOPE_FORMAT: u32 = 1;

/// A signed license: canonical payload bytes plus their signature.
///
/// Treated as an opaque, immutable blob once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedLicense {
    /// Canonical serialized license terms.
    pub payload: Vec<u8>,

    /// Signature over `payload`.
    pub signature: Vec<u8>,

    /// Fingerprint hint of the signing key (unauthenticated).
    pub key_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct EnvelopeRecord {
    format: u32,
    algorithm: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    key_id: Option<String>,
    payload: String,
    signature: String,
}

impl SignedLicense {
    /// Serialize to the envelope's JSON bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, LicenseSealError> {
        let record = EnvelopeRecord {
            format: ENVELOPE_FORMAT,
            algorithm: KeyAlgorithm::Ed25519.name().to_string(),
            key_id: self.key_id.clone(),
            payload: STANDARD.encode(&self.payload),
            signature: STANDARD.encode(&self.signature),
        };
        serde_json::to_vec_pretty(&record)
            .map_err(|e| LicenseSealError::Envelope(format!("Failed to serialize envelope: {}", e)))
    }

    /// Decode envelope bytes.
    ///
    /// This only checks structure; authenticity is established by
    /// [`crate::crypto::verify::verify`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LicenseSealError> {
        let record: EnvelopeRecord = serde_json::from_slice(bytes)
            .map_err(|e| LicenseSealError::Envelope(format!("Failed to parse envelope: {}", e)))?;

        if record.format != ENVELOPE_FORMAT {
            return Err(LicenseSealError::Envelope(format!(
                "Unsupported envelope format: {} (expected {})",
                record.format, ENVELOPE_FORMAT
            )));
        }

        if KeyAlgorithm::from_name(&record.algorithm).is_none() {
            return Err(LicenseSealError::Envelope(format!(
                "Unsupported signature algorithm: {}",
                record.algorithm
            )));
        }

        let payload = STANDARD
            .decode(record.payload.trim())
            .map_err(|e| LicenseSealError::Envelope(format!("Invalid payload base64: {}", e)))?;

        let signature = STANDARD
            .decode(record.signature.trim())
            .map_err(|e| LicenseSealError::Envelope(format!("Invalid signature base64: {}", e)))?;

        Ok(Self {
            payload,
            signature,
            key_id: record.key_id,
        })
    }
}

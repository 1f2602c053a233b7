//! License-seal error types.

use crate::storage::Artifact;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur while issuing or validating licenses.
#[derive(Debug, Error)]
pub enum LicenseSealError {
    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An artifact could not be read or written.
    #[error("I/O error: {0}")]
    Io(String),

    /// Key bytes do not parse as the expected PEM encoding.
    #[error("Key format error: {0}")]
    KeyFormat(String),

    /// The signing operation failed (e.g. wrong passphrase).
    #[error("Signing error: {0}")]
    Signing(String),

    /// License signature verification failed.
    #[error("License signature verification failed")]
    Authenticity,

    /// Signature verified but the payload is not a valid set of license terms.
    #[error("Malformed license payload: {0}")]
    MalformedPayload(String),

    /// The signed license file could not be decoded.
    #[error("Signed license envelope error: {0}")]
    Envelope(String),

    /// License terms cannot be signed as given.
    #[error("Invalid license terms: {0}")]
    InvalidTerms(String),

    /// Publishing the issued artifacts stopped part way through.
    #[error("Publishing {failed} failed after writing {written:?}: {source}")]
    PartialPublish {
        /// Artifacts that were written before the failure.
        written: Vec<Artifact>,
        /// The artifact whose write failed.
        failed: Artifact,
        /// The underlying write error.
        #[source]
        source: Box<LicenseSealError>,
    },

    /// The validation bridge is closed or the channel is not allowed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The `expire` field is not a recognized date.
    #[error("Invalid expiry date: {0}")]
    InvalidExpiry(String),

    /// A validation result carries no verified terms to check.
    #[error("No verified license terms")]
    Unlicensed,

    /// The license expired.
    #[error("License expired at {expired_at}")]
    Expired {
        /// The instant the license stopped being valid.
        expired_at: DateTime<Utc>,
    },
}

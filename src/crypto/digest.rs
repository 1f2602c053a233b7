//! SHA-256 key fingerprints.

use ed25519_dalek::VerifyingKey;
use sha2::{Digest, Sha256};

/// Number of hex characters kept in a key id.
pub const KEY_ID_LEN: usize = 16;

/// Full hex-encoded SHA-256 of the raw public key bytes.
pub fn key_fingerprint(key: &VerifyingKey) -> String {
    let hash = Sha256::digest(key.as_bytes());
    hex::encode(hash)
}

/// Short key id used in envelopes and log lines.
pub fn key_id(key: &VerifyingKey) -> String {
    let mut fingerprint = key_fingerprint(key);
    fingerprint.truncate(KEY_ID_LEN);
    fingerprint
}

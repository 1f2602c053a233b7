//! License signing.
//!
//! The payload is signed with Ed25519, a genuine signature scheme that
//! hashes the message (SHA-512) as part of signing. Licenses are never
//! produced by "encrypting" the payload with the private key: raw RSA
//! private-key encryption binds no hash to the data and admits structural
//! forgeries.

use crate::crypto::digest::key_id;
use crate::crypto::keypair::decode_private_key;
use crate::protocol::envelope::SignedLicense;
use crate::protocol::models::LicenseTerms;
use crate::LicenseSealError;
use ed25519_dalek::Signer;

/// Sign license terms with a PEM private key.
///
/// # Arguments
/// * `terms` - The license terms to embed
/// * `private_key` - PKCS#8 PEM private key bytes
/// * `passphrase` - Passphrase for an encrypted private key
///
/// # Errors
/// * `InvalidTerms` - An extra field uses a reserved key or a non-finite float
/// * `KeyFormat` - The private key cannot be parsed
/// * `Signing` - Missing/wrong passphrase or other signing failure
pub fn sign(
    terms: &LicenseTerms,
    private_key: &[u8],
    passphrase: Option<&str>,
) -> Result<SignedLicense, LicenseSealError> {
    let payload = terms.to_canonical_bytes()?;
    let signing_key = decode_private_key(private_key, passphrase)?;

    let signature = signing_key
        .try_sign(&payload)
        .map_err(|e| LicenseSealError::Signing(e.to_string()))?;

    let key_id = key_id(&signing_key.verifying_key());
    tracing::debug!(key_id = %key_id, payload_len = payload.len(), "signed license payload");

    Ok(SignedLicense {
        payload,
        signature: signature.to_bytes().to_vec(),
        key_id: Some(key_id),
    })
}

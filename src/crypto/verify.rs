//! Ed25519 license verification.

use crate::crypto::digest::key_id;
use crate::crypto::keypair::decode_public_key;
use crate::protocol::envelope::SignedLicense;
use crate::protocol::models::LicenseTerms;
use crate::LicenseSealError;
use ed25519_dalek::{Signature, VerifyingKey};

/// Verify a raw Ed25519 signature over `payload`.
///
/// Uses strict verification, rejecting small-order keys and
/// non-canonical signatures.
pub fn verify_ed25519(
    payload: &[u8],
    signature: &[u8],
    verifying_key: &VerifyingKey,
) -> Result<(), LicenseSealError> {
    let signature =
        Signature::from_slice(signature).map_err(|_| LicenseSealError::Authenticity)?;

    verifying_key
        .verify_strict(payload, &signature)
        .map_err(|_| LicenseSealError::Authenticity)?;

    Ok(())
}

/// Verify a signed license against a PEM public key and recover its terms.
///
/// Verification is all-or-nothing: the payload is only decoded after the
/// signature checks out, so a forged license never yields any field.
///
/// # Errors
/// * `KeyFormat` - The public key cannot be parsed
/// * `Authenticity` - The signature does not match payload and key
/// * `MalformedPayload` - Authentic payload that is not valid license terms
pub fn verify(signed: &SignedLicense, public_key: &[u8]) -> Result<LicenseTerms, LicenseSealError> {
    let verifying_key = decode_public_key(public_key)?;

    if let Some(claimed) = signed.key_id.as_deref() {
        let actual = key_id(&verifying_key);
        if claimed != actual {
            tracing::debug!(
                claimed_key_id = claimed,
                actual_key_id = %actual,
                "license claims a different signing key"
            );
        }
    }

    verify_ed25519(&signed.payload, &signed.signature, &verifying_key)?;

    LicenseTerms::from_payload(&signed.payload)
}

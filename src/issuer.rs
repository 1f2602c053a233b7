//! License issuance.
//!
//! Issuance is an operator-driven one-shot action, so unlike validation every
//! failure is returned to the caller. Publishing writes the public key, the
//! private key and the license in that order; if a write fails the error
//! lists what was already written so the caller can clean up or retry the
//! whole set.
//!
//! The private key is never written into the directory of a distributed
//! artifact. Such paths are refused with `Config` before anything is
//! generated or written.

use crate::config::KeyGenConfig;
use crate::crypto::keypair::{generate_key_pair, KeyPair};
use crate::crypto::signing::sign;
use crate::protocol::envelope::SignedLicense;
use crate::protocol::models::LicenseTerms;
use crate::storage::{check_not_colocated, Artifact, ArtifactPaths, Storage};
use crate::LicenseSealError;
use std::path::Path;

/// Artifacts produced by a full issuance.
#[derive(Debug, Clone)]
pub struct IssuedLicense {
    /// The generated key pair.
    pub key_pair: KeyPair,

    /// The signed license that was written.
    pub license: SignedLicense,

    /// Where the artifacts were written.
    pub paths: ArtifactPaths,
}

/// Issuer-side API: key generation, signing and publishing.
pub struct LicenseIssuer<S: Storage> {
    storage: S,
    config: KeyGenConfig,
}

impl<S: Storage> LicenseIssuer<S> {
    /// Create an issuer writing through `storage`.
    ///
    /// # Errors
    /// Returns `Config` if the key generation config is invalid.
    pub fn new(storage: S, config: KeyGenConfig) -> Result<Self, LicenseSealError> {
        config.validate()?;
        Ok(Self { storage, config })
    }

    /// Generate a key pair without persisting it.
    pub fn generate_key_pair(&self) -> Result<KeyPair, LicenseSealError> {
        generate_key_pair(&self.config)
    }

    /// Generate a key pair and write both halves.
    ///
    /// # Errors
    /// * `Config` - The private key would sit next to the public key
    /// * `PartialPublish` - A write failed
    pub fn issue_key_pair(&self, paths: &ArtifactPaths) -> Result<KeyPair, LicenseSealError> {
        check_not_colocated(&paths.private_key, &paths.public_key)?;
        let key_pair = self.generate_key_pair()?;
        self.publish(
            paths,
            &[
                (Artifact::PublicKey, key_pair.public_key()),
                (Artifact::PrivateKey, key_pair.private_key()),
            ],
        )?;
        Ok(key_pair)
    }

    /// Generate a key pair, sign `terms` and write all three artifacts.
    ///
    /// # Errors
    /// * `Config` - `paths` put the private key into the distribution bundle
    /// * `InvalidTerms` - `terms` cannot be signed
    /// * `PartialPublish` - A write failed
    pub fn issue(
        &self,
        terms: &LicenseTerms,
        paths: &ArtifactPaths,
    ) -> Result<IssuedLicense, LicenseSealError> {
        paths.check_separated()?;
        let key_pair = self.generate_key_pair()?;
        let license = sign(terms, key_pair.private_key(), self.config.passphrase.as_deref())?;
        let envelope = license.to_bytes()?;

        self.publish(
            paths,
            &[
                (Artifact::PublicKey, key_pair.public_key()),
                (Artifact::PrivateKey, key_pair.private_key()),
                (Artifact::License, envelope.as_slice()),
            ],
        )?;

        tracing::info!(
            key_id = %key_pair.key_id(),
            license = %paths.license.display(),
            "issued license"
        );

        Ok(IssuedLicense {
            key_pair,
            license,
            paths: paths.clone(),
        })
    }

    /// Sign `terms` with an already persisted private key.
    ///
    /// Uses the configured passphrase for encrypted keys.
    pub fn sign_with_stored_key(
        &self,
        terms: &LicenseTerms,
        private_key_location: &Path,
        license_location: &Path,
    ) -> Result<SignedLicense, LicenseSealError> {
        check_not_colocated(private_key_location, license_location)?;
        let private_key = self.storage.read_bytes(private_key_location)?;
        let license = sign(terms, &private_key, self.config.passphrase.as_deref())?;
        self.storage
            .write_bytes(license_location, &license.to_bytes()?)?;

        tracing::info!(license = %license_location.display(), "signed license with stored key");
        Ok(license)
    }

    fn publish(
        &self,
        paths: &ArtifactPaths,
        artifacts: &[(Artifact, &[u8])],
    ) -> Result<(), LicenseSealError> {
        let mut written = Vec::with_capacity(artifacts.len());

        for (artifact, bytes) in artifacts {
            if let Err(e) = self.storage.write_bytes(paths.get(*artifact), bytes) {
                tracing::error!(
                    failed = %artifact,
                    written = ?written,
                    error = %e,
                    "publishing license artifacts failed"
                );
                return Err(LicenseSealError::PartialPublish {
                    written,
                    failed: *artifact,
                    source: Box::new(e),
                });
            }
            written.push(*artifact);
        }

        Ok(())
    }
}

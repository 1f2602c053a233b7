//! Key generation and validation configuration.

use crate::storage::ArtifactPaths;
use crate::LicenseSealError;
use pkcs8::LineEnding;
use std::fmt;

/// Minimum security level (in bits) accepted for license signing keys.
///
/// 128 bits matches RSA-3072, the weakest key the protocol tolerates.
pub const MIN_SECURITY_BITS: u32 = 128;

/// Asymmetric signature scheme used for license keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyAlgorithm {
    /// Ed25519 (RFC 8032), roughly 128-bit security.
    #[default]
    Ed25519,
}

impl KeyAlgorithm {
    /// Identifier written into signed license envelopes.
    pub fn name(&self) -> &'static str {
        match self {
            KeyAlgorithm::Ed25519 => "ed25519",
        }
    }

    /// Look up an algorithm by its envelope identifier.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ed25519" => Some(KeyAlgorithm::Ed25519),
            _ => None,
        }
    }

    /// Approximate security level of the scheme in bits.
    pub fn security_bits(&self) -> u32 {
        match self {
            KeyAlgorithm::Ed25519 => 128,
        }
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameters for key pair generation.
///
/// Passed explicitly to the generator; nothing about key generation is
/// global state.
#[derive(Clone)]
pub struct KeyGenConfig {
    /// Signature scheme of generated keys.
    pub algorithm: KeyAlgorithm,

    /// Passphrase protecting the private key at rest.
    /// When set, the same passphrase must be supplied to every signing call.
    pub passphrase: Option<String>,

    /// Line ending used in the PEM output.
    pub line_ending: LineEnding,
}

impl Default for KeyGenConfig {
    fn default() -> Self {
        Self {
            algorithm: KeyAlgorithm::default(),
            passphrase: None,
            line_ending: LineEnding::LF,
        }
    }
}

impl fmt::Debug for KeyGenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyGenConfig")
            .field("algorithm", &self.algorithm)
            .field("passphrase", &self.passphrase.as_ref().map(|_| "<redacted>"))
            .field("line_ending", &self.line_ending)
            .finish()
    }
}

impl KeyGenConfig {
    /// Config that encrypts the private key with the given passphrase.
    pub fn with_passphrase(passphrase: impl Into<String>) -> Self {
        Self {
            passphrase: Some(passphrase.into()),
            ..Self::default()
        }
    }

    /// Validate configuration for obvious errors.
    pub fn validate(&self) -> Result<(), LicenseSealError> {
        if self.algorithm.security_bits() < MIN_SECURITY_BITS {
            return Err(LicenseSealError::Config(format!(
                "{} offers {} bits of security, at least {} required",
                self.algorithm,
                self.algorithm.security_bits(),
                MIN_SECURITY_BITS
            )));
        }
        if matches!(self.passphrase.as_deref(), Some("")) {
            return Err(LicenseSealError::Config(
                "passphrase cannot be empty; use None for an unencrypted key".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for a validation endpoint.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Where the public key and signed license are read from.
    pub paths: Option<ArtifactPaths>,

    /// Version of the running application, reported back as `appVersion`.
    pub version: Option<String>,
}

impl ValidatorConfig {
    /// Config reading the conventional artifact names from `root`.
    pub fn new(root: impl Into<std::path::PathBuf>, version: impl Into<String>) -> Self {
        Self {
            paths: Some(ArtifactPaths::in_dir(root)),
            version: Some(version.into()),
        }
    }

    /// Validate configuration for obvious errors.
    ///
    /// A missing version is allowed but logged, since consumers then cannot
    /// make version-based decisions.
    pub fn validate(&self) -> Result<(), LicenseSealError> {
        if self.paths.is_none() {
            return Err(LicenseSealError::Config(
                "artifact paths must be set; ArtifactPaths::in_dir(current dir) is a sensible default"
                    .to_string(),
            ));
        }
        if self.version.is_none() {
            tracing::warn!(
                "no application version configured; validation results will carry an empty appVersion"
            );
        }
        Ok(())
    }
}

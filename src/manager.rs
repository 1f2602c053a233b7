//! License validation - the runtime-side public API.
//!
//! `LicenseValidator` loads the public key and signed license, verifies the
//! license and always reports the parsed application version. Failures never
//! escape: an absent, tampered or foreign license simply yields
//! `success == false`, with the reason logged.

use crate::clock::Clock;
use crate::crypto::verify::verify;
use crate::policy::expiry::check_expiry;
use crate::protocol::envelope::SignedLicense;
use crate::protocol::models::LicenseTerms;
use crate::protocol::version::{parse_version, Version};
use crate::storage::{ArtifactPaths, Storage};
use crate::LicenseSealError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Runtime context supplied with each validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationContext {
    /// Version string of the running application.
    pub version: String,
}

impl ValidationContext {
    /// Context for the given application version.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }
}

/// Outcome of a single validation.
///
/// Serializes flat: `{"success":true,"appVersion":{..},"major":"2",...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// Whether an authentic license was found.
    pub success: bool,

    /// Parsed version of the running application.
    pub app_version: Version,

    /// Verified license terms; `None` whenever `success` is false.
    #[serde(flatten)]
    pub terms: Option<LicenseTerms>,
}

impl ValidationResult {
    pub(crate) fn verified(app_version: Version, terms: LicenseTerms) -> Self {
        Self {
            success: true,
            app_version,
            terms: Some(terms),
        }
    }

    pub(crate) fn failed(app_version: Version) -> Self {
        Self {
            success: false,
            app_version,
            terms: None,
        }
    }

    /// Apply expiry enforcement on top of a successful validation.
    ///
    /// A failed validation, whatever its cause, has no terms to check and
    /// reports [`LicenseSealError::Unlicensed`].
    pub fn check_expiry(&self, clock: &dyn Clock) -> Result<DateTime<Utc>, LicenseSealError> {
        let terms = self.terms.as_ref().ok_or(LicenseSealError::Unlicensed)?;
        check_expiry(terms, clock)
    }
}

/// Stateless license validator.
///
/// Cheap to clone and safe to share between threads; every call reads the
/// artifacts afresh.
#[derive(Clone)]
pub struct LicenseValidator {
    storage: Arc<dyn Storage>,
}

impl LicenseValidator {
    /// Create a validator reading artifacts through `storage`.
    pub fn new(storage: impl Storage + 'static) -> Self {
        Self {
            storage: Arc::new(storage),
        }
    }

    /// Create a validator sharing an existing storage handle.
    pub fn with_shared_storage(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Validate the license at `license_location` against the public key at
    /// `key_location`.
    ///
    /// Never fails; see the module docs.
    pub fn validate(
        &self,
        key_location: &Path,
        license_location: &Path,
        context: &ValidationContext,
    ) -> ValidationResult {
        let app_version = parse_version(&context.version);

        match self.verify_artifacts(key_location, license_location) {
            Ok(terms) => {
                tracing::info!(
                    license = %license_location.display(),
                    major = %terms.major,
                    minor = %terms.minor,
                    "license validated"
                );
                ValidationResult::verified(app_version, terms)
            }
            Err(e) => {
                tracing::warn!(
                    license = %license_location.display(),
                    public_key = %key_location.display(),
                    error = %e,
                    "license validation failed"
                );
                ValidationResult::failed(app_version)
            }
        }
    }

    /// Validate using conventional artifact locations.
    pub fn validate_in(&self, paths: &ArtifactPaths, context: &ValidationContext) -> ValidationResult {
        self.validate(&paths.public_key, &paths.license, context)
    }

    /// Load and verify the artifacts, returning the underlying error.
    ///
    /// # Errors
    /// * `Io` - An artifact could not be read
    /// * `Envelope` - The license file is not a signed license envelope
    /// * `KeyFormat` - The public key cannot be parsed
    /// * `Authenticity` - The signature does not verify
    /// * `MalformedPayload` - Authentic payload that is not license terms
    pub fn verify_artifacts(
        &self,
        key_location: &Path,
        license_location: &Path,
    ) -> Result<LicenseTerms, LicenseSealError> {
        let public_key = self.storage.read_bytes(key_location)?;
        let envelope = self.storage.read_bytes(license_location)?;
        let signed = SignedLicense::from_bytes(&envelope)?;
        verify(&signed, &public_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use crate::config::KeyGenConfig;
    use crate::crypto::keypair::generate_key_pair;
    use crate::crypto::signing::sign;
    use crate::storage::memory::MemoryStorage;

    fn seeded_storage(terms: &LicenseTerms) -> (Arc<MemoryStorage>, ArtifactPaths) {
        let storage = Arc::new(MemoryStorage::new());
        let paths = ArtifactPaths::new("app", "issuer");
        let pair = generate_key_pair(&KeyGenConfig::default()).unwrap();
        let signed = sign(terms, pair.private_key(), None).unwrap();

        storage.write_bytes(&paths.public_key, pair.public_key()).unwrap();
        storage
            .write_bytes(&paths.license, &signed.to_bytes().unwrap())
            .unwrap();
        (storage, paths)
    }

    #[test]
    fn valid_license_merges_terms() {
        let terms = LicenseTerms::new("2", "0", "2030-01-01");
        let (storage, paths) = seeded_storage(&terms);
        let validator = LicenseValidator::new(storage);

        let result = validator.validate_in(&paths, &ValidationContext::new("3.1.4"));

        assert!(result.success);
        assert_eq!(result.terms, Some(terms));
        assert_eq!(
            result.app_version,
            Version::Structured {
                major: "3".to_string(),
                minor: "1".to_string(),
                patch: "4".to_string(),
            }
        );
    }

    #[test]
    fn missing_license_degrades() {
        let terms = LicenseTerms::new("2", "0", "2030-01-01");
        let (storage, paths) = seeded_storage(&terms);
        storage.remove(&paths.license);
        let validator = LicenseValidator::new(storage);

        let result = validator.validate_in(&paths, &ValidationContext::new("3.1.4"));

        assert!(!result.success);
        assert!(result.terms.is_none());
        assert!(result.app_version.is_structured());
    }

    #[test]
    fn corrupt_envelope_degrades() {
        let terms = LicenseTerms::new("2", "0", "2030-01-01");
        let (storage, paths) = seeded_storage(&terms);
        storage.write_bytes(&paths.license, b"garbage").unwrap();
        let validator = LicenseValidator::new(storage.clone());

        let result = validator.validate_in(&paths, &ValidationContext::default());
        assert!(!result.success);
        assert_eq!(result.app_version, Version::Raw(String::new()));

        assert!(matches!(
            validator.verify_artifacts(&paths.public_key, &paths.license),
            Err(LicenseSealError::Envelope(_))
        ));
    }

    #[test]
    fn missing_license_expiry_check_is_unlicensed() {
        let terms = LicenseTerms::new("2", "0", "2030-01-01");
        let (storage, paths) = seeded_storage(&terms);
        storage.remove(&paths.license);

        let result = LicenseValidator::new(storage)
            .validate_in(&paths, &ValidationContext::new("3.1.4"));

        assert!(matches!(
            result.check_expiry(&MockClock::from_rfc3339("2029-06-01T00:00:00Z")),
            Err(LicenseSealError::Unlicensed)
        ));
    }

    #[test]
    fn failed_result_serializes_without_terms() {
        let result = ValidationResult::failed(parse_version("1.2"));
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"success":false,"appVersion":"1.2"}"#);
    }

    #[test]
    fn successful_result_serializes_flat() {
        let terms = LicenseTerms::new("2", "0", "2030-01-01").with_field("seats", 5i64);
        let result = ValidationResult::verified(parse_version("3.1.4"), terms);
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(
            json,
            r#"{"success":true,"appVersion":{"major":"3","minor":"1","patch":"4"},"major":"2","minor":"0","expire":"2030-01-01","seats":5}"#
        );
    }

    #[test]
    fn expiry_on_result() {
        let terms = LicenseTerms::new("2", "0", "2030-01-01");
        let result = ValidationResult::verified(parse_version("3.1.4"), terms);
        let before = MockClock::from_rfc3339("2029-06-01T00:00:00Z");
        let after = MockClock::from_rfc3339("2030-06-01T00:00:00Z");

        assert!(result.check_expiry(&before).is_ok());
        assert!(matches!(
            result.check_expiry(&after),
            Err(LicenseSealError::Expired { .. })
        ));
        assert!(matches!(
            ValidationResult::failed(parse_version("3.1.4")).check_expiry(&before),
            Err(LicenseSealError::Unlicensed)
        ));
    }
}

//! # License Seal
//!
//! **Offline software licenses, signed with Ed25519.**
//!
//! An issuer generates a key pair, signs license terms with the private key
//! and ships the public key plus the signed license with the application.
//! At runtime the application verifies the license against the public key
//! and reads the terms back.
//!
//! ## Features
//!
//! - **Real signatures**: licenses are Ed25519 signatures over a canonical
//!   JSON payload. The payload is signed, never "encrypted with the private
//!   key".
//! - **All-or-nothing verification**: a tampered or foreign license yields
//!   no terms at all.
//! - **Standard key formats**: SPKI PEM public keys, PKCS#8 PEM private keys,
//!   optionally passphrase-encrypted.
//! - **Silent degrade at runtime, loud failure at issuance**: validation
//!   returns `success: false` instead of erroring; issuance surfaces every
//!   failure, including partially written artifact sets.
//!
//! ## Quickstart
//!
//! ```no_run
//! use license_seal::{
//!     ArtifactPaths, FileStorage, KeyGenConfig, LicenseIssuer, LicenseTerms,
//!     LicenseValidator, ValidationContext,
//! };
//!
//! fn main() -> Result<(), license_seal::LicenseSealError> {
//!     let paths = ArtifactPaths::new("dist", "issuer-keys");
//!
//!     // Issuer side
//!     let issuer = LicenseIssuer::new(FileStorage::new(), KeyGenConfig::default())?;
//!     let terms = LicenseTerms::new("2", "0", "2030-01-01").with_field("seats", 25i64);
//!     issuer.issue(&terms, &paths)?;
//!
//!     // Application side
//!     let validator = LicenseValidator::new(FileStorage::new());
//!     let result = validator.validate_in(&paths, &ValidationContext::new("3.1.4"));
//!     if result.success {
//!         println!("licensed: {:?}", result.terms);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Expiry
//!
//! The `expire` field is carried, never enforced, by verification. Apply
//! [`policy::expiry::check_expiry`] (or [`ValidationResult::check_expiry`])
//! if the application wants licenses to lapse.
//!
//! ## Threat Model
//!
//! License-seal protects against forged or edited license files. It does
//! **not** prevent binary patching or replacing the bundled public key;
//! client-side licensing can always be bypassed by a determined attacker
//! with access to the binary.

#![deny(missing_docs)]

// Core modules
pub mod clock;
pub mod config;
pub mod errors;

// Data model
pub mod protocol;

// Crypto layer
pub mod crypto;

// Storage layer
pub mod storage;

// Policy layer
pub mod policy;

// Issuance and validation
pub mod issuer;
pub mod manager;

// Transport
pub mod bridge;

// Re-exports for public API
pub use bridge::{BridgeHandle, ValidationBridge};
pub use clock::{Clock, SystemClock};
pub use config::{KeyAlgorithm, KeyGenConfig, ValidatorConfig};
pub use crypto::keypair::{generate_key_pair, KeyPair};
pub use crypto::signing::sign;
pub use crypto::verify::verify;
pub use errors::LicenseSealError;
pub use issuer::{IssuedLicense, LicenseIssuer};
pub use manager::{LicenseValidator, ValidationContext, ValidationResult};
pub use protocol::envelope::SignedLicense;
pub use protocol::models::{LicenseTerms, TermValue};
pub use protocol::version::{parse_version, Version};
pub use storage::file::FileStorage;
pub use storage::{Artifact, ArtifactPaths, Storage};

#[cfg(any(test, feature = "test-seams"))]
pub use clock::MockClock;
#[cfg(any(test, feature = "test-seams"))]
pub use storage::memory::MemoryStorage;

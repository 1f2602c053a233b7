//! Storage collaborator for license artifacts.
//!
//! The core only needs to read and write opaque byte blobs at caller-chosen
//! locations. [`file::FileStorage`] is the real backend;
//! [`memory::MemoryStorage`] exists for tests.

pub mod file;
#[cfg(any(test, feature = "test-seams"))]
pub mod memory;

use crate::LicenseSealError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Conventional file name of the public key.
pub const PUBLIC_KEY_FILE: &str = "public.key";

/// Conventional file name of the private key.
pub const PRIVATE_KEY_FILE: &str = "private.key";

/// Conventional file name of the signed license.
pub const LICENSE_FILE: &str = "license.data";

/// Byte-level artifact storage.
pub trait Storage: Send + Sync {
    /// Read the full contents at `location`.
    fn read_bytes(&self, location: &Path) -> Result<Vec<u8>, LicenseSealError>;

    /// Replace the contents at `location`.
    fn write_bytes(&self, location: &Path, bytes: &[u8]) -> Result<(), LicenseSealError>;
}

impl<S: Storage + ?Sized> Storage for std::sync::Arc<S> {
    fn read_bytes(&self, location: &Path) -> Result<Vec<u8>, LicenseSealError> {
        (**self).read_bytes(location)
    }

    fn write_bytes(&self, location: &Path, bytes: &[u8]) -> Result<(), LicenseSealError> {
        (**self).write_bytes(location, bytes)
    }
}

/// The three persisted license artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Artifact {
    /// SPKI PEM public key, shipped with the application.
    PublicKey,
    /// PKCS#8 PEM private key, kept by the issuer.
    PrivateKey,
    /// Signed license envelope, shipped with the application.
    License,
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Artifact::PublicKey => write!(f, "public key"),
            Artifact::PrivateKey => write!(f, "private key"),
            Artifact::License => write!(f, "license"),
        }
    }
}

/// Locations of the license artifacts.
///
/// The public key and the license form the distribution bundle that ships
/// with the application. The private key belongs to the issuer and must
/// live in a different directory; see [`ArtifactPaths::check_separated`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// Public key location.
    pub public_key: PathBuf,
    /// Private key location.
    pub private_key: PathBuf,
    /// Signed license location.
    pub license: PathBuf,
}

impl ArtifactPaths {
    /// Distribution bundle under `dist_dir`, private key under `key_dir`.
    pub fn new(dist_dir: impl Into<PathBuf>, key_dir: impl Into<PathBuf>) -> Self {
        let dist_dir = dist_dir.into();
        Self {
            public_key: dist_dir.join(PUBLIC_KEY_FILE),
            private_key: key_dir.into().join(PRIVATE_KEY_FILE),
            license: dist_dir.join(LICENSE_FILE),
        }
    }

    /// All artifacts under `root` with the conventional file names.
    ///
    /// Suitable for validation, which never touches the private key.
    /// Issuing into these paths fails [`ArtifactPaths::check_separated`].
    pub fn in_dir(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self::new(root.clone(), root)
    }

    /// Bundle under `dirs::data_dir()/<namespace>/`, private key under
    /// `dirs::data_dir()/<namespace>.issuer/`.
    pub fn default_for(namespace: &str) -> Result<Self, LicenseSealError> {
        if namespace.is_empty() {
            return Err(LicenseSealError::Config(
                "namespace cannot be empty".to_string(),
            ));
        }
        let base_dir = dirs::data_dir()
            .ok_or_else(|| LicenseSealError::Io("Could not find data directory".to_string()))?;
        Ok(Self::new(
            base_dir.join(namespace),
            base_dir.join(format!("{}.issuer", namespace)),
        ))
    }

    /// Location of a given artifact.
    pub fn get(&self, artifact: Artifact) -> &Path {
        match artifact {
            Artifact::PublicKey => &self.public_key,
            Artifact::PrivateKey => &self.private_key,
            Artifact::License => &self.license,
        }
    }

    /// Ensure the private key is not written into the distribution bundle.
    ///
    /// # Errors
    /// Returns `Config` if the private key shares a directory with the
    /// public key or the license.
    pub fn check_separated(&self) -> Result<(), LicenseSealError> {
        for shipped in [&self.public_key, &self.license] {
            check_not_colocated(&self.private_key, shipped)?;
        }
        Ok(())
    }
}

/// Fail with `Config` when `private_key` sits in the same directory as
/// `shipped`.
pub(crate) fn check_not_colocated(
    private_key: &Path,
    shipped: &Path,
) -> Result<(), LicenseSealError> {
    if private_key.parent() == shipped.parent() {
        return Err(LicenseSealError::Config(format!(
            "private key {} must not be stored next to distributed artifact {}",
            private_key.display(),
            shipped.display()
        )));
    }
    Ok(())
}

//! Cryptographic primitives for license issuance and verification.

pub mod digest;
pub mod keypair;
pub mod signing;
pub mod verify;

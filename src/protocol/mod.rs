//! License data model: terms, versions and the signed envelope.

pub mod envelope;
pub mod models;
pub mod version;

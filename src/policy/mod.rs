//! Consumer-side policies layered on verified terms.

pub mod expiry;

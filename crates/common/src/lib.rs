//! Algorithm identifiers, size tables, and errors shared across `jwe-engine` crates.

pub mod error;
pub mod protocol;

pub use error::JweError;
pub use protocol::{Algorithms, ContentEncryptionAlg, KeyManagementAlg};

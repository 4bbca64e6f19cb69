//! Key material used by the local crypto collaborator.

pub mod ed25519;
pub mod errors;
pub mod sha256_hash;
pub mod traits;
mod utils;

pub use ed25519::Ed25519KeyPair;
pub use errors::Error;
pub use sha256_hash::sha256_hash;
pub use traits::{CoreSign, Generate, KeyMaterial, BYTES_LENGTH_32};

pub struct AsymmetricKey<P, S> {
    pub public_key: P,
    pub secret_key: Option<S>,
}

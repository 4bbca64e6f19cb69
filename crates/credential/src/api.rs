//! Collaborators the signer delegates to.
//!
//! Implementations report failures as [`eyre::Report`]; the signer wraps
//! them without loss, so callers can still downcast to the original error.

pub use did_utils::loader::{DocumentLoader, LoaderError, RemoteDocument};

/// Read access to the credentials held by a wallet.
pub trait CredentialReader: Send + Sync {
    /// Returns the serialized credential registered under `id`.
    fn get(&self, id: &str) -> eyre::Result<Vec<u8>>;

    /// Returns every serialized credential.
    fn get_all(&self) -> eyre::Result<Vec<Vec<u8>>>;
}

/// Resolves DIDs into DID documents.
pub trait DidResolver: Send + Sync {
    /// Returns either the DID document of `did` or a DID resolution
    /// result carrying it under `didDocument`, serialized as JSON.
    fn resolve(&self, did: &str) -> eyre::Result<Vec<u8>>;
}

/// Signing and verification with keys held outside the signer.
pub trait Crypto: Send + Sync {
    /// Signs `payload` with the key identified by `key_id`.
    fn sign(&self, payload: &[u8], key_id: &str) -> eyre::Result<Vec<u8>>;

    /// Verifies `signature` over `payload` against the key identified by `key_id`.
    fn verify(&self, payload: &[u8], signature: &[u8], key_id: &str) -> eyre::Result<()>;
}

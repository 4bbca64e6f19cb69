//! Verifiable credential issuance and verification.
//!
//! A [`Signer`] signs credentials with keys referenced as `<DID>#<fragment>`.
//! It resolves the DID through a [`DidResolver`](api::DidResolver), picks the
//! [`ProofSuite`] matching the verification method's type, and delegates the
//! signature itself to a [`Crypto`](api::Crypto) collaborator.
//!
//! ```
//! use std::sync::Arc;
//!
//! use credential::{local::{LocalCrypto, MemoryCredentialReader, MethodResolver}, Signer};
//! use did_utils::{crypto::{Ed25519KeyPair, Generate}, loader::StaticDocumentLoader, methods::DidKey};
//! use serde_json::json;
//!
//! let keypair = Ed25519KeyPair::new().unwrap();
//! let did = DidKey::from_ed25519_keypair(&keypair).unwrap();
//! let key_id = format!("{did}#{}", did.trim_start_matches("did:key:"));
//!
//! let crypto = LocalCrypto::new();
//! crypto.register(key_id.clone(), keypair);
//!
//! let signer = Signer::builder()
//!     .reader(Arc::new(MemoryCredentialReader::new()))
//!     .resolver(Arc::new(MethodResolver::new()))
//!     .crypto(Arc::new(crypto))
//!     .loader(Arc::new(StaticDocumentLoader::new()))
//!     .build()
//!     .unwrap();
//!
//! let credential = json!({
//!     "@context": ["https://www.w3.org/2018/credentials/v1"],
//!     "type": ["VerifiableCredential"],
//!     "issuer": did,
//!     "issuanceDate": "2024-01-01T00:00:00Z",
//!     "credentialSubject": { "id": "did:example:holder" }
//! });
//!
//! let signed = signer.issue(credential.to_string().as_bytes(), &key_id).unwrap();
//! assert_eq!(signed["proof"]["type"], "DataIntegrityProof");
//! assert!(signer.verify_document(&signed).is_ok());
//! ```

pub mod api;
pub mod local;

mod error;
mod request;
mod signer;
mod suite;

pub use error::{Category, Error, ErrorKind};
pub use request::SigningRequest;
pub use signer::{Signer, SignerBuilder};
pub use suite::{ProofSuite, SignatureError, UnsupportedKeyType};

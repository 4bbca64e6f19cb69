//! A collection of methods for DID resolution and related utilities.
//!
//! This module provides DID URL and key reference parsing, plus local
//! expansion of the [`did:key`] and [`did:jwk`] methods.
//!
//! [`did:key`]: https://w3c-ccg.github.io/did-method-key/
//! [`did:jwk`]: https://github.com/quartzjer/did-jwk/blob/main/spec.md
//!
//! # Examples
//!
//! ```
//! use did_utils::methods::{DIDMethod, DidKey};
//!
//! let did = "did:key:z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK";
//! let output = DidKey::new().resolve(did);
//! assert!(output.into_document().is_ok());
//! ```

mod alg;
mod errors;
mod jwk;
mod key;
mod resolution;
mod traits;
mod utils;

// Re-exported items
pub use alg::{decode_multikey, Algorithm};
pub use errors::DIDResolutionError;
pub use jwk::DidJwk;
pub use key::{DidKey, PublicKeyFormat};
pub use resolution::*;
pub use traits::DIDMethod;
pub use utils::{parse_did_url, KeyReference, ParsedDIDUrl};

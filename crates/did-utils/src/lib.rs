//! Data model and key material helpers shared by the wallet SDK crates.
//!
//! - [`didcore`]: DID documents and verification methods
//! - [`vc`]: verifiable credentials
//! - [`proof`]: linked-data proof blocks and their signing input
//! - [`methods`]: DID URL parsing and the `did:key` / `did:jwk` methods
//! - [`crypto`]: Ed25519 key pairs
//! - [`loader`]: JSON-LD context loading

pub mod crypto;
pub mod didcore;
pub mod didkit;
pub mod ldmodel;
pub mod loader;
pub mod methods;
pub mod proof;
pub mod vc;

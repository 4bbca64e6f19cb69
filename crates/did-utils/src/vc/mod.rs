//! This module provides utilities for working with [Verifiable Credentials (VCs)][vc].
//!
//! [vc]: https://www.w3.org/TR/vc-data-model-2.0/

mod model;

pub use model::{CredentialSubject, CredentialSubjects, Issuer, IssuerObject, Types, VerifiableCredential};

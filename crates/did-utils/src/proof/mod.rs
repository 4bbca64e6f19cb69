//! This module provides the linked-data proof model and the signing input
//! shared by every proof suite.
//!
//! The signing input follows the `eddsa-jcs-2022` construction: JCS
//! canonicalization of the proof options and of the unsecured document,
//! each hashed with SHA-256.

mod canon;
mod model;

// public re-exports
pub use canon::{hash_for_signing, CanonicalizationError};
pub use model::{Domain, PreviousProofs, Proof, Proofs};

pub const PROOF_PURPOSE_ASSERTION_METHOD: &str = "assertionMethod";

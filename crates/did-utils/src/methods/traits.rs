//! Trait definitions for DID methods.

use super::{errors::DIDResolutionError, resolution::ResolutionOutput};
use crate::didcore::Document;

/// Abstract contract for DID methods that can be expanded locally,
/// i.e. whose DID document is fully derived from the DID itself.
pub trait DIDMethod {
    /// Returns the DIDMethod's registered name, prefixed with `did:`,
    /// e.g. did:key, did:jwk, etc.
    fn name() -> String
    where
        Self: Sized;

    /// Tells whether `did` belongs to this method.
    fn supports(&self, did: &str) -> bool
    where
        Self: Sized,
    {
        did.starts_with(&format!("{}:", Self::name()))
    }

    /// Expands a DID into its DID document.
    fn expand(&self, did: &str) -> Result<Document, DIDResolutionError>;

    /// Resolves a DID into a resolution result, reporting failures in its metadata.
    fn resolve(&self, did: &str) -> ResolutionOutput {
        match self.expand(did) {
            Ok(document) => ResolutionOutput::from_document(document),
            Err(err) => ResolutionOutput::from_error(err),
        }
    }
}

//! JSON-LD context loading.
//!
//! Credentials name their vocabularies in `@context`. Every context URI is
//! loaded through a [`DocumentLoader`] before a credential is accepted, so an
//! unknown vocabulary is rejected rather than silently ignored.

use dashmap::DashMap;
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use thiserror::Error;

pub const CREDENTIALS_V1: &str = "https://www.w3.org/2018/credentials/v1";
pub const CREDENTIALS_V2: &str = "https://www.w3.org/ns/credentials/v2";
pub const DID_V1: &str = "https://www.w3.org/ns/did/v1";
pub const ED25519_2018: &str = "https://w3id.org/security/suites/ed25519-2018/v1";
pub const ED25519_2020: &str = "https://w3id.org/security/suites/ed25519-2020/v1";
pub const JWS_2020: &str = "https://w3id.org/security/suites/jws-2020/v1";
pub const DATA_INTEGRITY_V2: &str = "https://w3id.org/security/data-integrity/v2";
pub const MULTIKEY_V1: &str = "https://w3id.org/security/multikey/v1";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoaderError {
    #[error("context not found: {0}")]
    NotFound(String),
    #[error("invalid context document at {0}")]
    InvalidDocument(String),
}

/// A JSON-LD document retrieved by a [`DocumentLoader`].
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteDocument {
    pub document_url: String,
    pub context_url: Option<String>,
    pub document: Value,
}

/// Retrieves JSON-LD documents by URI.
pub trait DocumentLoader: Send + Sync {
    fn load(&self, uri: &str) -> Result<RemoteDocument, LoaderError>;
}

// Term definitions of the well-known contexts, reduced to the terms
// the SDK reads or writes.
static WELL_KNOWN_CONTEXTS: Lazy<Vec<(&'static str, Value)>> = Lazy::new(|| {
    let proof_terms = json!({
        "@version": 1.1,
        "@protected": true,
        "id": "@id",
        "type": "@type",
        "challenge": "https://w3id.org/security#challenge",
        "created": { "@id": "http://purl.org/dc/terms/created", "@type": "http://www.w3.org/2001/XMLSchema#dateTime" },
        "domain": "https://w3id.org/security#domain",
        "expires": { "@id": "https://w3id.org/security#expiration", "@type": "http://www.w3.org/2001/XMLSchema#dateTime" },
        "nonce": "https://w3id.org/security#nonce",
        "proofPurpose": { "@id": "https://w3id.org/security#proofPurpose", "@type": "@vocab" },
        "verificationMethod": { "@id": "https://w3id.org/security#verificationMethod", "@type": "@id" }
    });

    let with = |extra: Value| {
        let mut terms = proof_terms.clone();
        if let (Some(terms), Value::Object(extra)) = (terms.as_object_mut(), extra) {
            terms.extend(extra);
        }
        json!({ "@context": terms })
    };

    vec![
        (
            CREDENTIALS_V1,
            json!({ "@context": {
                "@version": 1.1,
                "@protected": true,
                "id": "@id",
                "type": "@type",
                "VerifiableCredential": "https://www.w3.org/2018/credentials#VerifiableCredential",
                "VerifiablePresentation": "https://www.w3.org/2018/credentials#VerifiablePresentation",
                "credentialSubject": { "@id": "https://www.w3.org/2018/credentials#credentialSubject", "@type": "@id" },
                "credentialStatus": { "@id": "https://www.w3.org/2018/credentials#credentialStatus", "@type": "@id" },
                "issuer": { "@id": "https://www.w3.org/2018/credentials#issuer", "@type": "@id" },
                "issuanceDate": { "@id": "https://www.w3.org/2018/credentials#issuanceDate", "@type": "http://www.w3.org/2001/XMLSchema#dateTime" },
                "expirationDate": { "@id": "https://www.w3.org/2018/credentials#expirationDate", "@type": "http://www.w3.org/2001/XMLSchema#dateTime" },
                "proof": { "@id": "https://w3id.org/security#proof", "@type": "@id", "@container": "@graph" }
            }}),
        ),
        (
            CREDENTIALS_V2,
            json!({ "@context": {
                "@version": 1.1,
                "@protected": true,
                "id": "@id",
                "type": "@type",
                "description": "https://schema.org/description",
                "name": "https://schema.org/name",
                "VerifiableCredential": "https://www.w3.org/2018/credentials#VerifiableCredential",
                "credentialSubject": { "@id": "https://www.w3.org/2018/credentials#credentialSubject", "@type": "@id" },
                "credentialStatus": { "@id": "https://www.w3.org/2018/credentials#credentialStatus", "@type": "@id" },
                "issuer": { "@id": "https://www.w3.org/2018/credentials#issuer", "@type": "@id" },
                "validFrom": { "@id": "https://www.w3.org/2018/credentials#validFrom", "@type": "http://www.w3.org/2001/XMLSchema#dateTime" },
                "validUntil": { "@id": "https://www.w3.org/2018/credentials#validUntil", "@type": "http://www.w3.org/2001/XMLSchema#dateTime" },
                "DataIntegrityProof": "https://w3id.org/security#DataIntegrityProof",
                "proof": { "@id": "https://w3id.org/security#proof", "@type": "@id", "@container": "@graph" }
            }}),
        ),
        (
            DID_V1,
            json!({ "@context": {
                "@protected": true,
                "id": "@id",
                "type": "@type",
                "alsoKnownAs": { "@id": "https://www.w3.org/ns/activitystreams#alsoKnownAs", "@type": "@id" },
                "assertionMethod": { "@id": "https://w3id.org/security#assertionMethod", "@type": "@id", "@container": "@set" },
                "authentication": { "@id": "https://w3id.org/security#authenticationMethod", "@type": "@id", "@container": "@set" },
                "capabilityDelegation": { "@id": "https://w3id.org/security#capabilityDelegationMethod", "@type": "@id", "@container": "@set" },
                "capabilityInvocation": { "@id": "https://w3id.org/security#capabilityInvocationMethod", "@type": "@id", "@container": "@set" },
                "controller": { "@id": "https://w3id.org/security#controller", "@type": "@id" },
                "keyAgreement": { "@id": "https://w3id.org/security#keyAgreementMethod", "@type": "@id", "@container": "@set" },
                "service": { "@id": "https://www.w3.org/ns/did#service", "@type": "@id" },
                "verificationMethod": { "@id": "https://w3id.org/security#verificationMethod", "@type": "@id" }
            }}),
        ),
        (
            ED25519_2018,
            with(json!({
                "Ed25519VerificationKey2018": "https://w3id.org/security#Ed25519VerificationKey2018",
                "Ed25519Signature2018": "https://w3id.org/security#Ed25519Signature2018",
                "jws": "https://w3id.org/security#jws",
                "publicKeyBase58": "https://w3id.org/security#publicKeyBase58"
            })),
        ),
        (
            ED25519_2020,
            with(json!({
                "Ed25519VerificationKey2020": "https://w3id.org/security#Ed25519VerificationKey2020",
                "Ed25519Signature2020": "https://w3id.org/security#Ed25519Signature2020",
                "proofValue": { "@id": "https://w3id.org/security#proofValue", "@type": "https://w3id.org/security#multibase" },
                "publicKeyMultibase": { "@id": "https://w3id.org/security#publicKeyMultibase", "@type": "https://w3id.org/security#multibase" }
            })),
        ),
        (
            JWS_2020,
            with(json!({
                "JsonWebKey2020": "https://w3id.org/security#JsonWebKey2020",
                "JsonWebSignature2020": "https://w3id.org/security#JsonWebSignature2020",
                "jws": "https://w3id.org/security#jws",
                "publicKeyJwk": { "@id": "https://w3id.org/security#publicKeyJwk", "@type": "@json" }
            })),
        ),
        (
            DATA_INTEGRITY_V2,
            with(json!({
                "DataIntegrityProof": "https://w3id.org/security#DataIntegrityProof",
                "cryptosuite": { "@id": "https://w3id.org/security#cryptosuite", "@type": "https://w3id.org/security#cryptosuiteString" },
                "proofValue": { "@id": "https://w3id.org/security#proofValue", "@type": "https://w3id.org/security#multibase" },
                "previousProof": { "@id": "https://w3id.org/security#previousProof", "@type": "@id" }
            })),
        ),
        (
            MULTIKEY_V1,
            json!({ "@context": {
                "id": "@id",
                "type": "@type",
                "@protected": true,
                "Multikey": "https://w3id.org/security#Multikey",
                "controller": { "@id": "https://w3id.org/security#controller", "@type": "@id" },
                "publicKeyMultibase": { "@id": "https://w3id.org/security#publicKeyMultibase", "@type": "https://w3id.org/security#multibase" }
            }}),
        ),
    ]
});

/// A [`DocumentLoader`] answering from memory, preloaded with the
/// well-known credential, DID and proof suite contexts.
///
/// Further contexts can be registered at runtime; no network access is made.
pub struct StaticDocumentLoader {
    contexts: DashMap<String, Value>,
}

impl Default for StaticDocumentLoader {
    fn default() -> Self {
        let contexts = WELL_KNOWN_CONTEXTS
            .iter()
            .map(|(uri, document)| (uri.to_string(), document.clone()))
            .collect();

        Self { contexts }
    }
}

impl StaticDocumentLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// A loader knowing no context at all.
    pub fn empty() -> Self {
        Self {
            contexts: DashMap::new(),
        }
    }

    /// Registers `document` under `uri`, replacing any previous entry.
    pub fn add(&self, uri: impl Into<String>, document: Value) -> Result<(), LoaderError> {
        let uri = uri.into();

        if !document.get("@context").is_some_and(|context| context.is_object() || context.is_array()) {
            return Err(LoaderError::InvalidDocument(uri));
        }

        tracing::debug!(%uri, "registered JSON-LD context");
        self.contexts.insert(uri, document);
        Ok(())
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.contexts.contains_key(uri)
    }
}

impl DocumentLoader for StaticDocumentLoader {
    fn load(&self, uri: &str) -> Result<RemoteDocument, LoaderError> {
        let document = self
            .contexts
            .get(uri)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| LoaderError::NotFound(uri.to_string()))?;

        Ok(RemoteDocument {
            document_url: uri.to_string(),
            context_url: None,
            document,
        })
    }
}

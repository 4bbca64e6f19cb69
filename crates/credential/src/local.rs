//! In-process collaborators, for hosts that keep credentials and keys in
//! memory and for tests.

use dashmap::DashMap;
use did_utils::{
    crypto::{CoreSign, Ed25519KeyPair, Generate},
    didcore::Document,
    methods::{DIDMethod, DidJwk, DidKey, ResolutionOutput},
};
use eyre::WrapErr;

use crate::api::{CredentialReader, Crypto, DidResolver};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LocalError {
    #[error("no credential with ID {0}")]
    CredentialNotFound(String),
    #[error("DID method of {0} is not supported")]
    MethodNotSupported(String),
    #[error("no key registered under {0}")]
    UnknownKey(String),
}

/// Credentials held in memory, keyed by identifier.
#[derive(Default)]
pub struct MemoryCredentialReader {
    credentials: DashMap<String, Vec<u8>>,
}

impl MemoryCredentialReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: impl Into<String>, credential: Vec<u8>) {
        self.credentials.insert(id.into(), credential);
    }
}

impl CredentialReader for MemoryCredentialReader {
    fn get(&self, id: &str) -> eyre::Result<Vec<u8>> {
        self.credentials
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| LocalError::CredentialNotFound(id.to_string()).into())
    }

    /// Returns the credentials ordered by identifier.
    fn get_all(&self) -> eyre::Result<Vec<Vec<u8>>> {
        let mut entries: Vec<_> = self
            .credentials
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));

        Ok(entries.into_iter().map(|(_, credential)| credential).collect())
    }
}

/// Resolves `did:key` and `did:jwk` DIDs locally, plus any document
/// registered beforehand.
#[derive(Default)]
pub struct MethodResolver {
    did_key: DidKey,
    did_jwk: DidJwk,
    documents: DashMap<String, Document>,
}

impl MethodResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a document; it takes precedence over method expansion.
    pub fn register(&self, document: Document) {
        self.documents.insert(document.id.clone(), document);
    }

    /// Resolves `did` into a DID resolution result.
    pub fn resolve_output(&self, did: &str) -> eyre::Result<ResolutionOutput> {
        if let Some(document) = self.documents.get(did) {
            return Ok(ResolutionOutput::from_document(document.value().clone()));
        }

        let document = if self.did_key.supports(did) {
            self.did_key.expand(did)
        } else if self.did_jwk.supports(did) {
            self.did_jwk.expand(did)
        } else {
            return Err(LocalError::MethodNotSupported(did.to_string()).into());
        };

        let document = document.wrap_err_with(|| format!("expanding {did}"))?;
        Ok(ResolutionOutput::from_document(document))
    }
}

impl DidResolver for MethodResolver {
    fn resolve(&self, did: &str) -> eyre::Result<Vec<u8>> {
        tracing::debug!(did, "resolving DID locally");

        let output = self.resolve_output(did)?;
        Ok(serde_json::to_vec(&output)?)
    }
}

/// Ed25519 keys held in memory, keyed by key reference.
#[derive(Default)]
pub struct LocalCrypto {
    keys: DashMap<String, Ed25519KeyPair>,
}

impl LocalCrypto {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, key_id: impl Into<String>, keypair: Ed25519KeyPair) {
        self.keys.insert(key_id.into(), keypair);
    }

    /// Generates a key pair under `key_id` and returns its public JWK.
    pub fn generate(&self, key_id: impl Into<String>) -> eyre::Result<did_utils::didcore::Jwk> {
        let keypair = Ed25519KeyPair::new()?;
        let jwk = keypair.to_public_jwk();
        self.register(key_id, keypair);
        Ok(jwk)
    }
}

impl Crypto for LocalCrypto {
    fn sign(&self, payload: &[u8], key_id: &str) -> eyre::Result<Vec<u8>> {
        let keypair = self
            .keys
            .get(key_id)
            .ok_or_else(|| LocalError::UnknownKey(key_id.to_string()))?;

        Ok(keypair.sign(payload)?)
    }

    fn verify(&self, payload: &[u8], signature: &[u8], key_id: &str) -> eyre::Result<()> {
        let keypair = self
            .keys
            .get(key_id)
            .ok_or_else(|| LocalError::UnknownKey(key_id.to_string()))?;

        Ok(keypair.verify(payload, signature)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use did_utils::{crypto::KeyMaterial, didcore::VerificationMethod};

    #[test]
    fn test_memory_reader() {
        let reader = MemoryCredentialReader::new();
        reader.insert("b", b"{\"id\":\"b\"}".to_vec());
        reader.insert("a", b"{\"id\":\"a\"}".to_vec());

        assert_eq!(reader.get("a").unwrap(), b"{\"id\":\"a\"}");
        assert_eq!(reader.get_all().unwrap(), vec![b"{\"id\":\"a\"}".to_vec(), b"{\"id\":\"b\"}".to_vec()]);

        let err = reader.get("c").unwrap_err();
        assert_eq!(err.downcast_ref::<LocalError>(), Some(&LocalError::CredentialNotFound("c".to_string())));
    }

    #[test]
    fn test_method_resolver_expands_did_jwk() {
        let keypair = Ed25519KeyPair::new().unwrap();
        let method = VerificationMethod::from_jwk("#0".to_string(), String::new(), keypair.to_public_jwk());
        let created = DidJwk::new().create(&method).unwrap().into_document().unwrap();

        let resolver = MethodResolver::new();
        let resolved: ResolutionOutput = serde_json::from_slice(&resolver.resolve(&created.id).unwrap()).unwrap();
        let resolved = resolved.into_document().unwrap();

        assert_eq!(resolved.id, created.id);
        assert_eq!(
            resolved.find_verification_method("0").unwrap().public_key_jwk,
            Some(keypair.to_public_jwk())
        );
    }

    #[test]
    fn test_method_resolver_prefers_registered_documents() {
        let keypair = Ed25519KeyPair::new().unwrap();
        let did = DidKey::from_ed25519_keypair(&keypair).unwrap();

        let resolver = MethodResolver::new();
        let expanded = resolver.resolve_output(&did).unwrap().into_document().unwrap();
        assert_eq!(expanded.verification_method.as_ref().unwrap()[0].key_type, "Multikey");

        resolver.register(Document::new(expanded.context.clone(), did.clone()));
        let registered = resolver.resolve_output(&did).unwrap().into_document().unwrap();
        assert!(registered.verification_method.is_none());

        let err = resolver.resolve("did:web:example.com").unwrap_err();
        assert!(err.downcast_ref::<LocalError>().is_some());
    }

    #[test]
    fn test_local_crypto_sign_verify() {
        let crypto = LocalCrypto::new();
        let jwk = crypto.generate("did:test:foo#key-1").unwrap();
        assert_eq!(jwk.curve, "Ed25519");

        let signature = crypto.sign(b"payload", "did:test:foo#key-1").unwrap();
        assert!(crypto.verify(b"payload", &signature, "did:test:foo#key-1").is_ok());
        assert!(crypto.verify(b"tampered", &signature, "did:test:foo#key-1").is_err());

        let err = crypto.sign(b"payload", "did:test:foo#key-2").unwrap_err();
        assert_eq!(
            err.downcast_ref::<LocalError>(),
            Some(&LocalError::UnknownKey("did:test:foo#key-2".to_string()))
        );

        let public_only = Ed25519KeyPair::from_public_key(&Ed25519KeyPair::new().unwrap().public_key_bytes().unwrap()).unwrap();
        crypto.register("did:test:foo#key-3", public_only);
        assert!(crypto.sign(b"payload", "did:test:foo#key-3").is_err());
    }
}

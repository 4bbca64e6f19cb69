use std::sync::Arc;

use chrono::{SubsecRound, Utc};
use did_utils::{
    didcore::{Document, VerificationMethod},
    methods::KeyReference,
    proof::{Proof, PROOF_PURPOSE_ASSERTION_METHOD},
    vc::VerifiableCredential,
};
use serde_json::Value;

use crate::{
    api::{CredentialReader, Crypto, DidResolver, DocumentLoader},
    error::{Error, ErrorKind},
    request::SigningRequest,
    suite::ProofSuite,
};

/// Issues and verifies credentials with keys referenced from DID documents.
///
/// Collaborators are fixed at construction and shared, so a signer can
/// serve concurrent calls from several threads.
pub struct Signer {
    reader: Arc<dyn CredentialReader>,
    resolver: Arc<dyn DidResolver>,
    crypto: Arc<dyn Crypto>,
    loader: Arc<dyn DocumentLoader>,
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer").finish_non_exhaustive()
    }
}

#[derive(Default)]
pub struct SignerBuilder {
    reader: Option<Arc<dyn CredentialReader>>,
    resolver: Option<Arc<dyn DidResolver>>,
    crypto: Option<Arc<dyn Crypto>>,
    loader: Option<Arc<dyn DocumentLoader>>,
}

impl SignerBuilder {
    pub fn reader(mut self, reader: Arc<dyn CredentialReader>) -> Self {
        self.reader = Some(reader);
        self
    }

    pub fn resolver(mut self, resolver: Arc<dyn DidResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn crypto(mut self, crypto: Arc<dyn Crypto>) -> Self {
        self.crypto = Some(crypto);
        self
    }

    pub fn loader(mut self, loader: Arc<dyn DocumentLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn build(self) -> Result<Signer, Error> {
        Signer::new(self.reader, self.resolver, self.crypto, self.loader)
    }
}

/// A verification method and the key reference it was found by.
struct ResolvedKey {
    reference: KeyReference,
    method: VerificationMethod,
}

impl Signer {
    /// Creates a signer; every collaborator is required.
    pub fn new(
        reader: Option<Arc<dyn CredentialReader>>,
        resolver: Option<Arc<dyn DidResolver>>,
        crypto: Option<Arc<dyn Crypto>>,
        loader: Option<Arc<dyn DocumentLoader>>,
    ) -> Result<Self, Error> {
        let missing = |name: &'static str| Error::msg(ErrorKind::MissingCollaborator, format!("{name} is missing"));

        Ok(Self {
            reader: reader.ok_or_else(|| missing("credential reader"))?,
            resolver: resolver.ok_or_else(|| missing("DID resolver"))?,
            crypto: crypto.ok_or_else(|| missing("crypto"))?,
            loader: loader.ok_or_else(|| missing("document loader"))?,
        })
    }

    pub fn builder() -> SignerBuilder {
        SignerBuilder::default()
    }

    /// Signs a credential given as a raw payload.
    ///
    /// A payload holding a single JSON string names a credential to fetch
    /// from the reader; any other JSON is the credential itself.
    pub fn issue(&self, payload: &[u8], key_id: &str) -> Result<Value, Error> {
        let request = SigningRequest::from_bytes(payload).map_err(|e| Error::new(ErrorKind::ParseCredential, e))?;
        self.issue_request(request, key_id)
    }

    /// Signs the credential described by `request` with the key `key_id`,
    /// returning the credential with the new proof attached.
    pub fn issue_request(&self, request: SigningRequest, key_id: &str) -> Result<Value, Error> {
        let mut document = self.credential_document(request)?;
        let credential = self.parse_credential(&document)?;

        let key = self.resolve_key(key_id)?;
        let suite = ProofSuite::for_method(&key.method).map_err(|e| Error::new(ErrorKind::UnsupportedKeyType, e))?;

        let mut proof = Proof {
            proof_type: suite.proof_type().to_string(),
            cryptosuite: suite.cryptosuite().map(str::to_string),
            proof_purpose: Some(PROOF_PURPOSE_ASSERTION_METHOD.to_string()),
            verification_method: key.reference.to_string(),
            created: Some(Utc::now().trunc_subsecs(0)),
            ..Default::default()
        };

        let input = suite
            .signing_input(&proof, &document)
            .map_err(|e| Error::new(ErrorKind::Sign, e))?;
        let signature = self
            .crypto
            .sign(&input, key_id)
            .map_err(|e| Error::wrap(ErrorKind::Sign, e))?;
        suite.attach_signature(&mut proof, &signature);

        attach_proof(&mut document, &proof).map_err(|e| Error::new(ErrorKind::Sign, e))?;

        tracing::info!(
            key_id,
            credential_id = credential.id.as_deref().unwrap_or_default(),
            proof_type = suite.proof_type(),
            "issued credential"
        );

        Ok(document)
    }

    /// Checks every proof of a signed credential.
    pub fn verify(&self, payload: &[u8]) -> Result<(), Error> {
        let document: Value = serde_json::from_slice(payload).map_err(|e| Error::new(ErrorKind::ParseCredential, e))?;
        self.verify_document(&document)
    }

    pub fn verify_document(&self, document: &Value) -> Result<(), Error> {
        let credential = self.parse_credential(document)?;
        let credential_id = credential.id.as_deref().unwrap_or_default();

        let proofs = credential.proofs();
        if proofs.is_empty() {
            return Err(Error::msg(ErrorKind::Verify, "credential carries no proof"));
        }

        for proof in &proofs {
            if proof.proof_purpose.as_deref() != Some(PROOF_PURPOSE_ASSERTION_METHOD) {
                return Err(Error::msg(
                    ErrorKind::Verify,
                    format!(
                        "proof purpose {} is not {PROOF_PURPOSE_ASSERTION_METHOD}",
                        proof.proof_purpose.as_deref().unwrap_or("(none)")
                    ),
                ));
            }

            let key = self.resolve_key(&proof.verification_method)?;
            let suite =
                ProofSuite::for_method(&key.method).map_err(|e| Error::new(ErrorKind::UnsupportedKeyType, e))?;

            if !suite.matches(proof) {
                return Err(Error::msg(
                    ErrorKind::Verify,
                    format!(
                        "proof type {} does not match key type {}",
                        proof.proof_type, key.method.key_type
                    ),
                ));
            }

            let input = suite
                .signing_input(proof, document)
                .map_err(|e| Error::new(ErrorKind::Verify, e))?;
            let signature = suite
                .extract_signature(proof)
                .map_err(|e| Error::new(ErrorKind::Verify, e))?;

            self.crypto
                .verify(&input, &signature, &proof.verification_method)
                .map_err(|e| Error::wrap(ErrorKind::Verify, e))?;

            tracing::debug!(key_id = %key.reference, credential_id, "verified proof");
        }

        tracing::info!(credential_id, proofs = proofs.len(), "verified credential");
        Ok(())
    }

    fn credential_document(&self, request: SigningRequest) -> Result<Value, Error> {
        match request {
            SigningRequest::Document(document) => Ok(document),
            SigningRequest::Identifier(id) => {
                tracing::debug!(credential_id = %id, "retrieving credential");

                let bytes = self
                    .reader
                    .get(&id)
                    .map_err(|e| Error::wrap(ErrorKind::RetrieveCredential, e))?;
                serde_json::from_slice(&bytes).map_err(|e| Error::new(ErrorKind::ParseCredential, e))
            }
        }
    }

    /// Parses a credential and loads every context it names.
    fn parse_credential(&self, document: &Value) -> Result<VerifiableCredential, Error> {
        let credential: VerifiableCredential =
            serde_json::from_value(document.clone()).map_err(|e| Error::new(ErrorKind::ParseCredential, e))?;

        if !credential.is_signable() {
            return Err(Error::msg(
                ErrorKind::ParseCredential,
                "credential must have an issuer and a subject",
            ));
        }

        for uri in credential.context.uris() {
            self.loader
                .load(uri)
                .map_err(|e| Error::new(ErrorKind::ParseCredential, e))?;
        }

        Ok(credential)
    }

    fn resolve_key(&self, key_id: &str) -> Result<ResolvedKey, Error> {
        let reference: KeyReference = key_id
            .parse()
            .map_err(|e| Error::new(ErrorKind::ParseKeyReference, e))?;

        let document = self.resolve_document(reference.did())?;

        let method = document
            .find_verification_method(reference.fragment())
            .cloned()
            .ok_or_else(|| {
                Error::msg(
                    ErrorKind::VerificationMethodNotFound,
                    format!("{} has no verification method #{}", reference.did(), reference.fragment()),
                )
            })?;

        if !document.is_assertion_method(reference.fragment()) {
            return Err(Error::msg(
                ErrorKind::VerificationMethodNotFound,
                format!("{key_id} is not an assertion method of {}", reference.did()),
            ));
        }

        tracing::debug!(key_id, key_type = %method.key_type, "resolved verification method");
        Ok(ResolvedKey { reference, method })
    }

    fn resolve_document(&self, did: &str) -> Result<Document, Error> {
        let bytes = self
            .resolver
            .resolve(did)
            .map_err(|e| Error::wrap(ErrorKind::ResolveDid, e))?;

        let mut value: Value = serde_json::from_slice(&bytes).map_err(|e| Error::new(ErrorKind::ResolveDid, e))?;
        if let Some(document) = value.get_mut("didDocument") {
            value = document.take();
        }

        let document: Document = serde_json::from_value(value).map_err(|e| Error::new(ErrorKind::ResolveDid, e))?;

        if document.id != did {
            return Err(Error::msg(
                ErrorKind::ResolveDid,
                format!("resolved document {} does not belong to {did}", document.id),
            ));
        }

        document
            .validate_relationships()
            .map_err(|e| Error::new(ErrorKind::ResolveDid, e))?;

        Ok(document)
    }
}

/// Adds `proof` to the document, turning an existing proof into a proof set.
fn attach_proof(document: &mut Value, proof: &Proof) -> Result<(), serde_json::Error> {
    let proof = serde_json::to_value(proof)?;

    if let Value::Object(map) = document {
        match map.remove("proof") {
            None => {
                map.insert("proof".to_string(), proof);
            }
            Some(Value::Array(mut proofs)) => {
                proofs.push(proof);
                map.insert("proof".to_string(), Value::Array(proofs));
            }
            Some(existing) => {
                map.insert("proof".to_string(), Value::Array(vec![existing, proof]));
            }
        }
    }

    Ok(())
}

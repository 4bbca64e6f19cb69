use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use credential::{
    api::{CredentialReader, Crypto, DidResolver},
    local::{LocalCrypto, MemoryCredentialReader, MethodResolver},
    Category, ErrorKind, ProofSuite, Signer,
};
use did_utils::{
    crypto::{Ed25519KeyPair, Generate},
    didcore::{Document, VerificationMethod},
    loader::StaticDocumentLoader,
    methods::{DidJwk, DidKey},
};
use serde_json::{json, Value};

const CRED_ID: &str = "foo-cred";
const MOCK_DID: &str = "did:test:foo";
const MOCK_KID: &str = "did:test:foo#key-1";

#[derive(Debug, thiserror::Error)]
#[error("expected error")]
struct ExpectedError;

#[derive(Default)]
struct MockReader {
    get_val: Vec<u8>,
    fail: bool,
    calls: AtomicUsize,
    requested: Mutex<Vec<String>>,
}

impl CredentialReader for MockReader {
    fn get(&self, id: &str) -> eyre::Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(id.to_string());

        if self.fail {
            return Err(ExpectedError.into());
        }
        Ok(self.get_val.clone())
    }

    fn get_all(&self) -> eyre::Result<Vec<Vec<u8>>> {
        Ok(vec![self.get_val.clone()])
    }
}

struct MockResolver {
    resolve_val: Vec<u8>,
    fail: bool,
}

impl DidResolver for MockResolver {
    fn resolve(&self, _did: &str) -> eyre::Result<Vec<u8>> {
        if self.fail {
            return Err(eyre::eyre!("DID not found"));
        }
        Ok(self.resolve_val.clone())
    }
}

#[derive(Default)]
struct MockCrypto {
    sign_val: Vec<u8>,
    fail_sign: bool,
    sign_calls: AtomicUsize,
}

impl Crypto for MockCrypto {
    fn sign(&self, _payload: &[u8], _key_id: &str) -> eyre::Result<Vec<u8>> {
        self.sign_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_sign {
            return Err(ExpectedError.into());
        }
        Ok(self.sign_val.clone())
    }

    fn verify(&self, _payload: &[u8], _signature: &[u8], _key_id: &str) -> eyre::Result<()> {
        Ok(())
    }
}

fn mock_credential() -> Value {
    json!({
        "@context": ["https://www.w3.org/2018/credentials/v1"],
        "id": CRED_ID,
        "type": ["VerifiableCredential"],
        "issuer": MOCK_DID,
        "issuanceDate": "2024-01-01T00:00:00Z",
        "credentialSubject": { "id": "foo" }
    })
}

fn mock_cred_bytes() -> Vec<u8> {
    serde_json::to_vec(&mock_credential()).unwrap()
}

fn mock_vm(key_type: &str) -> Value {
    json!({
        "id": "#key-1",
        "controller": MOCK_DID,
        "type": key_type,
        "publicKeyBase58": "H3C2AVvLMv6gmMNam3uVAjZpfkcJCwDwnZn6z3wXmqPV"
    })
}

fn mock_doc_resolution(vm: Value) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "didDocument": {
            "@context": "https://www.w3.org/ns/did/v1",
            "id": MOCK_DID,
            "verificationMethod": [vm.clone()],
            "assertionMethod": [vm]
        },
        "didResolutionMetadata": {},
        "didDocumentMetadata": {}
    }))
    .unwrap()
}

fn mock_resolver() -> MockResolver {
    MockResolver {
        resolve_val: mock_doc_resolution(mock_vm("Ed25519VerificationKey2018")),
        fail: false,
    }
}

fn foo_crypto() -> MockCrypto {
    MockCrypto {
        sign_val: b"foo".to_vec(),
        ..Default::default()
    }
}

fn signer(reader: Arc<MockReader>, resolver: MockResolver, crypto: Arc<MockCrypto>) -> Signer {
    Signer::builder()
        .reader(reader)
        .resolver(Arc::new(resolver))
        .crypto(crypto)
        .loader(Arc::new(StaticDocumentLoader::new()))
        .build()
        .unwrap()
}

#[test]
fn test_issue_given_raw_credential() {
    let reader = Arc::new(MockReader::default());
    let s = signer(reader.clone(), mock_resolver(), Arc::new(foo_crypto()));

    let issued = s.issue(&mock_cred_bytes(), MOCK_KID).unwrap();

    assert_eq!(issued["proof"]["verificationMethod"], MOCK_KID);
    assert_eq!(issued["proof"]["type"], "Ed25519Signature2018");
    assert_eq!(issued["proof"]["proofPurpose"], "assertionMethod");
    // base64url("foo")
    assert!(issued["proof"]["jws"].as_str().unwrap().ends_with("..Zm9v"));
    assert_eq!(reader.calls.load(Ordering::SeqCst), 0);

    // Nothing but the proof was added
    let mut unsecured = issued.clone();
    unsecured.as_object_mut().unwrap().remove("proof");
    assert_eq!(unsecured, mock_credential());
}

#[test]
fn test_issue_given_credential_id() {
    let reader = Arc::new(MockReader {
        get_val: mock_cred_bytes(),
        ..Default::default()
    });
    let s = signer(reader.clone(), mock_resolver(), Arc::new(foo_crypto()));

    let issued = s.issue(format!("\"{CRED_ID}\"").as_bytes(), MOCK_KID).unwrap();

    assert_eq!(issued["id"], CRED_ID);
    assert_eq!(reader.calls.load(Ordering::SeqCst), 1);
    assert_eq!(*reader.requested.lock().unwrap(), vec![CRED_ID.to_string()]);
}

#[test]
fn test_retrieval_failure() {
    let reader = Arc::new(MockReader {
        fail: true,
        ..Default::default()
    });
    let s = signer(reader, mock_resolver(), Arc::new(foo_crypto()));

    let err = s.issue(format!("\"{CRED_ID}\"").as_bytes(), MOCK_KID).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RetrieveCredential);
    assert!(err.to_string().contains("retrieving credential by ID"));
    assert!(err.is::<ExpectedError>());
}

#[test]
fn test_parsing_credential_failure_never_signs() {
    let crypto = Arc::new(foo_crypto());
    let s = signer(Arc::new(MockReader::default()), mock_resolver(), crypto.clone());

    let err = s.issue(b"blah", MOCK_KID).unwrap_err();
    assert!(err.to_string().contains("parsing input credential"));
    assert_eq!(err.category(), Category::Input);

    let mut no_issuer = mock_credential();
    no_issuer["issuer"] = json!("");
    let err = s.issue(&serde_json::to_vec(&no_issuer).unwrap(), MOCK_KID).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ParseCredential);

    let mut unknown_context = mock_credential();
    unknown_context["@context"] = json!(["https://www.w3.org/2018/credentials/v1", "https://example.com/unknown/v1"]);
    let err = s
        .issue(&serde_json::to_vec(&unknown_context).unwrap(), MOCK_KID)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ParseCredential);

    assert_eq!(crypto.sign_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_unresolvable_signer_did() {
    let resolver = MockResolver {
        resolve_val: vec![],
        fail: true,
    };
    let s = signer(Arc::new(MockReader::default()), resolver, Arc::new(foo_crypto()));

    let err = s.issue(&mock_cred_bytes(), MOCK_KID).unwrap_err();
    assert!(err.to_string().contains("resolving signer DID"));
    assert_eq!(err.category(), Category::Lookup);
}

#[test]
fn test_inconsistent_did_documents_are_rejected() {
    let s = signer(Arc::new(MockReader::default()), mock_resolver(), Arc::new(foo_crypto()));

    // The resolver answers with the document of another DID
    let err = s.issue(&mock_cred_bytes(), "did:test:bar#key-1").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResolveDid);

    let dangling = MockResolver {
        resolve_val: serde_json::to_vec(&json!({
            "@context": "https://www.w3.org/ns/did/v1",
            "id": MOCK_DID,
            "verificationMethod": [mock_vm("Ed25519VerificationKey2018")],
            "assertionMethod": ["#key-2"]
        }))
        .unwrap(),
        fail: false,
    };
    let s = signer(Arc::new(MockReader::default()), dangling, Arc::new(foo_crypto()));
    let err = s.issue(&mock_cred_bytes(), MOCK_KID).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResolveDid);

    let garbage = MockResolver {
        resolve_val: b"not json".to_vec(),
        fail: false,
    };
    let s = signer(Arc::new(MockReader::default()), garbage, Arc::new(foo_crypto()));
    let err = s.issue(&mock_cred_bytes(), MOCK_KID).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResolveDid);
}

#[test]
fn test_key_reference_failures() {
    let s = signer(Arc::new(MockReader::default()), mock_resolver(), Arc::new(foo_crypto()));

    let err = s.issue(&mock_cred_bytes(), "").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ParseKeyReference);
    assert!(err.to_string().contains("parsing key reference"));

    let err = s.issue(&mock_cred_bytes(), "did:test:foo#key-9").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::VerificationMethodNotFound);
    assert!(err.to_string().contains("verification method not found"));
}

#[test]
fn test_authentication_key_cannot_sign_credentials() {
    let vm = mock_vm("Ed25519VerificationKey2018");
    let resolver = MockResolver {
        resolve_val: serde_json::to_vec(&json!({
            "@context": "https://www.w3.org/ns/did/v1",
            "id": MOCK_DID,
            "verificationMethod": [vm],
            "authentication": ["#key-1"]
        }))
        .unwrap(),
        fail: false,
    };
    let crypto = Arc::new(foo_crypto());
    let s = signer(Arc::new(MockReader::default()), resolver, crypto.clone());

    let err = s.issue(&mock_cred_bytes(), MOCK_KID).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::VerificationMethodNotFound);
    assert!(err.to_string().contains("is not an assertion method of did:test:foo"));
    assert_eq!(crypto.sign_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_unsupported_key_type() {
    let resolver = MockResolver {
        resolve_val: mock_doc_resolution(mock_vm("EcdsaSecp256k1VerificationKey2019")),
        fail: false,
    };
    let crypto = Arc::new(foo_crypto());
    let s = signer(Arc::new(MockReader::default()), resolver, crypto.clone());

    let err = s.issue(&mock_cred_bytes(), MOCK_KID).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedKeyType);
    assert_eq!(err.category(), Category::Policy);
    assert!(err.to_string().contains("selecting proof suite"));
    assert_eq!(crypto.sign_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_signing_failure_unwraps_to_collaborator_error() {
    let crypto = Arc::new(MockCrypto {
        fail_sign: true,
        ..Default::default()
    });
    let s = signer(Arc::new(MockReader::default()), mock_resolver(), crypto);

    let err = s.issue(&mock_cred_bytes(), MOCK_KID).unwrap_err();
    assert!(err.to_string().contains("signing credential"));
    assert!(err.is::<ExpectedError>());
    assert_eq!(err.category(), Category::Operational);
}

#[test]
fn test_missing_collaborator() {
    let err = Signer::builder()
        .reader(Arc::new(MockReader::default()))
        .crypto(Arc::new(foo_crypto()))
        .loader(Arc::new(StaticDocumentLoader::new()))
        .build()
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::MissingCollaborator);
    assert_eq!(err.to_string(), "constructing signer: DID resolver is missing");
}

// === Round trips with the local collaborators ===

struct Fixture {
    signer: Signer,
    resolver: Arc<MethodResolver>,
    crypto: Arc<LocalCrypto>,
}

fn fixture() -> Fixture {
    let resolver = Arc::new(MethodResolver::new());
    let crypto = Arc::new(LocalCrypto::new());

    let signer = Signer::builder()
        .reader(Arc::new(MemoryCredentialReader::new()))
        .resolver(resolver.clone())
        .crypto(crypto.clone())
        .loader(Arc::new(StaticDocumentLoader::new()))
        .build()
        .unwrap();

    Fixture {
        signer,
        resolver,
        crypto,
    }
}

fn credential_issued_by(did: &str) -> Vec<u8> {
    let mut credential = mock_credential();
    credential["issuer"] = json!(did);
    serde_json::to_vec(&credential).unwrap()
}

/// Registers a `did:test` document whose `#key-1` method has the given type.
fn register_test_did(fx: &Fixture, did: &str, key_type: &str) -> String {
    let keypair = Ed25519KeyPair::new().unwrap();
    let key_id = format!("{did}#key-1");

    let document: Document = serde_json::from_value(json!({
        "@context": "https://www.w3.org/ns/did/v1",
        "id": did,
        "verificationMethod": [{
            "id": key_id,
            "type": key_type,
            "controller": did,
            "publicKeyJwk": keypair.to_public_jwk()
        }],
        "assertionMethod": [key_id]
    }))
    .unwrap();

    fx.resolver.register(document);
    fx.crypto.register(key_id.clone(), keypair);
    key_id
}

fn assert_round_trip(fx: &Fixture, did: &str, key_id: &str, suite: ProofSuite) {
    let issued = fx.signer.issue(&credential_issued_by(did), key_id).unwrap();

    assert_eq!(issued["proof"]["type"], suite.proof_type());
    assert_eq!(issued["proof"]["verificationMethod"], key_id);
    match suite.cryptosuite() {
        Some(cryptosuite) => assert_eq!(issued["proof"]["cryptosuite"], cryptosuite),
        None => assert!(issued["proof"].get("cryptosuite").is_none()),
    }

    fx.signer.verify(&serde_json::to_vec(&issued).unwrap()).unwrap();
}

#[test]
fn test_round_trip_ed25519_signature_2018() {
    let fx = fixture();
    let key_id = register_test_did(&fx, "did:test:a", "Ed25519VerificationKey2018");
    assert_round_trip(&fx, "did:test:a", &key_id, ProofSuite::Ed25519Signature2018);
}

#[test]
fn test_round_trip_ed25519_signature_2020() {
    let fx = fixture();
    let key_id = register_test_did(&fx, "did:test:b", "Ed25519VerificationKey2020");
    assert_round_trip(&fx, "did:test:b", &key_id, ProofSuite::Ed25519Signature2020);
}

#[test]
fn test_round_trip_data_integrity_with_did_key() {
    let fx = fixture();
    let keypair = Ed25519KeyPair::new().unwrap();
    let did = DidKey::from_ed25519_keypair(&keypair).unwrap();
    let key_id = format!("{did}#{}", did.trim_start_matches("did:key:"));
    fx.crypto.register(key_id.clone(), keypair);

    assert_round_trip(&fx, &did, &key_id, ProofSuite::EddsaJcs2022);
}

#[test]
fn test_round_trip_json_web_signature_with_did_jwk() {
    let fx = fixture();
    let keypair = Ed25519KeyPair::new().unwrap();
    let method = VerificationMethod::from_jwk("#0".to_string(), String::new(), keypair.to_public_jwk());
    let did = DidJwk::new().create(&method).unwrap().into_document().unwrap().id;
    let key_id = format!("{did}#0");
    fx.crypto.register(key_id.clone(), keypair);

    assert_round_trip(&fx, &did, &key_id, ProofSuite::JsonWebSignature2020);
}

#[test]
fn test_issuing_twice_builds_a_proof_set() {
    let fx = fixture();
    let first = register_test_did(&fx, "did:test:c", "Ed25519VerificationKey2020");
    let second = register_test_did(&fx, "did:test:d", "Ed25519VerificationKey2018");

    let issued = fx.signer.issue(&credential_issued_by("did:test:c"), &first).unwrap();
    let issued = fx.signer.issue(&serde_json::to_vec(&issued).unwrap(), &second).unwrap();

    assert_eq!(issued["proof"].as_array().unwrap().len(), 2);
    fx.signer.verify_document(&issued).unwrap();
}

#[test]
fn test_verification_failures() {
    let fx = fixture();
    let key_id = register_test_did(&fx, "did:test:e", "Ed25519VerificationKey2018");
    let issued = fx.signer.issue(&credential_issued_by("did:test:e"), &key_id).unwrap();

    // Proof type does not match the key type
    let mut mismatched = issued.clone();
    mismatched["proof"]["type"] = json!("Ed25519Signature2020");
    let err = fx.signer.verify_document(&mismatched).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Verify);
    assert!(err.to_string().contains("verifying credential"));

    // Content changed after signing
    let mut tampered = issued.clone();
    tampered["credentialSubject"]["id"] = json!("bar");
    assert_eq!(fx.signer.verify_document(&tampered).unwrap_err().kind(), ErrorKind::Verify);

    // No proof at all
    let unsigned = credential_issued_by("did:test:e");
    assert_eq!(fx.signer.verify(&unsigned).unwrap_err().kind(), ErrorKind::Verify);

    assert_eq!(fx.signer.verify(b"blah").unwrap_err().kind(), ErrorKind::ParseCredential);
}

#[test]
fn test_proofs_for_other_purposes_are_rejected() {
    let fx = fixture();
    let key_id = register_test_did(&fx, "did:test:g", "Ed25519VerificationKey2018");
    let issued = fx.signer.issue(&credential_issued_by("did:test:g"), &key_id).unwrap();

    let mut authentication = issued.clone();
    authentication["proof"]["proofPurpose"] = json!("authentication");
    let err = fx.signer.verify_document(&authentication).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Verify);
    assert!(err.to_string().contains("proof purpose authentication is not assertionMethod"));

    let mut no_purpose = issued;
    no_purpose["proof"].as_object_mut().unwrap().remove("proofPurpose");
    assert_eq!(fx.signer.verify_document(&no_purpose).unwrap_err().kind(), ErrorKind::Verify);

    // Keys listed only under authentication cannot issue
    let keypair = Ed25519KeyPair::new().unwrap();
    let document: Document = serde_json::from_value(json!({
        "@context": "https://www.w3.org/ns/did/v1",
        "id": "did:test:h",
        "verificationMethod": [{
            "id": "did:test:h#key-1",
            "type": "Ed25519VerificationKey2018",
            "controller": "did:test:h",
            "publicKeyJwk": keypair.to_public_jwk()
        }],
        "authentication": ["did:test:h#key-1"]
    }))
    .unwrap();
    fx.resolver.register(document);
    fx.crypto.register("did:test:h#key-1".to_string(), keypair);

    let err = fx.signer.issue(&credential_issued_by("did:test:h"), "did:test:h#key-1").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::VerificationMethodNotFound);
}

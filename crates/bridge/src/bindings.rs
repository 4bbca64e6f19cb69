//! The wallet operations exposed to hosts.

use std::sync::Arc;

use credential::{api::DidResolver, Signer, SigningRequest};
use did_utils::{
    didcore::{Document, Jwk, VerificationMethod},
    methods::{parse_did_url, DidJwk, KeyReference, ResolutionOutput},
};
use eyre::WrapErr;
use serde_json::Value;

use crate::{
    host::{HostError, HostErrorKind, HostValue, NamedArgs},
    runner::BridgedOperation,
};

/// The credential issuance protocol, as driven by a wallet.
pub trait Interaction: Send + Sync {
    /// Requests credentials with a pre-authorized code, proving possession
    /// of the key behind `method`.
    fn request_credential_with_pre_auth(&self, method: &VerificationMethod, pin: Option<&str>)
        -> eyre::Result<Vec<Value>>;
}

// === issueCredential ===

pub struct IssueCredential {
    signer: Arc<Signer>,
}

pub struct IssueRequest {
    request: SigningRequest,
    key_id: String,
}

impl IssueCredential {
    pub fn new(signer: Arc<Signer>) -> Self {
        Self { signer }
    }
}

impl BridgedOperation for IssueCredential {
    type Request = IssueRequest;
    type Response = Value;

    fn name(&self) -> &'static str {
        "issueCredential"
    }

    fn adapt(&self, args: &NamedArgs) -> Result<IssueRequest, HostError> {
        let key_id = args.string("keyID")?;
        key_id
            .parse::<KeyReference>()
            .map_err(|_| HostError::invalid_argument(format!("{key_id} is not a <DID>#<fragment> key reference")))?;

        let request = match (args.get("credential"), args.optional_string("credentialID")?) {
            (Some(Value::String(text)), _) => SigningRequest::from_bytes(text.as_bytes())
                .map_err(|e| HostError::invalid_argument(format!("argument credential is not valid JSON: {e}")))?,
            (Some(document), _) => SigningRequest::Document(document.clone()),
            (None, Some(id)) => SigningRequest::Identifier(id),
            (None, None) => {
                return Err(HostError::invalid_argument(
                    "either credential or credentialID must be provided",
                ))
            }
        };

        Ok(IssueRequest { request, key_id })
    }

    fn run(&self, request: IssueRequest) -> eyre::Result<Value> {
        Ok(self.signer.issue_request(request.request, &request.key_id)?)
    }

    fn marshal(&self, issued: Value) -> Result<HostValue, HostError> {
        Ok(issued)
    }
}

// === verifyCredential ===

pub struct VerifyCredential {
    signer: Arc<Signer>,
}

impl VerifyCredential {
    pub fn new(signer: Arc<Signer>) -> Self {
        Self { signer }
    }
}

impl BridgedOperation for VerifyCredential {
    type Request = Value;
    type Response = ();

    fn name(&self) -> &'static str {
        "verifyCredential"
    }

    fn adapt(&self, args: &NamedArgs) -> Result<Value, HostError> {
        args.document("credential")
    }

    fn run(&self, credential: Value) -> eyre::Result<()> {
        Ok(self.signer.verify_document(&credential)?)
    }

    fn marshal(&self, _: ()) -> Result<HostValue, HostError> {
        Ok(Value::Bool(true))
    }
}

// === resolveDID ===

pub struct ResolveDid {
    resolver: Arc<dyn DidResolver>,
}

impl ResolveDid {
    pub fn new(resolver: Arc<dyn DidResolver>) -> Self {
        Self { resolver }
    }
}

impl BridgedOperation for ResolveDid {
    type Request = String;
    type Response = Vec<u8>;

    fn name(&self) -> &'static str {
        "resolveDID"
    }

    fn adapt(&self, args: &NamedArgs) -> Result<String, HostError> {
        let did = args.string("did")?;
        parse_did_url(&did).map_err(|_| HostError::invalid_argument(format!("{did} is not a DID")))?;
        Ok(did)
    }

    fn run(&self, did: String) -> eyre::Result<Vec<u8>> {
        self.resolver.resolve(&did).wrap_err_with(|| format!("resolving {did}"))
    }

    fn marshal(&self, bytes: Vec<u8>) -> Result<HostValue, HostError> {
        let document = document_from_resolution(
            serde_json::from_slice(&bytes)
                .map_err(|e| HostError::new(HostErrorKind::Lookup, format!("resolver returned invalid JSON: {e}")))?,
        )
        .map_err(|e| HostError::new(HostErrorKind::Lookup, e.message))?;

        serde_json::to_value(document).map_err(|e| HostError::internal(e.to_string()))
    }
}

// === createDID ===

#[derive(Default)]
pub struct CreateDid {
    creator: DidJwk,
}

impl CreateDid {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BridgedOperation for CreateDid {
    type Request = Jwk;
    type Response = ResolutionOutput;

    fn name(&self) -> &'static str {
        "createDID"
    }

    fn adapt(&self, args: &NamedArgs) -> Result<Jwk, HostError> {
        serde_json::from_value(args.document("jwk")?)
            .map_err(|e| HostError::invalid_argument(format!("argument jwk is not a JWK: {e}")))
    }

    fn run(&self, jwk: Jwk) -> eyre::Result<ResolutionOutput> {
        let method = VerificationMethod::from_jwk(String::from("#0"), String::new(), jwk);

        self.creator
            .create(&method)
            .wrap_err("creating did:jwk DID Document")
    }

    fn marshal(&self, output: ResolutionOutput) -> Result<HostValue, HostError> {
        serde_json::to_value(output).map_err(|e| HostError::internal(e.to_string()))
    }
}

// === requestCredentialWithPreAuth ===

pub struct RequestCredentialWithPreAuth {
    interaction: Arc<dyn Interaction>,
}

pub struct PreAuthRequest {
    pin: Option<String>,
    document: Document,
}

impl RequestCredentialWithPreAuth {
    pub fn new(interaction: Arc<dyn Interaction>) -> Self {
        Self { interaction }
    }
}

impl BridgedOperation for RequestCredentialWithPreAuth {
    type Request = PreAuthRequest;
    type Response = Vec<Value>;

    fn name(&self) -> &'static str {
        "requestCredentialWithPreAuth"
    }

    fn adapt(&self, args: &NamedArgs) -> Result<PreAuthRequest, HostError> {
        let pin = args.optional_string("pin")?;
        let document = document_from_resolution(args.document("didDoc")?)?;

        Ok(PreAuthRequest { pin, document })
    }

    fn run(&self, request: PreAuthRequest) -> eyre::Result<Vec<Value>> {
        let method = request.document.assertion_methods().into_iter().next().ok_or_else(|| {
            HostError::new(
                HostErrorKind::Input,
                "DID provided has no assertion method to use as a default signing key",
            )
        })?;

        self.interaction
            .request_credential_with_pre_auth(method, request.pin.as_deref())
    }

    fn marshal(&self, credentials: Vec<Value>) -> Result<HostValue, HostError> {
        Ok(Value::Array(credentials))
    }
}

/// Reads a DID document given either bare or as a DID resolution result.
fn document_from_resolution(mut value: Value) -> Result<Document, HostError> {
    if let Some(document) = value.get_mut("didDocument") {
        value = document.take();
    }

    serde_json::from_value(value).map_err(|e| HostError::invalid_argument(format!("invalid DID document: {e}")))
}

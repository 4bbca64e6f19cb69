use multibase::Base::Base64Url;

use crate::{
    didcore::{Document, Jwk, VerificationMethod},
    ldmodel::Context,
};

use super::{
    alg::Algorithm,
    errors::DIDResolutionError,
    key::{document_for, DID_CONTEXT, JWS_2020_CONTEXT},
    resolution::ResolutionOutput,
    traits::DIDMethod,
};

/// The `did:jwk` method: the DID is the base64url-encoded public JWK.
///
/// See https://github.com/quartzjer/did-jwk/blob/main/spec.md
#[derive(Debug, Default, Clone)]
pub struct DidJwk;

impl DIDMethod for DidJwk {
    fn name() -> String {
        "did:jwk".to_string()
    }

    fn expand(&self, did: &str) -> Result<Document, DIDResolutionError> {
        let encoded = did.strip_prefix("did:jwk:").ok_or(DIDResolutionError::InvalidDid)?;

        let decoded = Base64Url.decode(encoded).map_err(|_| DIDResolutionError::InvalidDid)?;
        let jwk: Jwk = serde_json::from_slice(&decoded).map_err(|_| DIDResolutionError::InvalidDid)?;

        if jwk.d.is_some() {
            return Err(DIDResolutionError::InvalidPublicKey);
        }

        let alg = algorithm_of(&jwk)?;
        let method = VerificationMethod::from_jwk(format!("{did}#0"), did.to_string(), jwk);
        let context = Context::SetOfString(vec![DID_CONTEXT.to_string(), JWS_2020_CONTEXT.to_string()]);

        Ok(document_for(alg, context, did, method))
    }
}

impl DidJwk {
    pub fn new() -> Self {
        Self
    }

    /// Creates the `did:jwk` DID of the public part of `jwk`.
    pub fn did_of(jwk: &Jwk) -> Result<String, DIDResolutionError> {
        algorithm_of(jwk)?;

        if jwk.x.is_none() {
            return Err(DIDResolutionError::InvalidPublicKey);
        }

        let public = Jwk {
            key_id: None,
            d: None,
            ..jwk.clone()
        };

        let value = serde_json::to_value(&public).map_err(|_| DIDResolutionError::InternalError)?;
        let canonical = json_canon::to_string(&value).map_err(|_| DIDResolutionError::InternalError)?;

        Ok(format!("did:jwk:{}", Base64Url.encode(canonical)))
    }

    /// Creates a `did:jwk` DID from the JWK held by `method` and returns
    /// the resolution result of its DID document.
    pub fn create(&self, method: &VerificationMethod) -> Result<ResolutionOutput, DIDResolutionError> {
        let jwk = method.public_key_jwk.as_ref().ok_or(DIDResolutionError::InvalidPublicKeyType)?;

        let did = Self::did_of(jwk)?;
        tracing::debug!(%did, "created did:jwk");

        Ok(ResolutionOutput::from_document(self.expand(&did)?))
    }
}

fn algorithm_of(jwk: &Jwk) -> Result<Algorithm, DIDResolutionError> {
    match (jwk.key_type.as_str(), jwk.curve.as_str()) {
        ("OKP", "Ed25519") => Ok(Algorithm::Ed25519),
        ("OKP", "X25519") => Ok(Algorithm::X25519),
        _ => Err(DIDResolutionError::UnsupportedPublicKeyType),
    }
}

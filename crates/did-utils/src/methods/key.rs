use crate::{
    crypto::{Ed25519KeyPair, Error as CryptoError, Generate, KeyMaterial},
    didcore::{Document, VerificationMethod, VerificationMethodType},
    ldmodel::Context,
};

use super::{
    alg::{decode_multikey, Algorithm},
    errors::DIDResolutionError,
    traits::DIDMethod,
};

pub(crate) const DID_CONTEXT: &str = "https://www.w3.org/ns/did/v1";
const MULTIKEY_CONTEXT: &str = "https://w3id.org/security/multikey/v1";
pub(crate) const JWS_2020_CONTEXT: &str = "https://w3id.org/security/suites/jws-2020/v1";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PublicKeyFormat {
    #[default]
    Multikey,
    Jwk,
}

#[derive(Debug, Default, Clone)]
pub struct DidKey {
    /// Key format to consider during DID
    /// expansion into a DID document.
    pub key_format: PublicKeyFormat,
}

impl DIDMethod for DidKey {
    fn name() -> String {
        "did:key".to_string()
    }

    fn expand(&self, did: &str) -> Result<Document, DIDResolutionError> {
        let multikey = did.strip_prefix("did:key:").ok_or(DIDResolutionError::InvalidDid)?;

        if !multikey.starts_with('z') {
            return Err(DIDResolutionError::InvalidDid);
        }

        let (alg, raw) = decode_multikey(multikey).map_err(|err| match err {
            CryptoError::InvalidCurve => DIDResolutionError::UnsupportedPublicKeyType,
            CryptoError::InvalidKeyLength => DIDResolutionError::InvalidPublicKeyLength,
            _ => DIDResolutionError::InvalidDid,
        })?;

        let id = format!("{did}#{multikey}");
        let (method, format_context) = match self.key_format {
            PublicKeyFormat::Multikey => (
                VerificationMethod {
                    public_key_multibase: Some(multikey.to_string()),
                    ..VerificationMethod::new(id, String::from("Multikey"), did.to_string())
                },
                MULTIKEY_CONTEXT,
            ),
            PublicKeyFormat::Jwk => {
                let jwk = alg.build_jwk(&raw).map_err(|_| DIDResolutionError::InvalidPublicKey)?;
                (VerificationMethod::from_jwk(id, did.to_string(), jwk), JWS_2020_CONTEXT)
            }
        };

        let context = Context::SetOfString(vec![DID_CONTEXT.to_string(), format_context.to_string()]);
        Ok(document_for(alg, context, did, method))
    }
}

impl DidKey {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_full(key_format: PublicKeyFormat) -> Self {
        Self { key_format }
    }

    /// Generates did:key address ex nihilo, off self-generated Ed25519 key pair
    pub fn generate() -> Result<String, CryptoError> {
        let keypair = Ed25519KeyPair::new()?;
        Self::from_ed25519_keypair(&keypair)
    }

    /// Computes did:key address corresponding to Ed25519 key pair
    pub fn from_ed25519_keypair(keypair: &Ed25519KeyPair) -> Result<String, CryptoError> {
        Self::from_raw_public_key(Algorithm::Ed25519, &keypair.public_key_bytes()?)
    }

    /// Computes did:key address corresponding to raw public key bytes
    pub fn from_raw_public_key(alg: Algorithm, bytes: &[u8]) -> Result<String, CryptoError> {
        Ok(format!("did:key:{}", alg.encode_multikey(bytes)?))
    }
}

/// Places `method` under the relationships its algorithm is fit for.
pub(crate) fn document_for(alg: Algorithm, context: Context, did: &str, method: VerificationMethod) -> Document {
    match alg {
        Algorithm::Ed25519 => Document::with_signing_method(context, did.to_string(), method),
        Algorithm::X25519 => Document {
            controller: None,
            key_agreement: Some(vec![VerificationMethodType::Reference(method.id.clone())]),
            verification_method: Some(vec![method]),
            ..Document::new(context, did.to_string())
        },
    }
}

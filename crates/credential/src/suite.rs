use did_utils::{
    didcore::{KeyFormat, VerificationMethod},
    methods::{decode_multikey, Algorithm},
    proof::{hash_for_signing, CanonicalizationError, Proof},
};
use multibase::Base::{Base58Btc, Base64Url};
use serde_json::Value;

// {"alg":"EdDSA","b64":false,"crit":["b64"]}
const DETACHED_EDDSA_HEADER: &str = "eyJhbGciOiJFZERTQSIsImI2NCI6ZmFsc2UsImNyaXQiOlsiYjY0Il19";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("no proof suite for verification method type {key_type}")]
pub struct UnsupportedKeyType {
    pub key_type: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("proof carries no signature")]
    Missing,
    #[error("malformed detached JWS")]
    MalformedJws,
    #[error("malformed proof value")]
    MalformedProofValue,
}

/// Linked-data proof suites the signer can produce and check.
///
/// A suite is selected from the type of the verification method
/// holding the signing key; see [`ProofSuite::for_method`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofSuite {
    /// Detached JWS in `jws`.
    Ed25519Signature2018,
    /// Base58-btc multibase signature in `proofValue`.
    Ed25519Signature2020,
    /// `DataIntegrityProof` with the `eddsa-jcs-2022` cryptosuite.
    EddsaJcs2022,
    /// Detached JWS in `jws`, for keys given as JWK.
    JsonWebSignature2020,
}

impl ProofSuite {
    pub fn for_method(method: &VerificationMethod) -> Result<Self, UnsupportedKeyType> {
        let unsupported = || UnsupportedKeyType {
            key_type: method.key_type.clone(),
        };

        match method.key_type.as_str() {
            "Ed25519VerificationKey2018" => Ok(ProofSuite::Ed25519Signature2018),
            "Ed25519VerificationKey2020" => Ok(ProofSuite::Ed25519Signature2020),
            "Multikey" => match method.public_key() {
                Some(KeyFormat::Multibase(multikey)) => match decode_multikey(multikey) {
                    Ok((Algorithm::Ed25519, _)) => Ok(ProofSuite::EddsaJcs2022),
                    _ => Err(unsupported()),
                },
                _ => Err(unsupported()),
            },
            "JsonWebKey2020" => match method.public_key() {
                Some(KeyFormat::Jwk(jwk)) if jwk.key_type == "OKP" && jwk.curve == "Ed25519" => {
                    Ok(ProofSuite::JsonWebSignature2020)
                }
                _ => Err(unsupported()),
            },
            _ => Err(unsupported()),
        }
    }

    pub fn proof_type(&self) -> &'static str {
        match self {
            ProofSuite::Ed25519Signature2018 => "Ed25519Signature2018",
            ProofSuite::Ed25519Signature2020 => "Ed25519Signature2020",
            ProofSuite::EddsaJcs2022 => "DataIntegrityProof",
            ProofSuite::JsonWebSignature2020 => "JsonWebSignature2020",
        }
    }

    pub fn cryptosuite(&self) -> Option<&'static str> {
        match self {
            ProofSuite::EddsaJcs2022 => Some("eddsa-jcs-2022"),
            _ => None,
        }
    }

    fn is_jws(&self) -> bool {
        matches!(self, ProofSuite::Ed25519Signature2018 | ProofSuite::JsonWebSignature2020)
    }

    /// Tells whether `proof` claims to have been produced by this suite.
    pub fn matches(&self, proof: &Proof) -> bool {
        proof.proof_type == self.proof_type() && proof.cryptosuite.as_deref() == self.cryptosuite()
    }

    /// Builds the bytes handed to the crypto collaborator.
    pub fn signing_input(&self, proof: &Proof, document: &Value) -> Result<Vec<u8>, CanonicalizationError> {
        let hash = hash_for_signing(proof, document)?;

        if self.is_jws() {
            Ok([DETACHED_EDDSA_HEADER.as_bytes(), b".", &hash].concat())
        } else {
            Ok(hash)
        }
    }

    /// Stores `signature` in the proof member this suite uses.
    pub fn attach_signature(&self, proof: &mut Proof, signature: &[u8]) {
        if self.is_jws() {
            proof.jws = Some(format!("{DETACHED_EDDSA_HEADER}..{}", Base64Url.encode(signature)));
        } else {
            proof.proof_value = Some(multibase::encode(Base58Btc, signature));
        }
    }

    /// Reads back the signature stored by [`ProofSuite::attach_signature`].
    pub fn extract_signature(&self, proof: &Proof) -> Result<Vec<u8>, SignatureError> {
        if self.is_jws() {
            let jws = proof.jws.as_deref().ok_or(SignatureError::Missing)?;
            let (header, signature) = jws.split_once("..").ok_or(SignatureError::MalformedJws)?;

            if header != DETACHED_EDDSA_HEADER {
                return Err(SignatureError::MalformedJws);
            }

            Base64Url.decode(signature).map_err(|_| SignatureError::MalformedJws)
        } else {
            let proof_value = proof.proof_value.as_deref().ok_or(SignatureError::Missing)?;

            match multibase::decode(proof_value) {
                Ok((Base58Btc, signature)) => Ok(signature),
                _ => Err(SignatureError::MalformedProofValue),
            }
        }
    }
}

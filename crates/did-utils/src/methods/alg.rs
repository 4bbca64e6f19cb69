use multibase::Base::{Base58Btc, Base64Url};

use crate::{crypto::Error as CryptoError, didcore::Jwk};

/// Supported cryptographic algorithms.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Algorithm {
    Ed25519,
    X25519,
}

use Algorithm::*;

// See:
// - https://w3c-ccg.github.io/did-method-key/#signature-method-creation-algorithm
// - https://w3c-ccg.github.io/did-method-key/#encryption-method-creation-algorithm
impl Algorithm {
    /// Returns the multicodec prefix associated with the algorithm.
    pub fn muticodec_prefix(&self) -> [u8; 2] {
        match self {
            Ed25519 => [0xed, 0x01],
            X25519 => [0xec, 0x01],
        }
    }

    /// Creates an `Algorithm` enum variant from the given multicodec prefix.
    pub fn from_muticodec_prefix(prefix: &[u8; 2]) -> Option<Self> {
        match prefix {
            [0xed, 0x01] => Some(Ed25519),
            [0xec, 0x01] => Some(X25519),
            _ => None,
        }
    }

    /// Returns the length of the public key for the algorithm.
    pub fn public_key_length(&self) -> usize {
        match self {
            Ed25519 | X25519 => 32,
        }
    }

    /// Name of the `OKP` curve carrying this algorithm's keys.
    pub fn curve(&self) -> &'static str {
        match self {
            Ed25519 => "Ed25519",
            X25519 => "X25519",
        }
    }

    /// Builds a public JSON Web Key from raw public key bytes.
    pub fn build_jwk(&self, raw_public_key_bytes: &[u8]) -> Result<Jwk, CryptoError> {
        if raw_public_key_bytes.len() != self.public_key_length() {
            return Err(CryptoError::InvalidKeyLength);
        }

        Ok(Jwk {
            key_id: None,
            key_type: String::from("OKP"),
            curve: self.curve().to_string(),
            x: Some(Base64Url.encode(raw_public_key_bytes)),
            y: None,
            d: None,
        })
    }

    /// Encodes raw public key bytes as a base58-btc multikey.
    pub fn encode_multikey(&self, raw_public_key_bytes: &[u8]) -> Result<String, CryptoError> {
        if raw_public_key_bytes.len() != self.public_key_length() {
            return Err(CryptoError::InvalidKeyLength);
        }

        Ok(multibase::encode(
            Base58Btc,
            [&self.muticodec_prefix(), raw_public_key_bytes].concat(),
        ))
    }
}

/// Decodes a multibase multikey into its algorithm and raw public key bytes.
pub fn decode_multikey(multikey: &str) -> Result<(Algorithm, Vec<u8>), CryptoError> {
    let (_, bytes) = multibase::decode(multikey).map_err(|_| CryptoError::InvalidPublicKey)?;

    if bytes.len() < 2 {
        return Err(CryptoError::InvalidPublicKey);
    }

    let prefix = [bytes[0], bytes[1]];
    let alg = Algorithm::from_muticodec_prefix(&prefix).ok_or(CryptoError::InvalidCurve)?;

    let raw = bytes[2..].to_vec();
    if raw.len() != alg.public_key_length() {
        return Err(CryptoError::InvalidKeyLength);
    }

    Ok((alg, raw))
}

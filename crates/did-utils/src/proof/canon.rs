use serde_json::Value;

use super::model::Proof;
use crate::crypto::sha256_hash;

#[derive(Debug, thiserror::Error)]
#[error("canonicalization failed: {0}")]
pub struct CanonicalizationError(String);

/// Computes the bytes a proof signs over.
///
/// Both the proof options (the proof without its signature) and the document
/// (without any `proof` entry) are JCS-canonicalized and hashed with SHA-256.
/// The two digests are concatenated, options first.
pub fn hash_for_signing(proof: &Proof, document: &Value) -> Result<Vec<u8>, CanonicalizationError> {
    let naked_document = match document {
        Value::Object(map) if map.contains_key("proof") => {
            let mut map = map.clone();
            map.remove("proof");
            Value::Object(map)
        }
        _ => document.clone(),
    };

    let options = serde_json::to_value(proof.options()).map_err(|e| CanonicalizationError(e.to_string()))?;
    let canonicalize = |value: &Value| json_canon::to_string(value).map_err(|e| CanonicalizationError(e.to_string()));

    let canon_proof = canonicalize(&options)?;
    let canon_doc = canonicalize(&naked_document)?;

    Ok([sha256_hash(canon_proof.as_bytes()), sha256_hash(canon_doc.as_bytes())].concat())
}

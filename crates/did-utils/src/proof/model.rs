use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, PartialEq, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    // An optional identifier for the proof.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    // See https://www.w3.org/TR/vc-data-integrity/#dfn-proof-type
    #[serde(rename = "type")]
    pub proof_type: String,

    // Only set for `DataIntegrityProof`, which delegates the algorithm choice
    // to a cryptographic suite identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cryptosuite: Option<String>,

    // See https://www.w3.org/TR/vc-data-integrity/#dfn-proof-purpose
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_purpose: Option<String>,

    // See https://www.w3.org/TR/vc-data-integrity/#dfn-verification-method
    pub verification_method: String,

    // The date and time the proof was created
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,

    // The date and time that the proof expires
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,

    // One or more security domains in which the proof is meant to be used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<Domain>,

    // Used once for a particular domain and window of time, against replays.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge: Option<String>,

    // Multibase-encoded signature, as used by Ed25519Signature2020 and DataIntegrityProof.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_value: Option<String>,

    // Detached JWS, as used by Ed25519Signature2018 and JsonWebSignature2020.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jws: Option<String>,

    // See https://www.w3.org/TR/vc-data-integrity/#proof-chains
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_proof: Option<PreviousProofs>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Domain {
    SingleString(String),
    SetOfString(Vec<String>),
}

#[derive(Serialize, Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PreviousProofs {
    SingleString(String),
    SetOfString(Vec<String>),
}

#[derive(Serialize, Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Proofs {
    SingleProof(Box<Proof>),
    SetOfProofs(Vec<Proof>),
}

impl Proofs {
    /// Flattens the proof section into a list.
    pub fn into_vec(self) -> Vec<Proof> {
        match self {
            Proofs::SingleProof(proof) => vec![*proof],
            Proofs::SetOfProofs(proofs) => proofs,
        }
    }

    /// Appends a proof, turning a single proof into a set.
    pub fn push(self, proof: Proof) -> Self {
        let mut proofs = self.into_vec();
        proofs.push(proof);
        Proofs::SetOfProofs(proofs)
    }
}

impl Proof {
    /// Proof options: this proof without its signature, as covered by the signing input.
    pub fn options(&self) -> Proof {
        Proof {
            proof_value: None,
            jws: None,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_and_set_of_proofs() {
        let single: Proofs = serde_json::from_value(json!({
            "type": "Ed25519Signature2020",
            "verificationMethod": "did:example:123#key-1",
            "proofValue": "z3FXQ"
        }))
        .unwrap();
        assert!(matches!(single, Proofs::SingleProof(_)));

        let proof = Proof {
            proof_type: "JsonWebSignature2020".to_string(),
            verification_method: "did:example:123#key-2".to_string(),
            ..Default::default()
        };
        let set = single.push(proof);
        let proofs = set.into_vec();
        assert_eq!(proofs.len(), 2);
        assert_eq!(proofs[1].proof_type, "JsonWebSignature2020");
    }

    #[test]
    fn test_options_drop_signature_only() {
        let proof = Proof {
            proof_type: "Ed25519Signature2018".to_string(),
            proof_purpose: Some("assertionMethod".to_string()),
            verification_method: "did:example:123#key-1".to_string(),
            jws: Some("eyJhbGciOiJFZERTQSJ9..c2ln".to_string()),
            ..Default::default()
        };

        let options = proof.options();
        assert!(options.jws.is_none());
        assert_eq!(options.proof_purpose, proof.proof_purpose);
        assert_eq!(options.verification_method, proof.verification_method);
    }
}

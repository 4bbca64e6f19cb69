use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    ldmodel::Context,
    proof::{Proof, Proofs},
};

/// Represents a Verifiable Credential.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VerifiableCredential {
    #[serde(rename = "@context")]
    pub context: Context,

    // Identifier of this credential.
    // WARNING: This is not the identifier of the subject of the credential.
    // https://www.w3.org/TR/vc-data-model-2.0/#identifiers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    // see https://www.w3.org/TR/vc-data-model-2.0/#types
    #[serde(rename = "type")]
    pub cred_type: Types,

    // see https://www.w3.org/TR/vc-data-model-2.0/#issuer
    pub issuer: Issuer,

    // VC data model 1.1
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuance_date: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,

    // VC data model 2.0
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<DateTime<Utc>>,

    // See https://www.w3.org/TR/vc-data-model-2.0/#credential-subject
    pub credential_subject: CredentialSubjects,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_status: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proofs>,

    // === Properties Map===
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(flatten)]
    pub additional_properties: Option<HashMap<String, Value>>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Types {
    Single(String),
    SetOf(Vec<String>),
}

#[derive(Serialize, Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Issuer {
    SingleString(String),
    IssuerObject(IssuerObject),
}

#[derive(Serialize, Debug, Clone, PartialEq, Deserialize)]
pub struct IssuerObject {
    pub id: String,

    #[serde(flatten)]
    pub additional_properties: HashMap<String, Value>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CredentialSubjects {
    Single(Box<CredentialSubject>),
    SetOf(Vec<CredentialSubject>),
}

#[derive(Serialize, Deserialize, PartialEq, Debug, Clone, Default)]
pub struct CredentialSubject {
    // Identifies the subject of the verifiable credential
    // (the thing the claims are about).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    // === Claims ===
    #[serde(flatten)]
    pub claims: HashMap<String, Value>,
}

impl VerifiableCredential {
    /// Identifier of the issuer, whichever form the issuer takes.
    pub fn issuer_id(&self) -> &str {
        match &self.issuer {
            Issuer::SingleString(id) => id,
            Issuer::IssuerObject(issuer) => &issuer.id,
        }
    }

    pub fn types(&self) -> Vec<&str> {
        match &self.cred_type {
            Types::Single(t) => vec![t.as_str()],
            Types::SetOf(types) => types.iter().map(String::as_str).collect(),
        }
    }

    pub fn subjects(&self) -> Vec<&CredentialSubject> {
        match &self.credential_subject {
            CredentialSubjects::Single(subject) => vec![subject.as_ref()],
            CredentialSubjects::SetOf(subjects) => subjects.iter().collect(),
        }
    }

    /// A credential can be signed once its issuer and subject are populated.
    pub fn is_signable(&self) -> bool {
        let subjects = self.subjects();

        !self.issuer_id().is_empty()
            && !subjects.is_empty()
            && subjects.iter().all(|subject| subject.id.is_some() || !subject.claims.is_empty())
    }

    /// The proofs attached to this credential, in order.
    pub fn proofs(&self) -> Vec<Proof> {
        self.proof.clone().map(Proofs::into_vec).unwrap_or_default()
    }
}

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ldmodel::Context, methods::DIDResolutionError, proof::Proofs};

// === Structure of a did document ===

#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    // The @context property defines the vocabulary used in the JSON-LD document.
    #[serde(rename = "@context")]
    pub context: Context,

    // === Identifier ===

    // Identifier property is mandatory in a did document.
    // see https://www.w3.org/TR/did-core/#dfn-id
    pub id: String,

    // See https://www.w3.org/TR/did-core/#dfn-controller
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller: Option<Controller>,

    // See https://www.w3.org/TR/did-core/#dfn-alsoknownas
    #[serde(skip_serializing_if = "Option::is_none")]
    pub also_known_as: Option<Vec<String>>,

    // === Verification Methods ===
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_method: Option<Vec<VerificationMethod>>,

    // === Verification Relationships ===
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication: Option<Vec<VerificationMethodType>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub assertion_method: Option<Vec<VerificationMethodType>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub capability_delegation: Option<Vec<VerificationMethodType>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub capability_invocation: Option<Vec<VerificationMethodType>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_agreement: Option<Vec<VerificationMethodType>>,

    // === Services ===
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<Vec<Service>>,

    // === Dynamic Properties ===
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(flatten)]
    pub additional_properties: Option<HashMap<String, Value>>,

    // === Proof ===
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proofs>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Controller {
    SingleString(String),
    SetOfString(Vec<String>),
}

// See https://www.w3.org/TR/did-core/#services
#[derive(Serialize, Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,

    #[serde(rename = "type")]
    pub service_type: String,

    pub service_endpoint: Value,

    // === Additional properties ===
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(flatten)]
    pub additional_properties: Option<HashMap<String, Value>>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    pub id: String,

    #[serde(rename = "type")]
    pub key_type: String,

    pub controller: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_base58: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_multibase: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_jwk: Option<Jwk>,

    // === Additional properties ===
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(flatten)]
    pub additional_properties: Option<HashMap<String, Value>>,
}

/// The verification material carried by a verification method.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyFormat<'a> {
    Base58(&'a str),
    Multibase(&'a str),
    Jwk(&'a Jwk),
}

#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Default)]
pub struct Jwk {
    #[serde(rename = "kid", skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    #[serde(rename = "kty")]
    pub key_type: String,
    #[serde(rename = "crv")]
    pub curve: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
}

/// Entry of a verification relationship: either a reference to a method
/// declared in `verificationMethod`, or a method embedded in place.
#[derive(Serialize, Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum VerificationMethodType {
    Reference(String),
    Embedded(Box<VerificationMethod>),
}

impl VerificationMethod {
    /// Returns the verification material, preferring JWK over multibase over base58.
    ///
    /// A method MUST NOT carry multiple representations of the same material,
    /// so the order only matters for malformed documents.
    pub fn public_key(&self) -> Option<KeyFormat<'_>> {
        if let Some(jwk) = &self.public_key_jwk {
            return Some(KeyFormat::Jwk(jwk));
        }

        if let Some(multibase) = &self.public_key_multibase {
            return Some(KeyFormat::Multibase(multibase));
        }

        self.public_key_base58.as_deref().map(KeyFormat::Base58)
    }

    /// Fragment part of the method identifier, if any.
    pub fn fragment(&self) -> Option<&str> {
        self.id.split_once('#').map(|(_, fragment)| fragment)
    }
}

impl Document {
    /// Finds the verification method whose identifier carries `fragment`.
    ///
    /// Identifiers may be relative (`#key-1`) or absolute (`did:example:123#key-1`).
    /// Methods embedded in verification relationships are looked up as well.
    pub fn find_verification_method(&self, fragment: &str) -> Option<&VerificationMethod> {
        let matches = |vm: &&VerificationMethod| self.has_fragment(vm, fragment);

        self.verification_method
            .iter()
            .flatten()
            .find(matches)
            .or_else(|| self.embedded_methods().find(matches))
    }

    /// Tells whether the method with the given fragment is listed under `assertionMethod`.
    pub fn is_assertion_method(&self, fragment: &str) -> bool {
        self.assertion_methods().into_iter().any(|vm| self.has_fragment(vm, fragment))
    }

    /// Lists the methods usable for assertions, resolving references.
    ///
    /// References that point nowhere are skipped; see [`Document::validate_relationships`].
    pub fn assertion_methods(&self) -> Vec<&VerificationMethod> {
        self.assertion_method
            .iter()
            .flatten()
            .filter_map(|entry| match entry {
                VerificationMethodType::Embedded(vm) => Some(vm.as_ref()),
                VerificationMethodType::Reference(reference) => self.dereference(reference),
            })
            .collect()
    }

    /// Checks that every referenced verification method exists in the method set.
    pub fn validate_relationships(&self) -> Result<(), DIDResolutionError> {
        let dangling = self
            .relationships()
            .flatten()
            .filter_map(|entry| match entry {
                VerificationMethodType::Reference(reference) => Some(reference),
                VerificationMethodType::Embedded(_) => None,
            })
            .find(|reference| self.dereference(reference).is_none());

        match dangling {
            Some(reference) => {
                tracing::debug!(did = %self.id, reference, "dangling verification method reference");
                Err(DIDResolutionError::InvalidDidDocument)
            }
            None => Ok(()),
        }
    }

    fn dereference(&self, reference: &str) -> Option<&VerificationMethod> {
        let (did, fragment) = reference.split_once('#')?;
        let local = did.is_empty() || did == self.id;

        self.verification_method
            .iter()
            .flatten()
            .find(|vm| vm.id == reference || (local && self.has_fragment(vm, fragment)))
    }

    // Method ids are either relative (`#frag`) or prefixed with this document's DID.
    fn has_fragment(&self, vm: &VerificationMethod, fragment: &str) -> bool {
        match vm.id.split_once('#') {
            Some((did, id_fragment)) => id_fragment == fragment && (did.is_empty() || did == self.id),
            None => false,
        }
    }

    fn relationships(&self) -> impl Iterator<Item = &Vec<VerificationMethodType>> {
        [
            &self.authentication,
            &self.assertion_method,
            &self.capability_delegation,
            &self.capability_invocation,
            &self.key_agreement,
        ]
        .into_iter()
        .flatten()
    }

    fn embedded_methods(&self) -> impl Iterator<Item = &VerificationMethod> {
        self.relationships().flatten().filter_map(|entry| match entry {
            VerificationMethodType::Embedded(vm) => Some(vm.as_ref()),
            VerificationMethodType::Reference(_) => None,
        })
    }
}

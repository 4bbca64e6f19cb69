use crate::{
    didcore::{Controller, Document, Jwk, VerificationMethod, VerificationMethodType},
    ldmodel::Context,
};

impl VerificationMethod {
    /// Creates a new `VerificationMethod` instance.
    ///
    /// # Arguments
    ///
    /// * `id` - A unique identifier for the verification method.
    /// * `key_type` - The type of key used in the verification method.
    /// * `controller` - The identifier of the controller of the verification method.
    pub fn new(id: String, key_type: String, controller: String) -> Self {
        Self {
            id,
            key_type,
            controller,
            ..Default::default()
        }
    }

    /// Creates a `JsonWebKey2020` verification method holding `jwk`.
    pub fn from_jwk(id: String, controller: String, jwk: Jwk) -> Self {
        Self {
            public_key_jwk: Some(jwk),
            ..Self::new(id, String::from("JsonWebKey2020"), controller)
        }
    }
}

impl Document {
    /// Creates a new `Document` instance with only the required members.
    ///
    /// # Arguments
    ///
    /// * `context` - The context defining the vocabulary for the document.
    /// * `id` - A unique identifier for the DID document.
    pub fn new(context: Context, id: String) -> Self {
        Self {
            id: id.clone(),
            context,
            also_known_as: None,
            controller: Some(Controller::SingleString(id)),
            authentication: None,
            assertion_method: None,
            capability_delegation: None,
            capability_invocation: None,
            key_agreement: None,
            verification_method: None,
            service: None,
            proof: None,
            additional_properties: None,
        }
    }

    /// Creates a document around a single signing method, referenced from
    /// every signature-capable verification relationship.
    pub fn with_signing_method(context: Context, id: String, method: VerificationMethod) -> Self {
        let reference = || Some(vec![VerificationMethodType::Reference(method.id.clone())]);

        Self {
            controller: None,
            authentication: reference(),
            assertion_method: reference(),
            capability_delegation: reference(),
            capability_invocation: reference(),
            verification_method: Some(vec![method.clone()]),
            ..Self::new(context, id)
        }
    }
}

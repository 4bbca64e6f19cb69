use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{didcore::Document as DIDDocument, ldmodel::Context, methods::errors::DIDResolutionError};

pub const DID_RESOLUTION_CONTEXT: &str = "https://w3id.org/did-resolution/v1";
pub const DID_LD_JSON: &str = "application/did+ld+json";

/// DID Resolution Output.
///
/// See `<https://www.w3.org/TR/did-core/#did-resolution>`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionOutput {
    #[serde(rename = "@context")]
    pub context: Context,
    // See https://www.w3.org/TR/did-core/#dfn-diddocument
    pub did_document: Option<DIDDocument>,
    // See https://www.w3.org/TR/did-core/#dfn-didresolutionmetadata
    pub did_resolution_metadata: Option<DIDResolutionMetadata>,
    // See https://www.w3.org/TR/did-core/#dfn-diddocumentmetadata
    pub did_document_metadata: Option<DIDDocumentMetadata>,
    // Dynamic properties
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(flatten)]
    pub additional_properties: Option<HashMap<String, Value>>,
}

/// DID Resolution Metadata.
///
/// See `<https://www.w3.org/TR/did-core/#did-resolution-metadata>`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DIDResolutionMetadata {
    // See https://www.w3.org/TR/did-spec-registries/#error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<DIDResolutionError>,
    // See https://www.w3.org/TR/did-spec-registries/#contenttype
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// DID Document Metadata.
///
/// See `<https://www.w3.org/TR/did-core/#did-document-metadata>`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DIDDocumentMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deactivated: Option<bool>,
    // Dynamic properties
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(flatten)]
    pub additional_properties: Option<HashMap<String, Value>>,
}

impl ResolutionOutput {
    /// Successful resolution of `document`.
    pub fn from_document(document: DIDDocument) -> Self {
        Self {
            context: Context::SingleString(DID_RESOLUTION_CONTEXT.to_string()),
            did_document: Some(document),
            did_resolution_metadata: Some(DIDResolutionMetadata {
                error: None,
                content_type: Some(DID_LD_JSON.to_string()),
            }),
            did_document_metadata: Some(DIDDocumentMetadata::default()),
            additional_properties: None,
        }
    }

    /// Failed resolution reporting `error`.
    pub fn from_error(error: DIDResolutionError) -> Self {
        Self {
            context: Context::SingleString(DID_RESOLUTION_CONTEXT.to_string()),
            did_document: None,
            did_resolution_metadata: Some(DIDResolutionMetadata {
                error: Some(error),
                content_type: None,
            }),
            did_document_metadata: None,
            additional_properties: None,
        }
    }

    /// The resolved document, or the error reported in the resolution metadata.
    pub fn into_document(self) -> Result<DIDDocument, DIDResolutionError> {
        if let Some(error) = self.did_resolution_metadata.and_then(|metadata| metadata.error) {
            return Err(error);
        }

        self.did_document.ok_or(DIDResolutionError::NotFound)
    }
}

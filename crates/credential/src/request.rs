use serde_json::Value;

/// What to sign: a credential document, or the identifier of one held by the reader.
#[derive(Debug, Clone, PartialEq)]
pub enum SigningRequest {
    Identifier(String),
    Document(Value),
}

impl SigningRequest {
    /// Interprets a raw payload.
    ///
    /// A payload holding a single JSON string is an identifier; any other
    /// JSON value is the credential itself.
    pub fn from_bytes(payload: &[u8]) -> Result<Self, serde_json::Error> {
        Ok(match serde_json::from_slice(payload)? {
            Value::String(id) => SigningRequest::Identifier(id),
            document => SigningRequest::Document(document),
        })
    }
}

impl From<Value> for SigningRequest {
    fn from(value: Value) -> Self {
        match value {
            Value::String(id) => SigningRequest::Identifier(id),
            document => SigningRequest::Document(document),
        }
    }
}

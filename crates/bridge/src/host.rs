//! Values and errors as seen by the host.

use credential::Category;
use did_utils::methods::DIDResolutionError;
use serde_json::{Map, Value};

/// A value handed to or received from the host.
pub type HostValue = Value;

#[derive(thiserror::Error, Debug, Copy, Clone, Eq, PartialEq)]
pub enum HostErrorKind {
    /// Arguments could not be adapted; nothing was dispatched.
    #[error("invalid argument")]
    InvalidArgument,
    #[error("invalid input")]
    Input,
    #[error("lookup failed")]
    Lookup,
    #[error("not supported")]
    Policy,
    #[error("operation failed")]
    Operational,
    /// The worker panicked or failed in an unexpected way.
    #[error("internal error")]
    Internal,
}

/// Error delivered to the host, either synchronously or by rejecting a promise.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct HostError {
    pub kind: HostErrorKind,
    pub message: String,
}

impl HostError {
    pub fn new(kind: HostErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(HostErrorKind::InvalidArgument, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(HostErrorKind::Internal, message)
    }

    /// Classifies the failure of a bridged operation.
    ///
    /// Signer errors keep their phase message and map their category onto a
    /// kind. A [`HostError`] raised by the operation itself is passed through.
    pub fn from_report(report: &eyre::Report) -> Self {
        if let Some(err) = report.chain().find_map(|cause| cause.downcast_ref::<HostError>()) {
            return err.clone();
        }

        if let Some(err) = report.chain().find_map(|cause| cause.downcast_ref::<credential::Error>()) {
            let kind = match err.category() {
                Category::Input => HostErrorKind::Input,
                Category::Lookup => HostErrorKind::Lookup,
                Category::Policy => HostErrorKind::Policy,
                Category::Operational => HostErrorKind::Operational,
            };
            return Self::new(kind, err.to_string());
        }

        if let Some(err) = report.chain().find_map(|cause| cause.downcast_ref::<DIDResolutionError>()) {
            let kind = match err {
                DIDResolutionError::NotFound | DIDResolutionError::MethodNotSupported => HostErrorKind::Lookup,
                DIDResolutionError::InternalError => HostErrorKind::Internal,
                _ => HostErrorKind::Input,
            };
            return Self::new(kind, format!("{report:#}"));
        }

        Self::internal(format!("{report:#}"))
    }
}

/// Arguments of a bridged call, passed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedArgs(Map<String, Value>);

impl NamedArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the arguments object the host passed.
    pub fn from_value(value: Value) -> Result<Self, HostError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            _ => Err(HostError::invalid_argument("arguments must be an object of named arguments")),
        }
    }

    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.0.insert(name.to_string(), value.into());
        self
    }

    /// The argument `name`, treating an explicit `null` as absent.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|value| !value.is_null())
    }

    pub fn require(&self, name: &str) -> Result<&Value, HostError> {
        self.get(name)
            .ok_or_else(|| HostError::invalid_argument(format!("missing required argument {name}")))
    }

    pub fn string(&self, name: &str) -> Result<String, HostError> {
        self.optional_string(name)?
            .ok_or_else(|| HostError::invalid_argument(format!("missing required argument {name}")))
    }

    pub fn optional_string(&self, name: &str) -> Result<Option<String>, HostError> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::String(value)) => Ok(Some(value.clone())),
            Some(_) => Err(HostError::invalid_argument(format!("argument {name} must be a string"))),
        }
    }

    /// An argument carrying a JSON document, either as an object or as JSON text.
    pub fn document(&self, name: &str) -> Result<Value, HostError> {
        match self.require(name)? {
            Value::String(text) => serde_json::from_str(text)
                .map_err(|e| HostError::invalid_argument(format!("argument {name} is not valid JSON: {e}"))),
            value => Ok(value.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use credential::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_named_arguments() {
        let args = NamedArgs::from_value(json!({
            "did": "did:key:z6Mk",
            "pin": null,
            "count": 3,
            "didDoc": "{\"id\":\"did:key:z6Mk\"}"
        }))
        .unwrap();

        assert_eq!(args.string("did").unwrap(), "did:key:z6Mk");
        assert_eq!(args.optional_string("pin").unwrap(), None);
        assert_eq!(args.string("count").unwrap_err().kind, HostErrorKind::InvalidArgument);
        assert_eq!(args.string("keyID").unwrap_err().message, "missing required argument keyID");
        assert_eq!(args.document("didDoc").unwrap(), json!({ "id": "did:key:z6Mk" }));

        assert!(NamedArgs::from_value(json!(["did"])).is_err());
        assert_eq!(NamedArgs::from_value(Value::Null).unwrap(), NamedArgs::new());
    }

    #[test]
    fn test_reports_are_classified() {
        let signer_error = credential::Signer::builder().build().unwrap_err();
        assert_eq!(signer_error.kind(), ErrorKind::MissingCollaborator);

        let err = HostError::from_report(&eyre::Report::new(signer_error));
        assert_eq!(err.kind, HostErrorKind::Input);
        assert_eq!(err.message, "constructing signer: credential reader is missing");

        let err = HostError::from_report(
            &eyre::Report::new(DIDResolutionError::UnsupportedPublicKeyType).wrap_err("creating did:jwk DID Document"),
        );
        assert_eq!(err.kind, HostErrorKind::Input);
        assert_eq!(err.message, "creating did:jwk DID Document: unsupportedPublicKeyType");

        let err = HostError::from_report(&eyre::Report::new(HostError::new(HostErrorKind::Policy, "no")));
        assert_eq!(err, HostError::new(HostErrorKind::Policy, "no"));

        assert_eq!(HostError::from_report(&eyre::eyre!("boom")).kind, HostErrorKind::Internal);
    }
}

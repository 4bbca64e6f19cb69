use core::fmt::{Debug, Display};
use std::error::Error as StdError;

/// Kind of error that can occur while issuing or verifying a credential.
///
/// The display text of a kind names the phase that failed.
#[derive(thiserror::Error, Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorKind {
    /// A collaborator was not supplied when building the signer.
    #[error("constructing signer")]
    MissingCollaborator,
    /// The credential reader failed to return the credential named by an identifier.
    #[error("retrieving credential by ID")]
    RetrieveCredential,
    /// The payload is not a well-formed, signable credential.
    #[error("parsing input credential")]
    ParseCredential,
    /// The key reference is not a `<DID>#<fragment>` string.
    #[error("parsing key reference")]
    ParseKeyReference,
    /// The signer DID could not be resolved into a consistent DID document.
    #[error("resolving signer DID")]
    ResolveDid,
    /// The resolved DID document has no method with the referenced fragment.
    #[error("verification method not found")]
    VerificationMethodNotFound,
    /// No proof suite is known for the verification method's key type.
    #[error("selecting proof suite")]
    UnsupportedKeyType,
    /// The crypto collaborator or the signing input construction failed.
    #[error("signing credential")]
    Sign,
    /// A proof did not verify.
    #[error("verifying credential")]
    Verify,
}

/// Coarse origin of an error, as reported to hosts.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Category {
    /// The caller supplied something malformed.
    Input,
    /// Something the caller referred to could not be found.
    Lookup,
    /// The request is well-formed but not supported.
    Policy,
    /// A collaborator failed while doing its work.
    Operational,
}

impl ErrorKind {
    pub fn category(&self) -> Category {
        match self {
            ErrorKind::MissingCollaborator | ErrorKind::ParseCredential | ErrorKind::ParseKeyReference => {
                Category::Input
            }
            ErrorKind::RetrieveCredential | ErrorKind::ResolveDid | ErrorKind::VerificationMethodNotFound => {
                Category::Lookup
            }
            ErrorKind::UnsupportedKeyType => Category::Policy,
            ErrorKind::Sign | ErrorKind::Verify => Category::Operational,
        }
    }
}

/// Represents all possible errors of the signer.
///
/// The underlying cause is kept, so collaborator errors can be recovered
/// with [`Error::downcast_ref`].
pub struct Error {
    kind: ErrorKind,
    source: eyre::Report,
}

impl Error {
    /// Returns the kind of the error that occurred.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn category(&self) -> Category {
        self.kind.category()
    }

    /// Returns the lowest level error that caused this error.
    pub fn root_cause(&self) -> &(dyn StdError + 'static) {
        self.source.root_cause()
    }

    /// Returns the context of the error.
    pub fn context(&self) -> &(dyn StdError) {
        self.source.as_ref()
    }

    /// Looks for a cause of type `E` anywhere in the error chain.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: StdError + Send + Sync + 'static,
    {
        self.source
            .downcast_ref::<E>()
            .or_else(|| self.source.chain().find_map(|cause| cause.downcast_ref::<E>()))
    }

    /// Tells whether a cause of type `E` is found in the error chain.
    pub fn is<E>(&self) -> bool
    where
        E: StdError + Send + Sync + 'static,
    {
        self.downcast_ref::<E>().is_some()
    }

    pub(crate) fn new<E>(kind: ErrorKind, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Error {
            kind,
            source: eyre::Report::new(source),
        }
    }

    pub(crate) fn msg<M>(kind: ErrorKind, msg: M) -> Self
    where
        M: Display + Debug + Send + Sync + 'static,
    {
        Error {
            kind,
            source: eyre::Report::msg(msg),
        }
    }

    /// Wraps an error reported by a collaborator, keeping it intact.
    pub(crate) fn wrap(kind: ErrorKind, source: eyre::Report) -> Self {
        Error { kind, source }
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("context", &self.context())
            .field("source", &self.root_cause())
            .finish()
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {:#}", self.kind, self.source)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.source.as_ref())
    }
}

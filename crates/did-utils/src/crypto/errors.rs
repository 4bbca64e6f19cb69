/// The set of errors that can occur during key operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Can not retrieve signature
    #[error("can not retrieve signature")]
    CanNotRetrieveSignature,
    /// Invalid curve
    #[error("invalid curve")]
    InvalidCurve,
    /// Invalid key length
    #[error("invalid key length")]
    InvalidKeyLength,
    /// Invalid secret key
    #[error("invalid secret key")]
    InvalidSecretKey,
    /// Invalid seed
    #[error("invalid seed")]
    InvalidSeed,
    /// Invalid public key
    #[error("invalid public key")]
    InvalidPublicKey,
    /// Error while signing
    #[error("error while signing")]
    SignatureError,
    /// Error while verifying
    #[error("signature does not verify")]
    VerificationError,
}

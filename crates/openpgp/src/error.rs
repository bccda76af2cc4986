//! Decoding errors.

use thiserror::Error;

/// Result type for decoding operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Reasons an input cannot be turned into a public key entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Armor, packet framing or key material rejected by the OpenPGP parser.
    #[error("invalid OpenPGP data: {0}")]
    Parse(String),

    /// Stored key content is not valid base64.
    #[error("invalid base64 in key data: {0}")]
    InvalidBase64(String),

    /// Stored key content holds some other packet.
    #[error("not a public key packet")]
    NotAKeyPacket,

    /// A key expiration time that does not fit a timestamp.
    #[error("key expiration time out of range")]
    ExpiryOutOfRange,

    /// The input holds no public key.
    #[error("no public key found")]
    NoKeys,
}

impl From<pgp::errors::Error> for DecodeError {
    fn from(err: pgp::errors::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

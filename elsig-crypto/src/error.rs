//! Error taxonomy for parameter, key, digest and randomness failures.
//!
//! A signature that fails to verify is not an error; `verify` reports it as `false`.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("invalid domain parameters: {0}")]
    InvalidParameters(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("invalid digest: {0}")]
    InvalidDigest(String),

    #[error("random source exhausted: {0}")]
    RngExhausted(String),

    #[error("encoding error: {0}")]
    Encoding(String),
}

impl SignatureError {
    pub fn parameters(message: impl Into<String>) -> Self {
        SignatureError::InvalidParameters(message.into())
    }

    pub fn key(message: impl Into<String>) -> Self {
        SignatureError::InvalidKey(message.into())
    }

    pub fn digest(message: impl Into<String>) -> Self {
        SignatureError::InvalidDigest(message.into())
    }

    pub fn rng(message: impl Into<String>) -> Self {
        SignatureError::RngExhausted(message.into())
    }

    pub fn encoding(message: impl Into<String>) -> Self {
        SignatureError::Encoding(message.into())
    }
}

impl From<rand::Error> for SignatureError {
    fn from(err: rand::Error) -> Self {
        SignatureError::RngExhausted(err.to_string())
    }
}

impl From<hex::FromHexError> for SignatureError {
    fn from(err: hex::FromHexError) -> Self {
        SignatureError::Encoding(format!("invalid hex: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, SignatureError>;

// RSA Errors
// Error type shared by the arithmetic, key generation and encoding layers

use std::string::FromUtf8Error;

/// Errors that can occur during RSA operations.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("modulus must be positive")]
    InvalidModulus,

    #[error("no modular inverse exists: gcd(a, m) != 1")]
    NoInverseExists,

    #[error("key generation failed: {0}")]
    KeyGenerationError(String),

    #[error("integer does not decode to valid UTF-8: {0}")]
    DecodeError(#[from] FromUtf8Error),

    #[error("value is outside the range [0, n)")]
    RangeError,

    #[error("invalid bit length: must be at least {min} bits, got {actual}")]
    InvalidBitLength { min: u64, actual: u64 },
}

pub type Result<T> = std::result::Result<T, Error>;

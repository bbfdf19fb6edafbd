use thiserror::Error;

/// Failure modes of the cryptographic layer.
///
/// Messages are fixed strings; the only variable data is byte lengths, which
/// are public protocol constants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("server identity not initialized")]
    NotInitialized,

    /// The OS entropy source is unusable. There is no fallback: key
    /// generation refuses to proceed rather than degrade to weak randomness.
    #[error("key material unavailable")]
    KeyMaterialUnavailable,

    #[error("invalid KEM ciphertext: expected {expected} bytes, got {actual}")]
    InvalidCiphertext { expected: usize, actual: usize },

    #[error("invalid KEM public key: expected {expected} bytes, got {actual}")]
    InvalidPublicKey { expected: usize, actual: usize },

    #[error("encryption failed")]
    Encryption,

    /// Tag verification failed. Wrong key, tampered ciphertext and mismatched
    /// nonce all surface here; callers are never told which.
    #[error("authentication failed")]
    AuthenticationFailure,
}

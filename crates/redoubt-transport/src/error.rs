use redoubt_crypto::CryptoError;
use thiserror::Error;

/// Failure signals surfaced to the request layer.
///
/// Each variant is a distinct signal the caller can act on; none carries
/// internal cryptographic diagnostics. Nothing is retried inside the core —
/// redoing a handshake is always the caller's decision.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    /// Server startup has not completed key generation yet. Retry after
    /// initialization.
    #[error("server identity not initialized")]
    NotInitialized,

    /// Malformed or wrong-length handshake ciphertext. The client must retry
    /// with a fresh encapsulation; no session state was changed.
    #[error("invalid handshake ciphertext")]
    InvalidCiphertext,

    /// A protected payload arrived before any successful handshake for this
    /// identity. The client must perform the handshake first.
    #[error("no session key established; perform the handshake first")]
    NoSessionKey,

    /// Payload rejected. Wrong key, tampering and malformed envelopes all
    /// surface here; the cause is deliberately not distinguished.
    #[error("payload authentication failed")]
    AuthenticationFailure,

    /// The cryptographic backend refused to produce key material. Fatal;
    /// never downgraded to weaker randomness.
    #[error("key material unavailable")]
    KeyMaterialUnavailable,
}

impl From<CryptoError> for TransportError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::NotInitialized => Self::NotInitialized,
            CryptoError::KeyMaterialUnavailable => Self::KeyMaterialUnavailable,
            CryptoError::InvalidCiphertext { .. } | CryptoError::InvalidPublicKey { .. } => {
                Self::InvalidCiphertext
            }
            // Both cipher failure modes collapse into one signal so the
            // error surface cannot act as a decryption oracle.
            CryptoError::Encryption | CryptoError::AuthenticationFailure => {
                Self::AuthenticationFailure
            }
        }
    }
}

//! Cryptographic core of the redoubt transport layer.
//!
//! Post-quantum KEM identity (ML-KEM-512), session key derivation
//! (HKDF-SHA256) and authenticated payload encryption (AES-256-GCM).
//! The stateful handshake protocol built on top lives in
//! `redoubt-transport`.

pub mod encrypt;
pub mod error;
pub mod kdf;
pub mod kem;

pub use error::CryptoError;
pub use kdf::TransportKey;
pub use kem::KemIdentity;

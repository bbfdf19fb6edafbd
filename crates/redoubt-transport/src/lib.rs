//! Post-quantum transport session layer.
//!
//! Binds the cryptographic leaves from `redoubt-crypto` into the stateful
//! protocol the request layer talks to: handshake completion, the per-user
//! session key registry, and the decrypt-or-reject payload contract.

pub mod error;
pub mod handshake;
pub mod session;

pub use error::TransportError;
pub use handshake::{HandshakeService, OpenedContent};
pub use session::{SessionKey, SessionKeyStore};

//! Session key derivation (HKDF-SHA256).

use std::fmt;

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// Context label bound into every transport session key.
///
/// This constant is part of the protocol: the client derives its copy of the
/// key with the same label, so changing it is a protocol version bump that
/// breaks interoperability with existing clients.
pub const TRANSPORT_CONTEXT: &[u8] = b"pq_transport_session";

/// A derived 32-byte transport session key.
///
/// The only way to obtain one is [`derive`]; key bytes are zeroed on drop
/// and redacted from `Debug` output.
#[derive(Clone)]
pub struct TransportKey {
    bytes: Zeroizing<[u8; 32]>,
}

impl TransportKey {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }
}

impl fmt::Debug for TransportKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TransportKey(..)")
    }
}

/// Derive a transport session key from a KEM shared secret.
///
/// HKDF-SHA256 with no salt and `context` as the info parameter. Pure and
/// deterministic: client and server run this independently on the same
/// shared secret and agree on the key without further communication.
pub fn derive(shared_secret: &[u8], context: &[u8]) -> Result<TransportKey, CryptoError> {
    let hk = Hkdf::<Sha256>::new(None, shared_secret);
    let mut okm = Zeroizing::new([0u8; 32]);
    hk.expand(context, &mut *okm)
        .map_err(|_| CryptoError::KeyMaterialUnavailable)?;
    Ok(TransportKey { bytes: okm })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let secret = [7u8; 32];
        let a = derive(&secret, TRANSPORT_CONTEXT).unwrap();
        let b = derive(&secret, TRANSPORT_CONTEXT).unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn different_secret_yields_different_key() {
        let a = derive(&[1u8; 32], TRANSPORT_CONTEXT).unwrap();
        let b = derive(&[2u8; 32], TRANSPORT_CONTEXT).unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn different_context_yields_different_key() {
        let secret = [7u8; 32];
        let a = derive(&secret, TRANSPORT_CONTEXT).unwrap();
        let b = derive(&secret, b"some_other_protocol").unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn debug_output_redacts_key_bytes() {
        let key = derive(&[9u8; 32], TRANSPORT_CONTEXT).unwrap();
        assert_eq!(format!("{:?}", key), "TransportKey(..)");
    }
}

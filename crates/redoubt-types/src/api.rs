use serde::{Deserialize, Serialize};

// -- Handshake --

/// Published server KEM identity. No authentication required to fetch it;
/// the public key is not secret.
#[derive(Debug, Clone, Serialize)]
pub struct PublicKeyResponse {
    pub algorithm: String,
    /// Base64-encoded encapsulation key.
    pub public_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HandshakeRequest {
    /// Base64-encoded KEM ciphertext produced by the client's encapsulation.
    pub ciphertext: String,
}

#[derive(Debug, Serialize)]
pub struct HandshakeResponse {
    pub status: String,
    pub message: String,
}

// -- Protected payloads --

/// An AEAD-protected payload. The ciphertext carries the authentication tag
/// appended; the identity of the session key travels out-of-band with the
/// authenticated request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedPayload {
    /// Base64-encoded 12-byte nonce.
    pub nonce: String,
    /// Base64-encoded ciphertext with appended tag.
    pub ciphertext: String,
}

/// Inbound message/document content: either an encrypted payload or the
/// legacy plaintext form kept for backward compatibility.
///
/// When a request carries both forms, the encrypted one wins. Plaintext
/// content bypasses the transport cipher entirely and must never be treated
/// as authenticated.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum InboundPayload {
    Encrypted { nonce: String, ciphertext: String },
    Plaintext { content: String },
}

impl InboundPayload {
    pub fn is_encrypted(&self) -> bool {
        matches!(self, Self::Encrypted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbound_payload_prefers_encrypted_form() {
        let both: InboundPayload = serde_json::from_str(
            r#"{"content":"hi","nonce":"AAAA","ciphertext":"BBBB"}"#,
        )
        .unwrap();
        assert!(both.is_encrypted());

        let plain: InboundPayload = serde_json::from_str(r#"{"content":"hi"}"#).unwrap();
        assert!(!plain.is_encrypted());
    }
}

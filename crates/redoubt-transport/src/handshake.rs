//! The handshake protocol and the decrypt-or-reject ingestion contract.
//!
//! One round trip establishes a session: the client fetches the server's
//! KEM public key, encapsulates against it, and submits the resulting
//! ciphertext; the server decapsulates, derives the session key and stores
//! it under the caller's identity. From then on either side protects
//! payloads with the shared key independently.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use redoubt_crypto::{encrypt, kdf, kem, KemIdentity};
use redoubt_types::api::{InboundPayload, PublicKeyResponse};

use crate::error::TransportError;
use crate::session::SessionKeyStore;

/// Content recovered from an inbound payload.
///
/// `authenticated` is true only when the content passed through the
/// transport cipher; plaintext-fallback content carries no integrity
/// guarantee and must not be trusted as authenticated.
#[derive(Debug)]
pub struct OpenedContent {
    pub text: String,
    pub authenticated: bool,
}

/// Orchestrates the KEM identity, key derivation and the session key store.
///
/// Cheap to clone; all clones share the server identity and the injected
/// store. Per identity the protocol has two states — no session, or
/// established — and a single round trip moves between them.
#[derive(Clone)]
pub struct HandshakeService {
    inner: Arc<ServiceInner>,
}

struct ServiceInner {
    identity: RwLock<Option<Arc<KemIdentity>>>,
    sessions: SessionKeyStore,
}

impl HandshakeService {
    pub fn new(sessions: SessionKeyStore) -> Self {
        Self {
            inner: Arc::new(ServiceInner {
                identity: RwLock::new(None),
                sessions,
            }),
        }
    }

    /// Generate and install the server KEM identity.
    ///
    /// Must complete at startup before any handshake or public-key request
    /// is served; until then every operation answers `NotInitialized`.
    /// Calling it again rotates the keypair: existing session keys stay in
    /// the store but clients holding them will fail at decryption, not at
    /// handshake time.
    pub async fn initialize(&self) -> Result<(), TransportError> {
        let identity = KemIdentity::generate()?;

        let mut slot = self.inner.identity.write().await;
        if slot.is_some() {
            warn!("regenerating server KEM identity; existing session keys are now stale");
        }
        *slot = Some(Arc::new(identity));

        info!(algorithm = kem::ALGORITHM_ID, "generated server KEM keypair");
        Ok(())
    }

    /// The published server identity: algorithm id plus base64 public key.
    pub async fn public_key(&self) -> Result<PublicKeyResponse, TransportError> {
        let identity = self.identity().await?;
        Ok(PublicKeyResponse {
            algorithm: kem::ALGORITHM_ID.to_string(),
            public_key: B64.encode(identity.public_key()),
        })
    }

    /// Complete a handshake for an authenticated identity.
    ///
    /// Decapsulates the client's KEM ciphertext, derives the session key and
    /// stores it, replacing any previous key for the identity. On failure no
    /// session state changes: a prior established key stays valid.
    pub async fn complete_handshake(
        &self,
        user_id: Uuid,
        kem_ciphertext: &[u8],
    ) -> Result<(), TransportError> {
        let identity = self.identity().await?;

        let shared_secret = identity.decapsulate(kem_ciphertext).map_err(|err| {
            warn!(%user_id, error = %err, "handshake rejected");
            TransportError::from(err)
        })?;

        let key = kdf::derive(&*shared_secret, kdf::TRANSPORT_CONTEXT)?;
        self.inner.sessions.store(user_id, key).await;

        info!(%user_id, "established transport session");
        Ok(())
    }

    /// Decrypt a protected payload for an identity with an established
    /// session.
    ///
    /// `NoSessionKey` tells the caller explicitly to perform the handshake
    /// first; it is never conflated with a decryption failure.
    pub async fn decrypt_incoming(
        &self,
        user_id: Uuid,
        nonce: &[u8],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, TransportError> {
        let session = self
            .inner
            .sessions
            .fetch(user_id)
            .await
            .ok_or(TransportError::NoSessionKey)?;

        Ok(encrypt::decrypt(session.key(), nonce, ciphertext)?)
    }

    /// Protect a server-to-client payload under the identity's session key.
    pub async fn encrypt_outgoing(
        &self,
        user_id: Uuid,
        plaintext: &[u8],
    ) -> Result<([u8; encrypt::NONCE_LEN], Vec<u8>), TransportError> {
        let session = self
            .inner
            .sessions
            .fetch(user_id)
            .await
            .ok_or(TransportError::NoSessionKey)?;

        Ok(encrypt::encrypt(session.key(), plaintext)?)
    }

    /// Open inbound message/document content.
    ///
    /// Encrypted payloads are base64-decoded, decrypted and UTF-8 decoded;
    /// every failure along that path folds into the single
    /// `AuthenticationFailure` signal. The plaintext fallback passes through
    /// unmodified, flagged unauthenticated.
    pub async fn open_incoming(
        &self,
        user_id: Uuid,
        payload: &InboundPayload,
    ) -> Result<OpenedContent, TransportError> {
        match payload {
            InboundPayload::Encrypted { nonce, ciphertext } => {
                let nonce = B64
                    .decode(nonce)
                    .map_err(|_| TransportError::AuthenticationFailure)?;
                let ciphertext = B64
                    .decode(ciphertext)
                    .map_err(|_| TransportError::AuthenticationFailure)?;

                let plaintext = self.decrypt_incoming(user_id, &nonce, &ciphertext).await?;
                let text = String::from_utf8(plaintext)
                    .map_err(|_| TransportError::AuthenticationFailure)?;

                Ok(OpenedContent {
                    text,
                    authenticated: true,
                })
            }
            InboundPayload::Plaintext { content } => Ok(OpenedContent {
                text: content.clone(),
                authenticated: false,
            }),
        }
    }

    /// Drop an identity's session (logout).
    pub async fn clear_session(&self, user_id: Uuid) {
        self.inner.sessions.clear(user_id).await;
    }

    pub async fn has_session(&self, user_id: Uuid) -> bool {
        self.inner.sessions.contains(user_id).await
    }

    /// The injected session key store, shared with the host application.
    pub fn sessions(&self) -> &SessionKeyStore {
        &self.inner.sessions
    }

    async fn identity(&self) -> Result<Arc<KemIdentity>, TransportError> {
        self.inner
            .identity
            .read()
            .await
            .clone()
            .ok_or(TransportError::NotInitialized)
    }
}

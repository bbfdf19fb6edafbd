use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use redoubt_crypto::TransportKey;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// A live transport session for one authenticated identity.
///
/// Only ever constructed by [`SessionKeyStore::store`] from a key that came
/// out of the derivation step; there is one per identity at most, and a new
/// handshake replaces it wholesale.
#[derive(Debug, Clone)]
pub struct SessionKey {
    key: TransportKey,
    established_at: DateTime<Utc>,
}

impl SessionKey {
    pub fn key(&self) -> &TransportKey {
        &self.key
    }

    pub fn established_at(&self) -> DateTime<Utc> {
        self.established_at
    }
}

/// Process-wide registry of session keys, keyed by authenticated identity.
///
/// Cheap to clone; all clones share the same map. The whole-store lock keeps
/// replace atomic: a concurrent reader observes either the old key or the
/// new one, never a torn value. Deployments running more than one process
/// must swap this handle for one backed by a shared external store with the
/// same replace guarantee.
#[derive(Clone)]
pub struct SessionKeyStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    keys: RwLock<HashMap<Uuid, SessionKey>>,
}

impl SessionKeyStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(StoreInner {
                keys: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Insert or atomically replace the session key for an identity.
    pub async fn store(&self, user_id: Uuid, key: TransportKey) {
        let entry = SessionKey {
            key,
            established_at: Utc::now(),
        };
        self.inner.keys.write().await.insert(user_id, entry);
        debug!(%user_id, "stored transport session key");
    }

    /// Fetch the current session key. Absence is a normal outcome, not an
    /// error: it means this identity has not completed a handshake.
    pub async fn fetch(&self, user_id: Uuid) -> Option<SessionKey> {
        self.inner.keys.read().await.get(&user_id).cloned()
    }

    /// Drop an identity's session key (logout path).
    pub async fn clear(&self, user_id: Uuid) {
        if self.inner.keys.write().await.remove(&user_id).is_some() {
            debug!(%user_id, "cleared transport session key");
        }
    }

    pub async fn contains(&self, user_id: Uuid) -> bool {
        self.inner.keys.read().await.contains_key(&user_id)
    }
}

impl Default for SessionKeyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redoubt_crypto::kdf::{self, TRANSPORT_CONTEXT};

    fn key(seed: u8) -> TransportKey {
        kdf::derive(&[seed; 32], TRANSPORT_CONTEXT).unwrap()
    }

    #[tokio::test]
    async fn fetch_without_store_is_absent() {
        let store = SessionKeyStore::new();
        assert!(store.fetch(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn store_fetch_clear_lifecycle() {
        let store = SessionKeyStore::new();
        let user = Uuid::new_v4();

        store.store(user, key(1)).await;
        assert!(store.contains(user).await);

        let fetched = store.fetch(user).await.unwrap();
        assert_eq!(fetched.key().as_bytes(), key(1).as_bytes());

        store.clear(user).await;
        assert!(!store.contains(user).await);
        assert!(store.fetch(user).await.is_none());
    }

    #[tokio::test]
    async fn second_store_replaces_first() {
        let store = SessionKeyStore::new();
        let user = Uuid::new_v4();

        store.store(user, key(1)).await;
        store.store(user, key(2)).await;

        let fetched = store.fetch(user).await.unwrap();
        assert_eq!(fetched.key().as_bytes(), key(2).as_bytes());
        assert_ne!(fetched.key().as_bytes(), key(1).as_bytes());
    }

    #[tokio::test]
    async fn identities_are_independent() {
        let store = SessionKeyStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        store.store(alice, key(1)).await;
        store.store(bob, key(2)).await;
        store.clear(alice).await;

        assert!(store.fetch(alice).await.is_none());
        assert_eq!(
            store.fetch(bob).await.unwrap().key().as_bytes(),
            key(2).as_bytes()
        );
    }
}

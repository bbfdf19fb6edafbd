//! Self-check binary: proves the deployed build performs real post-quantum
//! key establishment and authenticated encryption, end to end.
//!
//! Run it after a deployment or toolchain change:
//!
//! ```text
//! cargo run -p redoubt-verify
//! ```
//!
//! Exits non-zero if any check fails.

use anyhow::{Context, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use tracing::{error, info};
use uuid::Uuid;

use redoubt_crypto::{encrypt, kdf, kem};
use redoubt_transport::{HandshakeService, SessionKeyStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "redoubt=info".into()),
        )
        .init();

    let checks: [(&str, anyhow::Result<()>); 4] = [
        ("kem agreement", check_kem()),
        ("key derivation", check_kdf()),
        ("transport cipher", check_cipher()),
        ("handshake service", check_service().await),
    ];

    let mut all_passed = true;
    for (name, result) in &checks {
        match result {
            Ok(()) => info!(check = name, "PASS"),
            Err(err) => {
                all_passed = false;
                error!(check = name, error = %err, "FAIL");
            }
        }
    }

    if !all_passed {
        bail!("verification failed; this build must not serve handshakes");
    }

    info!("all checks passed; transport security is operational");
    Ok(())
}

/// Keypair generation, sizes, and encapsulation/decapsulation agreement.
fn check_kem() -> anyhow::Result<()> {
    let identity = kem::KemIdentity::generate().context("keypair generation")?;

    if identity.public_key().len() != kem::PUBLIC_KEY_LEN {
        bail!("public key is {} bytes", identity.public_key().len());
    }

    let (ciphertext, client_secret) =
        kem::encapsulate(identity.public_key()).context("client encapsulation")?;
    let server_secret = identity.decapsulate(&ciphertext).context("server decapsulation")?;

    if *client_secret != *server_secret {
        bail!("shared secrets do not match");
    }
    info!(
        algorithm = kem::ALGORITHM_ID,
        public_key_len = kem::PUBLIC_KEY_LEN,
        ciphertext_len = kem::CIPHERTEXT_LEN,
        "kem agreement holds"
    );
    Ok(())
}

/// Derivation is deterministic and input-sensitive.
fn check_kdf() -> anyhow::Result<()> {
    let secret = [0x42u8; 32];
    let a = kdf::derive(&secret, kdf::TRANSPORT_CONTEXT)?;
    let b = kdf::derive(&secret, kdf::TRANSPORT_CONTEXT)?;
    if a.as_bytes() != b.as_bytes() {
        bail!("derivation is not deterministic");
    }

    let c = kdf::derive(&[0x43u8; 32], kdf::TRANSPORT_CONTEXT)?;
    if a.as_bytes() == c.as_bytes() {
        bail!("distinct secrets derived the same key");
    }
    Ok(())
}

/// Round-trip and tamper rejection under a derived key.
fn check_cipher() -> anyhow::Result<()> {
    let key = kdf::derive(&[0x42u8; 32], kdf::TRANSPORT_CONTEXT)?;

    let message = b"Hello, post-quantum world!";
    let (nonce, ciphertext) = encrypt::encrypt(&key, message)?;
    let decrypted = encrypt::decrypt(&key, &nonce, &ciphertext)?;
    if decrypted != message {
        bail!("round-trip altered the payload");
    }

    let mut tampered = ciphertext.clone();
    tampered[0] ^= 0x01;
    if encrypt::decrypt(&key, &nonce, &tampered).is_ok() {
        bail!("tampered ciphertext was accepted");
    }
    Ok(())
}

/// The full protocol path a real client walks.
async fn check_service() -> anyhow::Result<()> {
    let service = HandshakeService::new(SessionKeyStore::new());
    service.initialize().await.context("identity generation")?;

    let user = Uuid::new_v4();
    let response = service.public_key().await.context("public key publication")?;
    let public_key = B64.decode(&response.public_key).context("public key encoding")?;

    let (ciphertext, shared_secret) = kem::encapsulate(&public_key)?;
    service
        .complete_handshake(user, &ciphertext)
        .await
        .context("handshake completion")?;

    let client_key = kdf::derive(&*shared_secret, kdf::TRANSPORT_CONTEXT)?;
    let (nonce, payload) = encrypt::encrypt(&client_key, b"hello")?;
    let plaintext = service
        .decrypt_incoming(user, &nonce, &payload)
        .await
        .context("protected payload ingestion")?;

    if plaintext != b"hello" {
        bail!("ingested payload does not match");
    }
    Ok(())
}

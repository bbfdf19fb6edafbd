//! ML-KEM-512 server identity (FIPS 203, NIST security level 1).
//!
//! The server holds one keypair for its process lifetime; clients encapsulate
//! against the public key and the server decapsulates their ciphertext to
//! recover the shared secret that seeds the transport session key.

use kem::{Decapsulate, Encapsulate};
use ml_kem::kem::{DecapsulationKey, EncapsulationKey};
use ml_kem::{EncodedSizeUser, KemCore, MlKem512, MlKem512Params};
use rand_core::{OsRng, RngCore};
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// Algorithm identifier published alongside the public key.
pub const ALGORITHM_ID: &str = "ML-KEM-512";

/// Encapsulation (public) key size in bytes.
pub const PUBLIC_KEY_LEN: usize = 800;
/// Decapsulation (secret) key size in bytes.
pub const SECRET_KEY_LEN: usize = 1632;
/// KEM ciphertext size in bytes.
pub const CIPHERTEXT_LEN: usize = 768;
/// Shared secret size in bytes.
pub const SHARED_SECRET_LEN: usize = 32;

/// The server's KEM keypair.
///
/// The decapsulation key never leaves this struct and is zeroed on drop.
pub struct KemIdentity {
    decapsulation_key_bytes: Zeroizing<[u8; SECRET_KEY_LEN]>,
    encapsulation_key_bytes: [u8; PUBLIC_KEY_LEN],
}

impl KemIdentity {
    /// Generate a fresh keypair from the OS RNG.
    ///
    /// Fails closed with `KeyMaterialUnavailable` if the entropy source is
    /// unusable; there is no non-cryptographic fallback.
    pub fn generate() -> Result<Self, CryptoError> {
        let mut rng = OsRng;

        // Probe the entropy source before committing to key generation.
        let mut probe = [0u8; 8];
        rng.try_fill_bytes(&mut probe)
            .map_err(|_| CryptoError::KeyMaterialUnavailable)?;

        let (decapsulation_key, encapsulation_key) = MlKem512::generate(&mut rng);

        let mut dk_bytes = Zeroizing::new([0u8; SECRET_KEY_LEN]);
        let mut ek_bytes = [0u8; PUBLIC_KEY_LEN];
        dk_bytes.copy_from_slice(&decapsulation_key.as_bytes()[..]);
        ek_bytes.copy_from_slice(&encapsulation_key.as_bytes()[..]);

        Ok(Self {
            decapsulation_key_bytes: dk_bytes,
            encapsulation_key_bytes: ek_bytes,
        })
    }

    /// The public (encapsulation) key, safe to hand to any client.
    pub fn public_key(&self) -> &[u8] {
        &self.encapsulation_key_bytes
    }

    /// Recover the shared secret from a client's KEM ciphertext.
    ///
    /// Only the length of the ciphertext is validated here. Any well-sized
    /// ciphertext decapsulates via the algorithm's implicit rejection, so a
    /// ciphertext produced against a different keypair yields a
    /// pseudorandom secret rather than a distinguishable error.
    pub fn decapsulate(
        &self,
        ciphertext: &[u8],
    ) -> Result<Zeroizing<[u8; SHARED_SECRET_LEN]>, CryptoError> {
        if ciphertext.len() != CIPHERTEXT_LEN {
            return Err(CryptoError::InvalidCiphertext {
                expected: CIPHERTEXT_LEN,
                actual: ciphertext.len(),
            });
        }

        let ct_bytes: &[u8; CIPHERTEXT_LEN] =
            ciphertext
                .try_into()
                .map_err(|_| CryptoError::InvalidCiphertext {
                    expected: CIPHERTEXT_LEN,
                    actual: ciphertext.len(),
                })?;

        let decapsulation_key = DecapsulationKey::<MlKem512Params>::from_bytes(
            &(*self.decapsulation_key_bytes).into(),
        );

        let shared_secret = decapsulation_key
            .decapsulate(&(*ct_bytes).into())
            .map_err(|_| CryptoError::InvalidCiphertext {
                expected: CIPHERTEXT_LEN,
                actual: ciphertext.len(),
            })?;

        let mut out = Zeroizing::new([0u8; SHARED_SECRET_LEN]);
        out.copy_from_slice(&shared_secret[..]);
        Ok(out)
    }
}

/// Client side of the exchange: encapsulate a fresh shared secret against a
/// server public key, producing the ciphertext to send and our copy of the
/// secret.
pub fn encapsulate(
    public_key: &[u8],
) -> Result<(Vec<u8>, Zeroizing<[u8; SHARED_SECRET_LEN]>), CryptoError> {
    if public_key.len() != PUBLIC_KEY_LEN {
        return Err(CryptoError::InvalidPublicKey {
            expected: PUBLIC_KEY_LEN,
            actual: public_key.len(),
        });
    }

    let ek_bytes: &[u8; PUBLIC_KEY_LEN] =
        public_key
            .try_into()
            .map_err(|_| CryptoError::InvalidPublicKey {
                expected: PUBLIC_KEY_LEN,
                actual: public_key.len(),
            })?;

    let encapsulation_key = EncapsulationKey::<MlKem512Params>::from_bytes(&(*ek_bytes).into());

    let mut rng = OsRng;
    let (ciphertext, shared_secret) = encapsulation_key
        .encapsulate(&mut rng)
        .map_err(|_| CryptoError::KeyMaterialUnavailable)?;

    let mut ct = vec![0u8; CIPHERTEXT_LEN];
    ct.copy_from_slice(&ciphertext[..]);

    let mut ss = Zeroizing::new([0u8; SHARED_SECRET_LEN]);
    ss.copy_from_slice(&shared_secret[..]);

    Ok((ct, ss))
}

use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, KeyInit, OsRng, rand_core::RngCore},
};

use crate::error::CryptoError;
use crate::kdf::TransportKey;

/// AES-GCM nonce size in bytes.
pub const NONCE_LEN: usize = 12;

/// Encrypt a payload with AES-256-GCM under a transport session key.
///
/// A fresh random nonce is drawn from the OS RNG on every call; callers
/// cannot supply their own. The returned ciphertext carries the
/// authentication tag appended.
pub fn encrypt(
    key: &TransportKey,
    plaintext: &[u8],
) -> Result<([u8; NONCE_LEN], Vec<u8>), CryptoError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));

    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|_| CryptoError::Encryption)?;

    Ok((nonce_bytes, ciphertext))
}

/// Decrypt and authenticate a payload.
///
/// Every failure cause — wrong nonce length, wrong key, tampered ciphertext,
/// truncated tag — surfaces as the single `AuthenticationFailure` signal, and
/// no plaintext is ever returned on failure.
pub fn decrypt(
    key: &TransportKey,
    nonce: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    if nonce.len() != NONCE_LEN {
        return Err(CryptoError::AuthenticationFailure);
    }

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));

    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| CryptoError::AuthenticationFailure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kdf::{self, TRANSPORT_CONTEXT};

    fn test_key(seed: u8) -> TransportKey {
        kdf::derive(&[seed; 32], TRANSPORT_CONTEXT).unwrap()
    }

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let key = test_key(1);
        let message = b"Hello, post-quantum world!";

        let (nonce, ciphertext) = encrypt(&key, message).unwrap();
        assert_ne!(&ciphertext, message);

        let decrypted = decrypt(&key, &nonce, &ciphertext).unwrap();
        assert_eq!(decrypted, message);
    }

    #[test]
    fn empty_plaintext_roundtrip() {
        let key = test_key(2);
        let (nonce, ciphertext) = encrypt(&key, b"").unwrap();
        // Only the 16-byte tag remains.
        assert_eq!(ciphertext.len(), 16);
        assert_eq!(decrypt(&key, &nonce, &ciphertext).unwrap(), b"");
    }

    #[test]
    fn multi_kilobyte_roundtrip() {
        let key = test_key(3);
        let plaintext: Vec<u8> = (0..8192u32).map(|i| (i % 251) as u8).collect();

        let (nonce, ciphertext) = encrypt(&key, &plaintext).unwrap();
        assert_eq!(decrypt(&key, &nonce, &ciphertext).unwrap(), plaintext);
    }

    #[test]
    fn nonces_are_fresh_per_call() {
        let key = test_key(4);
        let (n1, c1) = encrypt(&key, b"same message").unwrap();
        let (n2, c2) = encrypt(&key, b"same message").unwrap();
        assert_ne!(n1, n2);
        assert_ne!(c1, c2);
    }

    #[test]
    fn wrong_key_fails() {
        let (nonce, ciphertext) = encrypt(&test_key(5), b"secret").unwrap();
        assert_eq!(
            decrypt(&test_key(6), &nonce, &ciphertext),
            Err(CryptoError::AuthenticationFailure)
        );
    }

    #[test]
    fn flipped_ciphertext_bit_fails() {
        let key = test_key(7);
        let (nonce, ciphertext) = encrypt(&key, b"integrity matters").unwrap();

        for index in [0, ciphertext.len() / 2, ciphertext.len() - 1] {
            let mut tampered = ciphertext.clone();
            tampered[index] ^= 0x01;
            assert_eq!(
                decrypt(&key, &nonce, &tampered),
                Err(CryptoError::AuthenticationFailure)
            );
        }
    }

    #[test]
    fn flipped_nonce_bit_fails() {
        let key = test_key(8);
        let (nonce, ciphertext) = encrypt(&key, b"integrity matters").unwrap();

        for index in 0..NONCE_LEN {
            let mut tampered = nonce;
            tampered[index] ^= 0x01;
            assert_eq!(
                decrypt(&key, &tampered, &ciphertext),
                Err(CryptoError::AuthenticationFailure)
            );
        }
    }

    #[test]
    fn wrong_nonce_length_fails() {
        let key = test_key(9);
        let (_, ciphertext) = encrypt(&key, b"secret").unwrap();
        assert_eq!(
            decrypt(&key, &[0u8; 11], &ciphertext),
            Err(CryptoError::AuthenticationFailure)
        );
    }
}

//! Field encryption and transaction reference generation
//!
//! Sensitive stored fields (account numbers, contact details) are
//! protected with AES-256-GCM. IV and authentication tag travel with the
//! ciphertext; decryption of anything tampered fails closed.

use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    AeadCore, Aes256Gcm, Key, Nonce,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// GCM authentication tag length in bytes
const TAG_LEN: usize = 16;

/// Crypto errors
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Encryption failed
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Ciphertext, IV, or tag failed authentication
    #[error("Integrity failure: {0}")]
    IntegrityFailure(String),

    /// Malformed hex input
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),
}

/// Result type for crypto operations
pub type Result<T> = std::result::Result<T, CryptoError>;

/// An encrypted field with its IV and authentication tag, hex encoded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedField {
    /// Ciphertext without the tag
    pub ciphertext: String,

    /// 96-bit GCM nonce
    pub iv: String,

    /// 128-bit authentication tag
    pub tag: String,
}

/// AES-256-GCM cipher for sensitive fields
pub struct FieldCipher {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for FieldCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldCipher").finish_non_exhaustive()
    }
}

impl FieldCipher {
    /// Create a cipher from a 256-bit key
    pub fn new(key: &[u8; 32]) -> Self {
        let key = Key::<Aes256Gcm>::from_slice(key);
        Self {
            cipher: Aes256Gcm::new(key),
        }
    }

    /// Generate a random 256-bit key
    pub fn generate_key() -> [u8; 32] {
        rand::random()
    }

    /// Encrypt a field value
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<EncryptedField> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

        let mut combined = self
            .cipher
            .encrypt(&nonce, plaintext)
            .map_err(|e| CryptoError::Encryption(e.to_string()))?;

        // aes-gcm appends the tag to the ciphertext; split it out so the
        // tag can be stored and verified as its own column
        let tag = combined.split_off(combined.len() - TAG_LEN);

        Ok(EncryptedField {
            ciphertext: hex::encode(combined),
            iv: hex::encode(nonce),
            tag: hex::encode(tag),
        })
    }

    /// Decrypt a field value
    ///
    /// Fails with `IntegrityFailure` if the ciphertext, IV, or tag was
    /// modified; corrupted plaintext is never returned.
    pub fn decrypt(&self, field: &EncryptedField) -> Result<Vec<u8>> {
        let ciphertext =
            hex::decode(&field.ciphertext).map_err(|e| CryptoError::InvalidEncoding(e.to_string()))?;
        let iv = hex::decode(&field.iv).map_err(|e| CryptoError::InvalidEncoding(e.to_string()))?;
        let tag = hex::decode(&field.tag).map_err(|e| CryptoError::InvalidEncoding(e.to_string()))?;

        if iv.len() != 12 || tag.len() != TAG_LEN {
            return Err(CryptoError::IntegrityFailure(
                "wrong IV or tag length".to_string(),
            ));
        }

        let nonce = Nonce::from_slice(&iv);
        let mut combined = ciphertext;
        combined.extend_from_slice(&tag);

        self.cipher
            .decrypt(nonce, combined.as_ref())
            .map_err(|_| CryptoError::IntegrityFailure("authentication failed".to_string()))
    }
}

/// Generate a collision-resistant transaction reference
///
/// `TXN` prefix, millisecond timestamp, and 8 random hex characters; the
/// time component keeps references sortable while the random suffix
/// prevents collisions between calls in the same millisecond.
pub fn generate_transaction_ref() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let entropy: [u8; 4] = rand::random();
    format!("TXN{}{}", millis, hex::encode(entropy).to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_round_trip() {
        let cipher = FieldCipher::new(&FieldCipher::generate_key());
        let plaintext = b"01712345678";

        let field = cipher.encrypt(plaintext).unwrap();
        let decrypted = cipher.decrypt(&field).unwrap();

        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_ciphertext_differs_per_call() {
        let cipher = FieldCipher::new(&FieldCipher::generate_key());

        let a = cipher.encrypt(b"same data").unwrap();
        let b = cipher.encrypt(b"same data").unwrap();

        // Fresh nonce each call
        assert_ne!(a.iv, b.iv);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    fn flip_first_nibble(hex_str: &str) -> String {
        let mut chars: Vec<char> = hex_str.chars().collect();
        chars[0] = if chars[0] == '0' { '1' } else { '0' };
        chars.into_iter().collect()
    }

    #[test]
    fn test_tampered_ciphertext_rejected() {
        let cipher = FieldCipher::new(&FieldCipher::generate_key());
        let mut field = cipher.encrypt(b"account 123456").unwrap();

        field.ciphertext = flip_first_nibble(&field.ciphertext);
        assert!(matches!(
            cipher.decrypt(&field),
            Err(CryptoError::IntegrityFailure(_))
        ));
    }

    #[test]
    fn test_tampered_tag_rejected() {
        let cipher = FieldCipher::new(&FieldCipher::generate_key());
        let mut field = cipher.encrypt(b"account 123456").unwrap();

        field.tag = flip_first_nibble(&field.tag);
        assert!(matches!(
            cipher.decrypt(&field),
            Err(CryptoError::IntegrityFailure(_))
        ));
    }

    #[test]
    fn test_tampered_iv_rejected() {
        let cipher = FieldCipher::new(&FieldCipher::generate_key());
        let mut field = cipher.encrypt(b"account 123456").unwrap();

        field.iv = flip_first_nibble(&field.iv);
        assert!(matches!(
            cipher.decrypt(&field),
            Err(CryptoError::IntegrityFailure(_))
        ));
    }

    #[test]
    fn test_wrong_key_rejected() {
        let cipher = FieldCipher::new(&FieldCipher::generate_key());
        let other = FieldCipher::new(&FieldCipher::generate_key());

        let field = cipher.encrypt(b"secret").unwrap();
        assert!(other.decrypt(&field).is_err());
    }

    #[test]
    fn test_transaction_refs_unique() {
        let refs: HashSet<String> = (0..1000).map(|_| generate_transaction_ref()).collect();
        assert_eq!(refs.len(), 1000);
        assert!(refs.iter().all(|r| r.starts_with("TXN")));
    }
}

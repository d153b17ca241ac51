//! Note cipher: AES-256-GCM over the raw note text, key derived from a
//! service passphrase with PBKDF2-SHA256.
//!
//! Envelope layout is base64(nonce ‖ ciphertext+tag). A fresh random nonce
//! per call makes encryption non-deterministic: repeated encryptions of the
//! same note never produce equal envelopes, so stored values cannot be
//! correlated.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::Zeroize;

use super::CryptoError;

pub const PBKDF2_ITERATIONS: u32 = 600_000;
pub const KEY_LENGTH: usize = 32; // AES-256
pub const SALT_LENGTH: usize = 32;
const NONCE_LENGTH: usize = 12;
const TAG_LENGTH: usize = 16;

/// Encryption key for notes at rest — zeroed on drop.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct NoteCipher {
    key_bytes: [u8; KEY_LENGTH],
}

impl NoteCipher {
    /// Derive from a service passphrase + salt using PBKDF2-SHA256.
    pub fn derive(passphrase: &str, salt: &[u8; SALT_LENGTH]) -> Self {
        let mut key_bytes = [0u8; KEY_LENGTH];
        pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key_bytes);
        Self { key_bytes }
    }

    /// Wrap a pre-provisioned 32-byte key.
    pub fn from_key_bytes(key_bytes: [u8; KEY_LENGTH]) -> Self {
        Self { key_bytes }
    }

    /// Encrypt a raw note for storage. Fresh random nonce per call.
    pub fn encrypt_note(&self, plaintext: &str) -> Result<String, CryptoError> {
        let key = Key::<Aes256Gcm>::from_slice(&self.key_bytes);
        let cipher = Aes256Gcm::new(key);

        let mut nonce_bytes = [0u8; NONCE_LENGTH];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| CryptoError::EncryptionFailed)?;

        let mut envelope = Vec::with_capacity(NONCE_LENGTH + ciphertext.len());
        envelope.extend_from_slice(&nonce_bytes);
        envelope.extend_from_slice(&ciphertext);
        Ok(BASE64.encode(envelope))
    }

    /// Decrypt a stored envelope back to the raw note. Rejects malformed
    /// base64, truncated envelopes, wrong keys, and tampered ciphertext.
    pub fn decrypt_note(&self, envelope: &str) -> Result<String, CryptoError> {
        let bytes = BASE64
            .decode(envelope)
            .map_err(|_| CryptoError::MalformedEnvelope)?;
        if bytes.len() < NONCE_LENGTH + TAG_LENGTH {
            return Err(CryptoError::MalformedEnvelope);
        }

        let key = Key::<Aes256Gcm>::from_slice(&self.key_bytes);
        let cipher = Aes256Gcm::new(key);
        let nonce = Nonce::from_slice(&bytes[..NONCE_LENGTH]);

        let plaintext = cipher
            .decrypt(nonce, &bytes[NONCE_LENGTH..])
            .map_err(|_| CryptoError::DecryptionFailed)?;

        String::from_utf8(plaintext).map_err(|_| CryptoError::DecryptionFailed)
    }
}

/// Generate a cryptographically random salt
pub fn generate_salt() -> [u8; SALT_LENGTH] {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cipher() -> NoteCipher {
        NoteCipher::from_key_bytes([7u8; KEY_LENGTH])
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let cipher = test_cipher();
        let note = "Paciente apresenta febre alta há dois dias";
        let envelope = cipher.encrypt_note(note).unwrap();
        assert_eq!(cipher.decrypt_note(&envelope).unwrap(), note);
    }

    #[test]
    fn repeated_encryption_is_non_deterministic() {
        let cipher = test_cipher();
        let e1 = cipher.encrypt_note("same note text").unwrap();
        let e2 = cipher.encrypt_note("same note text").unwrap();
        assert_ne!(e1, e2);
    }

    #[test]
    fn envelope_never_contains_plaintext() {
        let cipher = test_cipher();
        let envelope = cipher.encrypt_note("highly sensitive content").unwrap();
        assert!(!envelope.contains("sensitive"));
    }

    #[test]
    fn decrypt_with_wrong_key_fails() {
        let cipher = test_cipher();
        let other = NoteCipher::from_key_bytes([8u8; KEY_LENGTH]);
        let envelope = cipher.encrypt_note("secret note data").unwrap();
        assert!(matches!(
            other.decrypt_note(&envelope),
            Err(CryptoError::DecryptionFailed)
        ));
    }

    #[test]
    fn tampered_ciphertext_detected() {
        let cipher = test_cipher();
        let envelope = cipher.encrypt_note("secret note data").unwrap();
        let mut bytes = BASE64.decode(&envelope).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        let tampered = BASE64.encode(bytes);
        assert!(matches!(
            cipher.decrypt_note(&tampered),
            Err(CryptoError::DecryptionFailed)
        ));
    }

    #[test]
    fn malformed_base64_rejected() {
        let cipher = test_cipher();
        assert!(matches!(
            cipher.decrypt_note("not base64!!!"),
            Err(CryptoError::MalformedEnvelope)
        ));
    }

    #[test]
    fn truncated_envelope_rejected() {
        let cipher = test_cipher();
        let short = BASE64.encode([0u8; 10]);
        assert!(matches!(
            cipher.decrypt_note(&short),
            Err(CryptoError::MalformedEnvelope)
        ));
    }

    #[test]
    fn derive_is_deterministic_per_passphrase_and_salt() {
        let salt = [42u8; SALT_LENGTH];
        let c1 = NoteCipher::derive("passphrase", &salt);
        let c2 = NoteCipher::derive("passphrase", &salt);
        let envelope = c1.encrypt_note("note for key check").unwrap();
        assert_eq!(c2.decrypt_note(&envelope).unwrap(), "note for key check");
    }

    #[test]
    fn different_salts_produce_different_keys() {
        let c1 = NoteCipher::derive("passphrase", &[1u8; SALT_LENGTH]);
        let c2 = NoteCipher::derive("passphrase", &[2u8; SALT_LENGTH]);
        let envelope = c1.encrypt_note("note for key check").unwrap();
        assert!(c2.decrypt_note(&envelope).is_err());
    }

    #[test]
    fn generate_salt_is_random() {
        assert_ne!(generate_salt(), generate_salt());
    }

    #[test]
    fn unicode_note_round_trip() {
        let cipher = test_cipher();
        let note = "Paciente João — açúcar elevado, 37.5°C";
        let envelope = cipher.encrypt_note(note).unwrap();
        assert_eq!(cipher.decrypt_note(&envelope).unwrap(), note);
    }
}

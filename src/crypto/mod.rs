pub mod cipher;

pub use cipher::*;

use thiserror::Error;

/// Failures from the note cipher. Encryption and decryption never degrade
/// silently: every underlying error surfaces as one of these.
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Encryption failed")]
    EncryptionFailed,

    #[error("Decryption failed — wrong key or tampered ciphertext")]
    DecryptionFailed,

    #[error("Malformed cipher envelope")]
    MalformedEnvelope,
}

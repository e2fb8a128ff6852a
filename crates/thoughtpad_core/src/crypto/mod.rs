//! Note password protection.
//!
//! # Responsibility
//! - Provide the symmetric key used to seal note passwords.
//! - Encode sealed passwords into the envelope stored in `notes.password`.
//!
//! # Invariants
//! - Envelope layout: `[nonce_len: u8][nonce][ct_len: u16 BE][ciphertext]`.
//! - Every `encrypt` call uses a fresh random nonce.
//! - Plaintext passwords and keys are never logged.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use std::error::Error;
use std::fmt::{Display, Formatter};

mod key;

pub use key::{InMemoryKeyProvider, KeyProvider, KeyringKeyProvider, KEY_LEN};

const NONCE_LEN: usize = 12;

pub type CryptoResult<T> = Result<T, CryptoError>;

/// Password sealing failure.
#[derive(Debug)]
pub enum CryptoError {
    /// Key storage (OS keychain) could not be read or written.
    KeyStore(String),
    /// Stored key material has the wrong shape.
    InvalidKey,
    /// Envelope framing is truncated or inconsistent.
    MalformedEnvelope(&'static str),
    /// Authentication failed: wrong key or tampered ciphertext.
    Decrypt,
    Encrypt,
    PlaintextTooLong(usize),
}

impl Display for CryptoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::KeyStore(message) => write!(f, "key store failure: {message}"),
            Self::InvalidKey => write!(f, "stored key has invalid length"),
            Self::MalformedEnvelope(reason) => write!(f, "malformed password envelope: {reason}"),
            Self::Decrypt => write!(f, "password envelope failed authentication"),
            Self::Encrypt => write!(f, "password encryption failed"),
            Self::PlaintextTooLong(len) => {
                write!(f, "password of {len} bytes exceeds envelope capacity")
            }
        }
    }
}

impl Error for CryptoError {}

/// Seals and opens note passwords with AES-256-GCM.
pub struct PasswordCipher {
    cipher: Aes256Gcm,
}

impl PasswordCipher {
    /// Builds a cipher from the provider's key, creating the key if needed.
    pub fn from_provider(provider: &dyn KeyProvider) -> CryptoResult<Self> {
        let key = provider.key()?;
        Self::from_key(&key)
    }

    pub fn from_key(key: &[u8]) -> CryptoResult<Self> {
        let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| CryptoError::InvalidKey)?;
        Ok(Self { cipher })
    }

    pub fn encrypt(&self, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
        let nonce_bytes: [u8; NONCE_LEN] = rand::random();
        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
            .map_err(|_| CryptoError::Encrypt)?;
        let ct_len = u16::try_from(ciphertext.len())
            .map_err(|_| CryptoError::PlaintextTooLong(plaintext.len()))?;

        let mut envelope = Vec::with_capacity(1 + NONCE_LEN + 2 + ciphertext.len());
        envelope.push(NONCE_LEN as u8);
        envelope.extend_from_slice(&nonce_bytes);
        envelope.extend_from_slice(&ct_len.to_be_bytes());
        envelope.extend_from_slice(&ciphertext);
        Ok(envelope)
    }

    pub fn decrypt(&self, envelope: &[u8]) -> CryptoResult<Vec<u8>> {
        let (nonce, ciphertext) = split_envelope(envelope)?;
        self.cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CryptoError::Decrypt)
    }

    /// Returns whether `candidate` is the password sealed in `envelope`.
    ///
    /// Any decode or authentication failure counts as a mismatch.
    pub fn verify(&self, envelope: &[u8], candidate: &str) -> bool {
        match self.decrypt(envelope) {
            Ok(plaintext) => plaintext == candidate.as_bytes(),
            Err(_) => false,
        }
    }
}

fn split_envelope(envelope: &[u8]) -> CryptoResult<(&[u8], &[u8])> {
    let (&nonce_len, rest) = envelope
        .split_first()
        .ok_or(CryptoError::MalformedEnvelope("empty envelope"))?;
    let nonce_len = usize::from(nonce_len);
    if nonce_len != NONCE_LEN {
        return Err(CryptoError::MalformedEnvelope("unexpected nonce length"));
    }
    if rest.len() < nonce_len + 2 {
        return Err(CryptoError::MalformedEnvelope("truncated header"));
    }

    let (nonce, rest) = rest.split_at(nonce_len);
    let (len_bytes, ciphertext) = rest.split_at(2);
    let ct_len = usize::from(u16::from_be_bytes([len_bytes[0], len_bytes[1]]));
    if ciphertext.len() != ct_len {
        return Err(CryptoError::MalformedEnvelope("ciphertext length mismatch"));
    }
    Ok((nonce, ciphertext))
}

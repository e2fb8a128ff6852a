//! Symmetric key sources.

use super::{CryptoError, CryptoResult};
use base64::Engine;
use log::{info, warn};
use std::sync::Mutex;

pub const KEY_LEN: usize = 32;

const KEYRING_SERVICE: &str = "thoughtpad";
const KEYRING_ACCOUNT: &str = "note-password-key";

/// Yields the 32-byte key used to seal note passwords.
///
/// Implementations create and persist a key on first use.
pub trait KeyProvider: Send + Sync {
    fn key(&self) -> CryptoResult<[u8; KEY_LEN]>;
}

/// OS keychain backed provider; the key is stored base64 encoded.
pub struct KeyringKeyProvider {
    service: String,
    account: String,
    lock: Mutex<()>,
}

impl KeyringKeyProvider {
    pub fn new() -> Self {
        Self::with_entry(KEYRING_SERVICE, KEYRING_ACCOUNT)
    }

    pub fn with_entry(service: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            account: account.into(),
            lock: Mutex::new(()),
        }
    }
}

impl Default for KeyringKeyProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyProvider for KeyringKeyProvider {
    fn key(&self) -> CryptoResult<[u8; KEY_LEN]> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| CryptoError::KeyStore("key lock poisoned".to_string()))?;
        let entry = self.entry()?;

        match entry.get_password() {
            Ok(encoded) => decode_key(&encoded),
            Err(keyring::Error::NoEntry) => {
                let key: [u8; KEY_LEN] = rand::random();
                let encoded = base64::engine::general_purpose::STANDARD.encode(key);
                entry
                    .set_password(&encoded)
                    .map_err(|err| CryptoError::KeyStore(err.to_string()))?;

                // The key must be readable through a fresh entry.
                match self.entry()?.get_password() {
                    Ok(stored) if stored == encoded => {
                        info!("event=key_create module=crypto status=ok");
                        Ok(key)
                    }
                    _ => {
                        warn!(
                            "event=key_create module=crypto status=error error_code=key_not_persisted"
                        );
                        Err(CryptoError::KeyStore(
                            "credential store did not persist the key".to_string(),
                        ))
                    }
                }
            }
            Err(err) => Err(CryptoError::KeyStore(err.to_string())),
        }
    }
}

impl KeyringKeyProvider {
    fn entry(&self) -> CryptoResult<keyring::Entry> {
        keyring::Entry::new(&self.service, &self.account)
            .map_err(|err| CryptoError::KeyStore(err.to_string()))
    }

    /// Removes the stored key. Notes sealed with it can no longer be opened.
    pub fn delete_key(&self) -> CryptoResult<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(CryptoError::KeyStore(err.to_string())),
        }
    }
}

fn decode_key(encoded: &str) -> CryptoResult<[u8; KEY_LEN]> {
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|_| CryptoError::InvalidKey)?;
    <[u8; KEY_LEN]>::try_from(decoded.as_slice()).map_err(|_| {
        warn!("event=key_load module=crypto status=error error_code=invalid_key_length");
        CryptoError::InvalidKey
    })
}

/// Process-local provider with a random key per instance.
pub struct InMemoryKeyProvider {
    key: [u8; KEY_LEN],
}

impl InMemoryKeyProvider {
    pub fn new() -> Self {
        Self {
            key: rand::random(),
        }
    }

    pub fn with_key(key: [u8; KEY_LEN]) -> Self {
        Self { key }
    }
}

impl Default for InMemoryKeyProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyProvider for InMemoryKeyProvider {
    fn key(&self) -> CryptoResult<[u8; KEY_LEN]> {
        Ok(self.key)
    }
}

//! Provider credential encryption.
//!
//! Two envelope schemes coexist during migration: the retired scheme the
//! legacy store wrote (`v1:`-prefixed, no associated data) and the target
//! scheme everything converges on (nonce-prefixed AES-256-GCM envelope with
//! the key id authenticated as associated data). `Reencryptor` normalizes
//! any credential to the target scheme and is safe to re-run over already
//! migrated values.

use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, AeadCore, KeyInit, OsRng, Payload},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use sha2::{Digest, Sha256};
use thiserror::Error;

const NONCE_LEN: usize = 12;
const LEGACY_PREFIX: &str = "v1:";

#[derive(Debug, Error)]
pub enum SecretsError {
    #[error("Invalid key material for '{key_id}': {reason}")]
    InvalidKey { key_id: String, reason: String },
    #[error("Encryption under key '{0}' failed")]
    Encrypt(String),
    #[error("Value does not decrypt under the {scheme} scheme")]
    Decrypt { scheme: &'static str },
    #[error("Malformed credential envelope")]
    Envelope,
}

/// AES-256-GCM cipher for the target scheme. Envelope layout:
/// `base64(nonce ‖ ciphertext)` with the key id as associated data, so a
/// value can only decrypt under the key it names.
pub struct KeyCipher {
    cipher: Aes256Gcm,
    key_id: String,
}

impl KeyCipher {
    pub fn new(key_id: &str, key_material: &[u8; 32]) -> Self {
        let key = Key::<Aes256Gcm>::from_slice(key_material);
        Self {
            cipher: Aes256Gcm::new(key),
            key_id: key_id.to_string(),
        }
    }

    pub fn from_base64(key_id: &str, encoded: &str) -> Result<Self, SecretsError> {
        let bytes = BASE64.decode(encoded).map_err(|err| SecretsError::InvalidKey {
            key_id: key_id.to_string(),
            reason: err.to_string(),
        })?;
        let material: [u8; 32] = bytes.try_into().map_err(|_| SecretsError::InvalidKey {
            key_id: key_id.to_string(),
            reason: "key must be exactly 32 bytes".to_string(),
        })?;
        Ok(Self::new(key_id, &material))
    }

    /// Derives the key from a passphrase via SHA-256. Used where the
    /// deployment hands out a key secret rather than raw key material.
    pub fn from_passphrase(key_id: &str, passphrase: &str) -> Self {
        let digest = Sha256::digest(passphrase.as_bytes());
        Self::new(key_id, &digest.into())
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, SecretsError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(
                &nonce,
                Payload {
                    msg: plaintext.as_bytes(),
                    aad: self.key_id.as_bytes(),
                },
            )
            .map_err(|_| SecretsError::Encrypt(self.key_id.clone()))?;
        let mut envelope = nonce.to_vec();
        envelope.extend_from_slice(&ciphertext);
        Ok(BASE64.encode(envelope))
    }

    pub fn decrypt(&self, envelope: &str) -> Result<String, SecretsError> {
        let bytes = BASE64.decode(envelope).map_err(|_| SecretsError::Envelope)?;
        if bytes.len() <= NONCE_LEN {
            return Err(SecretsError::Envelope);
        }
        let (nonce, ciphertext) = bytes.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(
                Nonce::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad: self.key_id.as_bytes(),
                },
            )
            .map_err(|_| SecretsError::Decrypt { scheme: "target" })?;
        String::from_utf8(plaintext).map_err(|_| SecretsError::Envelope)
    }
}

/// The retired envelope scheme: `v1:` + `base64(nonce ‖ ciphertext)`,
/// no associated data. Kept only to decrypt values written before the
/// key rollover.
pub struct LegacyKeyCipher {
    cipher: Aes256Gcm,
}

impl LegacyKeyCipher {
    pub fn new(key_material: &[u8; 32]) -> Self {
        let key = Key::<Aes256Gcm>::from_slice(key_material);
        Self {
            cipher: Aes256Gcm::new(key),
        }
    }

    pub fn from_passphrase(passphrase: &str) -> Self {
        let digest = Sha256::digest(passphrase.as_bytes());
        Self::new(&digest.into())
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, SecretsError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| SecretsError::Encrypt("legacy".to_string()))?;
        let mut envelope = nonce.to_vec();
        envelope.extend_from_slice(&ciphertext);
        Ok(format!("{LEGACY_PREFIX}{}", BASE64.encode(envelope)))
    }

    pub fn decrypt(&self, envelope: &str) -> Result<String, SecretsError> {
        let encoded = envelope
            .strip_prefix(LEGACY_PREFIX)
            .ok_or(SecretsError::Decrypt { scheme: "legacy" })?;
        let bytes = BASE64.decode(encoded).map_err(|_| SecretsError::Envelope)?;
        if bytes.len() <= NONCE_LEN {
            return Err(SecretsError::Envelope);
        }
        let (nonce, ciphertext) = bytes.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| SecretsError::Decrypt { scheme: "legacy" })?;
        String::from_utf8(plaintext).map_err(|_| SecretsError::Envelope)
    }
}

/// Normalizes a credential to the target scheme.
pub struct Reencryptor {
    target: KeyCipher,
    legacy: Option<LegacyKeyCipher>,
}

impl Reencryptor {
    pub fn new(target: KeyCipher, legacy: Option<LegacyKeyCipher>) -> Self {
        Self { target, legacy }
    }

    pub fn target(&self) -> &KeyCipher {
        &self.target
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, SecretsError> {
        self.target.encrypt(plaintext)
    }

    /// Re-encrypts one credential value.
    ///
    /// `already_encrypted` comes from the legacy record's flag. Plaintext
    /// is encrypted under the target key. Ciphertext is first tried under
    /// the legacy scheme and rewrapped; if that fails but the value
    /// decrypts under the target scheme it is already migrated and passes
    /// through unchanged, so re-running a migration never double-wraps.
    /// A value that decrypts under neither scheme propagates the legacy
    /// decrypt error.
    pub fn reencrypt(
        &self,
        value: &str,
        already_encrypted: bool,
    ) -> Result<String, SecretsError> {
        if !already_encrypted {
            return self.target.encrypt(value);
        }

        let legacy_err = match &self.legacy {
            Some(legacy) => match legacy.decrypt(value) {
                Ok(plaintext) => return self.target.encrypt(&plaintext),
                Err(err) => err,
            },
            None => SecretsError::Decrypt { scheme: "legacy" },
        };

        match self.target.decrypt(value) {
            Ok(_) => Ok(value.to_string()),
            Err(_) => Err(legacy_err),
        }
    }
}

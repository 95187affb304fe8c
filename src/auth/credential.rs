//! Stored admin credential, salted hashing and plain-text migration

use crate::auth::AuthConfig;
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha512;
use std::fmt;
use subtle::ConstantTimeEq;

/// The admin credential as persisted by the store.
///
/// Without a salt the secret is a legacy plain-text password; with one it is
/// a hex PBKDF2 hash of the password and that salt.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,
}

impl Credential {
    pub fn plain(password: impl Into<String>) -> Self {
        Self {
            secret: password.into(),
            salt: None,
        }
    }

    pub fn hashed(hash: impl Into<String>, salt: impl Into<String>) -> Self {
        Self {
            secret: hash.into(),
            salt: Some(salt.into()),
        }
    }

    /// An empty salt counts as no salt.
    pub fn is_hashed(&self) -> bool {
        self.salt.as_deref().is_some_and(|salt| !salt.is_empty())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("secret", &"<redacted>")
            .field("hashed", &self.is_hashed())
            .finish()
    }
}

/// Outcome of a password check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub valid: bool,
    /// Replacement credential the caller should persist
    pub migrated: Option<Credential>,
}

impl Verification {
    pub fn accepted() -> Self {
        Self {
            valid: true,
            migrated: None,
        }
    }

    pub fn rejected() -> Self {
        Self {
            valid: false,
            migrated: None,
        }
    }

    pub fn migrated(credential: Credential) -> Self {
        Self {
            valid: true,
            migrated: Some(credential),
        }
    }
}

/// PBKDF2-HMAC-SHA512 password hashing
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    iterations: u32,
    hash_length: usize,
    salt_length: usize,
}

impl PasswordHasher {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            iterations: config.pbkdf2_iterations,
            hash_length: config.hash_length,
            salt_length: config.salt_length,
        }
    }

    /// Lowercase hex of the derived key for `password` and `salt`.
    pub fn hash(&self, password: &str, salt: &str) -> String {
        hex::encode(self.derive_key(password, salt))
    }

    fn derive_key(&self, password: &str, salt: &str) -> Vec<u8> {
        let mut derived = vec![0u8; self.hash_length];
        pbkdf2_hmac::<Sha512>(password.as_bytes(), salt.as_bytes(), self.iterations, &mut derived);
        derived
    }

    /// Fresh random salt from the OS generator, hex encoded.
    pub fn generate_salt(&self) -> String {
        let mut bytes = vec![0u8; self.salt_length];
        OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    /// Check `password` against a stored credential.
    ///
    /// A correct password against a plain-text credential yields a migrated,
    /// salted credential. Nothing is written here; persisting it is up to the
    /// caller, and if that fails the next login migrates again.
    pub fn verify(&self, password: &str, credential: &Credential) -> Verification {
        match credential.salt.as_deref().filter(|salt| !salt.is_empty()) {
            Some(salt) => {
                // A stored hash that is not valid hex can never match
                let Ok(stored) = hex::decode(&credential.secret) else {
                    return Verification::rejected();
                };

                if bool::from(self.derive_key(password, salt).ct_eq(stored.as_slice())) {
                    Verification::accepted()
                } else {
                    Verification::rejected()
                }
            }
            None => {
                if password != credential.secret {
                    return Verification::rejected();
                }

                let salt = self.generate_salt();
                let hash = self.hash(password, &salt);
                Verification::migrated(Credential::hashed(hash, salt))
            }
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(&AuthConfig::default())
    }
}

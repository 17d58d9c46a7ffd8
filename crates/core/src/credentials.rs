//! Salted password hashes for providers and staff profiles.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const SALT_LEN: usize = 16;

/// A salted SHA-256 password digest.
///
/// Only the hex-encoded salt and digest are kept; the clear-text password never reaches disk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordHash {
    salt: String,
    digest: String,
}

impl PasswordHash {
    /// Hashes `password` under a freshly drawn random salt.
    pub fn new(password: &str) -> Self {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        Self::with_salt(&salt, password)
    }

    fn with_salt(salt: &[u8], password: &str) -> Self {
        Self {
            salt: hex::encode(salt),
            digest: digest(salt, password),
        }
    }

    /// Returns true when `password` produces the stored digest.
    pub fn verify(&self, password: &str) -> bool {
        match hex::decode(&self.salt) {
            Ok(salt) => {
                let candidate = digest(&salt, password);
                // Compare every byte so timing does not depend on the mismatch position.
                candidate.len() == self.digest.len()
                    && candidate
                        .bytes()
                        .zip(self.digest.bytes())
                        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                        == 0
            }
            Err(e) => {
                tracing::warn!("stored password salt is not valid hex: {}", e);
                false
            }
        }
    }
}

fn digest(salt: &[u8], password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

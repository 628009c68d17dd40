//! Salted password hashing for user accounts (PBKDF2-HMAC-SHA256).

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 100_000;

const KEY_LEN: usize = 32;
const SALT_LEN: usize = 16;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct PasswordHash {
    pub salt: String,
    pub hash: String,
    pub iterations: u32,
}

impl PasswordHash {
    pub fn create(password: &str, iterations: u32) -> Self {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        let iterations = iterations.max(1);
        let key = derive_key(password, &salt, iterations);
        Self {
            salt: B64.encode(salt),
            hash: B64.encode(key),
            iterations,
        }
    }

    /// Check `password` against the stored hash. Malformed records never verify.
    pub fn verify(&self, password: &str) -> bool {
        let Ok(salt) = B64.decode(&self.salt) else {
            return false;
        };
        let Ok(expected) = B64.decode(&self.hash) else {
            return false;
        };
        let key = derive_key(password, &salt, self.iterations.max(1));
        key[..].ct_eq(&expected[..]).into()
    }
}

fn derive_key(password: &str, salt: &[u8], iterations: u32) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut key);
    key
}

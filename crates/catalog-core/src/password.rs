//! # Password Digests
//!
//! One-way digests for account passwords.
//!
//! ## Schemes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sha256 (default)                                                       │
//! │    hash("abc") = "ba7816bf8f01cfea414140de5dae2223b00361a3..."          │
//! │    deterministic, unsalted, single round                                │
//! │    kept because existing user rows were written this way                │
//! │                                                                         │
//! │  argon2                                                                 │
//! │    hash("abc") = "$argon2id$v=19$m=19456,t=2,p=1$<salt>$<hash>"         │
//! │    salted, memory-hard; a new salt every call                           │
//! │                                                                         │
//! │  verify_password() accepts BOTH stored forms, so a database can move   │
//! │  from sha256 to argon2 one account at a time.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use catalog_core::password::{hash_password, verify_password};
//!
//! let stored = hash_password("hunter22");
//! assert!(verify_password("hunter22", &stored));
//! assert!(!verify_password("hunter23", &stored));
//! ```

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{CoreError, CoreResult};

/// How new password hashes are produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordScheme {
    /// Lowercase hex SHA-256 of the UTF-8 bytes.
    #[default]
    Sha256,
    /// Salted Argon2id, PHC string format.
    Argon2,
}

/// Hex SHA-256 digest of `plaintext`.
///
/// Always 64 lowercase hex characters; identical input gives identical output.
pub fn hash_password(plaintext: &str) -> String {
    hex::encode(Sha256::digest(plaintext.as_bytes()))
}

/// Hashes `plaintext` with the given scheme.
pub fn hash_with(scheme: PasswordScheme, plaintext: &str) -> CoreResult<String> {
    match scheme {
        PasswordScheme::Sha256 => Ok(hash_password(plaintext)),
        PasswordScheme::Argon2 => {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::default()
                .hash_password(plaintext.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| CoreError::PasswordHash(e.to_string()))
        }
    }
}

/// Checks `plaintext` against a stored hash of either scheme.
///
/// A stored value that is neither a valid PHC string nor a matching hex
/// digest simply fails verification.
pub fn verify_password(plaintext: &str, stored: &str) -> bool {
    if stored.starts_with("$argon2") {
        return match PasswordHash::new(stored) {
            Ok(parsed) => Argon2::default()
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        };
    }

    hash_password(plaintext) == stored
}

// =============================================================================
// Unit Tests
// =============================================================================

//! Salted SHA-256 credential hashes stored in the students sheet.
//!
//! The sheet never holds a plaintext password. Each row carries a
//! `sha256$<salt>$<hex digest>` string produced by [`hash_password`]; login
//! recomputes the digest and compares it in constant time.

use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};
use thiserror::Error;

const SCHEME: &str = "sha256";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CredentialError {
    #[error("password cannot be empty")]
    EmptyPassword,

    #[error("salt cannot be empty or contain '$'")]
    InvalidSalt,

    #[error("unsupported hash scheme: {0}")]
    UnsupportedScheme(String),

    #[error("malformed password hash")]
    Malformed,
}

/// A parsed credential hash.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash {
    salt: String,
    digest: [u8; 32],
}

impl PasswordHash {
    /// Parses the `sha256$<salt>$<hex>` encoding.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError` if the scheme is unknown or any part is malformed.
    pub fn parse(encoded: &str) -> Result<Self, CredentialError> {
        let mut parts = encoded.trim().splitn(3, '$');
        let scheme = parts.next().unwrap_or_default();
        if scheme != SCHEME {
            return Err(CredentialError::UnsupportedScheme(scheme.to_owned()));
        }
        let salt = parts.next().ok_or(CredentialError::Malformed)?;
        let hex_digest = parts.next().ok_or(CredentialError::Malformed)?;
        if salt.is_empty() {
            return Err(CredentialError::Malformed);
        }

        let mut digest = [0_u8; 32];
        hex::decode_to_slice(hex_digest, &mut digest).map_err(|_| CredentialError::Malformed)?;

        Ok(Self {
            salt: salt.to_owned(),
            digest,
        })
    }

    #[must_use]
    pub fn salt(&self) -> &str {
        &self.salt
    }

    /// Checks a candidate password against this hash.
    #[must_use]
    pub fn verify(&self, password: &str) -> bool {
        let candidate = digest(&self.salt, password);
        constant_time_eq(&candidate, &self.digest)
    }

    /// Returns the storable `sha256$<salt>$<hex>` encoding.
    #[must_use]
    pub fn encode(&self) -> String {
        format!("{SCHEME}${}${}", self.salt, hex::encode(self.digest))
    }
}

impl FromStr for PasswordHash {
    type Err = CredentialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

/// Hashes a password with the given salt.
///
/// # Errors
///
/// Returns `CredentialError::EmptyPassword` for a blank password and
/// `CredentialError::InvalidSalt` when the salt is empty or contains `$`.
pub fn hash_password(password: &str, salt: &str) -> Result<PasswordHash, CredentialError> {
    if password.is_empty() {
        return Err(CredentialError::EmptyPassword);
    }
    if salt.is_empty() || salt.contains('$') {
        return Err(CredentialError::InvalidSalt);
    }
    Ok(PasswordHash {
        salt: salt.to_owned(),
        digest: digest(salt, password),
    })
}

/// Returns a fresh random salt.
#[must_use]
pub fn generate_salt() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

fn digest(salt: &str, password: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b"$");
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}

fn constant_time_eq(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a.iter().zip(b.iter()).fold(0_u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

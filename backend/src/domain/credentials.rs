//! Salted password hashing.
//!
//! Credential records use the textual layout `hex(key) + "." + hex(salt)`.
//! The hex-encoded salt string is what feeds the key derivation, so records
//! written by the earlier Node deployment verify unchanged.

use std::fmt;

use rand::RngCore;
use rand::rngs::OsRng;
use subtle::ConstantTimeEq;

/// Bytes of entropy drawn for each salt.
pub const SALT_LEN: usize = 16;
/// Length of the derived key in bytes.
pub const KEY_LEN: usize = 64;

/// Errors raised while deriving a key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("invalid scrypt parameters: {message}")]
    InvalidParams { message: String },
    #[error("key derivation failed: {message}")]
    Derivation { message: String },
}

/// Opaque stored credential.
///
/// `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialRecord(String);

impl CredentialRecord {
    /// Wrap a value read from storage. No validation is performed; malformed
    /// records simply never verify.
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Storage representation.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// A well-formed record that matches no password. Verifying against it
    /// costs the same as verifying against a real record.
    pub fn placeholder() -> Self {
        Self(format!(
            "{}.{}",
            "0".repeat(KEY_LEN * 2),
            "0".repeat(SALT_LEN * 2)
        ))
    }

    fn split(&self) -> Option<(Vec<u8>, &str)> {
        let (key_hex, salt_hex) = self.0.split_once('.')?;
        if salt_hex.is_empty() {
            return None;
        }
        let key = hex::decode(key_hex).ok()?;
        (key.len() == KEY_LEN).then_some((key, salt_hex))
    }
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CredentialRecord(..)")
    }
}

/// scrypt work factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScryptCost {
    log_n: u8,
    r: u32,
    p: u32,
}

impl ScryptCost {
    /// N = 2^14, r = 8, p = 1.
    pub const STANDARD: Self = Self {
        log_n: 14,
        r: 8,
        p: 1,
    };

    /// Construct a custom work factor.
    pub const fn new(log_n: u8, r: u32, p: u32) -> Self {
        Self { log_n, r, p }
    }
}

impl Default for ScryptCost {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Derives and verifies credential records.
///
/// # Examples
/// ```
/// use resource_library::domain::{CredentialHasher, ScryptCost};
///
/// let hasher = CredentialHasher::new(ScryptCost::new(4, 8, 1));
/// let record = hasher.hash("hunter2").expect("hash");
/// assert!(hasher.verify("hunter2", &record));
/// assert!(!hasher.verify("hunter3", &record));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CredentialHasher {
    cost: ScryptCost,
}

impl CredentialHasher {
    pub const fn new(cost: ScryptCost) -> Self {
        Self { cost }
    }

    /// Hash a password with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<CredentialRecord, CredentialError> {
        let mut salt = [0_u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        let salt_hex = hex::encode(salt);
        let key = self.derive(password, &salt_hex)?;
        Ok(CredentialRecord(format!("{}.{salt_hex}", hex::encode(key))))
    }

    /// Check a password against a stored record in constant time.
    ///
    /// Malformed records return `false`.
    pub fn verify(&self, password: &str, record: &CredentialRecord) -> bool {
        let Some((expected, salt_hex)) = record.split() else {
            return false;
        };
        match self.derive(password, salt_hex) {
            Ok(derived) => derived.as_slice().ct_eq(expected.as_slice()).into(),
            Err(error) => {
                tracing::error!(%error, "credential verification failed");
                false
            }
        }
    }

    fn derive(&self, password: &str, salt_hex: &str) -> Result<[u8; KEY_LEN], CredentialError> {
        let ScryptCost { log_n, r, p } = self.cost;
        let params = scrypt::Params::new(log_n, r, p, KEY_LEN).map_err(|err| {
            CredentialError::InvalidParams {
                message: err.to_string(),
            }
        })?;
        let mut key = [0_u8; KEY_LEN];
        scrypt::scrypt(password.as_bytes(), salt_hex.as_bytes(), &params, &mut key).map_err(
            |err| CredentialError::Derivation {
                message: err.to_string(),
            },
        )?;
        Ok(key)
    }
}

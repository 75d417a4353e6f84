//! Authentication: admin key and access-token extractors.

mod extractor;

use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

pub use extractor::{AdminGate, TokenAuth};

/// Wrapper type for the bootstrap admin key.
/// Uses `SecretString` to prevent accidental logging and zeroize on drop.
#[derive(Clone)]
pub struct AdminKey(Option<SecretString>);

impl AdminKey {
    pub fn new(key: Option<String>) -> Self {
        Self(key.map(SecretString::from))
    }

    /// Constant-time comparison of the provided key with the stored one.
    /// `ConstantTimeEq` returns false for unequal lengths without an early
    /// exit, so neither content nor length leaks through timing.
    pub fn verify(&self, provided: &str) -> bool {
        match &self.0 {
            Some(secret) => secret
                .expose_secret()
                .as_bytes()
                .ct_eq(provided.as_bytes())
                .into(),
            None => false,
        }
    }
}

impl std::fmt::Debug for AdminKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Some(_) => write!(f, "AdminKey([REDACTED])"),
            None => write!(f, "AdminKey(None)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_matches_exact_key() {
        let key = AdminKey::new(Some("secret-key".to_string()));
        assert!(key.verify("secret-key"));
        assert!(!key.verify("secret-keY"));
        assert!(!key.verify("secret-key-longer"));
        assert!(!key.verify(""));
    }

    #[test]
    fn test_unset_key_never_verifies() {
        let key = AdminKey::new(None);
        assert!(!key.verify("anything"));
        assert!(!key.verify(""));
    }

    #[test]
    fn test_debug_redacts() {
        let key = AdminKey::new(Some("secret".to_string()));
        assert_eq!(format!("{:?}", key), "AdminKey([REDACTED])");
    }
}

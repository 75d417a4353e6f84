//! Personal access token issuance and verification.
//!
//! Raw tokens are shown exactly once at account creation; only the SHA-256
//! hash is stored.

use rand::Rng;
use sea_orm::DatabaseConnection;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::db::access_tokens as db;
use crate::error::{AppError, AppResult};
use crate::models::{AuthenticatedUser, Role};

/// Token prefix.
const TOKEN_PREFIX: &str = "fcs_";
/// Length of the random part of the token.
const TOKEN_RANDOM_LENGTH: usize = 32;
/// Length of the stored prefix used for log correlation.
const TOKEN_PREFIX_LENGTH: usize = 8;

/// Generate a new random token. Returns the full token, its hash and the
/// short prefix stored alongside it.
pub fn generate_token() -> (String, String, String) {
    let random_part: String = rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(TOKEN_RANDOM_LENGTH)
        .map(char::from)
        .collect();

    let full_token = format!("{}{}", TOKEN_PREFIX, random_part);
    let token_hash = hash_token(&full_token);
    let token_prefix = full_token
        .chars()
        .take(TOKEN_PREFIX_LENGTH)
        .collect::<String>();

    (full_token, token_hash, token_prefix)
}

/// Hash a token using SHA-256.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Issue a fresh token for a user and persist its hash. Returns the raw
/// token, to be shown once.
pub async fn issue(db: &DatabaseConnection, user_id: Uuid) -> AppResult<String> {
    let (full_token, token_hash, token_prefix) = generate_token();
    db::insert(db, user_id, &token_hash, &token_prefix).await?;
    Ok(full_token)
}

/// Resolve a presented token to its user.
pub async fn authenticate(
    db: &DatabaseConnection,
    token: &SecretString,
) -> AppResult<AuthenticatedUser> {
    let raw = token.expose_secret();
    if !raw.starts_with(TOKEN_PREFIX) {
        return Err(AppError::Unauthorized("Invalid access token".to_string()));
    }

    let token_hash = hash_token(raw);
    let user = db::find_user_by_hash(db, &token_hash)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid access token".to_string()))?;

    let role = Role::parse(&user.role)
        .ok_or_else(|| AppError::Database(format!("Unknown role '{}' stored", user.role)))?;

    Ok(AuthenticatedUser {
        id: user.id,
        email: user.email,
        role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_shape() {
        let (full, hash, prefix) = generate_token();
        assert!(full.starts_with(TOKEN_PREFIX));
        assert_eq!(full.len(), TOKEN_PREFIX.len() + TOKEN_RANDOM_LENGTH);
        assert_eq!(hash.len(), 64);
        assert_eq!(prefix.len(), TOKEN_PREFIX_LENGTH);
        assert!(full.starts_with(&prefix));
    }

    #[test]
    fn test_hash_is_deterministic() {
        let h1 = hash_token("fcs_abc123");
        let h2 = hash_token("fcs_abc123");
        assert_eq!(h1, h2);
        assert_ne!(hash_token("fcs_abc124"), h1);
    }
}

/// Refresh Token Management
///
/// Refresh tokens are:
/// - Cryptographically secure random 64-character alphanumeric strings
/// - Hashed with SHA-256 before storage (never store plaintext)
/// - Reusable until revoked or expired (no rotation on refresh)
/// - Database-backed for revocation support

use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::RefreshTokenError;
use crate::persistence::{RefreshTokenRecord, RefreshTokenRepository};

const REFRESH_TOKEN_LENGTH: usize = 64;

/// Generate a new cryptographically secure refresh token
///
/// The plaintext is returned to the client; the server keeps only its hash.
pub fn generate_refresh_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(REFRESH_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Hash a refresh token using SHA-256
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Creates, looks up and revokes refresh tokens
#[derive(Clone)]
pub struct RefreshTokenStore {
    repository: Arc<dyn RefreshTokenRepository>,
    ttl: Duration,
}

impl RefreshTokenStore {
    pub fn new(repository: Arc<dyn RefreshTokenRepository>, ttl: Duration) -> Self {
        Self { repository, ttl }
    }

    /// Issue and persist a new refresh token for `user_id`
    ///
    /// # Errors
    /// Returns `RefreshTokenError::Storage` if the record cannot be stored
    pub async fn create(&self, user_id: Uuid) -> Result<String, RefreshTokenError> {
        let token = generate_refresh_token();
        let now = Utc::now();
        let record = RefreshTokenRecord {
            token_hash: hash_token(&token),
            user_id,
            created_at: now,
            expires_at: now + self.ttl,
            revoked_at: None,
        };

        self.repository.insert_refresh_token(&record).await?;
        tracing::debug!(user_id = %user_id, expires_at = %record.expires_at, "Refresh token created");

        Ok(token)
    }

    /// Resolve a refresh token to its user if it is still usable
    ///
    /// Checks:
    /// 1. Token exists in the database
    /// 2. Token has not expired (`now < expires_at`)
    /// 3. Token has not been revoked
    ///
    /// # Errors
    /// `NotFound`, `Expired` or `Revoked`; `Storage` on a database failure
    pub async fn lookup_active(&self, token: &str) -> Result<Uuid, RefreshTokenError> {
        let record = self
            .repository
            .find_refresh_token(&hash_token(token))
            .await?
            .ok_or(RefreshTokenError::NotFound)?;

        if Utc::now() >= record.expires_at {
            tracing::info!(user_id = %record.user_id, "Refresh token expired");
            return Err(RefreshTokenError::Expired);
        }

        if record.revoked_at.is_some() {
            tracing::warn!(user_id = %record.user_id, "Attempt to use revoked refresh token");
            return Err(RefreshTokenError::Revoked);
        }

        Ok(record.user_id)
    }

    /// Revoke a refresh token
    ///
    /// Revoking an already revoked token succeeds without changing it.
    /// A token that was never issued is `NotFound`.
    pub async fn revoke(&self, token: &str) -> Result<(), RefreshTokenError> {
        let found = self
            .repository
            .mark_refresh_token_revoked(&hash_token(token), Utc::now())
            .await?;

        if found {
            Ok(())
        } else {
            Err(RefreshTokenError::NotFound)
        }
    }
}

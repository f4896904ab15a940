/// Authentication Service
///
/// Orchestrates password hashing, access tokens and refresh tokens for the
/// login, refresh and revoke flows, plus credential registration and
/// replacement. Constructed once at startup with its repositories and
/// settings injected; holds no mutable state of its own.

use std::fmt;
use std::sync::Arc;

use actix_web::http::header::HeaderMap;
use chrono::Duration;
use uuid::Uuid;

use crate::auth::bearer::extract_bearer_token;
use crate::auth::jwt::{generate_access_token, validate_access_token};
use crate::auth::password::{hash_password_with_cost, verify_password};
use crate::auth::refresh_token::RefreshTokenStore;
use crate::configuration::AuthSettings;
use crate::error::{AppError, AuthError, RefreshTokenError};
use crate::persistence::{RefreshTokenRepository, User, UserRepository};
use crate::validators::{is_valid_email, is_valid_password};

/// Tokens handed out by a successful login
#[derive(Clone)]
pub struct Session {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    refresh_tokens: RefreshTokenStore,
    settings: AuthSettings,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        refresh_tokens: Arc<dyn RefreshTokenRepository>,
        settings: AuthSettings,
    ) -> Self {
        let refresh_tokens =
            RefreshTokenStore::new(refresh_tokens, Duration::seconds(settings.refresh_token_expiry));
        Self {
            users,
            refresh_tokens,
            settings,
        }
    }

    /// Register a user with a freshly hashed password
    pub async fn register(&self, email: &str, password: &str) -> Result<User, AppError> {
        let email = is_valid_email(email)?;
        is_valid_password(password)?;

        let password_hash = self.hash(password).await?;
        let user = self.users.create_user(&email, &password_hash).await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Replace the email and password of an authenticated user
    pub async fn update_credentials(
        &self,
        user_id: Uuid,
        email: &str,
        password: &str,
    ) -> Result<User, AppError> {
        let email = is_valid_email(email)?;
        is_valid_password(password)?;

        let password_hash = self.hash(password).await?;
        let user = self.users.update_user(user_id, &email, &password_hash).await?;

        tracing::info!(user_id = %user.id, "User credentials replaced");
        Ok(user)
    }

    /// Exchange email and password for an access token and a refresh token
    ///
    /// `requested_ttl_seconds` is clamped to the configured ceiling; a missing
    /// or non-positive value means the default access token lifetime.
    ///
    /// # Errors
    /// - `AuthError::UserNotFound` for an unknown email
    /// - `AuthError::InvalidCredentials` for a wrong password
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        requested_ttl_seconds: Option<i64>,
    ) -> Result<Session, AppError> {
        let credential = match self.users.find_credential_by_email(email.trim()).await? {
            Some(credential) => credential,
            None => {
                tracing::warn!("Login attempt for unknown email");
                return Err(AuthError::UserNotFound.into());
            }
        };

        if !self.verify(password, &credential.password_hash).await? {
            tracing::warn!(user_id = %credential.user.id, "Login attempt with wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        let user = credential.user;
        let access_token = generate_access_token(
            &user.id,
            &self.settings.secret,
            self.access_token_ttl(requested_ttl_seconds),
        )?;
        let refresh_token = self.refresh_tokens.create(user.id).await?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(Session {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Mint a new access token from the refresh token in `headers`
    ///
    /// The refresh token itself is left untouched and stays usable.
    pub async fn refresh(&self, headers: &HeaderMap) -> Result<String, AppError> {
        let token = extract_bearer_token(headers)?;
        let user_id = self
            .refresh_tokens
            .lookup_active(&token)
            .await
            .map_err(log_refresh_rejection)?;

        let access_token = generate_access_token(
            &user_id,
            &self.settings.secret,
            Duration::seconds(self.settings.access_token_expiry),
        )?;

        tracing::info!(user_id = %user_id, "Access token refreshed");
        Ok(access_token)
    }

    /// Revoke the refresh token in `headers`
    pub async fn revoke(&self, headers: &HeaderMap) -> Result<(), AppError> {
        let token = extract_bearer_token(headers)?;
        self.refresh_tokens
            .revoke(&token)
            .await
            .map_err(log_refresh_rejection)?;

        tracing::info!("Refresh token revoked");
        Ok(())
    }

    /// Validate the access token in `headers` and return its user
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Uuid, AuthError> {
        let token = extract_bearer_token(headers)?;
        validate_access_token(&token, &self.settings.secret)
    }

    /// Delete every user and refresh token
    pub async fn delete_all_users(&self) -> Result<u64, AppError> {
        let deleted = self.users.delete_all_users().await?;
        tracing::warn!(deleted = deleted, "All users deleted");
        Ok(deleted)
    }

    fn access_token_ttl(&self, requested_ttl_seconds: Option<i64>) -> Duration {
        let seconds = match requested_ttl_seconds {
            Some(requested) if requested > 0 => {
                requested.min(self.settings.access_token_max_expiry)
            }
            _ => self.settings.access_token_expiry,
        };
        Duration::seconds(seconds)
    }

    async fn hash(&self, password: &str) -> Result<String, AppError> {
        let password = password.to_string();
        let cost = self.settings.hash_cost;
        tokio::task::spawn_blocking(move || hash_password_with_cost(&password, cost))
            .await
            .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))?
    }

    async fn verify(&self, password: &str, password_hash: &str) -> Result<bool, AppError> {
        let password = password.to_string();
        let password_hash = password_hash.to_string();
        tokio::task::spawn_blocking(move || verify_password(&password, &password_hash))
            .await
            .map_err(|e| AppError::Internal(format!("Verification task failed: {}", e)))
    }
}

fn log_refresh_rejection(err: RefreshTokenError) -> AppError {
    match &err {
        RefreshTokenError::Storage(_) => {}
        reason => tracing::warn!(reason = %reason, "Refresh token rejected"),
    }
    err.into()
}

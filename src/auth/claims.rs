/// JWT Claims structure
///
/// Registered claims (RFC 7519) carried by access tokens. `sub` and `iss`
/// are optional on the wire so that a token missing them still decodes and
/// is rejected by the explicit checks in `validate_access_token`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer identifying access tokens minted by this service
pub const ISSUER: &str = "chirpy";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Issuer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Subject (user ID as UUID string)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Token ID, unique per issued token
    #[serde(default)]
    pub jti: String,
}

impl Claims {
    /// Claims for `user_id`, issued at `now` and expiring `ttl` later
    pub fn new(user_id: Uuid, now: DateTime<Utc>, ttl: chrono::Duration) -> Self {
        Self {
            iss: Some(ISSUER.to_string()),
            sub: Some(user_id.to_string()),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Parse the subject as a user ID
    pub fn user_id(&self) -> Option<Uuid> {
        self.sub.as_deref().and_then(|sub| Uuid::parse_str(sub).ok())
    }

    pub fn has_expected_issuer(&self) -> bool {
        self.iss.as_deref() == Some(ISSUER)
    }

    /// Strict: a token is only live while `now < exp`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

/// JWT Token Generation and Validation
///
/// HS256 compact tokens. Signature, subject, issuer and expiry are checked
/// in that order and any failure is reported as `AuthError::InvalidToken`.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::Claims;
use crate::error::{AppError, AuthError};

/// Generate a signed access token for a user
///
/// A negative `ttl` yields a token that is already expired.
///
/// # Errors
/// Returns `AppError::Internal` if signing fails
pub fn generate_access_token(
    user_id: &Uuid,
    secret: &str,
    ttl: Duration,
) -> Result<String, AppError> {
    let claims = Claims::new(*user_id, Utc::now(), ttl);

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

/// Validate an access token and return the user it was issued to
///
/// # Errors
/// Returns `AuthError::InvalidToken` if the token is malformed, signed with
/// another secret, lacks a valid subject, has a foreign issuer, or expired
pub fn validate_access_token(token: &str, secret: &str) -> Result<Uuid, AuthError> {
    // Expiry and issuer are checked by hand below so the order is fixed
    // and the expiry comparison is strict with no leeway.
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::warn!("JWT validation error: {}", e);
        AuthError::InvalidToken
    })?;

    let user_id = claims.user_id().ok_or_else(|| {
        tracing::warn!("JWT subject missing or not a user ID");
        AuthError::InvalidToken
    })?;

    if !claims.has_expected_issuer() {
        tracing::warn!(issuer = ?claims.iss, "JWT issued by a foreign issuer");
        return Err(AuthError::InvalidToken);
    }

    if claims.is_expired_at(Utc::now()) {
        tracing::info!(user_id = %user_id, "JWT expired");
        return Err(AuthError::InvalidToken);
    }

    Ok(user_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::ISSUER;

    const SECRET: &str = "test-secret-key-at-least-32-characters-long";

    fn sign(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_generate_and_validate_token() {
        let user_id = Uuid::new_v4();

        let token = generate_access_token(&user_id, SECRET, Duration::hours(1))
            .expect("Failed to generate token");
        let validated = validate_access_token(&token, SECRET).expect("Failed to validate token");

        assert_eq!(validated, user_id);
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_tokens_minted_back_to_back_differ() {
        let user_id = Uuid::new_v4();

        let first = generate_access_token(&user_id, SECRET, Duration::hours(1)).unwrap();
        let second = generate_access_token(&user_id, SECRET, Duration::hours(1)).unwrap();

        assert_ne!(first, second);
        assert_eq!(validate_access_token(&second, SECRET).unwrap(), user_id);
    }

    #[test]
    fn test_wrong_secret() {
        let token = generate_access_token(&Uuid::new_v4(), SECRET, Duration::hours(1)).unwrap();
        let result = validate_access_token(&token, "wrong_secret");

        assert_eq!(result, Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_invalid_token() {
        assert_eq!(
            validate_access_token("invalid.token.here", SECRET),
            Err(AuthError::InvalidToken)
        );
        assert_eq!(validate_access_token("", SECRET), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_tampered_token() {
        let token = generate_access_token(&Uuid::new_v4(), SECRET, Duration::hours(1)).unwrap();
        let tampered = format!("{}X", token);

        assert_eq!(validate_access_token(&tampered, SECRET), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_expired_token() {
        let token = generate_access_token(&Uuid::new_v4(), SECRET, -Duration::hours(1)).unwrap();

        assert_eq!(validate_access_token(&token, SECRET), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_recently_expired_token_has_no_leeway() {
        let token = generate_access_token(&Uuid::new_v4(), SECRET, -Duration::seconds(1)).unwrap();

        assert_eq!(validate_access_token(&token, SECRET), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_wrong_issuer() {
        let mut claims = Claims::new(Uuid::new_v4(), Utc::now(), Duration::hours(1));
        claims.iss = Some(format!("{}-admin", ISSUER));

        assert_eq!(
            validate_access_token(&sign(&claims, SECRET), SECRET),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn test_missing_issuer() {
        let mut claims = Claims::new(Uuid::new_v4(), Utc::now(), Duration::hours(1));
        claims.iss = None;

        assert_eq!(
            validate_access_token(&sign(&claims, SECRET), SECRET),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn test_subject_not_a_user_id() {
        let mut claims = Claims::new(Uuid::new_v4(), Utc::now(), Duration::hours(1));
        claims.sub = Some("not-a-uuid".to_string());

        assert_eq!(
            validate_access_token(&sign(&claims, SECRET), SECRET),
            Err(AuthError::InvalidToken)
        );

        claims.sub = None;
        assert_eq!(
            validate_access_token(&sign(&claims, SECRET), SECRET),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn test_other_algorithm_rejected() {
        let claims = Claims::new(Uuid::new_v4(), Utc::now(), Duration::hours(1));
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(validate_access_token(&token, SECRET), Err(AuthError::InvalidToken));
    }
}

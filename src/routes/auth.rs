/// Authentication Routes
///
/// Login, access token refresh and refresh token revocation.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::AuthService;
use crate::error::AppError;
use crate::routes::users::UserResponse;

/// User login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Requested access token lifetime, capped by configuration
    pub expires_in_seconds: Option<i64>,
}

/// Login response: the user plus both tokens
#[derive(Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub token: String,
    pub refresh_token: String,
}

/// Fresh access token
#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// POST /api/login
///
/// # Errors
/// - 401: Unknown email or wrong password (indistinguishable)
/// - 500: Hashing or storage failure
pub async fn login(
    form: web::Json<LoginRequest>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let session = auth
        .login(&form.email, &form.password, form.expires_in_seconds)
        .await?;

    tracing::info!(user_id = %session.user.id, "Login succeeded");

    Ok(HttpResponse::Ok().json(LoginResponse {
        user: UserResponse::from(&session.user),
        token: session.access_token,
        refresh_token: session.refresh_token,
    }))
}

/// POST /api/refresh
///
/// Requires `Authorization: Bearer <refresh_token>`. The refresh token is
/// not rotated.
///
/// # Errors
/// - 401: Missing, malformed, unknown, expired or revoked refresh token
pub async fn refresh(
    req: HttpRequest,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let token = auth.refresh(req.headers()).await?;

    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

/// POST /api/revoke
///
/// Requires `Authorization: Bearer <refresh_token>`. Revoking twice is
/// accepted.
///
/// # Errors
/// - 401: Missing or malformed header, or a token that was never issued
pub async fn revoke(
    req: HttpRequest,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    auth.revoke(req.headers()).await?;

    Ok(HttpResponse::NoContent().finish())
}

use actix_web::{web, HttpResponse};

use crate::auth::AuthService;
use crate::configuration::ApplicationSettings;
use crate::error::AppError;

/// POST /admin/reset
///
/// Deletes every user and refresh token. Only allowed on the `dev` platform.
pub async fn reset(
    application: web::Data<ApplicationSettings>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    if !application.allows_destructive_ops() {
        return Err(AppError::Forbidden(format!(
            "reset attempted on platform {:?}",
            application.platform
        )));
    }

    let deleted = auth.delete_all_users().await?;

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(format!("Deleted {} users", deleted)))
}

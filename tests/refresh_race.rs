//! Refresh racing revoke on the same token through the service layer.

mod common;

use std::sync::Arc;

use actix_web::http::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use chirpy_auth::auth::{validate_access_token, AuthService};
use chirpy_auth::error::{AppError, AuthError};
use chirpy_auth::persistence::InMemoryRepository;
use common::{auth_settings, SECRET};

fn bearer(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );
    headers
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn refresh_racing_revoke_is_all_or_nothing() {
    let repository = Arc::new(InMemoryRepository::new());
    let service = Arc::new(AuthService::new(
        repository.clone(),
        repository,
        auth_settings(),
    ));
    let user = service
        .register("walt@breakingbad.com", "04234")
        .await
        .unwrap();
    let session = service
        .login("walt@breakingbad.com", "04234", None)
        .await
        .unwrap();
    let headers = bearer(&session.refresh_token);

    let mut refreshes = Vec::new();
    for _ in 0..32 {
        let service = service.clone();
        let headers = headers.clone();
        refreshes.push(tokio::spawn(async move { service.refresh(&headers).await }));
    }
    let revoke = {
        let service = service.clone();
        let headers = headers.clone();
        tokio::spawn(async move { service.revoke(&headers).await })
    };

    revoke.await.unwrap().expect("Revoke should succeed");

    for handle in refreshes {
        match handle.await.unwrap() {
            Ok(token) => assert_eq!(validate_access_token(&token, SECRET).unwrap(), user.id),
            Err(AppError::Auth(AuthError::InvalidToken)) => (),
            Err(other) => panic!("Unexpected refresh outcome: {:?}", other),
        }
    }

    // Once revoke has returned, no refresh may succeed
    assert!(matches!(
        service.refresh(&headers).await,
        Err(AppError::Auth(AuthError::InvalidToken))
    ));
}

use std::net::TcpListener;
use std::sync::Arc;

use chirpy_auth::auth::{AuthService, MIN_HASH_COST};
use chirpy_auth::configuration::{ApplicationSettings, AuthSettings};
use chirpy_auth::persistence::InMemoryRepository;
use chirpy_auth::startup::run;
use serde_json::{json, Value};

pub const SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

pub fn auth_settings() -> AuthSettings {
    AuthSettings {
        secret: SECRET.to_string(),
        access_token_expiry: 3600,
        access_token_max_expiry: 3600,
        refresh_token_expiry: 60 * 24 * 3600,
        hash_cost: MIN_HASH_COST,
    }
}

pub fn spawn_app() -> TestApp {
    spawn_app_on_platform("dev")
}

pub fn spawn_app_on_platform(platform: &str) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let repository = Arc::new(InMemoryRepository::new());
    let auth_service = AuthService::new(repository.clone(), repository, auth_settings());
    let application = ApplicationSettings {
        host: "127.0.0.1".to_string(),
        port,
        platform: platform.to_string(),
    };

    let server = run(listener, auth_service, application).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(&format!("{}{}", self.address, path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_with_bearer(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .post(&format!("{}{}", self.address, path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn register(&self, email: &str, password: &str) -> Value {
        let response = self
            .post_json("/api/users", &json!({ "email": email, "password": password }))
            .await;
        assert_eq!(201, response.status().as_u16());
        response.json().await.expect("Failed to parse response")
    }

    pub async fn login(&self, email: &str, password: &str) -> Value {
        let response = self
            .post_json("/api/login", &json!({ "email": email, "password": password }))
            .await;
        assert_eq!(200, response.status().as_u16());
        response.json().await.expect("Failed to parse response")
    }
}

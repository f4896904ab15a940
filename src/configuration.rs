use crate::auth::{MAX_HASH_COST, MIN_HASH_COST};
use crate::error::ConfigError;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub auth: AuthSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
    /// Deployment flag. Only `dev` allows destructive admin operations.
    #[serde(default)]
    pub platform: String,
}

impl ApplicationSettings {
    pub fn allows_destructive_ops(&self) -> bool {
        self.platform == "dev"
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }
}

/// Token and password hashing settings
#[derive(serde::Deserialize, Clone)]
pub struct AuthSettings {
    pub secret: String,
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry: i64,       // seconds (e.g., 3600 for 1 hour)
    #[serde(default = "default_access_token_expiry")]
    pub access_token_max_expiry: i64,   // ceiling for client-requested expiry
    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry: i64,      // seconds (e.g., 5184000 for 60 days)
    #[serde(default = "default_hash_cost")]
    pub hash_cost: u32,
}

fn default_access_token_expiry() -> i64 {
    3600
}

fn default_refresh_token_expiry() -> i64 {
    60 * 24 * 3600
}

fn default_hash_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

impl AuthSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("auth.secret".to_string()));
        }
        if self.access_token_expiry <= 0 || self.refresh_token_expiry <= 0 {
            return Err(ConfigError::InvalidValue(
                "token expiry must be positive".to_string(),
            ));
        }
        if self.access_token_max_expiry < self.access_token_expiry {
            return Err(ConfigError::InvalidValue(
                "auth.access_token_max_expiry is below auth.access_token_expiry".to_string(),
            ));
        }
        if !(MIN_HASH_COST..=MAX_HASH_COST).contains(&self.hash_cost) {
            return Err(ConfigError::InvalidValue(format!(
                "auth.hash_cost must be between {} and {}",
                MIN_HASH_COST, MAX_HASH_COST
            )));
        }
        Ok(())
    }
}

/// Load settings from an optional `configuration` file, overridden by
/// `APP_`-prefixed environment variables (e.g. `APP_AUTH__SECRET`).
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;
    let settings = settings.try_deserialize::<Settings>()?;
    settings.auth.validate()?;
    Ok(settings)
}

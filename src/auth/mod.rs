/// Authentication module
///
/// Password hashing, bearer extraction, JWT access tokens, refresh token
/// management, and the service that ties them together.

mod bearer;
mod claims;
mod jwt;
mod password;
mod refresh_token;
mod service;

pub use bearer::extract_bearer_token;
pub use claims::{Claims, ISSUER};
pub use jwt::generate_access_token;
pub use jwt::validate_access_token;
pub use password::{hash_password_with_cost, verify_password};
pub use password::{MAX_HASH_COST, MAX_PASSWORD_BYTES, MIN_HASH_COST};
pub use refresh_token::RefreshTokenStore;
pub use service::{AuthService, Session};

/// In-memory repository
///
/// Backs both repository traits with maps behind one async `RwLock`. Each
/// operation holds the lock for its whole duration, so reads and the
/// revoke update on a token never interleave.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Credential, RefreshTokenRecord, RefreshTokenRepository, User, UserRepository};
use crate::error::DatabaseError;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, Credential>,
    refresh_tokens: HashMap<String, RefreshTokenRecord>,
}

#[derive(Default)]
pub struct InMemoryRepository {
    tables: RwLock<Tables>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|c| c.user.email == email) {
            return Err(DatabaseError::UniqueConstraintViolation(
                "Email already registered".to_string(),
            ));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(
            user.id,
            Credential {
                user: user.clone(),
                password_hash: password_hash.to_string(),
            },
        );
        Ok(user)
    }

    async fn update_user(
        &self,
        id: Uuid,
        email: &str,
        password_hash: &str,
    ) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .values()
            .any(|c| c.user.email == email && c.user.id != id)
        {
            return Err(DatabaseError::UniqueConstraintViolation(
                "Email already registered".to_string(),
            ));
        }

        let credential = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::NotFound("User not found".to_string()))?;
        credential.user.email = email.to_string();
        credential.user.updated_at = Utc::now();
        credential.password_hash = password_hash.to_string();
        Ok(credential.user.clone())
    }

    async fn find_credential_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Credential>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|c| c.user.email == email)
            .cloned())
    }

    async fn delete_all_users(&self) -> Result<u64, DatabaseError> {
        let mut tables = self.tables.write().await;
        let deleted = tables.users.len() as u64;
        tables.users.clear();
        tables.refresh_tokens.clear();
        Ok(deleted)
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRepository {
    async fn insert_refresh_token(&self, record: &RefreshTokenRecord) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&record.user_id) {
            return Err(DatabaseError::QueryExecution(
                "refresh token references unknown user".to_string(),
            ));
        }
        if tables.refresh_tokens.contains_key(&record.token_hash) {
            return Err(DatabaseError::UniqueConstraintViolation(
                "Refresh token already exists".to_string(),
            ));
        }
        tables
            .refresh_tokens
            .insert(record.token_hash.clone(), record.clone());
        Ok(())
    }

    async fn find_refresh_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.refresh_tokens.get(token_hash).cloned())
    }

    async fn mark_refresh_token_revoked(
        &self,
        token_hash: &str,
        revoked_at: DateTime<Utc>,
    ) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        match tables.refresh_tokens.get_mut(token_hash) {
            None => Ok(false),
            Some(record) => {
                record.revoked_at.get_or_insert(revoked_at);
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record_for(user_id: Uuid, key: &str) -> RefreshTokenRecord {
        let now = Utc::now();
        RefreshTokenRecord {
            token_hash: key.to_string(),
            user_id,
            created_at: now,
            expires_at: now + Duration::days(60),
            revoked_at: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let repo = InMemoryRepository::new();
        repo.create_user("walt@breakingbad.com", "hash").await.unwrap();

        let result = repo.create_user("walt@breakingbad.com", "hash").await;
        assert!(matches!(result, Err(DatabaseError::UniqueConstraintViolation(_))));
    }

    #[tokio::test]
    async fn test_update_replaces_credential() {
        let repo = InMemoryRepository::new();
        let user = repo.create_user("walt@breakingbad.com", "old").await.unwrap();

        let updated = repo
            .update_user(user.id, "heisenberg@breakingbad.com", "new")
            .await
            .unwrap();
        assert_eq!(updated.id, user.id);

        assert!(repo
            .find_credential_by_email("walt@breakingbad.com")
            .await
            .unwrap()
            .is_none());
        let credential = repo
            .find_credential_by_email("heisenberg@breakingbad.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(credential.password_hash, "new");
    }

    #[tokio::test]
    async fn test_revoke_keeps_first_timestamp() {
        let repo = InMemoryRepository::new();
        let user = repo.create_user("walt@breakingbad.com", "hash").await.unwrap();
        repo.insert_refresh_token(&record_for(user.id, "key")).await.unwrap();

        let first = Utc::now();
        assert!(repo.mark_refresh_token_revoked("key", first).await.unwrap());
        assert!(repo
            .mark_refresh_token_revoked("key", first + Duration::minutes(5))
            .await
            .unwrap());

        let record = repo.find_refresh_token("key").await.unwrap().unwrap();
        assert_eq!(record.revoked_at, Some(first));
        assert!(!repo.mark_refresh_token_revoked("missing", first).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_all_users_removes_tokens() {
        let repo = InMemoryRepository::new();
        let user = repo.create_user("walt@breakingbad.com", "hash").await.unwrap();
        repo.insert_refresh_token(&record_for(user.id, "key")).await.unwrap();

        assert_eq!(repo.delete_all_users().await.unwrap(), 1);
        assert!(repo.find_refresh_token("key").await.unwrap().is_none());
    }
}

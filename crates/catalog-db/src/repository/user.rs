//! # User Repository
//!
//! Login principals. The password hash lives only in [`UserRecord`]; every
//! public result is a [`User`] without it.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use catalog_core::{NewUser, User};

const USER_COLUMNS: &str = "id, username, email, created_at, updated_at";

/// A users row including the stored hash.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// Drops the hash.
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Looks up exactly one user by username, hash included.
    pub async fn find_by_username(&self, username: &str) -> DbResult<Option<UserRecord>> {
        debug!(username = %username, "Looking up user");

        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, username, email, password_hash, created_at, updated_at
            FROM users
            WHERE username = ?1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Inserts a user and returns it without the hash.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - Username or email already taken
    pub async fn insert(&self, new_user: &NewUser) -> DbResult<User> {
        debug!(username = %new_user.username, "Inserting user");

        let now = Utc::now();
        let sql = format!(
            r#"
            INSERT INTO users (id, username, email, password_hash, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4().to_string())
            .bind(&new_user.username)
            .bind(&new_user.email)
            .bind(&new_user.password_hash)
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                DbError::from(e).with_conflicting_value(|column| match column {
                    "username" => Some(new_user.username.clone()),
                    "email" => Some(new_user.email.clone()),
                    _ => None,
                })
            })?;

        Ok(user)
    }

    /// Lists users, newest first.
    pub async fn list(&self) -> DbResult<Vec<User>> {
        let sql = format!(
            "SELECT {} FROM users ORDER BY created_at DESC, rowid DESC",
            USER_COLUMNS
        );

        let users = sqlx::query_as::<_, User>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use catalog_core::password::hash_password;

    async fn repo() -> UserRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().users()
    }

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: hash_password("secret1"),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let repo = repo().await;

        let user = repo.insert(&new_user("alice", "alice@example.com")).await.unwrap();
        assert_eq!(user.username, "alice");

        let record = repo.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(record.password_hash, hash_password("secret1"));
        assert_eq!(record.into_user(), user);

        assert!(repo.find_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_username_and_email_are_unique() {
        let repo = repo().await;
        repo.insert(&new_user("alice", "alice@example.com")).await.unwrap();

        match repo.insert(&new_user("alice", "other@example.com")).await {
            Err(DbError::UniqueViolation { field, value }) => {
                assert_eq!(field, "username");
                assert_eq!(value, "alice");
            }
            other => panic!("expected UniqueViolation, got {:?}", other),
        }

        let err = repo
            .insert(&new_user("alice2", "alice@example.com"))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let repo = repo().await;
        repo.insert(&new_user("first", "first@example.com")).await.unwrap();
        repo.insert(&new_user("second", "second@example.com")).await.unwrap();

        let names: Vec<String> = repo.list().await.unwrap().into_iter().map(|u| u.username).collect();
        assert_eq!(names, vec!["second", "first"]);
        assert_eq!(repo.count().await.unwrap(), 2);
    }
}

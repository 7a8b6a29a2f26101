//! # User Commands
//!
//! Account creation and listing. Users always live in the SQLite record
//! store, whatever the product backend is.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use catalog_core::password::{hash_with, PasswordScheme};
use catalog_core::validation::AccountForm;
use catalog_core::{NewUser, User};
use catalog_db::UserRepository;

use crate::error::{ApiError, ApiResult};

/// User DTO. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        UserDto {
            id: u.id,
            username: u.username,
            email: u.email,
            created_at: u.created_at,
        }
    }
}

/// Creates a user from the account form.
///
/// ## Returns
/// * `Err(VALIDATION_ERROR)` - Any form field invalid (all reported)
/// * `Err(CONFLICT)` - Username or email taken
pub async fn create_user(
    users: &UserRepository,
    form: &AccountForm,
    scheme: PasswordScheme,
) -> ApiResult<UserDto> {
    let account = form.validate()?;
    debug!(username = %account.username, "create_user command");

    let password_hash = hash_with(scheme, &account.password)?;
    let user = users
        .insert(&NewUser {
            username: account.username,
            email: account.email,
            password_hash,
        })
        .await
        .map_err(|e| {
            if e.is_conflict() {
                ApiError::conflict("Username or email already exists")
            } else {
                e.into()
            }
        })?;

    info!(username = %user.username, "User created");
    Ok(user.into())
}

/// Lists users, newest first.
pub async fn list_users(users: &UserRepository) -> ApiResult<Vec<UserDto>> {
    let users = users.list().await?;
    Ok(users.into_iter().map(UserDto::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use catalog_core::password::verify_password;
    use catalog_db::{Database, DbConfig};

    fn account(username: &str, email: &str) -> AccountForm {
        AccountForm {
            username: username.to_string(),
            email: email.to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let users = db.users();

        let alice = create_user(&users, &account("alice", "alice@example.com"), PasswordScheme::Sha256)
            .await
            .unwrap();
        assert_eq!(alice.username, "alice");

        let record = users.find_by_username("alice").await.unwrap().unwrap();
        assert!(verify_password("secret1", &record.password_hash));

        create_user(&users, &account("bob", "bob@example.com"), PasswordScheme::Argon2)
            .await
            .unwrap();
        let record = users.find_by_username("bob").await.unwrap().unwrap();
        assert!(record.password_hash.starts_with("$argon2"));

        let names: Vec<String> = list_users(&users)
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(names, vec!["bob", "alice"]);
    }

    #[tokio::test]
    async fn test_duplicate_account_is_conflict() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let users = db.users();
        create_user(&users, &account("alice", "alice@example.com"), PasswordScheme::Sha256)
            .await
            .unwrap();

        let err = create_user(&users, &account("alice", "new@example.com"), PasswordScheme::Sha256)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
        assert_eq!(err.message, "Username or email already exists");
    }

    #[tokio::test]
    async fn test_invalid_form_reports_every_field() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let form = AccountForm {
            username: "".to_string(),
            email: "not-an-email".to_string(),
            password: "123".to_string(),
            confirm_password: "1234".to_string(),
        };

        let err = create_user(&db.users(), &form, PasswordScheme::Sha256)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.field("username").is_some());
        assert!(err.field("email").is_some());
        assert!(err.field("password").is_some());
        assert!(err.field("confirm password").is_some());
    }
}

//! # Auth Commands
//!
//! `login`, `logout` and `whoami`, plus the gate product commands pass
//! through when `require_login` is set.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use catalog_core::{Session, ValidationError, ValidationErrors};

use super::user::UserDto;
use crate::auth::Authenticator;
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDto {
    pub user: UserDto,
    pub started_at: DateTime<Utc>,
}

impl From<Session> for SessionDto {
    fn from(s: Session) -> Self {
        SessionDto {
            user: s.user.into(),
            started_at: s.started_at,
        }
    }
}

/// Logs in. Both fields are required before the store is asked.
pub async fn login(auth: &Authenticator, username: &str, password: &str) -> ApiResult<UserDto> {
    debug!(username = %username, "login command");

    let mut errors = ValidationErrors::new();
    if username.trim().is_empty() {
        errors.push(ValidationError::Required {
            field: "username".to_string(),
        });
    }
    if password.is_empty() {
        errors.push(ValidationError::Required {
            field: "password".to_string(),
        });
    }
    errors.into_result(())?;

    let user = auth.login(username, password).await?;
    Ok(user.into())
}

pub fn logout(auth: &Authenticator) -> ApiResult<()> {
    debug!("logout command");
    auth.logout()?;
    Ok(())
}

/// The current session, if any.
pub fn whoami(auth: &Authenticator) -> Option<SessionDto> {
    auth.current_session().map(SessionDto::from)
}

/// Fails with `UNAUTHENTICATED` when login is required and nobody is logged in.
pub fn ensure_logged_in(auth: &Authenticator, require_login: bool) -> ApiResult<()> {
    if require_login {
        auth.require_session().map_err(ApiError::from)?;
    }
    Ok(())
}

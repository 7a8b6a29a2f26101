//! # Authentication Flow
//!
//! ## Login State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   LoggedOut ──login()──► Authenticating ──ok──► LoggedIn(user)         │
//! │       ▲                        │                     │                  │
//! │       └──────── error ─────────┘                     │                  │
//! │       ▲                                              │                  │
//! │       └─────────────────── logout() ─────────────────┘                  │
//! │                                                                         │
//! │   restore() at startup: stored session ──► LoggedIn(user)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Login looks up exactly one user by username and compares password
//! digests. "No such user" and "wrong password" are the same error.
//! Concurrent logins are not de-duplicated; the last one to finish wins.

use std::sync::Mutex;

use chrono::Utc;
use tracing::{error, info, warn};

use catalog_core::password::verify_password;
use catalog_core::{Session, User};
use catalog_db::UserRepository;

use crate::error::{AuthError, StorageError};
use crate::state::SessionStore;

/// Where the login flow currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    LoggedOut,
    Authenticating,
    LoggedIn(User),
}

pub struct Authenticator {
    users: UserRepository,
    sessions: SessionStore,
    state: Mutex<AuthState>,
}

impl Authenticator {
    pub fn new(users: UserRepository, sessions: SessionStore) -> Self {
        Authenticator {
            users,
            sessions,
            state: Mutex::new(AuthState::LoggedOut),
        }
    }

    pub fn state(&self) -> AuthState {
        self.state.lock().expect("Auth state mutex poisoned").clone()
    }

    fn set_state(&self, state: AuthState) {
        *self.state.lock().expect("Auth state mutex poisoned") = state;
    }

    /// Picks up a session stored by an earlier process.
    pub fn restore(&self) -> Option<Session> {
        let session = self.sessions.load();
        match &session {
            Some(s) => self.set_state(AuthState::LoggedIn(s.user.clone())),
            None => self.set_state(AuthState::LoggedOut),
        }
        session
    }

    /// The stored session, if any. Never touches the record store.
    pub fn current_session(&self) -> Option<Session> {
        self.sessions.load()
    }

    /// The stored session, or `NotLoggedIn`.
    pub fn require_session(&self) -> Result<Session, AuthError> {
        self.current_session().ok_or(AuthError::NotLoggedIn)
    }

    /// Checks credentials and starts a session.
    ///
    /// ## Returns
    /// * `Ok(User)` - The user, without password hash
    /// * `Err(AuthError::InvalidCredentials)` - Unknown user or wrong password
    /// * `Err(AuthError::Unavailable)` - Store or session storage failed
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        self.set_state(AuthState::Authenticating);

        match self.authenticate(username, password).await {
            Ok(user) => {
                info!(username = %user.username, "Login successful");
                self.set_state(AuthState::LoggedIn(user.clone()));
                Ok(user)
            }
            Err(e) => {
                warn!(username = %username, error = %e, "Login failed");
                self.set_state(AuthState::LoggedOut);
                Err(e)
            }
        }
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let record = self
            .users
            .find_by_username(username)
            .await
            .map_err(|e| {
                error!(error = %e, "User lookup failed");
                AuthError::Unavailable
            })?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &record.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        let user = record.into_user();
        self.sessions
            .save(&Session::new(user.clone(), Utc::now()))
            .map_err(|e| {
                error!(error = %e, "Could not store session");
                AuthError::Unavailable
            })?;

        Ok(user)
    }

    /// Ends the session. Logging out twice is fine.
    pub fn logout(&self) -> Result<(), StorageError> {
        if let AuthState::LoggedIn(user) = self.state() {
            info!(username = %user.username, "Logging out");
        }
        self.set_state(AuthState::LoggedOut);
        self.sessions.clear()
    }
}

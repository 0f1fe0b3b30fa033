//! Explicit user sessions.
//!
//! Identity comes from the auth collaborator. A [`Session`] is handed out at login and
//! passed into every order operation; logging out flips a shared flag, so clones held by
//! trackers or checkout observe the logout too.

use crate::model::UserId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session for {0} has ended")]
    Inactive(UserId),

    #[error("No user is logged in")]
    NotLoggedIn,
}

#[derive(Debug, Clone)]
pub struct Session {
    user_id: UserId,
    display_name: String,
    active: Arc<AtomicBool>,
}

impl Session {
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// First name used in notifications. May be empty.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub fn require_active(&self) -> Result<(), SessionError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(SessionError::Inactive(self.user_id.clone()))
        }
    }

    fn invalidate(&self) {
        self.active.store(false, Ordering::Release);
    }
}

/// Holds the one live session of this client.
#[derive(Debug, Default)]
pub struct SessionManager {
    current: Option<Session>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a session, ending any previous one.
    pub fn login(&mut self, user_id: UserId, display_name: impl Into<String>) -> Session {
        self.logout();
        let session = Session {
            user_id,
            display_name: display_name.into(),
            active: Arc::new(AtomicBool::new(true)),
        };
        info!(user_id = %session.user_id, "Logged in");
        self.current = Some(session.clone());
        session
    }

    pub fn logout(&mut self) {
        if let Some(session) = self.current.take() {
            session.invalidate();
            info!(user_id = %session.user_id, "Logged out");
        }
    }

    pub fn current(&self) -> Result<&Session, SessionError> {
        self.current.as_ref().ok_or(SessionError::NotLoggedIn)
    }
}

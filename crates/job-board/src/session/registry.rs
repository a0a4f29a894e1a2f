use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tracing::info;

use super::{Credentials, IssuedSession, Session, SessionToken};
use crate::config::{AdminCredentials, AuthConfig};
use crate::identity::{Principal, Role};

/// In-process table of live sessions keyed by bearer token.
///
/// Job seeker and employer logins are self-asserted; admin logins are checked
/// against the configured credentials and refused when none are configured.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    admin: Option<AdminCredentials>,
    sessions: Mutex<HashMap<SessionToken, Session>>,
}

impl SessionRegistry {
    pub fn new(auth: &AuthConfig) -> Self {
        Self {
            admin: auth.admin.clone(),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn login(
        &self,
        credentials: Credentials,
        now: DateTime<Utc>,
    ) -> Result<IssuedSession, AuthError> {
        let email = credentials.email.trim();
        if email.is_empty() {
            return Err(AuthError::MissingEmail);
        }
        if !email.contains('@') {
            return Err(AuthError::InvalidEmail);
        }

        match credentials.role {
            Role::Guest => return Err(AuthError::RoleNotPermitted(Role::Guest)),
            Role::Admin => {
                let admin = self.admin.as_ref().ok_or(AuthError::AdminDisabled)?;
                let password = credentials.password.as_deref().unwrap_or_default();
                if !admin.email.eq_ignore_ascii_case(email) || admin.password != password {
                    return Err(AuthError::InvalidCredentials);
                }
            }
            Role::JobSeeker | Role::Employer => {}
        }

        let session = Session {
            principal: Principal::new(email),
            role: credentials.role,
            started_at: now,
        };
        let token = SessionToken::generate();
        self.table().insert(token.clone(), session.clone());

        info!(principal = %session.principal, role = %session.role, "session started");
        Ok(IssuedSession { token, session })
    }

    pub fn resolve(&self, token: &SessionToken) -> Option<Session> {
        self.table().get(token).cloned()
    }

    /// Returns the ended session, if the token was live.
    pub fn logout(&self, token: &SessionToken) -> Option<Session> {
        let ended = self.table().remove(token);
        if let Some(session) = &ended {
            info!(principal = %session.principal, "session ended");
        }
        ended
    }

    pub fn active(&self) -> usize {
        self.table().len()
    }

    fn table(&self) -> MutexGuard<'_, HashMap<SessionToken, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("an e-mail address is required")]
    MissingEmail,
    #[error("the e-mail address is not valid")]
    InvalidEmail,
    #[error("role '{0}' cannot sign in")]
    RoleNotPermitted(Role),
    #[error("admin login is not configured")]
    AdminDisabled,
    #[error("invalid admin credentials")]
    InvalidCredentials,
}

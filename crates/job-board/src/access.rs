//! Role-gated access checks shared by the HTTP routes and the client workflow.
//!
//! The client uses the gate to decide what to render; the backend applies the
//! same gate to every protected operation before touching any store.

use std::fmt;

use crate::identity::Role;
use crate::session::Session;

/// Route a denied caller is sent back to.
pub const LOGIN_PATH: &str = "/login";

pub const EMPLOYER_ONLY: RoleGate = RoleGate::new(&[Role::Employer]);
pub const JOB_SEEKER_ONLY: RoleGate = RoleGate::new(&[Role::JobSeeker]);
pub const ADMIN_ONLY: RoleGate = RoleGate::new(&[Role::Admin]);
pub const DIRECTORY_READERS: RoleGate = RoleGate::new(&[Role::Employer, Role::Admin]);
pub const ANY_MEMBER: RoleGate = RoleGate::new(&[Role::JobSeeker, Role::Employer, Role::Admin]);

/// Set of roles permitted to reach a view or operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleGate {
    allowed: &'static [Role],
}

impl RoleGate {
    pub const fn new(allowed: &'static [Role]) -> Self {
        Self { allowed }
    }

    pub fn allowed(&self) -> &'static [Role] {
        self.allowed
    }

    pub fn permits(&self, role: Role) -> bool {
        self.allowed.contains(&role)
    }

    /// Grant only when a session exists and its role is an exact member of the gate.
    pub fn check<'a>(&self, session: Option<&'a Session>) -> AccessDecision<'a> {
        match session {
            Some(session) if self.permits(session.role) => AccessDecision::Granted(session),
            Some(session) => AccessDecision::Denied(self.denial(Some(session.role))),
            None => AccessDecision::Denied(self.denial(None)),
        }
    }

    pub fn authorize<'a>(&self, session: &'a Session) -> Result<&'a Session, AccessDenied> {
        self.check(Some(session)).into_result()
    }

    fn denial(&self, actual: Option<Role>) -> AccessDenied {
        AccessDenied {
            required: self.allowed.to_vec(),
            actual,
            login_path: LOGIN_PATH,
        }
    }
}

/// Outcome of a gate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision<'a> {
    Granted(&'a Session),
    Denied(AccessDenied),
}

impl<'a> AccessDecision<'a> {
    pub fn is_granted(&self) -> bool {
        matches!(self, AccessDecision::Granted(_))
    }

    pub fn into_result(self) -> Result<&'a Session, AccessDenied> {
        match self {
            AccessDecision::Granted(session) => Ok(session),
            AccessDecision::Denied(denied) => Err(denied),
        }
    }
}

/// Access-denied affordance: what was required and where to authenticate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDenied {
    pub required: Vec<Role>,
    pub actual: Option<Role>,
    pub login_path: &'static str,
}

impl fmt::Display for AccessDenied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let required = self
            .required
            .iter()
            .map(|role| role.label())
            .collect::<Vec<_>>()
            .join(" or ");
        match self.actual {
            Some(role) => write!(f, "access denied: requires {required} (signed in as {role})"),
            None => write!(f, "access denied: sign in as {required} at {}", self.login_path),
        }
    }
}

impl std::error::Error for AccessDenied {}

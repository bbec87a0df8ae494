//! Resolution outcomes.
//!
//! "No access" is a normal value here, never an `Err`. Callers that want a
//! `Result` use [`Outcome::into_result`].

use std::fmt;

use hyper::StatusCode;
use serde::Serialize;

use crate::error::Error;
use crate::role::Role;

/// Why access was denied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    Excluded,
    PersonalProject,
    ExplicitMembershipRequired,
    NoTeamAccess,
    NotPublic,
    NotOrgMember,
    InsufficientRole,
    ProjectNotFound,
    AccessDenied,
}

impl Reason {
    pub fn as_str(self) -> &'static str {
        match self {
            Reason::Excluded => "excluded",
            Reason::PersonalProject => "personal_project",
            Reason::ExplicitMembershipRequired => "explicit_membership_required",
            Reason::NoTeamAccess => "no_team_access",
            Reason::NotPublic => "not_public",
            Reason::NotOrgMember => "not_org_member",
            Reason::InsufficientRole => "insufficient_role",
            Reason::ProjectNotFound => "project_not_found",
            Reason::AccessDenied => "access_denied",
        }
    }

    /// `project_not_found` is a 404, everything else a 403.
    pub fn status_code(self) -> StatusCode {
        match self {
            Reason::ProjectNotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::FORBIDDEN,
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The result of one access resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Granted(Role),
    Denied(Reason),
    /// The user has access, but below the required bar.
    InsufficientRole { actual: Role, required: Role },
}

impl Outcome {
    /// Check `role` against an optional minimum.
    pub fn validate(role: Role, required: Option<Role>) -> Outcome {
        match required {
            Some(required) if !role.satisfies(required) => Outcome::InsufficientRole {
                actual: role,
                required,
            },
            _ => Outcome::Granted(role),
        }
    }

    pub fn is_granted(&self) -> bool {
        matches!(self, Outcome::Granted(_))
    }

    /// The granted role, if any.
    pub fn role(&self) -> Option<Role> {
        match self {
            Outcome::Granted(role) => Some(*role),
            _ => None,
        }
    }

    pub fn reason(&self) -> Option<Reason> {
        match self {
            Outcome::Granted(_) => None,
            Outcome::Denied(reason) => Some(*reason),
            Outcome::InsufficientRole { .. } => Some(Reason::InsufficientRole),
        }
    }

    pub fn into_result(self) -> crate::Result<Role> {
        match self {
            Outcome::Granted(role) => Ok(role),
            Outcome::Denied(reason) => Err(Error::Forbidden(reason)),
            Outcome::InsufficientRole { actual, required } => {
                Err(Error::InsufficientRole { actual, required })
            }
        }
    }
}

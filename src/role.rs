//! Role hierarchy for project access.
//!
//! Roles are totally ordered: `viewer < member < editor < admin < owner`.
//! The rank table is a process-wide constant; it never changes at runtime.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// A project role. Declaration order is rank order, so `Ord` follows the hierarchy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Viewer,
    Member,
    Editor,
    Admin,
    Owner,
}

/// Rank of every known role string. Anything not listed ranks 0.
const RANKS: [(&str, u8); 5] = [
    ("viewer", 1),
    ("member", 2),
    ("editor", 3),
    ("admin", 4),
    ("owner", 5),
];

/// Rank of a role string; unrecognized strings rank 0.
pub fn rank(role: &str) -> u8 {
    RANKS
        .iter()
        .find(|(name, _)| *name == role)
        .map(|(_, rank)| *rank)
        .unwrap_or(0)
}

/// Whether `actual` meets the bar set by `required`.
///
/// An unrecognized `actual` is never sufficient. Never fails; callers turn
/// `false` into a denial.
pub fn sufficient(actual: &str, required: &str) -> bool {
    let actual = rank(actual);
    actual > 0 && actual >= rank(required)
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Viewer,
        Role::Member,
        Role::Editor,
        Role::Admin,
        Role::Owner,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Viewer => "viewer",
            Role::Member => "member",
            Role::Editor => "editor",
            Role::Admin => "admin",
            Role::Owner => "owner",
        }
    }

    pub fn rank(self) -> u8 {
        rank(self.as_str())
    }

    /// Whether this role meets `required`.
    pub fn satisfies(self, required: Role) -> bool {
        sufficient(self.as_str(), required.as_str())
    }

    /// Parse a role string, `None` if it is not one of the five known roles.
    pub fn parse(s: &str) -> Option<Role> {
        Role::ALL.into_iter().find(|r| r.as_str() == s)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::parse(s).ok_or_else(|| Error::CorruptData(format!("unknown role: {s}")))
    }
}

/// A user's role within a team.
///
/// Leads are escalated to at least `admin` on projects their team can reach.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamRole {
    #[default]
    Member,
    Lead,
}

impl TeamRole {
    /// Any team role other than `lead` is an ordinary membership.
    pub fn parse(s: &str) -> TeamRole {
        if s == "lead" {
            TeamRole::Lead
        } else {
            TeamRole::Member
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TeamRole::Member => "member",
            TeamRole::Lead => "lead",
        }
    }
}

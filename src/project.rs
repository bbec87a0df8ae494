//! Fact records the resolver reads.
//!
//! All of these are owned and mutated elsewhere (membership, sharing and
//! exclusion endpoints). The resolver only reads them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;
use crate::role::Role;

/// Access-model tier a project operates under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Personal,
    Team,
    Organization,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Personal => "personal",
            Scope::Team => "team",
            Scope::Organization => "organization",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = Error;

    /// Case-insensitive, so both `team` and `TEAM` parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "personal" => Ok(Scope::Personal),
            "team" => Ok(Scope::Team),
            "organization" => Ok(Scope::Organization),
            _ => Err(Error::CorruptData(format!("unknown project scope: {s}"))),
        }
    }
}

/// The resource being protected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub scope: Scope,
    /// Creator of the project.
    pub owner_id: String,
    /// Parent project, if this is a subproject.
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Primary team. Its organization is the one consulted for org-public access.
    #[serde(default)]
    pub team_id: Option<String>,
    /// TEAM scope only: every member of a linked team gets access unless excluded.
    #[serde(default)]
    pub allow_all_team_members: bool,
    /// ORGANIZATION scope only: expose the project to all members of the organization.
    #[serde(default)]
    pub is_org_public: bool,
    #[serde(default = "default_org_public_role")]
    pub org_public_role: Role,
}

fn default_org_public_role() -> Role {
    Role::Viewer
}

impl Project {
    /// A top-level project with every switch off.
    pub fn new(id: impl Into<String>, scope: Scope, owner_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            scope,
            owner_id: owner_id.into(),
            parent_id: None,
            team_id: None,
            allow_all_team_members: false,
            is_org_public: false,
            org_public_role: default_org_public_role(),
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_team(mut self, team_id: impl Into<String>) -> Self {
        self.team_id = Some(team_id.into());
        self
    }

    pub fn allow_all_team_members(mut self, allow: bool) -> Self {
        self.allow_all_team_members = allow;
        self
    }

    pub fn org_public(mut self, role: Role) -> Self {
        self.is_org_public = true;
        self.org_public_role = role;
        self
    }
}

/// A team linked to a project, joined with the team's owner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TeamLink {
    pub team_id: String,
    /// Default role for members of this team on the project.
    pub role: Role,
    pub team_owner_id: String,
}

/// The per-(project, user) rows consulted before any scope strategy runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DirectGrants {
    pub membership: Option<Role>,
    pub share: Option<Role>,
    pub excluded: bool,
}

//! Scope strategies.
//!
//! One strategy per [`Scope`]. Each either grants a role or denies with the
//! reason specific to that scope. Dispatch is a plain match on the enum.

use tracing::debug;

use crate::Result;
use crate::facts::Facts;
use crate::project::{Project, Scope};
use crate::outcome::Reason;
use crate::role::{Role, TeamRole};

/// What a single step of the cascade decided.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Grant(Role),
    Deny(Reason),
    /// This step has nothing to say; try the next one.
    Pass,
}

/// Run the strategy for the project's scope.
pub async fn evaluate<F: Facts>(facts: &F, project: &Project, user_id: &str) -> Result<Verdict> {
    match project.scope {
        Scope::Personal => Ok(personal(project, user_id)),
        Scope::Team => team(facts, project, user_id).await,
        Scope::Organization => organization(facts, project, user_id).await,
    }
}

/// Only the owner, always as `owner`.
pub fn personal(project: &Project, user_id: &str) -> Verdict {
    if project.owner_id == user_id {
        Verdict::Grant(Role::Owner)
    } else {
        Verdict::Deny(Reason::PersonalProject)
    }
}

/// Team members, only when the project is in blocklist mode.
pub async fn team<F: Facts>(facts: &F, project: &Project, user_id: &str) -> Result<Verdict> {
    if !project.allow_all_team_members {
        return Ok(Verdict::Deny(Reason::ExplicitMembershipRequired));
    }

    Ok(match best_team_role(facts, &project.id, user_id).await? {
        Some(role) => Verdict::Grant(role),
        None => Verdict::Deny(Reason::NoTeamAccess),
    })
}

/// Team access regardless of blocklist mode, then the org-public fallback.
pub async fn organization<F: Facts>(
    facts: &F,
    project: &Project,
    user_id: &str,
) -> Result<Verdict> {
    if let Some(role) = best_team_role(facts, &project.id, user_id).await? {
        return Ok(Verdict::Grant(role));
    }

    if !project.is_org_public {
        return Ok(Verdict::Deny(Reason::NotPublic));
    }

    let organization = match &project.team_id {
        Some(team_id) => facts.team_organization(team_id).await?,
        None => None,
    };
    let Some(organization) = organization else {
        debug!(project = %project.id, "org-public project has no owning organization");
        return Ok(Verdict::Deny(Reason::NotOrgMember));
    };

    if facts.is_org_member(&organization, user_id).await? {
        Ok(Verdict::Grant(project.org_public_role))
    } else {
        Ok(Verdict::Deny(Reason::NotOrgMember))
    }
}

/// Best role the user reaches through any team linked to the project.
///
/// A team owner gets `owner` immediately. Leads are lifted to at least
/// `admin`, never lowered. Across several teams the highest role wins.
pub async fn best_team_role<F: Facts>(
    facts: &F,
    project_id: &str,
    user_id: &str,
) -> Result<Option<Role>> {
    let mut best: Option<Role> = None;

    for link in facts.team_links(project_id).await? {
        if link.team_owner_id == user_id {
            return Ok(Some(Role::Owner));
        }

        let Some(team_role) = facts.team_membership(&link.team_id, user_id).await? else {
            continue;
        };

        let mut effective = link.role;
        if team_role == TeamRole::Lead && Role::Admin > effective {
            effective = Role::Admin;
        }
        best = best.max(Some(effective));
    }

    Ok(best)
}

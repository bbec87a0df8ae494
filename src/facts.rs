//! Storage collaborator interface.
//!
//! The resolver issues only these read queries. Implementations must not
//! cache across calls; each resolution reads current facts.

use std::future::Future;

use crate::Result;
use crate::project::{DirectGrants, Project, TeamLink};
use crate::role::{Role, TeamRole};

/// Read-only fact queries backing access resolution.
pub trait Facts: Send + Sync {
    /// Look up a project by id.
    fn project(&self, project_id: &str) -> impl Future<Output = Result<Option<Project>>> + Send;

    /// Role from an explicit membership row.
    fn membership(
        &self,
        project_id: &str,
        user_id: &str,
    ) -> impl Future<Output = Result<Option<Role>>> + Send;

    /// Role from a share row.
    fn share(
        &self,
        project_id: &str,
        user_id: &str,
    ) -> impl Future<Output = Result<Option<Role>>> + Send;

    /// Whether the user is on the project's blocklist.
    fn is_excluded(
        &self,
        project_id: &str,
        user_id: &str,
    ) -> impl Future<Output = Result<bool>> + Send;

    /// Every team linked to the project, with each team's owner.
    fn team_links(&self, project_id: &str) -> impl Future<Output = Result<Vec<TeamLink>>> + Send;

    /// The user's role in a team, if they belong to it.
    fn team_membership(
        &self,
        team_id: &str,
        user_id: &str,
    ) -> impl Future<Output = Result<Option<TeamRole>>> + Send;

    /// Organization that owns a team.
    fn team_organization(
        &self,
        team_id: &str,
    ) -> impl Future<Output = Result<Option<String>>> + Send;

    /// Whether the user belongs to the organization.
    fn is_org_member(
        &self,
        organization_id: &str,
        user_id: &str,
    ) -> impl Future<Output = Result<bool>> + Send;

    /// Membership, share and exclusion for one (project, user) pair.
    ///
    /// Backends that can answer all three in one round trip should override this.
    fn direct_grants(
        &self,
        project_id: &str,
        user_id: &str,
    ) -> impl Future<Output = Result<DirectGrants>> + Send {
        async move {
            Ok(DirectGrants {
                excluded: self.is_excluded(project_id, user_id).await?,
                membership: self.membership(project_id, user_id).await?,
                share: self.share(project_id, user_id).await?,
            })
        }
    }
}

impl<F: Facts> Facts for &F {
    fn project(&self, project_id: &str) -> impl Future<Output = Result<Option<Project>>> + Send {
        (**self).project(project_id)
    }

    fn membership(
        &self,
        project_id: &str,
        user_id: &str,
    ) -> impl Future<Output = Result<Option<Role>>> + Send {
        (**self).membership(project_id, user_id)
    }

    fn share(
        &self,
        project_id: &str,
        user_id: &str,
    ) -> impl Future<Output = Result<Option<Role>>> + Send {
        (**self).share(project_id, user_id)
    }

    fn is_excluded(
        &self,
        project_id: &str,
        user_id: &str,
    ) -> impl Future<Output = Result<bool>> + Send {
        (**self).is_excluded(project_id, user_id)
    }

    fn team_links(&self, project_id: &str) -> impl Future<Output = Result<Vec<TeamLink>>> + Send {
        (**self).team_links(project_id)
    }

    fn team_membership(
        &self,
        team_id: &str,
        user_id: &str,
    ) -> impl Future<Output = Result<Option<TeamRole>>> + Send {
        (**self).team_membership(team_id, user_id)
    }

    fn team_organization(
        &self,
        team_id: &str,
    ) -> impl Future<Output = Result<Option<String>>> + Send {
        (**self).team_organization(team_id)
    }

    fn is_org_member(
        &self,
        organization_id: &str,
        user_id: &str,
    ) -> impl Future<Output = Result<bool>> + Send {
        (**self).is_org_member(organization_id, user_id)
    }

    fn direct_grants(
        &self,
        project_id: &str,
        user_id: &str,
    ) -> impl Future<Output = Result<DirectGrants>> + Send {
        (**self).direct_grants(project_id, user_id)
    }
}

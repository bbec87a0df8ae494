//! In-memory fact store.
//!
//! Projects live in an id-indexed map so ancestors are fetched by id rather
//! than through object references. Useful for embedding and for tests.

use std::collections::{HashMap, HashSet};
use std::future::{Future, ready};

use crate::Result;
use crate::facts::Facts;
use crate::project::{Project, TeamLink};
use crate::role::{Role, TeamRole};

struct Team {
    owner_id: String,
    organization_id: Option<String>,
}

type Pair = (String, String);

fn pair(a: &str, b: &str) -> Pair {
    (a.to_string(), b.to_string())
}

/// `Facts` backed by plain maps.
#[derive(Default)]
pub struct MemoryFacts {
    projects: HashMap<String, Project>,
    memberships: HashMap<Pair, Role>,
    shares: HashMap<Pair, Role>,
    exclusions: HashSet<Pair>,
    teams: HashMap<String, Team>,
    /// project id -> (team id, role) in link order
    team_links: HashMap<String, Vec<(String, Role)>>,
    team_members: HashMap<Pair, TeamRole>,
    org_members: HashSet<Pair>,
}

impl MemoryFacts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a project.
    pub fn insert_project(&mut self, project: Project) -> &mut Self {
        self.projects.insert(project.id.clone(), project);
        self
    }

    pub fn add_member(&mut self, project_id: &str, user_id: &str, role: Role) -> &mut Self {
        self.memberships.insert(pair(project_id, user_id), role);
        self
    }

    pub fn add_share(&mut self, project_id: &str, user_id: &str, role: Role) -> &mut Self {
        self.shares.insert(pair(project_id, user_id), role);
        self
    }

    pub fn exclude(&mut self, project_id: &str, user_id: &str) -> &mut Self {
        self.exclusions.insert(pair(project_id, user_id));
        self
    }

    pub fn add_team(
        &mut self,
        team_id: &str,
        owner_id: &str,
        organization_id: Option<&str>,
    ) -> &mut Self {
        self.teams.insert(
            team_id.to_string(),
            Team {
                owner_id: owner_id.to_string(),
                organization_id: organization_id.map(str::to_string),
            },
        );
        self
    }

    /// Link a team to a project. Re-linking the same team replaces its role.
    pub fn link_team(&mut self, project_id: &str, team_id: &str, role: Role) -> &mut Self {
        let links = self.team_links.entry(project_id.to_string()).or_default();
        match links.iter_mut().find(|(id, _)| id == team_id) {
            Some(link) => link.1 = role,
            None => links.push((team_id.to_string(), role)),
        }
        self
    }

    pub fn add_team_member(&mut self, team_id: &str, user_id: &str, role: TeamRole) -> &mut Self {
        self.team_members.insert(pair(team_id, user_id), role);
        self
    }

    pub fn add_org_member(&mut self, organization_id: &str, user_id: &str) -> &mut Self {
        self.org_members.insert(pair(organization_id, user_id));
        self
    }
}

impl Facts for MemoryFacts {
    fn project(&self, project_id: &str) -> impl Future<Output = Result<Option<Project>>> + Send {
        ready(Ok(self.projects.get(project_id).cloned()))
    }

    fn membership(
        &self,
        project_id: &str,
        user_id: &str,
    ) -> impl Future<Output = Result<Option<Role>>> + Send {
        ready(Ok(self.memberships.get(&pair(project_id, user_id)).copied()))
    }

    fn share(
        &self,
        project_id: &str,
        user_id: &str,
    ) -> impl Future<Output = Result<Option<Role>>> + Send {
        ready(Ok(self.shares.get(&pair(project_id, user_id)).copied()))
    }

    fn is_excluded(
        &self,
        project_id: &str,
        user_id: &str,
    ) -> impl Future<Output = Result<bool>> + Send {
        ready(Ok(self.exclusions.contains(&pair(project_id, user_id))))
    }

    /// Links to teams that no longer exist are skipped, as an inner join would.
    fn team_links(&self, project_id: &str) -> impl Future<Output = Result<Vec<TeamLink>>> + Send {
        let links = self
            .team_links
            .get(project_id)
            .into_iter()
            .flatten()
            .filter_map(|(team_id, role)| {
                self.teams.get(team_id).map(|team| TeamLink {
                    team_id: team_id.clone(),
                    role: *role,
                    team_owner_id: team.owner_id.clone(),
                })
            })
            .collect();
        ready(Ok(links))
    }

    fn team_membership(
        &self,
        team_id: &str,
        user_id: &str,
    ) -> impl Future<Output = Result<Option<TeamRole>>> + Send {
        ready(Ok(self.team_members.get(&pair(team_id, user_id)).copied()))
    }

    fn team_organization(
        &self,
        team_id: &str,
    ) -> impl Future<Output = Result<Option<String>>> + Send {
        ready(Ok(self
            .teams
            .get(team_id)
            .and_then(|team| team.organization_id.clone())))
    }

    fn is_org_member(
        &self,
        organization_id: &str,
        user_id: &str,
    ) -> impl Future<Output = Result<bool>> + Send {
        ready(Ok(self.org_members.contains(&pair(organization_id, user_id))))
    }
}

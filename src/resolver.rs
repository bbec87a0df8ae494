//! Project access resolution.
//!
//! Resolution walks a fixed cascade and stops at the first step that decides:
//!
//! 1. Exclusion: an absolute veto, ahead of every grant path.
//! 2. Direct membership.
//! 3. Share grant.
//! 4. Scope strategy (personal / team / organization).
//!
//! Only when the scope strategy denies does the resolver fall back to the
//! parent project chain. Inherited `admin`/`owner` roles carry over as-is;
//! anything lower is inherited as `member`.

use tracing::{debug, warn};

use crate::config::Access as AccessConfig;
use crate::facts::Facts;
use crate::outcome::{Outcome, Reason};
use crate::permission::{Level, Permission};
use crate::project::{DirectGrants, Project};
use crate::role::Role;
use crate::scope::{self, Verdict};
use crate::{Error, Result};

/// Default cap on how many ancestors the inheritance walk visits.
pub const DEFAULT_MAX_DEPTH: u32 = 10;

/// One step of the resolution cascade.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Exclusion,
    Membership,
    Share,
    Scope,
}

/// Precedence of the direct resolution steps, highest first.
pub const CASCADE: [Step; 4] = [Step::Exclusion, Step::Membership, Step::Share, Step::Scope];

impl Step {
    /// Decide from pre-fetched per-user rows. `Scope` needs storage and always
    /// passes here.
    pub fn decide(self, grants: &DirectGrants) -> Verdict {
        let role = match self {
            Step::Exclusion if grants.excluded => return Verdict::Deny(Reason::Excluded),
            Step::Membership => grants.membership,
            Step::Share => grants.share,
            Step::Exclusion | Step::Scope => None,
        };
        role.map_or(Verdict::Pass, Verdict::Grant)
    }
}

/// Role a child project inherits from a parent role.
pub fn inherited(parent_role: Role) -> Role {
    if parent_role >= Role::Admin {
        parent_role
    } else {
        Role::Member
    }
}

/// Resolves a user's effective role on a project.
///
/// Holds no state besides the fact source; every call reads current facts.
pub struct Resolver<F> {
    facts: F,
    max_depth: u32,
}

impl<F: Facts> Resolver<F> {
    pub fn new(facts: F) -> Self {
        Self {
            facts,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_config(facts: F, config: &AccessConfig) -> Self {
        Self {
            facts,
            max_depth: config.max_inheritance_depth,
        }
    }

    /// Override how many ancestors the inheritance walk may visit.
    pub fn max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn facts(&self) -> &F {
        &self.facts
    }

    /// Resolve the user's role on `project`, checked against `required` if given.
    ///
    /// Denial is an `Ok` outcome. `Err` is reserved for storage failures and
    /// for a parent id that points at no project.
    pub async fn resolve(
        &self,
        project: &Project,
        user_id: &str,
        required: Option<Role>,
    ) -> Result<Outcome> {
        let (step, verdict) = self.resolve_direct(project, user_id).await?;

        let outcome = match verdict {
            Verdict::Grant(role) => Outcome::validate(role, required),
            Verdict::Deny(reason) if step != Step::Scope => Outcome::Denied(reason),
            Verdict::Deny(reason) => match self.check_parent_access(project, user_id).await? {
                Some(role) => {
                    debug!(project = %project.id, user = %user_id, %role, "inherited from parent");
                    Outcome::validate(role, required)
                }
                None if project.parent_id.is_some() => Outcome::Denied(Reason::AccessDenied),
                None => Outcome::Denied(reason),
            },
            Verdict::Pass => Outcome::Denied(Reason::AccessDenied),
        };

        debug!(
            project = %project.id,
            user = %user_id,
            ?step,
            ?outcome,
            "resolved project access"
        );
        Ok(outcome)
    }

    /// Like [`resolve`](Self::resolve), looking the project up first.
    pub async fn resolve_by_id(
        &self,
        project_id: &str,
        user_id: &str,
        required: Option<Role>,
    ) -> Result<Outcome> {
        match self.facts.project(project_id).await? {
            Some(project) => self.resolve(&project, user_id, required).await,
            None => {
                debug!(project = %project_id, user = %user_id, "project not found");
                Ok(Outcome::Denied(Reason::ProjectNotFound))
            }
        }
    }

    /// Whether the user holds at least `required` on the project.
    pub async fn has_access(
        &self,
        project: &Project,
        user_id: &str,
        required: Role,
    ) -> Result<bool> {
        Ok(self
            .resolve(project, user_id, Some(required))
            .await?
            .is_granted())
    }

    /// Obtain a typed permission token, or the error the caller should surface.
    pub async fn require<L: Level>(
        &self,
        project: &Project,
        user_id: &str,
    ) -> Result<Permission<L>> {
        let role = self
            .resolve(project, user_id, Some(L::ROLE))
            .await?
            .into_result()?;
        Ok(Permission::new(&project.id, user_id, role))
    }

    /// Walk up the parent chain looking for an ancestor the user can reach
    /// directly, and return the role inherited from it.
    ///
    /// Visits at most `max_depth` ancestors, so a malformed chain (or a cycle)
    /// ends in `None` rather than looping.
    pub async fn check_parent_access(
        &self,
        project: &Project,
        user_id: &str,
    ) -> Result<Option<Role>> {
        let mut next = project.parent_id.clone();
        let mut remaining = self.max_depth;

        while let Some(parent_id) = next {
            if remaining == 0 {
                warn!(
                    project = %project.id,
                    user = %user_id,
                    max_depth = self.max_depth,
                    "inheritance depth exhausted"
                );
                return Ok(None);
            }
            remaining -= 1;

            let parent = self
                .facts
                .project(&parent_id)
                .await?
                .ok_or_else(|| Error::NotFound(format!("parent project {parent_id}")))?;

            if let (_, Verdict::Grant(role)) = self.resolve_direct(&parent, user_id).await? {
                return Ok(Some(inherited(role)));
            }
            next = parent.parent_id;
        }

        Ok(None)
    }

    /// Steps 1-4 of the cascade, without inheritance. Returns the deciding step.
    async fn resolve_direct(&self, project: &Project, user_id: &str) -> Result<(Step, Verdict)> {
        let grants = self.facts.direct_grants(&project.id, user_id).await?;

        for step in CASCADE {
            let verdict = match step {
                Step::Scope => scope::evaluate(&self.facts, project, user_id).await?,
                _ => step.decide(&grants),
            };
            if verdict != Verdict::Pass {
                return Ok((step, verdict));
            }
        }

        Ok((Step::Scope, Verdict::Deny(Reason::AccessDenied)))
    }
}

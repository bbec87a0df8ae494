//! Project tree depth checks, applied when a subproject is created.
//!
//! The resolver itself assumes a valid tree and never re-validates it.

use crate::config::Access;
use crate::facts::Facts;
use crate::project::Project;
use crate::{Error, Result};

/// Depth of a project: 1 for top-level, 2 for its children, and so on.
///
/// Stops counting at `limit` so a cyclic chain cannot loop.
pub async fn depth<F: Facts>(facts: &F, project: &Project, limit: u32) -> Result<u32> {
    let mut depth = 1;
    let mut next = project.parent_id.clone();

    while let Some(parent_id) = next {
        if depth >= limit {
            break;
        }
        let parent = facts
            .project(&parent_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("parent project {parent_id}")))?;
        depth += 1;
        next = parent.parent_id;
    }

    Ok(depth)
}

/// Check that a new subproject may be placed under `parent_id`.
///
/// Rejects a missing parent, and a parent already at `max_project_depth`.
pub async fn validate_parent<F: Facts>(
    facts: &F,
    parent_id: &str,
    access: &Access,
) -> Result<Project> {
    let max_depth = access.max_project_depth;
    let parent = facts
        .project(parent_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("parent project {parent_id}")))?;

    let parent_depth = depth(facts, &parent, max_depth).await?;
    if parent_depth >= max_depth {
        return Err(Error::BadRequest(format!(
            "project {parent_id} is at the maximum depth of {max_depth}"
        )));
    }

    Ok(parent)
}

//! Permission levels for type-safe access control.
//!
//! A `Permission<L>` can only be obtained from [`Resolver::require`], so an
//! operation that takes one as an argument cannot be reached without the
//! access check having passed at level `L` or above.
//!
//! # Example
//!
//! ```ignore
//! use warden::level::Edit;
//!
//! let perm = resolver.require::<Edit>(&project, &user_id).await?;
//! document::update(&conn, &doc, perm, req).await?; // Compiler enforces Edit
//! ```
//!
//! [`Resolver::require`]: crate::Resolver::require

use std::marker::PhantomData;

use crate::role::Role;

/// Marker trait for permission levels.
///
/// Each level maps onto the minimum project role it demands.
pub trait Level: Clone + Copy + PartialEq + Eq + std::fmt::Debug {
    /// Minimum role required.
    const ROLE: Role;
}

/// Standard permission levels (View < Contribute < Edit < Admin < Own).
pub mod level {
    use super::Level;
    use crate::role::Role;

    /// Read-only access level.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct View;

    impl Level for View {
        const ROLE: Role = Role::Viewer;
    }

    /// Baseline member access: comment, create own tasks.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Contribute;

    impl Level for Contribute {
        const ROLE: Role = Role::Member;
    }

    /// Content editing access level.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Edit;

    impl Level for Edit {
        const ROLE: Role = Role::Editor;
    }

    /// Administrative access level.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Admin;

    impl Level for Admin {
        const ROLE: Role = Role::Admin;
    }

    /// Owner-only operations such as deletion.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Own;

    impl Level for Own {
        const ROLE: Role = Role::Owner;
    }
}

/// Proof that a user holds at least level `L` on a project.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Permission<L: Level> {
    project_id: String,
    user_id: String,
    role: Role,
    _level: PhantomData<L>,
}

impl<L: Level> Permission<L> {
    /// Only the resolver mints these, after the role has been checked.
    pub(crate) fn new(project_id: &str, user_id: &str, role: Role) -> Self {
        debug_assert!(role.satisfies(L::ROLE));
        Self {
            project_id: project_id.to_string(),
            user_id: user_id.to_string(),
            role,
            _level: PhantomData,
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// The resolved role, which may exceed `L::ROLE`.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Re-check the held role against another level.
    pub fn narrow<M: Level>(&self) -> Option<Permission<M>> {
        self.role
            .satisfies(M::ROLE)
            .then(|| Permission::new(&self.project_id, &self.user_id, self.role))
    }
}

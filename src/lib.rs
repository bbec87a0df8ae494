//! Warden - project access-control resolution.
//!
//! Given a project and a user, warden decides the user's effective role or
//! why they have none:
//!
//! - **Role**: the `viewer < member < editor < admin < owner` hierarchy
//! - **Facts**: the read-only storage interface (in-memory and libsql/Turso backends)
//! - **Scope**: personal, team and organization strategies
//! - **Resolver**: exclusion veto, direct grants, scope dispatch, parent inheritance
//! - **Permission**: typed tokens proving a check passed at a given level
//! - **Config**: layered configuration (file → env → CLI)
//!
//! # Example
//!
//! ```ignore
//! use warden::{Loader, Resolver, Role, db::Store};
//!
//! #[tokio::main]
//! async fn main() -> warden::Result<()> {
//!     let config = Loader::new("MYAPP").load(None, None, None)?;
//!     let store = Store::open(&config.database.url).await?;
//!     let resolver = Resolver::with_config(store, &config.access);
//!
//!     match resolver.resolve_by_id("project-1", "user-1", Some(Role::Editor)).await? {
//!         warden::Outcome::Granted(role) => println!("editing as {role}"),
//!         denied => println!("{:?}", denied.reason()),
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod facts;
pub mod hierarchy;
pub mod memory;
pub mod outcome;
pub mod permission;
pub mod project;
pub mod resolver;
pub mod response;
pub mod role;
pub mod scope;

// Re-export main types at crate root
pub use config::{Config, Loader};
pub use error::{Error, Result};
pub use facts::Facts;
pub use memory::MemoryFacts;
pub use outcome::{Outcome, Reason};
pub use permission::{Level, Permission, level};
pub use project::{Project, Scope};
pub use resolver::Resolver;
pub use role::{Role, TeamRole, sufficient};

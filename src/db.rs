//! Database-backed fact store.
//!
//! Supports multiple backends:
//! - Local SQLite file: `path/to/db.sqlite` or `file:path` or `sqlite://path`
//! - In-memory: `:memory:`
//! - Remote Turso: `libsql://...` or `https://...` (requires TURSO_AUTH_TOKEN env var)
//!
//! Rows are written by the membership, sharing and exclusion endpoints; this
//! module only creates the tables and reads them.

use std::future::Future;
use std::sync::Arc;

use libsql::{Builder, Connection, Database, Row, params};
use tracing::info;

use crate::{Error, Result};
use crate::facts::Facts;
use crate::project::{DirectGrants, Project, TeamLink};
use crate::role::{Role, TeamRole};

/// Connect to the database.
///
/// # URL formats
/// - Local file: `mydata.db`, `file:path/to/db.sqlite`, `sqlite://path`
/// - In-memory: `:memory:`
/// - Remote Turso: `libsql://your-db.turso.io` (requires `TURSO_AUTH_TOKEN` env var)
pub async fn connect(url: &str) -> Result<Database> {
    let db = if url.starts_with("libsql://") || url.starts_with("https://") {
        let token = std::env::var("TURSO_AUTH_TOKEN").map_err(|_| {
            Error::Config("TURSO_AUTH_TOKEN not set for remote database".into())
        })?;
        Builder::new_remote(url.to_string(), token).build().await?
    } else if url == ":memory:" {
        Builder::new_local(":memory:").build().await?
    } else {
        let path = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("file:"))
            .unwrap_or(url);
        Builder::new_local(path).build().await?
    };

    Ok(db)
}

/// Get a connection from the database.
pub fn connection(db: &Database) -> Result<Connection> {
    Ok(db.connect()?)
}

/// Tables the resolver reads. Safe to apply repeatedly.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS teams (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL,
    organization_id TEXT
);
CREATE TABLE IF NOT EXISTS projects (
    id TEXT PRIMARY KEY,
    scope TEXT NOT NULL,
    owner_id TEXT NOT NULL,
    parent_id TEXT REFERENCES projects(id),
    team_id TEXT REFERENCES teams(id),
    allow_all_team_members INTEGER NOT NULL DEFAULT 0,
    is_org_public INTEGER NOT NULL DEFAULT 0,
    org_public_role TEXT NOT NULL DEFAULT 'viewer'
);
CREATE TABLE IF NOT EXISTS project_members (
    project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    user_id TEXT NOT NULL,
    role TEXT NOT NULL,
    PRIMARY KEY (project_id, user_id)
);
CREATE TABLE IF NOT EXISTS project_shares (
    project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    user_id TEXT NOT NULL,
    role TEXT NOT NULL,
    PRIMARY KEY (project_id, user_id)
);
CREATE TABLE IF NOT EXISTS project_exclusions (
    project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    user_id TEXT NOT NULL,
    PRIMARY KEY (project_id, user_id)
);
CREATE TABLE IF NOT EXISTS project_teams (
    project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    team_id TEXT NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
    role TEXT NOT NULL DEFAULT 'member',
    PRIMARY KEY (project_id, team_id)
);
CREATE TABLE IF NOT EXISTS team_members (
    team_id TEXT NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
    user_id TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'member',
    PRIMARY KEY (team_id, user_id)
);
CREATE TABLE IF NOT EXISTS organization_members (
    organization_id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    PRIMARY KEY (organization_id, user_id)
);
"#;

/// Create the fact tables if they do not exist.
pub async fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA).await?;
    info!("access schema ready");
    Ok(())
}

/// `Facts` over a libsql connection.
#[derive(Clone)]
pub struct Store {
    conn: Connection,
    /// Kept alive for stores that opened their own database.
    _db: Option<Arc<Database>>,
}

impl Store {
    pub fn new(conn: Connection) -> Self {
        Self { conn, _db: None }
    }

    /// Connect to `url`, create the tables and wrap the connection.
    pub async fn open(url: &str) -> Result<Self> {
        let db = connect(url).await?;
        let conn = connection(&db)?;
        migrate(&conn).await?;
        Ok(Self {
            conn,
            _db: Some(Arc::new(db)),
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    async fn first_row(
        &self,
        sql: &str,
        params: impl libsql::params::IntoParams,
    ) -> Result<Option<Row>> {
        let mut rows = self.conn.query(sql, params).await?;
        Ok(rows.next().await?)
    }

    async fn role_in(&self, table: &str, project_id: &str, user_id: &str) -> Result<Option<Role>> {
        let sql = format!("SELECT role FROM {table} WHERE project_id = ?1 AND user_id = ?2");
        match self.first_row(&sql, params![project_id, user_id]).await? {
            Some(row) => Ok(Some(row.get::<String>(0)?.parse()?)),
            None => Ok(None),
        }
    }
}

fn decode_project(row: &Row) -> Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        scope: row.get::<String>(1)?.parse()?,
        owner_id: row.get(2)?,
        parent_id: row.get(3)?,
        team_id: row.get(4)?,
        allow_all_team_members: row.get::<i64>(5)? != 0,
        is_org_public: row.get::<i64>(6)? != 0,
        org_public_role: row.get::<String>(7)?.parse()?,
    })
}

fn decode_optional_role(value: Option<String>) -> Result<Option<Role>> {
    value.map(|s| s.parse()).transpose()
}

impl Facts for Store {
    fn project(&self, project_id: &str) -> impl Future<Output = Result<Option<Project>>> + Send {
        async move {
            let row = self
                .first_row(
                    "SELECT id, scope, owner_id, parent_id, team_id, allow_all_team_members, \
                     is_org_public, org_public_role FROM projects WHERE id = ?1",
                    params![project_id],
                )
                .await?;
            row.as_ref().map(decode_project).transpose()
        }
    }

    fn membership(
        &self,
        project_id: &str,
        user_id: &str,
    ) -> impl Future<Output = Result<Option<Role>>> + Send {
        self.role_in("project_members", project_id, user_id)
    }

    fn share(
        &self,
        project_id: &str,
        user_id: &str,
    ) -> impl Future<Output = Result<Option<Role>>> + Send {
        self.role_in("project_shares", project_id, user_id)
    }

    fn is_excluded(
        &self,
        project_id: &str,
        user_id: &str,
    ) -> impl Future<Output = Result<bool>> + Send {
        async move {
            let row = self
                .first_row(
                    "SELECT 1 FROM project_exclusions WHERE project_id = ?1 AND user_id = ?2",
                    params![project_id, user_id],
                )
                .await?;
            Ok(row.is_some())
        }
    }

    fn team_links(&self, project_id: &str) -> impl Future<Output = Result<Vec<TeamLink>>> + Send {
        async move {
            let mut rows = self
                .conn
                .query(
                    "SELECT pt.team_id, pt.role, t.owner_id FROM project_teams pt \
                     JOIN teams t ON t.id = pt.team_id \
                     WHERE pt.project_id = ?1 ORDER BY pt.rowid",
                    params![project_id],
                )
                .await?;

            let mut links = Vec::new();
            while let Some(row) = rows.next().await? {
                links.push(TeamLink {
                    team_id: row.get(0)?,
                    role: row.get::<String>(1)?.parse()?,
                    team_owner_id: row.get(2)?,
                });
            }
            Ok(links)
        }
    }

    fn team_membership(
        &self,
        team_id: &str,
        user_id: &str,
    ) -> impl Future<Output = Result<Option<TeamRole>>> + Send {
        async move {
            let row = self
                .first_row(
                    "SELECT role FROM team_members WHERE team_id = ?1 AND user_id = ?2",
                    params![team_id, user_id],
                )
                .await?;
            match row {
                Some(row) => Ok(Some(TeamRole::parse(&row.get::<String>(0)?))),
                None => Ok(None),
            }
        }
    }

    fn team_organization(
        &self,
        team_id: &str,
    ) -> impl Future<Output = Result<Option<String>>> + Send {
        async move {
            let row = self
                .first_row(
                    "SELECT organization_id FROM teams WHERE id = ?1",
                    params![team_id],
                )
                .await?;
            match row {
                Some(row) => Ok(row.get::<Option<String>>(0)?),
                None => Ok(None),
            }
        }
    }

    fn is_org_member(
        &self,
        organization_id: &str,
        user_id: &str,
    ) -> impl Future<Output = Result<bool>> + Send {
        async move {
            let row = self
                .first_row(
                    "SELECT 1 FROM organization_members WHERE organization_id = ?1 AND user_id = ?2",
                    params![organization_id, user_id],
                )
                .await?;
            Ok(row.is_some())
        }
    }

    /// One round trip for membership, share and exclusion.
    fn direct_grants(
        &self,
        project_id: &str,
        user_id: &str,
    ) -> impl Future<Output = Result<DirectGrants>> + Send {
        async move {
            let row = self
                .first_row(
                    "SELECT \
                       (SELECT role FROM project_members WHERE project_id = ?1 AND user_id = ?2), \
                       (SELECT role FROM project_shares WHERE project_id = ?1 AND user_id = ?2), \
                       EXISTS (SELECT 1 FROM project_exclusions WHERE project_id = ?1 AND user_id = ?2)",
                    params![project_id, user_id],
                )
                .await?;
            // A FROM-less select always yields exactly one row.
            let Some(row) = row else {
                return Err(Error::Internal(format!(
                    "direct grant lookup for {project_id}/{user_id} returned no row"
                )));
            };
            Ok(DirectGrants {
                membership: decode_optional_role(row.get(0)?)?,
                share: decode_optional_role(row.get(1)?)?,
                excluded: row.get::<i64>(2)? != 0,
            })
        }
    }
}

//! Resolution against the libsql-backed store.
//!
//! Every test opens its own in-memory database, seeds rows with plain SQL the
//! way the CRUD layer would, and resolves through `Store`.

use warden::db::Store;
use warden::{Error, Facts, Outcome, Reason, Resolver, Role, hierarchy, level};

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// Open a fresh in-memory store and apply `seed` as a SQL batch.
async fn store_with(seed: &str) -> Store {
    let store = Store::open(":memory:")
        .await
        .expect("failed to open in-memory store");
    if !seed.is_empty() {
        store
            .connection()
            .execute_batch(seed)
            .await
            .expect("failed to seed");
    }
    store
}

async fn resolve(store: &Store, project: &str, user: &str, required: Option<Role>) -> Outcome {
    Resolver::new(store)
        .resolve_by_id(project, user, required)
        .await
        .expect("resolution failed")
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn personal_project_denies_everyone_but_owner() {
    let store = store_with(
        "INSERT INTO projects (id, scope, owner_id) VALUES ('p1', 'personal', 'u1');",
    )
    .await;

    assert_eq!(resolve(&store, "p1", "u1", None).await, Outcome::Granted(Role::Owner));
    assert_eq!(
        resolve(&store, "p1", "u2", None).await,
        Outcome::Denied(Reason::PersonalProject)
    );
}

#[tokio::test]
async fn team_lead_escalated_from_viewer_to_admin() {
    let store = store_with(
        "INSERT INTO teams (id, owner_id) VALUES ('t1', 'u1');
         INSERT INTO projects (id, scope, owner_id, team_id, allow_all_team_members)
             VALUES ('p1', 'team', 'u1', 't1', 1);
         INSERT INTO project_teams (project_id, team_id, role) VALUES ('p1', 't1', 'viewer');
         INSERT INTO team_members (team_id, user_id, role) VALUES ('t1', 'u3', 'lead');",
    )
    .await;

    assert_eq!(resolve(&store, "p1", "u3", None).await, Outcome::Granted(Role::Admin));
}

#[tokio::test]
async fn org_public_viewer_is_insufficient_for_member() {
    let store = store_with(
        "INSERT INTO teams (id, owner_id, organization_id) VALUES ('t1', 'u1', 'org1');
         INSERT INTO projects (id, scope, owner_id, team_id, is_org_public, org_public_role)
             VALUES ('p1', 'organization', 'u1', 't1', 1, 'viewer');
         INSERT INTO project_teams (project_id, team_id, role) VALUES ('p1', 't1', 'editor');
         INSERT INTO organization_members (organization_id, user_id) VALUES ('org1', 'u4');",
    )
    .await;

    assert_eq!(
        resolve(&store, "p1", "u4", Some(Role::Member)).await,
        Outcome::InsufficientRole {
            actual: Role::Viewer,
            required: Role::Member
        }
    );
    assert_eq!(resolve(&store, "p1", "u4", None).await, Outcome::Granted(Role::Viewer));
    assert_eq!(
        resolve(&store, "p1", "u5", None).await,
        Outcome::Denied(Reason::NotOrgMember)
    );
}

#[tokio::test]
async fn viewer_on_parent_becomes_member_on_subproject() {
    let store = store_with(
        "INSERT INTO projects (id, scope, owner_id) VALUES ('top', 'team', 'u1');
         INSERT INTO projects (id, scope, owner_id, parent_id) VALUES ('sub', 'team', 'u1', 'top');
         INSERT INTO project_members (project_id, user_id, role) VALUES ('top', 'u2', 'viewer');",
    )
    .await;

    assert_eq!(resolve(&store, "sub", "u2", None).await, Outcome::Granted(Role::Member));
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[tokio::test]
async fn exclusion_beats_membership_share_and_team() {
    let store = store_with(
        "INSERT INTO teams (id, owner_id) VALUES ('t1', 'u9');
         INSERT INTO projects (id, scope, owner_id, team_id, allow_all_team_members)
             VALUES ('p1', 'team', 'u1', 't1', 1);
         INSERT INTO project_teams (project_id, team_id, role) VALUES ('p1', 't1', 'admin');
         INSERT INTO project_members (project_id, user_id, role) VALUES ('p1', 'u9', 'owner');
         INSERT INTO project_shares (project_id, user_id, role) VALUES ('p1', 'u9', 'editor');
         INSERT INTO project_exclusions (project_id, user_id) VALUES ('p1', 'u9');",
    )
    .await;

    assert_eq!(
        resolve(&store, "p1", "u9", None).await,
        Outcome::Denied(Reason::Excluded)
    );
}

#[tokio::test]
async fn explicit_membership_required_without_blocklist_mode() {
    let store = store_with(
        "INSERT INTO teams (id, owner_id) VALUES ('t1', 'u1');
         INSERT INTO projects (id, scope, owner_id, team_id, allow_all_team_members)
             VALUES ('p1', 'team', 'u1', 't1', 0);
         INSERT INTO project_teams (project_id, team_id, role) VALUES ('p1', 't1', 'owner');
         INSERT INTO team_members (team_id, user_id, role) VALUES ('t1', 'u2', 'lead');
         INSERT INTO project_shares (project_id, user_id, role) VALUES ('p1', 'u3', 'editor');",
    )
    .await;

    assert_eq!(
        resolve(&store, "p1", "u2", None).await,
        Outcome::Denied(Reason::ExplicitMembershipRequired)
    );
    assert_eq!(resolve(&store, "p1", "u3", None).await, Outcome::Granted(Role::Editor));
}

#[tokio::test]
async fn team_owner_always_resolves_owner() {
    let store = store_with(
        "INSERT INTO teams (id, owner_id) VALUES ('t1', 'boss');
         INSERT INTO teams (id, owner_id) VALUES ('t2', 'other');
         INSERT INTO projects (id, scope, owner_id, team_id, allow_all_team_members)
             VALUES ('p1', 'team', 'u1', 't1', 1);
         INSERT INTO project_teams (project_id, team_id, role) VALUES ('p1', 't2', 'admin');
         INSERT INTO project_teams (project_id, team_id, role) VALUES ('p1', 't1', 'viewer');
         INSERT INTO team_members (team_id, user_id, role) VALUES ('t2', 'boss', 'member');",
    )
    .await;

    assert_eq!(resolve(&store, "p1", "boss", None).await, Outcome::Granted(Role::Owner));
}

#[tokio::test]
async fn multi_team_user_gets_best_link() {
    let store = store_with(
        "INSERT INTO teams (id, owner_id) VALUES ('t1', 'o1'), ('t2', 'o2');
         INSERT INTO projects (id, scope, owner_id, team_id, allow_all_team_members)
             VALUES ('p1', 'team', 'u1', 't1', 1);
         INSERT INTO project_teams (project_id, team_id, role) VALUES ('p1', 't1', 'viewer');
         INSERT INTO project_teams (project_id, team_id, role) VALUES ('p1', 't2', 'editor');
         INSERT INTO team_members (team_id, user_id, role) VALUES ('t1', 'u2', 'member');
         INSERT INTO team_members (team_id, user_id, role) VALUES ('t2', 'u2', 'member');",
    )
    .await;

    assert_eq!(resolve(&store, "p1", "u2", None).await, Outcome::Granted(Role::Editor));
    assert_eq!(
        resolve(&store, "p1", "u3", None).await,
        Outcome::Denied(Reason::NoTeamAccess)
    );
}

#[tokio::test]
async fn organization_team_access_ignores_blocklist_switch() {
    let store = store_with(
        "INSERT INTO teams (id, owner_id, organization_id) VALUES ('t1', 'o1', 'org1');
         INSERT INTO projects (id, scope, owner_id, team_id, allow_all_team_members)
             VALUES ('p1', 'organization', 'u1', 't1', 0);
         INSERT INTO project_teams (project_id, team_id, role) VALUES ('p1', 't1', 'editor');
         INSERT INTO team_members (team_id, user_id, role) VALUES ('t1', 'u2', 'member');
         INSERT INTO organization_members (organization_id, user_id) VALUES ('org1', 'u3');",
    )
    .await;

    assert_eq!(resolve(&store, "p1", "u2", None).await, Outcome::Granted(Role::Editor));
    assert_eq!(
        resolve(&store, "p1", "u3", None).await,
        Outcome::Denied(Reason::NotPublic)
    );
}

#[tokio::test]
async fn admin_on_parent_inherited_unchanged() {
    let store = store_with(
        "INSERT INTO projects (id, scope, owner_id) VALUES ('top', 'team', 'u1');
         INSERT INTO projects (id, scope, owner_id, parent_id) VALUES ('sub', 'personal', 'u1', 'top');
         INSERT INTO project_shares (project_id, user_id, role) VALUES ('top', 'u2', 'admin');
         INSERT INTO project_members (project_id, user_id, role) VALUES ('top', 'u3', 'editor');",
    )
    .await;

    assert_eq!(resolve(&store, "sub", "u2", None).await, Outcome::Granted(Role::Admin));
    assert_eq!(resolve(&store, "sub", "u3", None).await, Outcome::Granted(Role::Member));
    assert_eq!(
        resolve(&store, "sub", "u4", None).await,
        Outcome::Denied(Reason::AccessDenied)
    );
}

#[tokio::test]
async fn long_parent_chain_terminates_with_denial() {
    let mut seed = String::from(
        "INSERT INTO projects (id, scope, owner_id) VALUES ('p0', 'team', 'u1');
         INSERT INTO project_members (project_id, user_id, role) VALUES ('p0', 'u2', 'owner');",
    );
    for i in 1..=12 {
        seed.push_str(&format!(
            "INSERT INTO projects (id, scope, owner_id, parent_id) VALUES ('p{i}', 'team', 'u1', 'p{}');",
            i - 1
        ));
    }
    let store = store_with(&seed).await;

    assert_eq!(resolve(&store, "p10", "u2", None).await, Outcome::Granted(Role::Owner));
    assert_eq!(
        resolve(&store, "p12", "u2", None).await,
        Outcome::Denied(Reason::AccessDenied)
    );
}

// ---------------------------------------------------------------------------
// Store behavior
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_project_is_not_found_outcome() {
    let store = store_with("").await;
    assert_eq!(
        resolve(&store, "ghost", "u1", None).await,
        Outcome::Denied(Reason::ProjectNotFound)
    );
}

#[tokio::test]
async fn direct_grants_single_query_matches_rows() {
    let store = store_with(
        "INSERT INTO projects (id, scope, owner_id) VALUES ('p1', 'team', 'u1');
         INSERT INTO project_members (project_id, user_id, role) VALUES ('p1', 'u2', 'editor');
         INSERT INTO project_shares (project_id, user_id, role) VALUES ('p1', 'u2', 'viewer');",
    )
    .await;

    let grants = store.direct_grants("p1", "u2").await.unwrap();
    assert_eq!(grants.membership, Some(Role::Editor));
    assert_eq!(grants.share, Some(Role::Viewer));
    assert!(!grants.excluded);

    let nothing = store.direct_grants("p1", "u3").await.unwrap();
    assert_eq!(nothing, Default::default());
}

#[tokio::test]
async fn project_row_round_trips_every_column() {
    let store = store_with(
        "INSERT INTO teams (id, owner_id, organization_id) VALUES ('t1', 'u1', 'org1');
         INSERT INTO projects (id, scope, owner_id) VALUES ('top', 'organization', 'u1');
         INSERT INTO projects (id, scope, owner_id, parent_id, team_id, allow_all_team_members,
                               is_org_public, org_public_role)
             VALUES ('sub', 'ORGANIZATION', 'u1', 'top', 't1', 1, 1, 'editor');",
    )
    .await;

    let project = store.project("sub").await.unwrap().unwrap();
    assert_eq!(project.scope, warden::Scope::Organization);
    assert_eq!(project.parent_id.as_deref(), Some("top"));
    assert_eq!(project.team_id.as_deref(), Some("t1"));
    assert!(project.allow_all_team_members);
    assert!(project.is_org_public);
    assert_eq!(project.org_public_role, Role::Editor);

    let top = store.project("top").await.unwrap().unwrap();
    assert!(top.parent_id.is_none());
    assert_eq!(top.org_public_role, Role::Viewer);
}

#[tokio::test]
async fn unknown_stored_role_is_corrupt_data() {
    let store = store_with(
        "INSERT INTO projects (id, scope, owner_id) VALUES ('p1', 'team', 'u1');
         INSERT INTO project_members (project_id, user_id, role) VALUES ('p1', 'u2', 'superuser');",
    )
    .await;

    let err = Resolver::new(&store)
        .resolve_by_id("p1", "u2", None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::CorruptData(_)), "got {err:?}");
}

#[tokio::test]
async fn reads_see_rows_written_between_calls() {
    let store = store_with(
        "INSERT INTO projects (id, scope, owner_id) VALUES ('p1', 'personal', 'u1');",
    )
    .await;
    assert!(!resolve(&store, "p1", "u2", None).await.is_granted());

    store
        .connection()
        .execute(
            "INSERT INTO project_shares (project_id, user_id, role) VALUES (?1, ?2, ?3)",
            libsql::params!["p1", "u2", "member"],
        )
        .await
        .unwrap();
    assert_eq!(resolve(&store, "p1", "u2", None).await, Outcome::Granted(Role::Member));

    store
        .connection()
        .execute(
            "INSERT INTO project_exclusions (project_id, user_id) VALUES ('p1', 'u2')",
            (),
        )
        .await
        .unwrap();
    assert_eq!(
        resolve(&store, "p1", "u2", None).await,
        Outcome::Denied(Reason::Excluded)
    );
}

#[tokio::test]
async fn require_edit_token_through_store() {
    let store = store_with(
        "INSERT INTO projects (id, scope, owner_id) VALUES ('p1', 'team', 'u1');
         INSERT INTO project_members (project_id, user_id, role) VALUES ('p1', 'u2', 'editor');
         INSERT INTO project_members (project_id, user_id, role) VALUES ('p1', 'u3', 'viewer');",
    )
    .await;
    let project = store.project("p1").await.unwrap().unwrap();
    let resolver = Resolver::new(&store);

    let perm = resolver.require::<level::Edit>(&project, "u2").await.unwrap();
    assert_eq!(perm.role(), Role::Editor);

    let err = resolver
        .require::<level::Edit>(&project, "u3")
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), hyper::StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn subproject_creation_respects_max_depth() {
    let store = store_with(
        "INSERT INTO projects (id, scope, owner_id) VALUES ('top', 'team', 'u1');
         INSERT INTO projects (id, scope, owner_id, parent_id) VALUES ('sub', 'team', 'u1', 'top');",
    )
    .await;

    let access = warden::config::Access::default();
    assert!(hierarchy::validate_parent(&store, "top", &access).await.is_ok());
    let err = hierarchy::validate_parent(&store, "sub", &access)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::BadRequest(_)));
}

#[tokio::test]
async fn migrate_is_idempotent() {
    let store = store_with("").await;
    warden::db::migrate(store.connection()).await.unwrap();
    warden::db::migrate(store.connection()).await.unwrap();
}

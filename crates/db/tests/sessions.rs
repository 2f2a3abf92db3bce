//! Integration tests for the persistent session tier and role permission
//! lookups.

use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use pms_core::permissions::{PermissionSet, NAV_PROJECT_MANAGEMENT, NAV_TIMESHEET};
use pms_core::roles::ROLE_EMPLOYEE;
use pms_core::session::{
    hash_token, Identity, NewSession, SessionBackend, SessionMetrics, SessionResolver,
    SessionStore, SessionStoreError,
};
use pms_core::types::DbId;
use pms_db::models::employee::CreateEmployee;
use pms_db::models::role::CreateRole;
use pms_db::repositories::{EmployeeRepo, RoleRepo, SessionRepo};
use pms_db::session_store::PgSessionStore;
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_employee(pool: &PgPool, name: &str) -> DbId {
    let role = RoleRepo::find_by_name(pool, ROLE_EMPLOYEE)
        .await
        .unwrap()
        .expect("seeded employee role");
    EmployeeRepo::create(
        pool,
        &CreateEmployee {
            name: name.to_string(),
            email: format!("{name}@example.com"),
            password_hash: "not-a-real-hash".to_string(),
            role_id: role.id,
            department: None,
        },
    )
    .await
    .unwrap()
    .id
}

fn session_for(employee_id: DbId, token: &str, expires_in: Duration) -> NewSession {
    NewSession {
        token_hash: hash_token(token),
        employee_id,
        expires_at: Utc::now() + expires_in,
        ip_address: Some("127.0.0.1".to_string()),
        user_agent: None,
    }
}

// ---------------------------------------------------------------------------
// PgSessionStore
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn live_session_resolves_to_employee(pool: PgPool) {
    let employee_id = seed_employee(&pool, "alice").await;
    let store = PgSessionStore::new(pool.clone());

    store.probe().await.unwrap();
    store
        .insert(&session_for(employee_id, "tok-a", Duration::days(7)))
        .await
        .unwrap();

    assert_eq!(
        store.find_employee(&hash_token("tok-a")).await.unwrap(),
        Some(employee_id)
    );
    assert_eq!(store.find_employee(&hash_token("other")).await.unwrap(), None);
}

#[sqlx::test(migrations = "./migrations")]
async fn expired_session_is_not_resolved(pool: PgPool) {
    let employee_id = seed_employee(&pool, "bob").await;
    let store = PgSessionStore::new(pool.clone());

    store
        .insert(&session_for(employee_id, "old", Duration::seconds(-5)))
        .await
        .unwrap();
    assert_eq!(store.find_employee(&hash_token("old")).await.unwrap(), None);

    assert_eq!(store.purge_expired().await.unwrap(), 1);
    assert!(SessionRepo::find_by_token_hash(&pool, &hash_token("old"))
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn inactive_employee_session_is_not_resolved(pool: PgPool) {
    let employee_id = seed_employee(&pool, "carol").await;
    let store = PgSessionStore::new(pool.clone());

    store
        .insert(&session_for(employee_id, "tok-c", Duration::days(1)))
        .await
        .unwrap();
    assert!(EmployeeRepo::deactivate(&pool, employee_id).await.unwrap());

    assert_eq!(store.find_employee(&hash_token("tok-c")).await.unwrap(), None);
}

#[sqlx::test(migrations = "./migrations")]
async fn only_the_token_hash_is_stored(pool: PgPool) {
    let employee_id = seed_employee(&pool, "dave").await;
    let store = PgSessionStore::new(pool.clone());
    store
        .insert(&session_for(employee_id, "plain-token", Duration::days(1)))
        .await
        .unwrap();

    let (stored,): (String,) = sqlx::query_as("SELECT token_hash FROM user_sessions")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_ne!(stored, "plain-token");
    assert_eq!(stored, hash_token("plain-token"));
}

#[sqlx::test(migrations = "./migrations")]
async fn remove_for_employee_clears_all_sessions(pool: PgPool) {
    let employee_id = seed_employee(&pool, "erin").await;
    let store = PgSessionStore::new(pool.clone());
    for token in ["one", "two"] {
        store
            .insert(&session_for(employee_id, token, Duration::days(1)))
            .await
            .unwrap();
    }

    assert_eq!(store.remove_for_employee(employee_id).await.unwrap(), 2);
    assert!(!store.remove(&hash_token("one")).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn missing_table_reports_unavailable(pool: PgPool) {
    sqlx::query("DROP TABLE user_sessions")
        .execute(&pool)
        .await
        .unwrap();
    let store = PgSessionStore::new(pool.clone());

    assert_matches!(store.probe().await, Err(SessionStoreError::Unavailable(_)));
}

#[sqlx::test(migrations = "./migrations")]
async fn resolver_falls_back_when_table_is_missing(pool: PgPool) {
    let employee_id = seed_employee(&pool, "frank").await;
    sqlx::query("DROP TABLE user_sessions")
        .execute(&pool)
        .await
        .unwrap();

    let resolver = SessionResolver::start(
        Arc::new(PgSessionStore::new(pool.clone())),
        Arc::new(SessionMetrics::default()),
    )
    .await;
    assert_eq!(resolver.backend(), SessionBackend::Fallback);

    let issued = resolver.create_session(employee_id, None, None).await;
    assert_eq!(issued.backend, SessionBackend::Fallback);
    assert_matches!(
        resolver.resolve_identity(Some(&issued.token)).await,
        Ok(Identity::Authenticated(id)) if id == employee_id
    );
}

// ---------------------------------------------------------------------------
// Permissions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn permissions_stored_as_text_are_normalized(pool: PgPool) {
    let role = RoleRepo::create(
        &pool,
        &CreateRole {
            name: "legacy".to_string(),
            description: None,
            permissions: Some(json!(r#"{"navigation":{"project-management":true}}"#)),
        },
    )
    .await
    .unwrap();
    let employee_id = EmployeeRepo::create(
        &pool,
        &CreateEmployee {
            name: "gina".to_string(),
            email: "gina@example.com".to_string(),
            password_hash: "x".to_string(),
            role_id: role.id,
            department: Some("Ops".to_string()),
        },
    )
    .await
    .unwrap()
    .id;

    let raw = RoleRepo::find_permissions_for_employee(&pool, employee_id)
        .await
        .unwrap()
        .expect("employee exists");
    let set = PermissionSet::resolve(raw.as_ref());
    assert!(set.allows(NAV_PROJECT_MANAGEMENT));
    assert!(set.allows(NAV_TIMESHEET));
}

#[sqlx::test(migrations = "./migrations")]
async fn null_permissions_resolve_to_baseline(pool: PgPool) {
    let role = RoleRepo::create(
        &pool,
        &CreateRole {
            name: "bare".to_string(),
            description: None,
            permissions: None,
        },
    )
    .await
    .unwrap();
    let employee_id = EmployeeRepo::create(
        &pool,
        &CreateEmployee {
            name: "hank".to_string(),
            email: "hank@example.com".to_string(),
            password_hash: "x".to_string(),
            role_id: role.id,
            department: None,
        },
    )
    .await
    .unwrap()
    .id;

    let raw = RoleRepo::find_permissions_for_employee(&pool, employee_id)
        .await
        .unwrap()
        .unwrap();
    assert!(raw.is_none());
    assert_eq!(
        PermissionSet::resolve(raw.as_ref()).into_value(),
        json!({ "navigation": { "timesheet": true } })
    );

    assert!(RoleRepo::find_permissions_for_employee(&pool, 424242)
        .await
        .unwrap()
        .is_none());
}

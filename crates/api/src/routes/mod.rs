pub mod auth;
pub mod employee;
pub mod health;
pub mod project;
pub mod report;
pub mod role;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /auth/login                          login (public)
/// /auth/logout                         logout (session)
/// /auth/me                             current employee (session)
/// /current-user-permissions            resolved permissions (session)
///
/// /projects                            list (session), create (project-management)
/// /projects/{id}                       get (session), update, delete (project-management)
///
/// /employees                           list, create (staff-management)
/// /employees/{id}/deactivate           deactivate (staff-management)
/// /departments                         distinct departments (session)
///
/// /roles                               list, create (system-management)
/// /roles/{id}                          update (system-management)
///
/// /reports                             own reports, submit (session)
/// /reports/pending                     pending queue (approval-center)
/// /reports/{id}/approve                approve (approval-center)
/// /reports/{id}/reject                 reject (approval-center)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .route(
            "/current-user-permissions",
            get(handlers::auth::current_user_permissions),
        )
        .nest("/projects", project::router())
        .nest("/employees", employee::router())
        .route("/departments", get(handlers::employee::list_departments))
        .nest("/roles", role::router())
        .nest("/reports", report::router())
}

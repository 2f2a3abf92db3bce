//! HTTP-level tests for work report submission and review.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_employee, get, login, post_json};
use pms_core::roles::{ROLE_EMPLOYEE, ROLE_MANAGER};
use serde_json::json;
use sqlx::PgPool;

/// Create a project as the manager and return its id.
async fn seed_project(app: &axum::Router, manager_cookie: &str) -> i64 {
    let response = post_json(
        app,
        "/api/projects",
        json!({
            "project_name": "Timesheets",
            "project_type": "internal",
            "project_category": "D",
            "business_unit_code": "BU1",
            "client_or_dept_code": "C1",
        }),
        Some(manager_cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn submit(app: &axum::Router, cookie: &str, project_id: i64, date: &str) -> i64 {
    let response = post_json(
        app,
        "/api/reports",
        json!({
            "project_id": project_id,
            "task_description": "Implemented code allocation",
            "hours_spent": 6.5,
            "report_date": date,
        }),
        Some(cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn employee_submits_and_lists_own_reports(pool: PgPool) {
    create_employee(&pool, "mgr", ROLE_MANAGER).await;
    let emp_id = create_employee(&pool, "emp", ROLE_EMPLOYEE).await;
    let app = common::build_test_app(pool).await;
    let mgr = login(&app, "mgr").await;
    let emp = login(&app, "emp").await;
    let project_id = seed_project(&app, &mgr).await;

    submit(&app, &emp, project_id, "2025-03-03").await;
    submit(&app, &emp, project_id, "2025-03-04").await;

    let json = body_json(get(&app, "/api/reports", Some(&emp)).await).await;
    let reports = json["data"].as_array().unwrap();
    assert_eq!(reports.len(), 2);
    assert!(reports.iter().all(|r| r["employee_id"] == emp_id));
    assert_eq!(reports[0]["status"], 0);
    assert_eq!(reports[0]["employee_name"], "emp");

    let json = body_json(get(&app, "/api/reports?date=2025-03-04", Some(&emp)).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["report_date"], "2025-03-04");

    // The manager has not reported anything.
    let json = body_json(get(&app, "/api/reports", Some(&mgr)).await).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn report_validation(pool: PgPool) {
    create_employee(&pool, "mgr", ROLE_MANAGER).await;
    let app = common::build_test_app(pool).await;
    let mgr = login(&app, "mgr").await;
    let project_id = seed_project(&app, &mgr).await;

    let too_long = json!({
        "project_id": project_id,
        "task_description": "All nighter",
        "hours_spent": 25,
    });
    let response = post_json(&app, "/api/reports", too_long, Some(&mgr)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let blank = json!({
        "project_id": project_id,
        "task_description": "  ",
        "hours_spent": 2,
    });
    let response = post_json(&app, "/api/reports", blank, Some(&mgr)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let unknown_project = json!({
        "project_id": 987654,
        "task_description": "Ghost work",
        "hours_spent": 1,
    });
    let response = post_json(&app, "/api/reports", unknown_project, Some(&mgr)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn manager_reviews_pending_reports_once(pool: PgPool) {
    create_employee(&pool, "mgr", ROLE_MANAGER).await;
    create_employee(&pool, "emp", ROLE_EMPLOYEE).await;
    let app = common::build_test_app(pool).await;
    let mgr = login(&app, "mgr").await;
    let emp = login(&app, "emp").await;
    let project_id = seed_project(&app, &mgr).await;

    let first = submit(&app, &emp, project_id, "2025-03-03").await;
    let second = submit(&app, &emp, project_id, "2025-03-04").await;

    let page = body_json(get(&app, "/api/reports/pending?limit=1", Some(&mgr)).await).await;
    assert_eq!(page["total"], 2);
    assert_eq!(page["limit"], 1);
    assert_eq!(page["data"].as_array().unwrap().len(), 1);

    let response = post_json(&app, &format!("/api/reports/{first}/approve"), json!({}), Some(&mgr)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let approved = body_json(response).await;
    assert_eq!(approved["data"]["status"], 1);
    assert!(approved["data"]["reviewed_at"].is_string());

    let response = post_json(&app, &format!("/api/reports/{second}/reject"), json!({}), Some(&mgr)).await;
    assert_eq!(body_json(response).await["data"]["status"], 2);

    // Already reviewed.
    let response = post_json(&app, &format!("/api/reports/{first}/reject"), json!({}), Some(&mgr)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = post_json(&app, "/api/reports/424242/approve", json!({}), Some(&mgr)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let page = body_json(get(&app, "/api/reports/pending", Some(&mgr)).await).await;
    assert_eq!(page["total"], 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn employees_cannot_review(pool: PgPool) {
    create_employee(&pool, "mgr", ROLE_MANAGER).await;
    create_employee(&pool, "emp", ROLE_EMPLOYEE).await;
    let app = common::build_test_app(pool).await;
    let mgr = login(&app, "mgr").await;
    let emp = login(&app, "emp").await;
    let project_id = seed_project(&app, &mgr).await;
    let id = submit(&app, &emp, project_id, "2025-03-03").await;

    let response = get(&app, "/api/reports/pending", Some(&emp)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_json(&app, &format!("/api/reports/{id}/approve"), json!({}), Some(&emp)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

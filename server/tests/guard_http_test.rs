//! HTTP tests for the page-access guard.

mod helpers;

use axum::http::StatusCode;
use helpers::{body_json, TestApp};
use home21_server::permissions::{ActionSet, Resource, Role, RuleTable};

#[tokio::test]
async fn test_guest_can_open_public_pages() {
    let app = TestApp::new();

    for path in ["/", "/login", "/unauthorized"] {
        let response = app.oneshot(TestApp::get_as(None, path)).await;
        assert_eq!(response.status(), StatusCode::OK, "{path}");
    }
}

#[tokio::test]
async fn test_guest_is_asked_to_sign_in() {
    let app = TestApp::new();

    let response = app.oneshot(TestApp::get_as(None, "/admin/users")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["error"], "unauthorized");
    assert!(body["message"].as_str().unwrap().contains("sign in"));
}

#[tokio::test]
async fn test_unknown_role_header_is_a_guest() {
    let app = TestApp::new();

    let request = TestApp::request(axum::http::Method::GET, "/dashboard")
        .header(helpers::ROLE_HEADER, "OWNER")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_encadrant_resident_pages() {
    let app = TestApp::new();
    let encadrant = Some(Role::Encadrant);

    for path in ["/residents", "/residents/42", "/residents/42/edit", "/residents/"] {
        let response = app.oneshot(TestApp::get_as(encadrant, path)).await;
        assert_eq!(response.status(), StatusCode::OK, "{path}");
    }

    let response = app.oneshot(TestApp::get_as(encadrant, "/resident")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_forbidden_body_names_resource_generically() {
    let app = TestApp::new();

    let response = app
        .oneshot(TestApp::get_as(Some(Role::Encadrant), "/admin/settings/backend"))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = body_json(response).await;
    assert_eq!(body["error"], "forbidden");
    assert!(body["message"].as_str().unwrap().contains("settings"));
}

#[tokio::test]
async fn test_denial_does_not_depend_on_record() {
    let app = TestApp::new();
    let resident = Some(Role::Resident);

    let existing = app
        .oneshot(TestApp::get_as(resident, "/residents/1"))
        .await;
    let missing = app
        .oneshot(TestApp::get_as(resident, "/residents/999999"))
        .await;

    assert_eq!(existing.status(), StatusCode::FORBIDDEN);
    assert_eq!(missing.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(existing).await, body_json(missing).await);
}

#[tokio::test]
async fn test_path_traversal_is_refused() {
    let app = TestApp::new();

    for path in [
        "/residents/../admin/settings",
        "/residents/%2e%2e/admin/settings",
        "/residents/%2E%2e/admin/settings",
    ] {
        let response = app
            .oneshot(TestApp::get_as(Some(Role::Encadrant), path))
            .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{path}");
    }
}

#[tokio::test]
async fn test_query_string_is_ignored() {
    let app = TestApp::new();

    let response = app
        .oneshot(TestApp::get_as(Some(Role::Resident), "/tasks?page=2"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_super_admin_opens_everything() {
    let app = TestApp::new();

    for path in ["/admin/settings", "/admin/users/7", "/reports/2024", "/houses"] {
        let response = app
            .oneshot(TestApp::get_as(Some(Role::SuperAdmin), path))
            .await;
        assert_eq!(response.status(), StatusCode::OK, "{path}");
    }
}

#[tokio::test]
async fn test_replaced_rules_apply_to_next_request() {
    let app = TestApp::new();
    let admin = Some(Role::Admin);

    let response = app.oneshot(TestApp::get_as(admin, "/houses/3")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let without_houses = RuleTable::builder()
        .grant(Role::Resident, Resource::Residents, ActionSet::VIEW)
        .grant(
            Role::Encadrant,
            Resource::Residents,
            ActionSet::VIEW | ActionSet::UPDATE,
        )
        .grant(Role::Admin, Resource::Residents, ActionSet::MANAGE)
        .grant(Role::SuperAdmin, Resource::Residents, ActionSet::MANAGE)
        .page(Role::SuperAdmin, "*")
        .build()
        .unwrap();
    app.store.replace(without_houses, true).unwrap();

    let response = app.oneshot(TestApp::get_as(admin, "/houses/3")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = app.oneshot(TestApp::get_as(admin, "/residents/3")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

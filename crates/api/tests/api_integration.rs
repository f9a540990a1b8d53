//! API integration tests.
//!
//! These tests drive the router end to end against the in-memory stores,
//! including the authentication middleware.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use axum::{
    Router, middleware,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use smartmess_api::{AppState, auth_middleware, router as api_router};
use smartmess_core::{StaffCleanupService, UserDeletionService};
use smartmess_store::{MemoryDocumentStore, MemoryIdentityStore, collections};
use tower::ServiceExt;

struct TestContext {
    documents: Arc<MemoryDocumentStore>,
    identity: Arc<MemoryIdentityStore>,
    app: Router,
}

fn create_test_context() -> TestContext {
    let documents = Arc::new(MemoryDocumentStore::new());
    let identity = Arc::new(MemoryIdentityStore::new());

    let state = AppState {
        user_deletion_service: UserDeletionService::new(documents.clone(), identity.clone()),
        staff_cleanup_service: StaffCleanupService::new(documents.clone(), identity.clone()),
        identity: identity.clone(),
    };

    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state);

    TestContext {
        documents,
        identity,
        app,
    }
}

fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Seed an administrative caller with a valid token.
fn seed_admin(context: &TestContext, email: &str, role: &str, token: &str) {
    context.documents.insert(
        collections::STAFF_STATE,
        &format!("staff-{email}"),
        json!({"email": email, "role": role}),
    );
    context.identity.insert(email, &format!("uid-{email}"));
    context
        .identity
        .register_token(token, &format!("uid-{email}"), email);
}

#[tokio::test]
async fn test_delete_requires_email() {
    let context = create_test_context();
    seed_admin(&context, "g2@mess.example", "G2 (Mess)", "tok-g2");

    let response = context
        .app
        .oneshot(post_json("/api/users/delete", Some("tok-g2"), json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "invalid-argument");
}

#[tokio::test]
async fn test_delete_requires_authentication() {
    let context = create_test_context();

    let response = context
        .app
        .oneshot(post_json(
            "/api/users/delete",
            None,
            json!({"email": "member@mess.example"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "unauthenticated");
}

#[tokio::test]
async fn test_delete_rejects_non_admin_caller() {
    let context = create_test_context();
    seed_admin(&context, "cook@mess.example", "Mess Member", "tok-cook");
    context.identity.insert("member@mess.example", "uid-m");

    let response = context
        .app
        .oneshot(post_json(
            "/api/users/delete",
            Some("tok-cook"),
            json!({"email": "member@mess.example"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "permission-denied");
    assert!(context.identity.deleted_uids().is_empty());
}

#[tokio::test]
async fn test_delete_protects_pmc_target() {
    let context = create_test_context();
    seed_admin(&context, "secretary@mess.example", "Mess Secretary", "tok-sec");
    seed_admin(&context, "pmc@mess.example", "PMC", "tok-pmc");

    let response = context
        .app
        .oneshot(post_json(
            "/api/users/delete",
            Some("tok-sec"),
            json!({"email": "pmc@mess.example"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "permission-denied");
    assert!(body["error"]["message"].as_str().unwrap().contains("PMC"));
}

#[tokio::test]
async fn test_delete_succeeds_for_admin() {
    let context = create_test_context();
    seed_admin(&context, "g2@mess.example", "G2 (Mess)", "tok-g2");
    context.documents.insert(
        collections::STAFF_STATE,
        "staff-member",
        json!({"email": "member@mess.example", "role": "Mess Member"}),
    );
    context.identity.insert("member@mess.example", "uid-m");

    let response = context
        .app
        .oneshot(post_json(
            "/api/users/delete",
            Some("tok-g2"),
            json!({"email": "member@mess.example"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(context.identity.deleted_uids(), vec!["uid-m".to_string()]);
}

#[tokio::test]
async fn test_delete_reports_absent_identity_as_success() {
    let context = create_test_context();
    seed_admin(&context, "g2@mess.example", "G2 (Mess)", "tok-g2");

    let response = context
        .app
        .oneshot(post_json(
            "/api/users/delete",
            Some("tok-g2"),
            json!({"email": "gone@mess.example"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .contains("already deleted")
    );
}

#[tokio::test]
async fn test_staff_deleted_event_cleans_up_and_acks() {
    let context = create_test_context();
    context.identity.insert("member@mess.example", "uid-m");
    context.documents.insert(
        collections::USERS,
        "u1",
        json!({"email": "member@mess.example"}),
    );
    context.documents.insert(
        collections::USERS,
        "u2",
        json!({"email": "member@mess.example"}),
    );

    let response = context
        .app
        .oneshot(post_json(
            "/api/events/staff-deleted",
            None,
            json!({
                "staffId": "staff-member",
                "email": "member@mess.example",
                "role": "Mess Member",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(context.identity.deleted_uids(), vec!["uid-m".to_string()]);
    assert_eq!(context.documents.collection_len(collections::USERS), 0);
    assert_eq!(context.documents.commit_count(), 1);
}

#[tokio::test]
async fn test_staff_deleted_event_acks_even_without_email() {
    let context = create_test_context();

    let response = context
        .app
        .oneshot(post_json(
            "/api/events/staff-deleted",
            None,
            json!({"staffId": "staff-x"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(context.documents.commit_count(), 0);
}

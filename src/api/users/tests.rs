use axum::http::{Method, StatusCode};
use tower::ServiceExt;

use crate::services::access::permissions;
use crate::test_support;

#[tokio::test]
async fn me_provisions_on_first_request_and_echoes_permissions() {
    let ctx = test_support::setup_test_context().await;
    let token = test_support::bearer_token(
        ctx.state.settings(),
        "fresh@example.com",
        &[permissions::COURSE_ADD, permissions::QUEST_READ],
    );

    let mut ids = Vec::new();
    for _ in 0..2 {
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(Method::GET, "/api/users/me", Some(&token), None))
            .await
            .expect("me");
        let status = response.status();
        let body = test_support::read_json(response).await;
        assert_eq!(status, StatusCode::OK, "response: {body}");
        assert_eq!(body["external_ref"], "fresh@example.com");
        assert_eq!(body["roles"][0], "student");
        assert_eq!(body["permissions"].as_array().map(Vec::len), Some(2));
        ids.push(body["id"].as_i64().expect("id"));
    }
    assert_eq!(ids[0], ids[1]);
}

#[tokio::test]
async fn expired_token_is_unauthorized_with_challenge() {
    let ctx = test_support::setup_test_context().await;
    let now = time::OffsetDateTime::now_utc().unix_timestamp();
    let token = test_support::sign_claims(
        ctx.state.settings(),
        serde_json::json!({ "sub": "late@example.com", "permissions": [], "exp": now - 600 }),
    );

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, "/api/users/me", Some(&token), None))
        .await
        .expect("me");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key("www-authenticate"));
}

#[tokio::test]
async fn user_records_are_self_only_and_listing_needs_permission() {
    let ctx = test_support::setup_test_context().await;
    let pool = ctx.state.db();
    let alice = test_support::insert_user(pool, "alice@example.com").await;
    let bob = test_support::insert_user(pool, "bob@example.com").await;
    let alice_token = test_support::bearer_token(ctx.state.settings(), "alice@example.com", &[]);
    let admin_token = test_support::bearer_token(
        ctx.state.settings(),
        "bob@example.com",
        &[permissions::USER_LIST_READ],
    );

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/users/{}", alice.id),
            Some(&alice_token),
            None,
        ))
        .await
        .expect("own record");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["external_ref"], "alice@example.com");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/users/{}", bob.id),
            Some(&alice_token),
            None,
        ))
        .await
        .expect("someone else's record");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, "/api/users", Some(&alice_token), None))
        .await
        .expect("list without permission");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, "/api/users", Some(&admin_token), None))
        .await
        .expect("list users");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    let refs = body
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|user| user["external_ref"].as_str())
        .collect::<Vec<_>>();
    assert_eq!(refs, vec!["alice@example.com", "bob@example.com"]);
}

use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::services::access::permissions;
use crate::test_support;

const AUTHOR_PERMS: &[&str] = &[
    permissions::QUEST_CREATE,
    permissions::QUEST_READ,
    permissions::QUEST_UPDATE,
    permissions::QUEST_DEL,
];

#[tokio::test]
async fn question_lifecycle_bumps_version_and_soft_deletes() {
    let ctx = test_support::setup_test_context().await;
    let pool = ctx.state.db();
    let teacher = test_support::insert_user(pool, "teacher@example.com").await;
    let course = test_support::insert_course(pool, teacher.id, "Algebra 1").await;
    let token =
        test_support::bearer_token(ctx.state.settings(), "teacher@example.com", AUTHOR_PERMS);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/questions",
            Some(&token),
            Some(json!({
                "course_id": course.id,
                "text": "What is 2+2?",
                "options": ["3", "4", "5"],
                "correct_option": 1
            })),
        ))
        .await
        .expect("create question");
    let status = response.status();
    let created = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {created}");
    assert_eq!(created["version"], 1);
    assert_eq!(created["options"][2]["text"], "5");
    let question_id = created["id"].as_i64().expect("question id");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PUT,
            &format!("/api/questions/{question_id}"),
            Some(&token),
            Some(json!({ "options": ["four", "five"], "correct_option": 0 })),
        ))
        .await
        .expect("update question");
    let status = response.status();
    let updated = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {updated}");
    assert_eq!(updated["version"], 2);
    assert_eq!(updated["text"], "What is 2+2?");
    assert_eq!(updated["options"].as_array().map(Vec::len), Some(2));

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PUT,
            &format!("/api/questions/{question_id}"),
            Some(&token),
            Some(json!({ "text": "What is two plus two?" })),
        ))
        .await
        .expect("edit text");
    let updated = test_support::read_json(response).await;
    assert_eq!(updated["version"], 3);
    assert_eq!(updated["options"][0]["text"], "four");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::DELETE,
            &format!("/api/questions/{question_id}"),
            Some(&token),
            None,
        ))
        .await
        .expect("delete question");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/questions/{question_id}"),
            Some(&token),
            None,
        ))
        .await
        .expect("read deleted question");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_option_sets_are_rejected() {
    let ctx = test_support::setup_test_context().await;
    let pool = ctx.state.db();
    let teacher = test_support::insert_user(pool, "teacher@example.com").await;
    let course = test_support::insert_course(pool, teacher.id, "Algebra 1").await;
    let question = test_support::insert_question(pool, course.id, "Pick", &["a", "b", "c"], 2).await;
    let token =
        test_support::bearer_token(ctx.state.settings(), "teacher@example.com", AUTHOR_PERMS);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/questions",
            Some(&token),
            Some(json!({
                "course_id": course.id,
                "text": "Lonely",
                "options": ["only"],
                "correct_option": 0
            })),
        ))
        .await
        .expect("create single-option question");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Shrinking options must not orphan the stored correct index.
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PUT,
            &format!("/api/questions/{}", question.id),
            Some(&token),
            Some(json!({ "options": ["a", "b"] })),
        ))
        .await
        .expect("shrink options");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn questions_are_only_visible_to_course_members() {
    let ctx = test_support::setup_test_context().await;
    let pool = ctx.state.db();
    let teacher = test_support::insert_user(pool, "teacher@example.com").await;
    let course = test_support::insert_course(pool, teacher.id, "Algebra 1").await;
    let question = test_support::insert_question(pool, course.id, "Pick", &["a", "b"], 0).await;
    let outsider =
        test_support::bearer_token(ctx.state.settings(), "outsider@example.com", AUTHOR_PERMS);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/questions/{}", question.id),
            Some(&outsider),
            None,
        ))
        .await
        .expect("outsider reads question");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/questions",
            Some(&outsider),
            Some(json!({
                "course_id": course.id,
                "text": "Sneaky",
                "options": ["a", "b"],
                "correct_option": 0
            })),
        ))
        .await
        .expect("outsider creates question");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn course_question_list_includes_answers_and_skips_deleted() {
    let ctx = test_support::setup_test_context().await;
    let pool = ctx.state.db();
    let teacher = test_support::insert_user(pool, "teacher@example.com").await;
    let course = test_support::insert_course(pool, teacher.id, "Algebra 1").await;
    let kept = test_support::insert_question(pool, course.id, "Kept", &["a", "b"], 1).await;
    let dropped = test_support::insert_question(pool, course.id, "Dropped", &["a", "b"], 0).await;
    crate::repositories::questions::soft_delete(
        pool,
        dropped.id,
        crate::core::time::primitive_now_utc(),
    )
    .await
    .expect("delete question");

    let lister = test_support::bearer_token(
        ctx.state.settings(),
        "teacher@example.com",
        &[permissions::QUEST_LIST_READ],
    );
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/courses/{}/questions", course.id),
            Some(&lister),
            None,
        ))
        .await
        .expect("list course questions");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    let items = body.as_array().expect("array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], kept.id);
    assert_eq!(items[0]["correct_option"], 1);
    assert_eq!(items[0]["options"].as_array().map(Vec::len), Some(2));

    let without_permission =
        test_support::bearer_token(ctx.state.settings(), "teacher@example.com", AUTHOR_PERMS);
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/courses/{}/questions", course.id),
            Some(&without_permission),
            None,
        ))
        .await
        .expect("list without permission");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

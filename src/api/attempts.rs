use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::Caller;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::attempt::{AnswerResponse, AnswerSubmit, AttemptResponse};
use crate::services::access::{self, permissions, ResourceRef};
use crate::services::attempts;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/tests/:test_id/attempts", post(create_attempt))
        .route("/attempts/:attempt_id", get(get_attempt))
        .route("/attempts/:attempt_id/answers", post(submit_answer))
        .route("/attempts/:attempt_id/complete", post(complete_attempt))
}

async fn create_attempt(
    Path(test_id): Path<i64>,
    Caller(caller): Caller,
    state: State<AppState>,
) -> Result<(StatusCode, Json<AttemptResponse>), ApiError> {
    access::require(state.db(), &caller, permissions::TEST_ANSWER_READ, ResourceRef::None).await?;

    let attempt = attempts::create(state.db(), test_id, caller.user_id).await?;
    Ok((StatusCode::CREATED, Json(AttemptResponse::from_db(attempt))))
}

async fn get_attempt(
    Path(attempt_id): Path<i64>,
    Caller(caller): Caller,
    state: State<AppState>,
) -> Result<Json<AttemptResponse>, ApiError> {
    access::require(
        state.db(),
        &caller,
        permissions::TEST_ANSWER_READ,
        ResourceRef::Attempt(attempt_id),
    )
    .await?;

    let attempt = repositories::attempts::find_by_id(state.db(), attempt_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch attempt"))?
        .ok_or_else(|| ApiError::NotFound("Attempt not found".to_string()))?;
    let answers = repositories::answers::latest_per_question(state.db(), attempt_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load answers"))?;

    Ok(Json(AttemptResponse::from_db(attempt).with_answers(answers)))
}

async fn submit_answer(
    Path(attempt_id): Path<i64>,
    Caller(caller): Caller,
    state: State<AppState>,
    Json(payload): Json<AnswerSubmit>,
) -> Result<(StatusCode, Json<AnswerResponse>), ApiError> {
    access::require(
        state.db(),
        &caller,
        permissions::ANSWER_UPDATE,
        ResourceRef::Attempt(attempt_id),
    )
    .await?;

    let answer = attempts::submit_answer(
        state.db(),
        attempt_id,
        payload.question_id,
        payload.selected_option,
        caller.user_id,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(AnswerResponse::from_db(answer))))
}

async fn complete_attempt(
    Path(attempt_id): Path<i64>,
    Caller(caller): Caller,
    state: State<AppState>,
) -> Result<Json<AttemptResponse>, ApiError> {
    access::require(
        state.db(),
        &caller,
        permissions::TEST_ANSWER_READ,
        ResourceRef::Attempt(attempt_id),
    )
    .await?;

    let attempt = attempts::complete(state.db(), attempt_id, caller.user_id).await?;
    Ok(Json(AttemptResponse::from_db(attempt)))
}

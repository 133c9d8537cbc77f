use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::Caller;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::question::{QuestionCreate, QuestionResponse, QuestionUpdate};
use crate::services::access::{self, permissions, ResourceRef};
use crate::services::questions::{self, QuestionEdit};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/questions", post(create_question))
        .route(
            "/questions/:question_id",
            get(get_question).put(update_question).delete(delete_question),
        )
}

async fn create_question(
    Caller(caller): Caller,
    state: State<AppState>,
    Json(payload): Json<QuestionCreate>,
) -> Result<(StatusCode, Json<QuestionResponse>), ApiError> {
    access::require(
        state.db(),
        &caller,
        permissions::QUEST_CREATE,
        ResourceRef::Course(payload.course_id),
    )
    .await?;
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let (question, options) = repositories::questions::create_with_options(
        state.db(),
        repositories::questions::CreateQuestion {
            course_id: payload.course_id,
            text: payload.text.trim(),
            correct_option: payload.correct_option,
            options: &payload.options,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create question"))?;

    Ok((StatusCode::CREATED, Json(QuestionResponse::from_db(question, options))))
}

async fn get_question(
    Path(question_id): Path<i64>,
    Caller(caller): Caller,
    state: State<AppState>,
) -> Result<Json<QuestionResponse>, ApiError> {
    access::require(
        state.db(),
        &caller,
        permissions::QUEST_READ,
        ResourceRef::Question(question_id),
    )
    .await?;

    let question = repositories::questions::find_by_id(state.db(), question_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch question"))?
        .ok_or_else(|| ApiError::NotFound("Question not found".to_string()))?;
    let options = repositories::questions::options_for(state.db(), question_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load question options"))?;

    Ok(Json(QuestionResponse::from_db(question, options)))
}

async fn update_question(
    Path(question_id): Path<i64>,
    Caller(caller): Caller,
    state: State<AppState>,
    Json(payload): Json<QuestionUpdate>,
) -> Result<Json<QuestionResponse>, ApiError> {
    access::require(
        state.db(),
        &caller,
        permissions::QUEST_UPDATE,
        ResourceRef::Question(question_id),
    )
    .await?;
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let (question, options) = questions::update(
        state.db(),
        question_id,
        QuestionEdit {
            text: payload.text.as_deref(),
            correct_option: payload.correct_option,
            options: payload.options.as_deref(),
        },
    )
    .await?;

    Ok(Json(QuestionResponse::from_db(question, options)))
}

async fn delete_question(
    Path(question_id): Path<i64>,
    Caller(caller): Caller,
    state: State<AppState>,
) -> Result<StatusCode, ApiError> {
    access::require(
        state.db(),
        &caller,
        permissions::QUEST_DEL,
        ResourceRef::Question(question_id),
    )
    .await?;

    let deleted = repositories::questions::soft_delete(state.db(), question_id, primitive_now_utc())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete question"))?;
    if !deleted {
        return Err(ApiError::NotFound("Question not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests;

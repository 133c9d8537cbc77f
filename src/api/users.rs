use axum::extract::{Path, State};
use axum::{routing::get, Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::Caller;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::user::{MeResponse, UserResponse};
use crate::services::access::{self, permissions, ResourceRef};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/me", get(me))
        .route("/users/:user_id", get(get_user))
}

async fn me(Caller(caller): Caller, state: State<AppState>) -> Result<Json<MeResponse>, ApiError> {
    let user = repositories::users::find_by_id(state.db(), caller.user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load user"))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(MeResponse::from_db(user, caller.permissions)))
}

async fn list_users(
    Caller(caller): Caller,
    state: State<AppState>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    access::require(state.db(), &caller, permissions::USER_LIST_READ, ResourceRef::None).await?;

    let users = repositories::users::list_all(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list users"))?;

    Ok(Json(users.into_iter().map(UserResponse::from_db).collect()))
}

/// Only the caller's own record; anyone else's id is 403 whether or not it exists.
async fn get_user(
    Path(user_id): Path<i64>,
    Caller(caller): Caller,
    state: State<AppState>,
) -> Result<Json<UserResponse>, ApiError> {
    if user_id != caller.user_id {
        tracing::info!(user_id = caller.user_id, requested = user_id, "Access denied");
        return Err(ApiError::Forbidden("Access is limited to your own record".to_string()));
    }

    let user = repositories::users::find_by_id(state.db(), user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load user"))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse::from_db(user)))
}

#[cfg(test)]
mod tests;

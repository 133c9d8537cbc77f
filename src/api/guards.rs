use async_trait::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::{header, request::Parts};

use crate::api::errors::ApiError;
use crate::core::{security, state::AppState};
use crate::services::identity::{self, CallerContext};

/// Authenticated caller: token verified, user resolved or provisioned.
pub(crate) struct Caller(pub(crate) CallerContext);

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let State(app_state) = State::<AppState>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to access application state"))?;

        let header = parts.headers.get(header::AUTHORIZATION).and_then(|value| value.to_str().ok());
        let token = security::bearer_token(header)?;
        let claims = security::verify_token(token, app_state.settings())?;

        let ctx = identity::resolve(app_state.db(), claims).await?;
        tracing::Span::current().record("user_id", ctx.user_id);

        Ok(Caller(ctx))
    }
}

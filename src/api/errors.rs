use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::core::security::TokenError;
use crate::services::access::AccessError;
use crate::services::attempts::AttemptError;
use crate::services::identity::IdentityError;
use crate::services::questions::QuestionError;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    status: u16,
    error: String,
}

#[derive(Debug)]
pub(crate) enum ApiError {
    Unauthorized(String),
    Forbidden(String),
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl ApiError {
    /// Log the underlying error with context and return an `Internal` variant.
    pub(crate) fn internal(err: impl std::fmt::Display, context: &str) -> Self {
        tracing::error!(error = %err, "{context}");
        Self::Internal(context.to_string())
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let unauthorized = matches!(self, Self::Unauthorized(_));
        let message = match self {
            Self::Unauthorized(message)
            | Self::Forbidden(message)
            | Self::BadRequest(message)
            | Self::NotFound(message)
            | Self::Internal(message) => message,
        };

        let mut response =
            (status, Json(ErrorResponse { status: status.as_u16(), error: message }))
                .into_response();
        if unauthorized {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Missing => Self::Unauthorized("Missing bearer token".to_string()),
            TokenError::Invalid => {
                Self::Unauthorized("Invalid authentication credentials".to_string())
            }
            TokenError::ClaimMissing(claim) => {
                Self::Unauthorized(format!("Token is missing required claim `{claim}`"))
            }
        }
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        Self::internal(err, "Failed to resolve caller identity")
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Forbidden => Self::Forbidden("Not enough permissions".to_string()),
            AccessError::NotFound(kind) => Self::NotFound(format!("{} not found", kind.as_str())),
            AccessError::CheckFailed(err) => Self::internal(err, "Failed to evaluate access"),
        }
    }
}

impl From<AttemptError> for ApiError {
    fn from(err: AttemptError) -> Self {
        match err {
            AttemptError::TestNotFound | AttemptError::AttemptNotFound => {
                Self::NotFound(err.to_string())
            }
            AttemptError::AttemptForbidden => Self::Forbidden(err.to_string()),
            AttemptError::TestInactive
            | AttemptError::AttemptAlreadyActive
            | AttemptError::AttemptAlreadyComplete
            | AttemptError::QuestionNotInTest
            | AttemptError::InvalidOption
            | AttemptError::IncompleteAnswers { .. } => Self::BadRequest(err.to_string()),
            AttemptError::Storage(err) => Self::internal(err, "Failed to update attempt"),
        }
    }
}

impl From<QuestionError> for ApiError {
    fn from(err: QuestionError) -> Self {
        match err {
            QuestionError::NotFound => Self::NotFound(err.to_string()),
            QuestionError::Invalid(message) => Self::BadRequest(message),
            QuestionError::Storage(err) => Self::internal(err, "Failed to update question"),
        }
    }
}

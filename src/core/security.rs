use std::collections::BTreeSet;

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;

use crate::core::config::Settings;

#[derive(Debug, Error)]
pub(crate) enum TokenError {
    #[error("bearer token is missing")]
    Missing,
    #[error("bearer token is invalid")]
    Invalid,
    #[error("required claim `{0}` is missing")]
    ClaimMissing(&'static str),
}

/// Claims as they arrive on the wire. Everything optional so that absence can
/// be reported per claim instead of as a generic decode failure.
#[derive(Debug, Deserialize)]
struct RawClaims {
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    permissions: Option<Value>,
    #[serde(default)]
    iat: Option<i64>,
}

/// Validated identity bundle extracted from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TokenClaims {
    pub(crate) external_ref: String,
    pub(crate) display_name: Option<String>,
    pub(crate) permissions: BTreeSet<String>,
}

/// Strips the `Bearer` scheme from an `Authorization` header value. The scheme
/// name is matched case-insensitively.
pub(crate) fn bearer_token(header: Option<&str>) -> Result<&str, TokenError> {
    let header = header.ok_or(TokenError::Missing)?.trim_start();
    let (scheme, token) = header.split_once(' ').unwrap_or((header, ""));
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(TokenError::Invalid);
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(TokenError::Missing);
    }
    Ok(token)
}

pub(crate) fn verify_token(token: &str, settings: &Settings) -> Result<TokenClaims, TokenError> {
    let security = settings.security();
    let algorithm = algorithm_from_settings(settings)?;

    let mut validation = Validation::new(algorithm);
    validation.leeway = security.leeway_seconds;
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();
    validation.required_spec_claims.insert("exp".to_string());

    let raw = decode::<RawClaims>(
        token,
        &DecodingKey::from_secret(security.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|err| {
        tracing::debug!(error = %err, "Token rejected");
        TokenError::Invalid
    })?
    .claims;

    if let Some(issued_at) = raw.iat {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        if issued_at > now.saturating_add(security.leeway_seconds as i64) {
            return Err(TokenError::Invalid);
        }
    }

    let external_ref = raw
        .sub
        .or(raw.user_id)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or(TokenError::ClaimMissing("sub"))?;

    let permissions = parse_permissions(raw.permissions)?;

    let display_name = raw
        .name
        .or(raw.username)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());

    Ok(TokenClaims { external_ref, display_name, permissions })
}

fn parse_permissions(value: Option<Value>) -> Result<BTreeSet<String>, TokenError> {
    let Some(value) = value else {
        return Err(TokenError::ClaimMissing("permissions"));
    };
    let Value::Array(items) = value else {
        return Err(TokenError::Invalid);
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::String(permission) => Ok(permission),
            _ => Err(TokenError::Invalid),
        })
        .collect()
}

fn algorithm_from_settings(settings: &Settings) -> Result<Algorithm, TokenError> {
    match settings.security().algorithm.as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => {
            tracing::error!(algorithm = other, "Unsupported JWT algorithm configured");
            Err(TokenError::Invalid)
        }
    }
}

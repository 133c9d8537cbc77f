use std::collections::BTreeSet;

use sqlx::PgPool;
use thiserror::Error;

use crate::core::metrics::USERS_PROVISIONED_TOTAL;
use crate::core::security::TokenClaims;
use crate::core::time::primitive_now_utc;
use crate::db::models::User;
use crate::db::types::DEFAULT_USER_ROLE;
use crate::repositories;

#[derive(Debug, Error)]
pub(crate) enum IdentityError {
    #[error("identity store unavailable: {0}")]
    StoreUnavailable(#[from] sqlx::Error),
    #[error("user row for external ref disappeared after conflicting insert")]
    Vanished,
}

/// Who is calling, resolved once per request and passed by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CallerContext {
    pub(crate) user_id: i64,
    pub(crate) external_ref: String,
    pub(crate) permissions: BTreeSet<String>,
}

impl CallerContext {
    pub(crate) fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }
}

/// Maps the token subject to an internal user, provisioning it on first sight.
pub(crate) async fn resolve(pool: &PgPool, claims: TokenClaims) -> Result<CallerContext, IdentityError> {
    let user = find_or_provision(pool, &claims.external_ref, claims.display_name.as_deref()).await?;

    Ok(CallerContext {
        user_id: user.id,
        external_ref: claims.external_ref,
        permissions: claims.permissions,
    })
}

pub(crate) async fn find_or_provision(
    pool: &PgPool,
    external_ref: &str,
    display_name: Option<&str>,
) -> Result<User, IdentityError> {
    if let Some(user) = repositories::users::find_by_external_ref(pool, external_ref).await? {
        return Ok(user);
    }

    let created = repositories::users::insert_if_absent(
        pool,
        repositories::users::CreateUser {
            external_ref,
            full_name: display_name.unwrap_or(external_ref),
            role: DEFAULT_USER_ROLE,
            created_at: primitive_now_utc(),
        },
    )
    .await?;

    if let Some(user) = created {
        metrics::counter!(USERS_PROVISIONED_TOTAL).increment(1);
        tracing::info!(user_id = user.id, external_ref = %external_ref, "Provisioned new user");
        return Ok(user);
    }

    // A concurrent request inserted the row between our read and our insert.
    repositories::users::find_by_external_ref(pool, external_ref)
        .await?
        .ok_or(IdentityError::Vanished)
}

use sqlx::PgPool;

use crate::db::models::User;

const COLUMNS: &str = "id, external_ref, full_name, roles, created_at, updated_at";

pub(crate) struct CreateUser<'a> {
    pub(crate) external_ref: &'a str,
    pub(crate) full_name: &'a str,
    pub(crate) role: &'a str,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_all(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users ORDER BY id"))
        .fetch_all(pool)
        .await
}

pub(crate) async fn find_by_external_ref(
    executor: impl sqlx::PgExecutor<'_>,
    external_ref: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE external_ref = $1"))
        .bind(external_ref)
        .fetch_optional(executor)
        .await
}

/// Returns `None` when another writer already holds the external ref.
pub(crate) async fn insert_if_absent(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateUser<'_>,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (external_ref, full_name, roles, created_at, updated_at)
         VALUES ($1, $2, ARRAY[$3]::TEXT[], $4, $4)
         ON CONFLICT (external_ref) DO NOTHING
         RETURNING {COLUMNS}",
    ))
    .bind(params.external_ref)
    .bind(params.full_name)
    .bind(params.role)
    .bind(params.created_at)
    .fetch_optional(executor)
    .await
}

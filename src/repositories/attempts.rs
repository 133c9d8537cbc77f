use sqlx::PgPool;

use crate::db::models::Attempt;

const COLUMNS: &str = "id, user_id, test_id, is_complete, created_at, updated_at, completed_at";

/// Inserts an open attempt unless one already exists for the pair. The
/// partial unique index turns a lost race into `None` rather than an error.
pub(crate) async fn insert_if_none_open(
    executor: impl sqlx::PgExecutor<'_>,
    user_id: i64,
    test_id: i64,
    created_at: time::PrimitiveDateTime,
) -> Result<Option<Attempt>, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(&format!(
        "INSERT INTO attempts (user_id, test_id, is_complete, created_at, updated_at)
         VALUES ($1, $2, FALSE, $3, $3)
         ON CONFLICT (user_id, test_id) WHERE NOT is_complete DO NOTHING
         RETURNING {COLUMNS}",
    ))
    .bind(user_id)
    .bind(test_id)
    .bind(created_at)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    attempt_id: i64,
) -> Result<Option<Attempt>, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(&format!("SELECT {COLUMNS} FROM attempts WHERE id = $1"))
        .bind(attempt_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn lock_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    attempt_id: i64,
) -> Result<Option<Attempt>, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(&format!(
        "SELECT {COLUMNS} FROM attempts WHERE id = $1 FOR UPDATE"
    ))
    .bind(attempt_id)
    .fetch_optional(executor)
    .await
}

/// Owner and owning course (through the attempt's test, deleted or not).
pub(crate) async fn owner_and_course(
    pool: &PgPool,
    attempt_id: i64,
) -> Result<Option<(i64, i64)>, sqlx::Error> {
    sqlx::query_as::<_, (i64, i64)>(
        "SELECT a.user_id, t.course_id
         FROM attempts a
         JOIN tests t ON t.id = a.test_id
         WHERE a.id = $1",
    )
    .bind(attempt_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn touch(
    executor: impl sqlx::PgExecutor<'_>,
    attempt_id: i64,
    updated_at: time::PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE attempts SET updated_at = $2 WHERE id = $1")
        .bind(attempt_id)
        .bind(updated_at)
        .execute(executor)
        .await?;
    Ok(())
}

pub(crate) async fn mark_complete(
    executor: impl sqlx::PgExecutor<'_>,
    attempt_id: i64,
    completed_at: time::PrimitiveDateTime,
) -> Result<Attempt, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(&format!(
        "UPDATE attempts
         SET is_complete = TRUE, updated_at = $2, completed_at = $2
         WHERE id = $1
         RETURNING {COLUMNS}"
    ))
    .bind(attempt_id)
    .bind(completed_at)
    .fetch_one(executor)
    .await
}

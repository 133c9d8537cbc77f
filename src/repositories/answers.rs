use sqlx::PgPool;

use crate::db::models::Answer;

const COLUMNS: &str = "id, attempt_id, question_id, selected_option, created_at";

pub(crate) async fn insert(
    executor: impl sqlx::PgExecutor<'_>,
    attempt_id: i64,
    question_id: i64,
    selected_option: i32,
    created_at: time::PrimitiveDateTime,
) -> Result<Answer, sqlx::Error> {
    sqlx::query_as::<_, Answer>(&format!(
        "INSERT INTO answers (attempt_id, question_id, selected_option, created_at)
         VALUES ($1, $2, $3, $4)
         RETURNING {COLUMNS}",
    ))
    .bind(attempt_id)
    .bind(question_id)
    .bind(selected_option)
    .bind(created_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn answered_question_ids(
    executor: impl sqlx::PgExecutor<'_>,
    attempt_id: i64,
) -> Result<Vec<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT DISTINCT question_id FROM answers WHERE attempt_id = $1")
        .bind(attempt_id)
        .fetch_all(executor)
        .await
}

/// One row per answered question: the most recent submission wins.
pub(crate) async fn latest_per_question(
    pool: &PgPool,
    attempt_id: i64,
) -> Result<Vec<Answer>, sqlx::Error> {
    sqlx::query_as::<_, Answer>(&format!(
        "SELECT DISTINCT ON (question_id) {COLUMNS}
         FROM answers
         WHERE attempt_id = $1
         ORDER BY question_id, created_at DESC, id DESC"
    ))
    .bind(attempt_id)
    .fetch_all(pool)
    .await
}

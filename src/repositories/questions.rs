use sqlx::{PgPool, Postgres, Transaction};

use crate::db::models::{Question, QuestionOption};

const COLUMNS: &str =
    "id, course_id, text, correct_option, version, is_deleted, created_at, updated_at";

pub(crate) struct CreateQuestion<'a> {
    pub(crate) course_id: i64,
    pub(crate) text: &'a str,
    pub(crate) correct_option: i32,
    pub(crate) options: &'a [String],
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create_with_options(
    pool: &PgPool,
    params: CreateQuestion<'_>,
) -> Result<(Question, Vec<QuestionOption>), sqlx::Error> {
    let mut tx = pool.begin().await?;

    let question = sqlx::query_as::<_, Question>(&format!(
        "INSERT INTO questions (course_id, text, correct_option, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $4)
         RETURNING {COLUMNS}",
    ))
    .bind(params.course_id)
    .bind(params.text)
    .bind(params.correct_option)
    .bind(params.created_at)
    .fetch_one(&mut *tx)
    .await?;

    let options = insert_options(&mut tx, question.id, params.options, params.created_at).await?;

    tx.commit().await?;
    Ok((question, options))
}

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    question_id: i64,
) -> Result<Option<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {COLUMNS} FROM questions WHERE id = $1 AND NOT is_deleted"
    ))
    .bind(question_id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn course_id_of(
    pool: &PgPool,
    question_id: i64,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT course_id FROM questions WHERE id = $1 AND NOT is_deleted",
    )
    .bind(question_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn options_for(
    executor: impl sqlx::PgExecutor<'_>,
    question_id: i64,
) -> Result<Vec<QuestionOption>, sqlx::Error> {
    sqlx::query_as::<_, QuestionOption>(
        "SELECT question_id, option_index, text FROM question_options
         WHERE question_id = $1
         ORDER BY option_index",
    )
    .bind(question_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn options_for_many(
    pool: &PgPool,
    question_ids: &[i64],
) -> Result<Vec<QuestionOption>, sqlx::Error> {
    if question_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, QuestionOption>(
        "SELECT question_id, option_index, text FROM question_options
         WHERE question_id = ANY($1)
         ORDER BY question_id, option_index",
    )
    .bind(question_ids)
    .fetch_all(pool)
    .await
}

pub(crate) async fn option_count(
    executor: impl sqlx::PgExecutor<'_>,
    question_id: i64,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM question_options WHERE question_id = $1")
        .bind(question_id)
        .fetch_one(executor)
        .await
}

pub(crate) async fn list_for_course(
    pool: &PgPool,
    course_id: i64,
) -> Result<Vec<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {COLUMNS} FROM questions
         WHERE course_id = $1 AND NOT is_deleted
         ORDER BY created_at, id"
    ))
    .bind(course_id)
    .fetch_all(pool)
    .await
}

/// Questions of a test's question set, in binding order.
pub(crate) async fn list_for_test(pool: &PgPool, test_id: i64) -> Result<Vec<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(
        "SELECT q.id, q.course_id, q.text, q.correct_option, q.version, q.is_deleted,
                q.created_at, q.updated_at
         FROM test_questions tq
         JOIN questions q ON q.id = tq.question_id
         WHERE tq.test_id = $1 AND NOT q.is_deleted
         ORDER BY tq.created_at, q.id",
    )
    .bind(test_id)
    .fetch_all(pool)
    .await
}

/// Row-locks a live question for the rest of the transaction.
pub(crate) async fn lock_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    question_id: i64,
) -> Result<Option<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {COLUMNS} FROM questions WHERE id = $1 AND NOT is_deleted FOR UPDATE"
    ))
    .bind(question_id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn update_fields(
    executor: impl sqlx::PgExecutor<'_>,
    question_id: i64,
    text: &str,
    correct_option: i32,
    updated_at: time::PrimitiveDateTime,
) -> Result<Question, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "UPDATE questions
         SET text = $2, correct_option = $3, version = version + 1, updated_at = $4
         WHERE id = $1
         RETURNING {COLUMNS}"
    ))
    .bind(question_id)
    .bind(text)
    .bind(correct_option)
    .bind(updated_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn replace_options(
    tx: &mut Transaction<'_, Postgres>,
    question_id: i64,
    options: &[String],
    created_at: time::PrimitiveDateTime,
) -> Result<Vec<QuestionOption>, sqlx::Error> {
    sqlx::query("DELETE FROM question_options WHERE question_id = $1")
        .bind(question_id)
        .execute(&mut **tx)
        .await?;
    insert_options(tx, question_id, options, created_at).await
}

pub(crate) async fn soft_delete(
    pool: &PgPool,
    question_id: i64,
    updated_at: time::PrimitiveDateTime,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE questions SET is_deleted = TRUE, updated_at = $2
         WHERE id = $1 AND NOT is_deleted",
    )
    .bind(question_id)
    .bind(updated_at)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

async fn insert_options(
    tx: &mut Transaction<'_, Postgres>,
    question_id: i64,
    options: &[String],
    created_at: time::PrimitiveDateTime,
) -> Result<Vec<QuestionOption>, sqlx::Error> {
    let mut inserted = Vec::with_capacity(options.len());
    for (index, text) in options.iter().enumerate() {
        let option = sqlx::query_as::<_, QuestionOption>(
            "INSERT INTO question_options (question_id, option_index, text, created_at)
             VALUES ($1, $2, $3, $4)
             RETURNING question_id, option_index, text",
        )
        .bind(question_id)
        .bind(index as i32)
        .bind(text)
        .bind(created_at)
        .fetch_one(&mut **tx)
        .await?;
        inserted.push(option);
    }
    Ok(inserted)
}

use std::collections::HashSet;

use sqlx::PgPool;
use thiserror::Error;

use crate::core::metrics::{ATTEMPTS_COMPLETED_TOTAL, ATTEMPTS_CREATED_TOTAL};
use crate::core::time::primitive_now_utc;
use crate::db::models::{Answer, Attempt};
use crate::repositories;

#[derive(Debug, Error)]
pub(crate) enum AttemptError {
    #[error("Test not found")]
    TestNotFound,
    #[error("Test is not active")]
    TestInactive,
    #[error("An attempt for this test is already in progress")]
    AttemptAlreadyActive,
    #[error("Attempt not found")]
    AttemptNotFound,
    #[error("Attempt belongs to another user")]
    AttemptForbidden,
    #[error("Attempt is already complete")]
    AttemptAlreadyComplete,
    #[error("Question is not part of this test")]
    QuestionNotInTest,
    #[error("Selected option is out of range")]
    InvalidOption,
    #[error("Not all questions answered. Answered: {answered} of {total}")]
    IncompleteAnswers { answered: usize, total: usize },
    #[error("attempt storage failure: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Distinct answered questions that belong to the test's question set.
/// Duplicates and answers to questions since unbound are ignored.
pub(crate) fn coverage(question_set: &[i64], answered: &[i64]) -> (usize, usize) {
    let required: HashSet<i64> = question_set.iter().copied().collect();
    let covered =
        answered.iter().copied().filter(|id| required.contains(id)).collect::<HashSet<i64>>();
    (covered.len(), required.len())
}

pub(crate) async fn create(
    pool: &PgPool,
    test_id: i64,
    user_id: i64,
) -> Result<Attempt, AttemptError> {
    let test = repositories::course_tests::find_by_id(pool, test_id)
        .await?
        .ok_or(AttemptError::TestNotFound)?;
    if !test.is_active {
        return Err(AttemptError::TestInactive);
    }

    let attempt =
        repositories::attempts::insert_if_none_open(pool, user_id, test_id, primitive_now_utc())
            .await?
            .ok_or(AttemptError::AttemptAlreadyActive)?;

    metrics::counter!(ATTEMPTS_CREATED_TOTAL).increment(1);
    tracing::info!(attempt_id = attempt.id, test_id, user_id, "Attempt started");

    Ok(attempt)
}

pub(crate) async fn submit_answer(
    pool: &PgPool,
    attempt_id: i64,
    question_id: i64,
    selected_option: i32,
    user_id: i64,
) -> Result<Answer, AttemptError> {
    let mut tx = pool.begin().await?;

    let attempt = lock_owned_open(&mut tx, attempt_id, user_id).await?;

    let question_set = repositories::course_tests::question_ids(&mut *tx, attempt.test_id).await?;
    if !question_set.contains(&question_id) {
        return Err(AttemptError::QuestionNotInTest);
    }

    let option_count = repositories::questions::option_count(&mut *tx, question_id).await?;
    if selected_option < 0 || i64::from(selected_option) >= option_count {
        return Err(AttemptError::InvalidOption);
    }

    let now = primitive_now_utc();
    let answer =
        repositories::answers::insert(&mut *tx, attempt_id, question_id, selected_option, now)
            .await?;
    repositories::attempts::touch(&mut *tx, attempt_id, now).await?;

    tx.commit().await?;

    tracing::debug!(attempt_id, question_id, selected_option, "Answer recorded");
    Ok(answer)
}

pub(crate) async fn complete(
    pool: &PgPool,
    attempt_id: i64,
    user_id: i64,
) -> Result<Attempt, AttemptError> {
    let mut tx = pool.begin().await?;

    let attempt = lock_owned_open(&mut tx, attempt_id, user_id).await?;

    let question_set = repositories::course_tests::question_ids(&mut *tx, attempt.test_id).await?;
    let answered = repositories::answers::answered_question_ids(&mut *tx, attempt_id).await?;
    let (answered, total) = coverage(&question_set, &answered);
    if answered != total {
        return Err(AttemptError::IncompleteAnswers { answered, total });
    }

    let completed =
        repositories::attempts::mark_complete(&mut *tx, attempt_id, primitive_now_utc()).await?;
    tx.commit().await?;

    metrics::counter!(ATTEMPTS_COMPLETED_TOTAL).increment(1);
    tracing::info!(attempt_id, test_id = completed.test_id, user_id, "Attempt completed");

    Ok(completed)
}

/// Row-locks the attempt and checks ownership. The attempt must be open and
/// its test (and course) not deleted.
async fn lock_owned_open(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    attempt_id: i64,
    user_id: i64,
) -> Result<Attempt, AttemptError> {
    let attempt = repositories::attempts::lock_by_id(&mut **tx, attempt_id)
        .await?
        .ok_or(AttemptError::AttemptNotFound)?;
    if attempt.user_id != user_id {
        return Err(AttemptError::AttemptForbidden);
    }
    if attempt.is_complete {
        return Err(AttemptError::AttemptAlreadyComplete);
    }
    repositories::course_tests::find_by_id(&mut **tx, attempt.test_id)
        .await?
        .ok_or(AttemptError::TestNotFound)?;
    Ok(attempt)
}

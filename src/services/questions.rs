use sqlx::PgPool;
use thiserror::Error;

use crate::core::time::primitive_now_utc;
use crate::db::models::{Question, QuestionOption};
use crate::repositories;
use crate::schemas::question::validate_option_set;

#[derive(Debug, Error)]
pub(crate) enum QuestionError {
    #[error("Question not found")]
    NotFound,
    #[error("{0}")]
    Invalid(String),
    #[error("question storage failure: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Partial edit. Absent fields keep their stored values.
#[derive(Debug, Default)]
pub(crate) struct QuestionEdit<'a> {
    pub(crate) text: Option<&'a str>,
    pub(crate) correct_option: Option<i32>,
    pub(crate) options: Option<&'a [String]>,
}

/// Merges the edit with the row as it stands under `FOR UPDATE` and validates
/// the result before writing, so concurrent edits cannot leave
/// `correct_option` pointing past the option set.
pub(crate) async fn update(
    pool: &PgPool,
    question_id: i64,
    edit: QuestionEdit<'_>,
) -> Result<(Question, Vec<QuestionOption>), QuestionError> {
    let mut tx = pool.begin().await?;

    let current = repositories::questions::lock_by_id(&mut *tx, question_id)
        .await?
        .ok_or(QuestionError::NotFound)?;

    let text = edit.text.map(str::trim).unwrap_or(&current.text).to_string();
    let correct_option = edit.correct_option.unwrap_or(current.correct_option);
    let (merged, stored) = match edit.options {
        Some(options) => (options.to_vec(), None),
        None => {
            let stored = repositories::questions::options_for(&mut *tx, question_id).await?;
            (stored.iter().map(|option| option.text.clone()).collect::<Vec<_>>(), Some(stored))
        }
    };
    validate_option_set(&merged, correct_option)
        .map_err(|err| QuestionError::Invalid(err.to_string()))?;

    let now = primitive_now_utc();
    let question =
        repositories::questions::update_fields(&mut *tx, question_id, &text, correct_option, now)
            .await?;
    let options = match stored {
        Some(stored) => stored,
        None => repositories::questions::replace_options(&mut tx, question_id, &merged, now).await?,
    };

    tx.commit().await?;

    tracing::info!(question_id, version = question.version, "Question updated");
    Ok((question, options))
}

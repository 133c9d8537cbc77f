use serde::{Deserialize, Serialize};

use crate::core::time::format_primitive;
use crate::db::models::{Answer, Attempt};

#[derive(Debug, Deserialize)]
pub(crate) struct AnswerSubmit {
    #[serde(alias = "questionId")]
    pub(crate) question_id: i64,
    #[serde(alias = "selectedOption", alias = "option")]
    pub(crate) selected_option: i32,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnswerResponse {
    pub(crate) id: i64,
    pub(crate) attempt_id: i64,
    pub(crate) question_id: i64,
    pub(crate) selected_option: i32,
    pub(crate) created_at: String,
}

impl AnswerResponse {
    pub(crate) fn from_db(answer: Answer) -> Self {
        Self {
            id: answer.id,
            attempt_id: answer.attempt_id,
            question_id: answer.question_id,
            selected_option: answer.selected_option,
            created_at: format_primitive(answer.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AttemptResponse {
    pub(crate) id: i64,
    pub(crate) user_id: i64,
    pub(crate) test_id: i64,
    pub(crate) is_complete: bool,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
    pub(crate) completed_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) answers: Option<Vec<AnswerResponse>>,
}

impl AttemptResponse {
    pub(crate) fn from_db(attempt: Attempt) -> Self {
        Self {
            id: attempt.id,
            user_id: attempt.user_id,
            test_id: attempt.test_id,
            is_complete: attempt.is_complete,
            created_at: format_primitive(attempt.created_at),
            updated_at: format_primitive(attempt.updated_at),
            completed_at: attempt.completed_at.map(format_primitive),
            answers: None,
        }
    }

    /// Attaches the effective answer per question (latest submission).
    pub(crate) fn with_answers(mut self, answers: Vec<Answer>) -> Self {
        self.answers = Some(answers.into_iter().map(AnswerResponse::from_db).collect());
        self
    }
}

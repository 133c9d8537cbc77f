use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::core::time::format_primitive;
use crate::db::models::{Question, QuestionOption};

pub(crate) const MIN_OPTIONS: usize = 2;
pub(crate) const MAX_OPTIONS: usize = 26;

#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = validate_question_create))]
pub(crate) struct QuestionCreate {
    #[serde(alias = "courseId")]
    pub(crate) course_id: i64,
    #[validate(length(min = 1, message = "text must not be empty"))]
    pub(crate) text: String,
    pub(crate) options: Vec<String>,
    #[serde(alias = "correctOption", alias = "correct")]
    pub(crate) correct_option: i32,
}

/// Partial edit. Omitted fields keep their stored values; the merged result
/// is checked with [`validate_option_set`] before it is written.
#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuestionUpdate {
    #[serde(default)]
    #[validate(length(min = 1, message = "text must not be empty"))]
    pub(crate) text: Option<String>,
    #[serde(default)]
    pub(crate) options: Option<Vec<String>>,
    #[serde(default, alias = "correctOption", alias = "correct")]
    pub(crate) correct_option: Option<i32>,
}

fn validate_question_create(payload: &QuestionCreate) -> Result<(), ValidationError> {
    validate_option_set(&payload.options, payload.correct_option)
}

pub(crate) fn validate_option_set(
    options: &[String],
    correct_option: i32,
) -> Result<(), ValidationError> {
    if options.len() < MIN_OPTIONS || options.len() > MAX_OPTIONS {
        return Err(ValidationError::new("options_count")
            .with_message(format!("a question needs {MIN_OPTIONS}-{MAX_OPTIONS} options").into()));
    }
    if options.iter().any(|option| option.trim().is_empty()) {
        return Err(ValidationError::new("options_blank")
            .with_message("options must not be blank".into()));
    }
    if correct_option < 0 || correct_option as usize >= options.len() {
        return Err(ValidationError::new("correct_option_range")
            .with_message("correct_option must index one of the options".into()));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub(crate) struct OptionResponse {
    pub(crate) index: i32,
    pub(crate) text: String,
}

impl OptionResponse {
    fn from_db(option: QuestionOption) -> Self {
        Self { index: option.option_index, text: option.text }
    }
}

/// Author view, including the correct answer.
#[derive(Debug, Serialize)]
pub(crate) struct QuestionResponse {
    pub(crate) id: i64,
    pub(crate) course_id: i64,
    pub(crate) text: String,
    pub(crate) options: Vec<OptionResponse>,
    pub(crate) correct_option: i32,
    pub(crate) version: i32,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl QuestionResponse {
    pub(crate) fn from_db(question: Question, options: Vec<QuestionOption>) -> Self {
        Self {
            id: question.id,
            course_id: question.course_id,
            text: question.text,
            options: options.into_iter().map(OptionResponse::from_db).collect(),
            correct_option: question.correct_option,
            version: question.version,
            created_at: format_primitive(question.created_at),
            updated_at: format_primitive(question.updated_at),
        }
    }

    pub(crate) fn from_db_many(
        questions: Vec<Question>,
        options: Vec<QuestionOption>,
    ) -> Vec<Self> {
        let mut by_question: HashMap<i64, Vec<QuestionOption>> = HashMap::new();
        for option in options {
            by_question.entry(option.question_id).or_default().push(option);
        }

        questions
            .into_iter()
            .map(|question| {
                let options = by_question.remove(&question.id).unwrap_or_default();
                Self::from_db(question, options)
            })
            .collect()
    }
}

/// What a test taker sees: no correct answer, no audit fields.
#[derive(Debug, Serialize)]
pub(crate) struct PublicQuestionResponse {
    pub(crate) id: i64,
    pub(crate) text: String,
    pub(crate) options: Vec<OptionResponse>,
}

impl PublicQuestionResponse {
    pub(crate) fn from_db_many(
        questions: Vec<Question>,
        options: Vec<QuestionOption>,
    ) -> Vec<Self> {
        let mut by_question: HashMap<i64, Vec<OptionResponse>> = HashMap::new();
        for option in options {
            by_question.entry(option.question_id).or_default().push(OptionResponse::from_db(option));
        }

        questions
            .into_iter()
            .map(|question| Self {
                id: question.id,
                text: question.text,
                options: by_question.remove(&question.id).unwrap_or_default(),
            })
            .collect()
    }
}

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::EnrollmentRole;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct User {
    pub(crate) id: i64,
    pub(crate) external_ref: String,
    pub(crate) full_name: Option<String>,
    pub(crate) roles: Vec<String>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Course {
    pub(crate) id: i64,
    pub(crate) teacher_id: i64,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) is_active: bool,
    pub(crate) is_deleted: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

/// Enrollment row joined with the enrolled user's public fields.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct CourseMember {
    pub(crate) user_id: i64,
    pub(crate) course_id: i64,
    pub(crate) role: EnrollmentRole,
    pub(crate) external_ref: String,
    pub(crate) full_name: Option<String>,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct CourseTest {
    pub(crate) id: i64,
    pub(crate) course_id: i64,
    pub(crate) name: String,
    pub(crate) is_active: bool,
    pub(crate) is_deleted: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Question {
    pub(crate) id: i64,
    pub(crate) course_id: i64,
    pub(crate) text: String,
    pub(crate) correct_option: i32,
    pub(crate) version: i32,
    pub(crate) is_deleted: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct QuestionOption {
    pub(crate) question_id: i64,
    pub(crate) option_index: i32,
    pub(crate) text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Attempt {
    pub(crate) id: i64,
    pub(crate) user_id: i64,
    pub(crate) test_id: i64,
    pub(crate) is_complete: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
    pub(crate) completed_at: Option<PrimitiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Answer {
    pub(crate) id: i64,
    pub(crate) attempt_id: i64,
    pub(crate) question_id: i64,
    pub(crate) selected_option: i32,
    pub(crate) created_at: PrimitiveDateTime,
}

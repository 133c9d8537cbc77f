use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{Course, CourseMember};
use crate::db::types::EnrollmentRole;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CourseCreate {
    #[validate(length(min = 1, max = 200, message = "name must be 1-200 characters"))]
    pub(crate) name: String,
    #[serde(default)]
    #[validate(length(max = 4000, message = "description is too long"))]
    pub(crate) description: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CourseResponse {
    pub(crate) id: i64,
    pub(crate) teacher_id: i64,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) is_active: bool,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl CourseResponse {
    pub(crate) fn from_db(course: Course) -> Self {
        Self {
            id: course.id,
            teacher_id: course.teacher_id,
            name: course.name,
            description: course.description,
            is_active: course.is_active,
            created_at: format_primitive(course.created_at),
            updated_at: format_primitive(course.updated_at),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct EnrollRequest {
    #[serde(alias = "userId")]
    pub(crate) user_id: i64,
    #[serde(default = "default_enrollment_role")]
    pub(crate) role: EnrollmentRole,
}

fn default_enrollment_role() -> EnrollmentRole {
    EnrollmentRole::Student
}

#[derive(Debug, Serialize)]
pub(crate) struct CourseMemberResponse {
    pub(crate) user_id: i64,
    pub(crate) course_id: i64,
    pub(crate) role: EnrollmentRole,
    pub(crate) external_ref: String,
    pub(crate) full_name: Option<String>,
    pub(crate) enrolled_at: String,
}

impl CourseMemberResponse {
    pub(crate) fn from_db(member: CourseMember) -> Self {
        Self {
            user_id: member.user_id,
            course_id: member.course_id,
            role: member.role,
            external_ref: member.external_ref,
            full_name: member.full_name,
            enrolled_at: format_primitive(member.created_at),
        }
    }
}

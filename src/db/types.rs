use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "enrollmentrole", rename_all = "lowercase")]
pub(crate) enum EnrollmentRole {
    Teacher,
    Student,
}

impl EnrollmentRole {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Teacher => "teacher",
            Self::Student => "student",
        }
    }
}

/// Role every implicitly provisioned user starts with.
pub(crate) const DEFAULT_USER_ROLE: &str = "student";

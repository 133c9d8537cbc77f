pub(crate) mod answers;
pub(crate) mod attempts;
pub(crate) mod courses;
pub(crate) mod enrollments;
pub(crate) mod health;
pub(crate) mod questions;
pub(crate) mod users;

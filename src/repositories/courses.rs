use sqlx::PgPool;

use crate::db::models::Course;
use crate::db::types::EnrollmentRole;

const COLUMNS: &str =
    "id, teacher_id, name, description, is_active, is_deleted, created_at, updated_at";

pub(crate) struct CreateCourse<'a> {
    pub(crate) teacher_id: i64,
    pub(crate) name: &'a str,
    pub(crate) description: Option<&'a str>,
    pub(crate) created_at: time::PrimitiveDateTime,
}

/// Inserts the course and its owner's teacher enrollment as one unit.
pub(crate) async fn create_with_owner(
    pool: &PgPool,
    params: CreateCourse<'_>,
) -> Result<Course, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let course = sqlx::query_as::<_, Course>(&format!(
        "INSERT INTO courses (teacher_id, name, description, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $4)
         RETURNING {COLUMNS}",
    ))
    .bind(params.teacher_id)
    .bind(params.name)
    .bind(params.description)
    .bind(params.created_at)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO course_enrollments (user_id, course_id, role, created_at)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(params.teacher_id)
    .bind(course.id)
    .bind(EnrollmentRole::Teacher)
    .bind(params.created_at)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(course)
}

pub(crate) async fn find_by_id(pool: &PgPool, course_id: i64) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "SELECT {COLUMNS} FROM courses WHERE id = $1 AND NOT is_deleted"
    ))
    .bind(course_id)
    .fetch_optional(pool)
    .await
}

/// Courses the user teaches or is enrolled in, newest first.
pub(crate) async fn list_for_user(pool: &PgPool, user_id: i64) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "SELECT {COLUMNS} FROM courses c
         WHERE NOT c.is_deleted
           AND (c.teacher_id = $1 OR EXISTS (
                SELECT 1 FROM course_enrollments e
                WHERE e.course_id = c.id AND e.user_id = $1))
         ORDER BY c.created_at DESC, c.id DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// `None` when the course is absent or soft-deleted, otherwise whether the
/// user teaches it or is enrolled in it.
pub(crate) async fn user_has_access(
    pool: &PgPool,
    course_id: i64,
    user_id: i64,
) -> Result<Option<bool>, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT c.teacher_id = $2 OR EXISTS (
                SELECT 1 FROM course_enrollments e
                WHERE e.course_id = c.id AND e.user_id = $2)
         FROM courses c
         WHERE c.id = $1 AND NOT c.is_deleted",
    )
    .bind(course_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn soft_delete(
    pool: &PgPool,
    course_id: i64,
    updated_at: time::PrimitiveDateTime,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE courses SET is_deleted = TRUE, is_active = FALSE, updated_at = $2
         WHERE id = $1 AND NOT is_deleted",
    )
    .bind(course_id)
    .bind(updated_at)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

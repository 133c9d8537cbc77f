use sqlx::PgPool;

use crate::db::models::CourseMember;
use crate::db::types::EnrollmentRole;

pub(crate) async fn add(
    pool: &PgPool,
    course_id: i64,
    user_id: i64,
    role: EnrollmentRole,
    created_at: time::PrimitiveDateTime,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO course_enrollments (user_id, course_id, role, created_at)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (user_id, course_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(course_id)
    .bind(role)
    .bind(created_at)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn remove(pool: &PgPool, course_id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM course_enrollments WHERE course_id = $1 AND user_id = $2")
            .bind(course_id)
            .bind(user_id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn list_members(
    pool: &PgPool,
    course_id: i64,
) -> Result<Vec<CourseMember>, sqlx::Error> {
    sqlx::query_as::<_, CourseMember>(
        "SELECT e.user_id, e.course_id, e.role, u.external_ref, u.full_name, e.created_at
         FROM course_enrollments e
         JOIN users u ON u.id = e.user_id
         WHERE e.course_id = $1
         ORDER BY e.role, e.created_at, e.user_id",
    )
    .bind(course_id)
    .fetch_all(pool)
    .await
}

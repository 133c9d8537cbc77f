use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::Caller;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::course::{CourseCreate, CourseMemberResponse, CourseResponse, EnrollRequest};
use crate::schemas::course_test::{CourseTestCreate, CourseTestResponse};
use crate::schemas::question::QuestionResponse;
use crate::services::access::{self, permissions, ResourceRef};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/courses", get(list_courses).post(create_course))
        .route("/courses/:course_id", get(get_course).delete(delete_course))
        .route("/courses/:course_id/tests", get(list_course_tests).post(create_course_test))
        .route("/courses/:course_id/questions", get(list_course_questions))
        .route("/courses/:course_id/users", get(list_course_users).post(add_course_user))
        .route("/courses/:course_id/users/:user_id", delete(remove_course_user))
}

async fn create_course(
    Caller(caller): Caller,
    state: State<AppState>,
    Json(payload): Json<CourseCreate>,
) -> Result<(StatusCode, Json<CourseResponse>), ApiError> {
    access::require(state.db(), &caller, permissions::COURSE_ADD, ResourceRef::None).await?;
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Course name must not be empty".to_string()));
    }

    let course = repositories::courses::create_with_owner(
        state.db(),
        repositories::courses::CreateCourse {
            teacher_id: caller.user_id,
            name,
            description: payload.description.as_deref(),
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create course"))?;

    tracing::info!(course_id = course.id, teacher_id = caller.user_id, "Course created");
    Ok((StatusCode::CREATED, Json(CourseResponse::from_db(course))))
}

async fn list_courses(
    Caller(caller): Caller,
    state: State<AppState>,
) -> Result<Json<Vec<CourseResponse>>, ApiError> {
    access::require(state.db(), &caller, permissions::COURSE_LIST_READ, ResourceRef::None).await?;

    let courses = repositories::courses::list_for_user(state.db(), caller.user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list courses"))?;

    Ok(Json(courses.into_iter().map(CourseResponse::from_db).collect()))
}

async fn get_course(
    Path(course_id): Path<i64>,
    Caller(caller): Caller,
    state: State<AppState>,
) -> Result<Json<CourseResponse>, ApiError> {
    access::require(
        state.db(),
        &caller,
        permissions::COURSE_INFO_READ,
        ResourceRef::Course(course_id),
    )
    .await?;

    let course = repositories::courses::find_by_id(state.db(), course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch course"))?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    Ok(Json(CourseResponse::from_db(course)))
}

async fn delete_course(
    Path(course_id): Path<i64>,
    Caller(caller): Caller,
    state: State<AppState>,
) -> Result<StatusCode, ApiError> {
    access::require(state.db(), &caller, permissions::COURSE_DEL, ResourceRef::Course(course_id))
        .await?;

    let deleted = repositories::courses::soft_delete(state.db(), course_id, primitive_now_utc())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete course"))?;
    if !deleted {
        return Err(ApiError::NotFound("Course not found".to_string()));
    }

    tracing::info!(course_id, user_id = caller.user_id, "Course deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn list_course_tests(
    Path(course_id): Path<i64>,
    Caller(caller): Caller,
    state: State<AppState>,
) -> Result<Json<Vec<CourseTestResponse>>, ApiError> {
    access::require(
        state.db(),
        &caller,
        permissions::COURSE_TEST_LIST,
        ResourceRef::Course(course_id),
    )
    .await?;

    let tests = repositories::course_tests::list_for_course(state.db(), course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list tests"))?;

    Ok(Json(tests.into_iter().map(CourseTestResponse::from_db).collect()))
}

async fn create_course_test(
    Path(course_id): Path<i64>,
    Caller(caller): Caller,
    state: State<AppState>,
    Json(payload): Json<CourseTestCreate>,
) -> Result<(StatusCode, Json<CourseTestResponse>), ApiError> {
    access::require(
        state.db(),
        &caller,
        permissions::COURSE_TEST_ADD,
        ResourceRef::Course(course_id),
    )
    .await?;
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let test = repositories::course_tests::create(
        state.db(),
        repositories::course_tests::CreateCourseTest {
            course_id,
            name: payload.name.trim(),
            is_active: payload.is_active,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create test"))?;

    Ok((StatusCode::CREATED, Json(CourseTestResponse::from_db(test))))
}

async fn list_course_questions(
    Path(course_id): Path<i64>,
    Caller(caller): Caller,
    state: State<AppState>,
) -> Result<Json<Vec<QuestionResponse>>, ApiError> {
    access::require(
        state.db(),
        &caller,
        permissions::QUEST_LIST_READ,
        ResourceRef::Course(course_id),
    )
    .await?;

    let questions = repositories::questions::list_for_course(state.db(), course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list questions"))?;
    let ids = questions.iter().map(|question| question.id).collect::<Vec<_>>();
    let options = repositories::questions::options_for_many(state.db(), &ids)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load question options"))?;

    Ok(Json(QuestionResponse::from_db_many(questions, options)))
}

async fn list_course_users(
    Path(course_id): Path<i64>,
    Caller(caller): Caller,
    state: State<AppState>,
) -> Result<Json<Vec<CourseMemberResponse>>, ApiError> {
    access::require(
        state.db(),
        &caller,
        permissions::COURSE_USER_LIST,
        ResourceRef::Course(course_id),
    )
    .await?;

    let members = repositories::enrollments::list_members(state.db(), course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list course users"))?;

    Ok(Json(members.into_iter().map(CourseMemberResponse::from_db).collect()))
}

async fn add_course_user(
    Path(course_id): Path<i64>,
    Caller(caller): Caller,
    state: State<AppState>,
    Json(payload): Json<EnrollRequest>,
) -> Result<(StatusCode, Json<Vec<CourseMemberResponse>>), ApiError> {
    access::require(
        state.db(),
        &caller,
        permissions::COURSE_USER_ADD,
        ResourceRef::Course(course_id),
    )
    .await?;

    repositories::users::find_by_id(state.db(), payload.user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch user"))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let added = repositories::enrollments::add(
        state.db(),
        course_id,
        payload.user_id,
        payload.role,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to enroll user"))?;

    if added {
        tracing::info!(
            course_id,
            user_id = payload.user_id,
            role = payload.role.as_str(),
            "User enrolled"
        );
    }

    let members = repositories::enrollments::list_members(state.db(), course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list course users"))?;
    let status = if added { StatusCode::CREATED } else { StatusCode::OK };

    Ok((status, Json(members.into_iter().map(CourseMemberResponse::from_db).collect())))
}

async fn remove_course_user(
    Path((course_id, user_id)): Path<(i64, i64)>,
    Caller(caller): Caller,
    state: State<AppState>,
) -> Result<StatusCode, ApiError> {
    access::require(
        state.db(),
        &caller,
        permissions::COURSE_USER_DEL,
        ResourceRef::Course(course_id),
    )
    .await?;

    let course = repositories::courses::find_by_id(state.db(), course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch course"))?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;
    if course.teacher_id == user_id {
        return Err(ApiError::BadRequest("The course owner cannot be removed".to_string()));
    }

    let removed = repositories::enrollments::remove(state.db(), course_id, user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to remove user from course"))?;
    if !removed {
        return Err(ApiError::NotFound("Enrollment not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Response,
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::http::response::{single_row, ApiError};
use crate::http::server::AppState;
use crate::http::validation::{is_valid_text, json_body_error, parse_id};
use crate::store::Course;

/// Body of `POST /api/courses`. Kept loose so type errors become
/// validation errors.
#[derive(Debug, Deserialize)]
pub struct NewCourse {
    #[serde(default)]
    pub name: Value,
}

pub async fn list_courses(State(state): State<AppState>) -> Result<Json<Vec<Course>>, ApiError> {
    Ok(Json(state.store.list_courses().await?))
}

pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id, "courseId")?;
    let course = state.store.get_course(id).await?;
    single_row(course, "Course", state.api.strict_not_found)
}

pub async fn create_course(
    State(state): State<AppState>,
    body: Result<Json<NewCourse>, JsonRejection>,
) -> Result<Json<Course>, ApiError> {
    let Json(payload) = body.map_err(json_body_error)?;
    let name = match payload.name.as_str() {
        Some(name) if is_valid_text(&payload.name) => name,
        _ => return Err(ApiError::validation("Invalid course name")),
    };

    let course = state.store.create_course(name).await?;
    tracing::info!(course_id = course.id, "Course created");
    Ok(Json(course))
}

pub async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id, "courseId")?;
    let course = state.store.delete_course(id).await?;
    if course.is_some() {
        tracing::info!(course_id = id, "Course deleted");
    }
    single_row(course, "Course", state.api.strict_not_found)
}

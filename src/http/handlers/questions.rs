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
use crate::store::Question;

/// Body of `POST /api/courses/{id}/questions`.
#[derive(Debug, Deserialize)]
pub struct NewQuestion {
    #[serde(default)]
    pub title: Value,
    #[serde(default)]
    pub text: Value,
}

/// Validate `courseId` then `questionId`, in that order.
fn parse_ids(course_id: &str, question_id: &str) -> Result<(i32, i32), ApiError> {
    let course_id = parse_id(course_id, "courseId")?;
    let question_id = parse_id(question_id, "questionId")?;
    Ok((course_id, question_id))
}

pub async fn list_questions(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<Vec<Question>>, ApiError> {
    let course_id = parse_id(&course_id, "courseId")?;
    Ok(Json(state.store.list_questions(course_id).await?))
}

pub async fn create_question(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    body: Result<Json<NewQuestion>, JsonRejection>,
) -> Result<Json<Question>, ApiError> {
    let course_id = parse_id(&course_id, "courseId")?;
    let Json(payload) = body.map_err(json_body_error)?;

    let (title, text) = match (payload.title.as_str(), payload.text.as_str()) {
        (Some(title), Some(text)) if is_valid_text(&payload.title) && is_valid_text(&payload.text) => {
            (title, text)
        }
        _ => return Err(ApiError::validation("Invalid question data")),
    };

    let question = state.store.create_question(course_id, title, text).await?;
    tracing::info!(course_id, question_id = question.id, "Question created");
    Ok(Json(question))
}

pub async fn upvote_question(
    State(state): State<AppState>,
    Path((course_id, question_id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let (course_id, question_id) = parse_ids(&course_id, &question_id)?;
    let question = state.store.upvote_question(course_id, question_id).await?;
    single_row(question, "Question", state.api.strict_not_found)
}

pub async fn delete_question(
    State(state): State<AppState>,
    Path((course_id, question_id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let (course_id, question_id) = parse_ids(&course_id, &question_id)?;
    let question = state.store.delete_question(course_id, question_id).await?;
    if question.is_some() {
        tracing::info!(course_id, question_id, "Question deleted");
    }
    single_row(question, "Question", state.api.strict_not_found)
}

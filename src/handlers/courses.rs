//! Course-level endpoints: catalogue, materialization, progress.

use axum::{
  extract::{Path, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde::Deserialize;

use super::not_found;
use crate::content::CourseDocument;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateCourseRequest {
  pub name: String,
  pub document: CourseDocument,
}

/// GET /courses
pub async fn list_courses(State(state): State<AppState>) -> Json<serde_json::Value> {
  let courses = state.store().list_courses();
  Json(serde_json::json!({ "courses": courses }))
}

/// POST /courses
///
/// Replaces any existing course with the same name.
pub async fn create_course(
  State(state): State<AppState>,
  Json(request): Json<CreateCourseRequest>,
) -> Response {
  let store = state.store();
  match store.create_course_structure(&request.name, &request.document) {
    Ok(_) => {
      let total_lessons = store
        .get_course_structure(&request.name)
        .map(|doc| doc.lesson_count())
        .unwrap_or_default();
      (
        StatusCode::CREATED,
        Json(serde_json::json!({
          "name": request.name,
          "total_lessons": total_lessons,
        })),
      )
        .into_response()
    }
    Err(e) => e.into_response(),
  }
}

/// GET /courses/{course}
pub async fn get_course(State(state): State<AppState>, Path(course): Path<String>) -> Response {
  match state.store().get_course_structure(&course) {
    Some(document) => Json(document).into_response(),
    None => not_found("Course not found"),
  }
}

/// POST /courses/{course}/reindex
pub async fn reindex_course(State(state): State<AppState>, Path(course): Path<String>) -> Response {
  match state.store().reindex_course(&course) {
    Ok(document) => Json(document).into_response(),
    Err(e) => e.into_response(),
  }
}

/// GET /courses/{course}/progress
pub async fn get_progress(State(state): State<AppState>, Path(course): Path<String>) -> Response {
  match state.store().compute_progress(&course) {
    Ok(report) => Json(report).into_response(),
    Err(e) => e.into_response(),
  }
}

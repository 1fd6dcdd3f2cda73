//! JSON HTTP surface over the course store.
//!
//! Not-found conditions map to 404, unusable course names to 400, and every
//! other store failure to 500. Error bodies are `{"error": "..."}` with a
//! message that never exposes filesystem paths.

pub mod courses;
pub mod lessons;

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  routing::{get, post},
  Json, Router,
};

use crate::state::AppState;
use crate::store::StoreError;

/// Build the application router.
pub fn router(state: AppState) -> Router {
  let lesson = "/courses/{course}/lessons/{section}/{subsection}/{lesson}";

  Router::new()
    .route("/courses", get(courses::list_courses).post(courses::create_course))
    .route("/courses/{course}", get(courses::get_course))
    .route("/courses/{course}/reindex", post(courses::reindex_course))
    .route("/courses/{course}/progress", get(courses::get_progress))
    .route(lesson, get(lessons::get_lesson))
    .route(&format!("{lesson}/complete"), post(lessons::mark_completed))
    .route(&format!("{lesson}/code"), get(lessons::get_code).put(lessons::save_code))
    .route(&format!("{lesson}/plan"), get(lessons::get_plan).put(lessons::save_plan))
    .route(&format!("{lesson}/videos"), get(lessons::get_videos).put(lessons::attach_videos))
    .with_state(state)
}

/// JSON error body with the given status
pub(crate) fn error_json(status: StatusCode, message: &str) -> Response {
  (status, Json(serde_json::json!({ "error": message }))).into_response()
}

pub(crate) fn not_found(message: &str) -> Response {
  error_json(StatusCode::NOT_FOUND, message)
}

impl IntoResponse for StoreError {
  fn into_response(self) -> Response {
    let status = if self.is_not_found() {
      StatusCode::NOT_FOUND
    } else if matches!(self, StoreError::InvalidName(_)) {
      StatusCode::BAD_REQUEST
    } else {
      tracing::error!("Store operation failed: {}", self);
      StatusCode::INTERNAL_SERVER_ERROR
    };
    error_json(status, self.user_message())
  }
}

//! Single-lesson endpoints under
//! `/courses/{course}/lessons/{section}/{subsection}/{lesson}`.

use axum::{
  extract::{Path, State},
  response::{IntoResponse, Response},
  Json,
};
use serde::{Deserialize, Serialize};

use super::not_found;
use crate::content::VideoRecord;
use crate::state::AppState;
use crate::store::{ConceptInfo, LessonCoord};

/// Path parameters shared by every lesson route
#[derive(Debug, Deserialize)]
pub struct LessonPath {
  pub course: String,
  pub section: u32,
  pub subsection: u32,
  pub lesson: u32,
}

impl LessonPath {
  fn coord(&self) -> LessonCoord {
    LessonCoord::new(self.section, self.subsection, self.lesson)
  }
}

#[derive(Debug, Serialize)]
pub struct LessonView {
  pub lesson: ConceptInfo,
  pub agenda: Option<String>,
  pub has_videos: bool,
}

#[derive(Debug, Deserialize)]
pub struct CodeRequest {
  pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct PlanRequest {
  pub plan: String,
}

/// GET .../lessons/{s}/{ss}/{l}
pub async fn get_lesson(State(state): State<AppState>, Path(path): Path<LessonPath>) -> Response {
  let store = state.store();
  let coord = path.coord();
  let Some(lesson) = store.get_lesson(&path.course, coord) else {
    return not_found("Lesson not found");
  };
  Json(LessonView {
    lesson,
    agenda: store.get_agenda(&path.course, coord),
    has_videos: store.has_videos(&path.course, coord),
  })
  .into_response()
}

/// POST .../complete
pub async fn mark_completed(State(state): State<AppState>, Path(path): Path<LessonPath>) -> Response {
  match state.store().mark_completed(&path.course, path.coord()) {
    Ok(()) => Json(serde_json::json!({ "completed": true })).into_response(),
    Err(e) => e.into_response(),
  }
}

/// GET .../code
pub async fn get_code(State(state): State<AppState>, Path(path): Path<LessonPath>) -> Response {
  match state.store().get_code(&path.course, path.coord()) {
    Some(code) => Json(serde_json::json!({ "code": code })).into_response(),
    None => not_found("No saved code"),
  }
}

/// PUT .../code
pub async fn save_code(
  State(state): State<AppState>,
  Path(path): Path<LessonPath>,
  Json(request): Json<CodeRequest>,
) -> Response {
  let store = state.store();
  let coord = path.coord();
  match store.save_code(&path.course, coord, &request.code) {
    Ok(()) => Json(serde_json::json!({
      "saved": true,
      "time_spent_minutes": store.get_time_spent(&path.course, coord),
    }))
    .into_response(),
    Err(e) => e.into_response(),
  }
}

/// GET .../plan
pub async fn get_plan(State(state): State<AppState>, Path(path): Path<LessonPath>) -> Response {
  match state.store().get_detailed_plan(&path.course, path.coord()) {
    Some(plan) => Json(serde_json::json!({ "plan": plan })).into_response(),
    None => not_found("No detailed plan"),
  }
}

/// PUT .../plan
///
/// Storing a plan also marks the lesson completed.
pub async fn save_plan(
  State(state): State<AppState>,
  Path(path): Path<LessonPath>,
  Json(request): Json<PlanRequest>,
) -> Response {
  match state.store().save_detailed_plan(&path.course, path.coord(), &request.plan) {
    Ok(()) => Json(serde_json::json!({ "saved": true, "completed": true })).into_response(),
    Err(e) => e.into_response(),
  }
}

/// GET .../videos
pub async fn get_videos(State(state): State<AppState>, Path(path): Path<LessonPath>) -> Response {
  match state.store().get_videos(&path.course, path.coord()) {
    Some(videos) => Json(videos).into_response(),
    None => not_found("No videos attached"),
  }
}

/// PUT .../videos
///
/// Replaces the whole list.
pub async fn attach_videos(
  State(state): State<AppState>,
  Path(path): Path<LessonPath>,
  Json(videos): Json<Vec<VideoRecord>>,
) -> Response {
  match state.store().attach_videos(&path.course, path.coord(), &videos) {
    Ok(()) => Json(serde_json::json!({ "attached": videos.len() })).into_response(),
    Err(e) => e.into_response(),
  }
}

#[cfg(test)]
mod tests {
  use serde_json::{json, Value};

  use crate::handlers::test_support::server_with_course;

  const LESSON: &str = "/courses/Data_Structures/lessons/1/1/1";

  #[tokio::test]
  async fn test_get_lesson_view() {
    let (_env, server) = server_with_course();

    let response = server.get(LESSON).await;
    response.assert_status_ok();
    let view = response.json::<Value>();
    assert_eq!(view["lesson"]["name"], "Indexing");
    assert_eq!(view["agenda"], "Access elements by position");
    assert_eq!(view["lesson"]["completed"], false);
    assert_eq!(view["has_videos"], false);
  }

  #[tokio::test]
  async fn test_code_round_trip() {
    let (_env, server) = server_with_course();

    server.get(&format!("{LESSON}/code")).await.assert_status_not_found();

    let response = server
      .put(&format!("{LESSON}/code"))
      .json(&json!({ "code": "fn main() {}" }))
      .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["time_spent_minutes"], 0);

    let response = server.get(&format!("{LESSON}/code")).await;
    assert_eq!(response.json::<Value>()["code"], "fn main() {}");
  }

  #[tokio::test]
  async fn test_plan_marks_completed() {
    let (_env, server) = server_with_course();

    server
      .put(&format!("{LESSON}/plan"))
      .json(&json!({ "plan": "# Indexing" }))
      .await
      .assert_status_ok();

    let response = server.get(&format!("{LESSON}/plan")).await;
    assert_eq!(response.json::<Value>()["plan"], "# Indexing");
    assert_eq!(server.get(LESSON).await.json::<Value>()["lesson"]["completed"], true);
  }

  #[tokio::test]
  async fn test_videos_replace() {
    let (_env, server) = server_with_course();
    let videos = json!([
      { "title": "Arrays", "channel": "CS", "url": "https://youtu.be/a",
        "transcript": "t", "summary": "s", "explanation": "e" }
    ]);

    let response = server.put(&format!("{LESSON}/videos")).json(&videos).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["attached"], 1);

    let response = server.get(&format!("{LESSON}/videos")).await;
    assert_eq!(response.json::<Value>(), videos);
    assert_eq!(server.get(LESSON).await.json::<Value>()["has_videos"], true);
  }

  #[tokio::test]
  async fn test_missing_lesson_is_404() {
    let (_env, server) = server_with_course();
    let missing = "/courses/Data_Structures/lessons/4/1/1";

    server.get(missing).await.assert_status_not_found();
    server
      .post(&format!("{missing}/complete"))
      .await
      .assert_status_not_found();
    server
      .put(&format!("{missing}/code"))
      .json(&json!({ "code": "x" }))
      .await
      .assert_status_not_found();
    server
      .post("/courses/Nope/lessons/1/1/1/complete")
      .await
      .assert_status_not_found();
  }
}

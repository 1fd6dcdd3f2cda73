//! Per-lesson state: agenda, detailed plan, completion, code and videos.
//!
//! Every operation addresses a lesson by course name and [`LessonCoord`] and
//! resolves it through the locator. Reads return `None`/`false` when the
//! lesson is absent; mutations log and return the error.

use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

use super::locator::prefix_candidates;
use super::records::{read_text, timestamp, write_json, ConceptInfo, MetadataRecord};
use super::{log_failure, CourseStore, LessonCoord, LogOnError, StoreError, StoreResult};
use crate::content::VideoRecord;
use crate::paths;

impl CourseStore {
    /// Full metadata record of a lesson.
    pub fn get_lesson(&self, course_name: &str, coord: LessonCoord) -> Option<ConceptInfo> {
        let dir = self.locate(course_name, coord)?;
        ConceptInfo::load(&dir).log_warn(&format!("Unreadable lesson {} in '{}'", coord, course_name))
    }

    /// Learning objective of a lesson.
    ///
    /// Prefers `agenda.txt`, then the metadata field. A lesson whose metadata
    /// is missing is still found by its directory prefix; a prefix match whose
    /// metadata names another index is not this lesson.
    pub fn get_agenda(&self, course_name: &str, coord: LessonCoord) -> Option<String> {
        if let Some(dir) = self.locate(course_name, coord) {
            if let Some(agenda) = read_text(&dir.join(paths::AGENDA_FILE)) {
                return Some(trimmed(&agenda));
            }
            return ConceptInfo::load(&dir)
                .log_warn(&format!("No agenda for lesson {} in '{}'", coord, course_name))
                .map(|info| trimmed(&info.agenda));
        }

        let course_dir = self.existing_course_dir(course_name)?;
        prefix_candidates(&course_dir, coord)
            .iter()
            .filter(|dir| !dir.join(paths::CONCEPT_INFO).exists())
            .find_map(|dir| read_text(&dir.join(paths::AGENDA_FILE)))
            .map(|agenda| trimmed(&agenda))
    }

    /// Expanded lesson content, from `detailed_plan.txt` or the metadata.
    pub fn get_detailed_plan(&self, course_name: &str, coord: LessonCoord) -> Option<String> {
        let dir = self.locate(course_name, coord)?;
        if let Some(plan) = read_text(&dir.join(paths::DETAILED_PLAN_FILE)) {
            return Some(trimmed(&plan));
        }
        ConceptInfo::load(&dir).ok()?.detailed_plan.map(|plan| trimmed(&plan))
    }

    /// Store an expanded lesson plan.
    ///
    /// Receiving a plan also marks the lesson completed.
    pub fn save_detailed_plan(
        &self,
        course_name: &str,
        coord: LessonCoord,
        plan: &str,
    ) -> StoreResult<()> {
        let now = Utc::now();
        let result = self.lesson_dir(course_name, coord).and_then(|dir| {
            fs::write(dir.join(paths::DETAILED_PLAN_FILE), plan)?;
            update_concept(&dir, |info| {
                info.completed = true;
                info.completed_at = Some(timestamp(now));
                info.detailed_plan = Some(plan.to_string());
            })
        });
        log_failure("save detailed plan", course_name, coord, result)
    }

    pub fn mark_completed(&self, course_name: &str, coord: LessonCoord) -> StoreResult<()> {
        self.mark_completed_at(course_name, coord, Utc::now())
    }

    /// Mark a lesson completed as of `now`. Repeating it only advances
    /// `completed_at`.
    pub fn mark_completed_at(
        &self,
        course_name: &str,
        coord: LessonCoord,
        now: DateTime<Utc>,
    ) -> StoreResult<()> {
        let result = self.lesson_dir(course_name, coord).and_then(|dir| {
            update_concept(&dir, |info| {
                info.completed = true;
                info.completed_at = Some(timestamp(now));
            })
        });
        log_failure("mark completed", course_name, coord, result)
    }

    pub fn is_completed(&self, course_name: &str, coord: LessonCoord) -> bool {
        self.get_lesson(course_name, coord)
            .is_some_and(|info| info.completed)
    }

    pub fn save_code(&self, course_name: &str, coord: LessonCoord, code: &str) -> StoreResult<()> {
        self.save_code_at(course_name, coord, code, Utc::now())
    }

    /// Persist the learner's code as of `now` and update time accounting.
    ///
    /// `first_code_update` is set once; the time spent is always measured from
    /// it to the latest save.
    pub fn save_code_at(
        &self,
        course_name: &str,
        coord: LessonCoord,
        code: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<()> {
        let result = self.lesson_dir(course_name, coord).and_then(|dir| {
            fs::write(dir.join(paths::CODE_FILE), code)?;
            update_concept(&dir, |info| {
                let stamp = timestamp(now);
                info.code_file = Some(paths::CODE_FILE.to_string());
                if info.first_code_update.is_none() {
                    info.first_code_update = Some(stamp.clone());
                }
                info.last_code_update = Some(stamp);
                info.recompute_time_spent();
            })
        });
        log_failure("save code", course_name, coord, result)
    }

    pub fn get_code(&self, course_name: &str, coord: LessonCoord) -> Option<String> {
        let dir = self.locate(course_name, coord)?;
        read_text(&dir.join(paths::CODE_FILE))
    }

    /// Minutes between the first and latest code save, if any code was saved.
    pub fn get_time_spent(&self, course_name: &str, coord: LessonCoord) -> Option<i64> {
        self.get_lesson(course_name, coord)?.total_time_minutes
    }

    /// Replace the lesson's videos with `videos`.
    ///
    /// Writes the list plus one transcript and one summary file per video.
    /// Side files from a previous list are removed first.
    pub fn attach_videos(
        &self,
        course_name: &str,
        coord: LessonCoord,
        videos: &[VideoRecord],
    ) -> StoreResult<()> {
        let result = self.lesson_dir(course_name, coord).and_then(|dir| {
            remove_video_side_files(&dir)?;
            write_json(&dir.join(paths::VIDEOS_FILE), videos)?;
            for (position, video) in (1usize..).zip(videos) {
                if !video.transcript.is_empty() {
                    fs::write(dir.join(paths::video_transcript_file(position)), &video.transcript)?;
                }
                if !video.summary.is_empty() {
                    fs::write(dir.join(paths::video_summary_file(position)), &video.summary)?;
                }
            }
            update_concept(&dir, |info| {
                info.video_count = Some(videos.len());
                info.videos_file = Some(paths::VIDEOS_FILE.to_string());
            })
        });
        if result.is_ok() {
            tracing::debug!(
                "Attached {} videos to '{}' lesson {}",
                videos.len(),
                course_name,
                coord
            );
        }
        log_failure("attach videos", course_name, coord, result)
    }

    pub fn get_videos(&self, course_name: &str, coord: LessonCoord) -> Option<Vec<VideoRecord>> {
        let dir = self.locate(course_name, coord)?;
        let content = read_text(&dir.join(paths::VIDEOS_FILE))?;
        serde_json::from_str(&content)
            .log_warn(&format!("Corrupt video list for lesson {} in '{}'", coord, course_name))
    }

    /// Cheap check from metadata alone; the video list is not opened.
    pub fn has_videos(&self, course_name: &str, coord: LessonCoord) -> bool {
        self.get_lesson(course_name, coord).is_some_and(|info| {
            info.video_count.is_some_and(|count| count > 0) && info.videos_file.is_some()
        })
    }

    fn lesson_dir(&self, course_name: &str, coord: LessonCoord) -> StoreResult<PathBuf> {
        if self.existing_course_dir(course_name).is_none() {
            return Err(StoreError::CourseNotFound(course_name.to_string()));
        }
        self.locate(course_name, coord)
            .ok_or_else(|| StoreError::LessonNotFound {
                course: course_name.to_string(),
                coord,
            })
    }
}

fn trimmed(text: &str) -> String {
    text.trim().to_string()
}

/// Read-modify-write of a lesson's metadata record.
fn update_concept(dir: &Path, apply: impl FnOnce(&mut ConceptInfo)) -> StoreResult<()> {
    let mut info = ConceptInfo::load(dir)?;
    apply(&mut info);
    info.save(dir)
}

fn remove_video_side_files(dir: &Path) -> StoreResult<()> {
    for entry in fs::read_dir(dir)?.filter_map(|e| e.ok()) {
        let name = entry.file_name();
        if name.to_str().is_some_and(paths::is_video_side_file) {
            fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}

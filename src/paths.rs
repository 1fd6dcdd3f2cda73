//! Project path functions - single source of truth for all file paths.
//!
//! Every file and directory name the course store reads or writes is defined
//! here, so the materializer, locator and aggregator can never disagree about
//! the layout.
//!
//! ```text
//! <store_root>/<course>/
//!   course_structure.json
//!   section_01_<name>/
//!     section_info.json
//!     subsection_01_<name>/
//!       subsection_info.json
//!       lesson_01_<name>/
//!         concept_info.json
//!         agenda.txt
//!         ...
//! ```
//!
//! ## Environment Variables
//!
//! - `DATA_DIR`: Override the base data directory (default: "data")
//! - `COURSES_DIR`: Override the course store root (see config.rs)

use std::env;
use std::sync::OnceLock;

/// Lazily initialized data directory from DATA_DIR env var
static DATA_DIR_VALUE: OnceLock<String> = OnceLock::new();

/// Get the base data directory (from DATA_DIR env var or default "data")
pub fn data_dir() -> &'static str {
    DATA_DIR_VALUE.get_or_init(|| env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()))
}

/// Default course store root
pub fn default_courses_dir() -> String {
    format!("{}/courses", data_dir())
}

// ==================== Course Root ====================

/// Root manifest holding the whole annotated course document
pub const COURSE_MANIFEST: &str = "course_structure.json";

/// Hidden directory a course is built in before being swapped into place
pub fn staging_dir_name(safe_course: &str) -> String {
    format!(".staging_{safe_course}")
}

/// Prefix of the hidden name the previous course tree is moved to during the swap
pub const RETIRED_PREFIX: &str = ".retired_";

pub fn retired_dir_name(safe_course: &str) -> String {
    format!("{RETIRED_PREFIX}{safe_course}")
}

// ==================== Tree Levels ====================

pub const SECTION_PREFIX: &str = "section";
pub const SUBSECTION_PREFIX: &str = "subsection";
pub const LESSON_PREFIX: &str = "lesson";

pub const SECTION_INFO: &str = "section_info.json";
pub const SUBSECTION_INFO: &str = "subsection_info.json";
pub const CONCEPT_INFO: &str = "concept_info.json";

// ==================== Lesson Files ====================

pub const AGENDA_FILE: &str = "agenda.txt";
pub const DETAILED_PLAN_FILE: &str = "detailed_plan.txt";
pub const CODE_FILE: &str = "student_code.txt";
pub const VIDEOS_FILE: &str = "youtube_videos.json";

/// Directory-name prefix for a node: `section_03_`
pub fn index_prefix(level: &str, index: u32) -> String {
    format!("{level}_{index:02}_")
}

/// Section directory name, e.g. `section_01_Arrays`
pub fn section_dir_name(index: u32, safe_name: &str) -> String {
    format!("{}{safe_name}", index_prefix(SECTION_PREFIX, index))
}

/// Subsection directory name, e.g. `subsection_01_Basics`
pub fn subsection_dir_name(index: u32, safe_name: &str) -> String {
    format!("{}{safe_name}", index_prefix(SUBSECTION_PREFIX, index))
}

/// Lesson directory name, e.g. `lesson_02_Traversal`
pub fn lesson_dir_name(index: u32, safe_name: &str) -> String {
    format!("{}{safe_name}", index_prefix(LESSON_PREFIX, index))
}

/// Per-video transcript file (1-based)
pub fn video_transcript_file(position: usize) -> String {
    format!("video_{position}_transcript.txt")
}

/// Per-video summary file (1-based)
pub fn video_summary_file(position: usize) -> String {
    format!("video_{position}_summary.txt")
}

/// True for `video_<k>_transcript.txt` / `video_<k>_summary.txt`
pub fn is_video_side_file(file_name: &str) -> bool {
    let Some(rest) = file_name.strip_prefix("video_") else {
        return false;
    };
    let Some((position, kind)) = rest.split_once('_') else {
        return false;
    };
    !position.is_empty()
        && position.chars().all(|c| c.is_ascii_digit())
        && (kind == "transcript.txt" || kind == "summary.txt")
}

// ==================== Tests ====================

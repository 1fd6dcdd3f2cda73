//! Filesystem-backed course progress store.
//!
//! A course is materialized once into a fixed-depth directory tree
//! (course → sections → subsections → lessons). Afterwards every lesson is
//! addressed by a [`LessonCoord`] of 1-based indices, resolved by the locator
//! against the metadata files written next to each node.
//!
//! # Error discipline
//!
//! - Reads return `Option` / `bool`: absence and unreadable data both come
//!   back as `None` / `false`, with the cause logged.
//! - Mutations return [`StoreResult<()>`] and log the failure before
//!   returning it; they never panic.
//! - Materialization propagates I/O errors to the caller.
//!
//! # Concurrency
//!
//! One writer per course at a time. There is no file locking; callers that
//! share a store across threads serialize access (see `state.rs`).

pub mod lesson;
pub mod locator;
pub mod materialize;
pub mod progress;
pub mod records;

pub use progress::{LessonProgress, ModuleProgress, ProgressReport, SubmoduleProgress};
pub use records::{ConceptInfo, MetadataRecord, SectionInfo, SubsectionInfo};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::{FanOut, StoreConfig};
use crate::content::sanitize;
use crate::paths;

/// Position of a lesson inside a course: 1-based section, subsection and
/// lesson indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LessonCoord {
    pub section: u32,
    pub subsection: u32,
    pub lesson: u32,
}

impl LessonCoord {
    pub fn new(section: u32, subsection: u32, lesson: u32) -> Self {
        Self {
            section,
            subsection,
            lesson,
        }
    }
}

impl fmt::Display for LessonCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.section, self.subsection, self.lesson)
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Course name '{0}' has no filesystem-safe characters")]
    InvalidName(String),

    #[error("Course not found: {0}")]
    CourseNotFound(String),

    #[error("Lesson {coord} not found in course '{course}'")]
    LessonNotFound { course: String, coord: LessonCoord },

    #[error("Metadata file missing: {}", .0.display())]
    MetadataMissing(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// True for the "absent" family of errors (course, lesson, metadata).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::CourseNotFound(_)
                | StoreError::LessonNotFound { .. }
                | StoreError::MetadataMissing(_)
        )
    }

    /// Returns a user-facing error message without exposing filesystem paths.
    pub fn user_message(&self) -> &str {
        match self {
            StoreError::InvalidName(_) => "Course name has no usable characters",
            StoreError::CourseNotFound(_) => "Course not found",
            StoreError::LessonNotFound { .. } => "Lesson not found",
            StoreError::MetadataMissing(_) => "Lesson data is incomplete",
            StoreError::Io(_) => "Failed to access course files",
            StoreError::Json(_) => "Failed to parse course data",
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Extension trait for logging errors before discarding them
pub trait LogOnError<T> {
    /// Log the error at warn level and return None
    fn log_warn(self, context: &str) -> Option<T>;
}

impl<T, E: fmt::Display> LogOnError<T> for Result<T, E> {
    fn log_warn(self, context: &str) -> Option<T> {
        match self {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("{}: {}", context, e);
                None
            }
        }
    }
}

/// Handle to a course store rooted at one directory.
#[derive(Debug, Clone)]
pub struct CourseStore {
    root: PathBuf,
    fan_out: FanOut,
}

impl CourseStore {
    /// Open (creating if needed) a store at `root`.
    pub fn open(root: impl AsRef<Path>, fan_out: FanOut) -> StoreResult<Self> {
        let root = root.as_ref();
        fs::create_dir_all(root)?;
        let root = fs::canonicalize(root)?;
        tracing::debug!("Course store opened at {}", root.display());
        let store = Self { root, fan_out };
        store.restore_all_retired();
        Ok(store)
    }

    pub fn from_config(config: &StoreConfig) -> StoreResult<Self> {
        Self::open(&config.root, config.fan_out)
    }

    /// Absolute store root
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn fan_out(&self) -> FanOut {
        self.fan_out
    }

    /// Directory a course lives in (whether or not it exists).
    pub fn course_dir(&self, course_name: &str) -> PathBuf {
        self.root.join(sanitize(course_name))
    }

    /// Course directory if the course has been materialized.
    ///
    /// A course that only exists as its retired tree, left by a replacement
    /// interrupted mid-swap, is moved back into place first.
    pub(crate) fn existing_course_dir(&self, course_name: &str) -> Option<PathBuf> {
        let safe_name = sanitize(course_name);
        if safe_name.is_empty() {
            return None;
        }
        let dir = self.root.join(&safe_name);
        if !dir.exists() {
            self.restore_retired(&safe_name);
        }
        dir.is_dir().then_some(dir)
    }

    /// Rename `.retired_<name>` back to `<name>` when the course directory is
    /// missing. Returns whether a course was restored.
    pub(crate) fn restore_retired(&self, safe_name: &str) -> bool {
        let dir = self.root.join(safe_name);
        let retired = self.root.join(paths::retired_dir_name(safe_name));
        if dir.exists() || !retired.is_dir() {
            return false;
        }
        match fs::rename(&retired, &dir) {
            Ok(()) => {
                tracing::warn!(
                    "Restored course {} left retired by an interrupted replacement",
                    dir.display()
                );
                true
            }
            Err(e) => {
                tracing::error!("Failed to restore retired course {}: {}", retired.display(), e);
                false
            }
        }
    }

    /// Restore every orphaned retired tree in the store root.
    pub(crate) fn restore_all_retired(&self) {
        let Ok(entries) = fs::read_dir(&self.root) else {
            return;
        };
        let orphaned: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter_map(|e| e.file_name().into_string().ok())
            .filter_map(|name| name.strip_prefix(paths::RETIRED_PREFIX).map(str::to_string))
            .filter(|safe_name| !safe_name.is_empty())
            .collect();
        for safe_name in orphaned {
            self.restore_retired(&safe_name);
        }
    }
}

/// Log a failed mutation and hand the result back unchanged.
pub(crate) fn log_failure<T>(
    action: &str,
    course_name: &str,
    coord: LessonCoord,
    result: StoreResult<T>,
) -> StoreResult<T> {
    result.inspect_err(|e| {
        tracing::warn!("Failed to {} for '{}' lesson {}: {}", action, course_name, coord, e);
    })
}

/// Subdirectories of `dir`, sorted by name. Unreadable directories yield none.
pub(crate) fn child_dirs(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(), // Directory doesn't exist or not readable
    };

    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_coord_display() {
        assert_eq!(LessonCoord::new(1, 2, 3).to_string(), "1.2.3");
    }

    #[test]
    fn test_open_creates_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("nested").join("courses");
        let store = CourseStore::open(&root, FanOut::default()).unwrap();
        assert!(root.is_dir());
        assert!(store.root().is_absolute());
    }

    #[test]
    fn test_course_dir_uses_sanitized_name() {
        let temp = TempDir::new().unwrap();
        let store = CourseStore::open(temp.path(), FanOut::default()).unwrap();
        assert!(store.course_dir("Data Structures").ends_with("Data_Structures"));
    }

    #[test]
    fn test_existing_course_dir_rejects_empty_name() {
        let temp = TempDir::new().unwrap();
        let store = CourseStore::open(temp.path(), FanOut::default()).unwrap();
        // "!!!" sanitizes to "" and would otherwise resolve to the store root
        assert!(store.existing_course_dir("!!!").is_none());
        assert!(store.existing_course_dir("Missing").is_none());
    }

    #[test]
    fn test_not_found_family() {
        assert!(StoreError::CourseNotFound("x".into()).is_not_found());
        assert!(
            StoreError::LessonNotFound {
                course: "x".into(),
                coord: LessonCoord::new(1, 1, 1)
            }
            .is_not_found()
        );
        assert!(!StoreError::InvalidName("!".into()).is_not_found());
    }

    #[test]
    fn test_log_warn() {
        let err: Result<u32, String> = Err("boom".into());
        assert_eq!(err.log_warn("context"), None);
        let ok: Result<u32, String> = Ok(7);
        assert_eq!(ok.log_warn("context"), Some(7));
    }

    #[test]
    fn test_open_restores_retired_course() {
        let temp = TempDir::new().unwrap();
        let retired = temp.path().join(paths::retired_dir_name("Rust"));
        fs::create_dir_all(retired.join("section_01_Basics")).unwrap();
        // Retired tree whose course directory still exists is left alone
        fs::create_dir_all(temp.path().join("Go")).unwrap();
        fs::create_dir_all(temp.path().join(paths::retired_dir_name("Go"))).unwrap();

        let store = CourseStore::open(temp.path(), FanOut::default()).unwrap();

        assert!(store.root().join("Rust/section_01_Basics").is_dir());
        assert!(!retired.exists());
        assert!(temp.path().join(paths::retired_dir_name("Go")).exists());
    }

    #[test]
    fn test_child_dirs_sorted_and_dirs_only() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("b")).unwrap();
        fs::create_dir(temp.path().join("a")).unwrap();
        fs::write(temp.path().join("file.txt"), "x").unwrap();

        let names: Vec<_> = child_dirs(temp.path())
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}

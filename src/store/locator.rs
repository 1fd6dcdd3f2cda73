//! Resolving a lesson coordinate to its directory.
//!
//! Resolution runs in two phases:
//!
//! 1. **Fast path** - follow the zero-padded index prefixes the materializer
//!    bakes into directory names (`section_NN_*/subsection_NN_*/lesson_NN_*`)
//!    and confirm the hit against the stored metadata.
//! 2. **Fallback** - walk every node, comparing the `index` in each metadata
//!    file. Slower, but independent of directory naming.
//!
//! A lesson is only ever returned when its stored indices match at every level
//! that has readable metadata.

use std::path::{Path, PathBuf};

use super::records::{ConceptInfo, MetadataRecord, SectionInfo, SubsectionInfo};
use super::{child_dirs, CourseStore, LessonCoord};
use crate::paths;

impl CourseStore {
    /// Lesson directory for `coord`, or `None` if the course or lesson is absent.
    pub fn locate(&self, course_name: &str, coord: LessonCoord) -> Option<PathBuf> {
        let course_dir = self.existing_course_dir(course_name)?;

        if let Some(dir) = locate_by_prefix(&course_dir, coord) {
            return Some(dir);
        }

        tracing::debug!(
            "Prefix lookup missed lesson {} in {}, scanning metadata",
            coord,
            course_dir.display()
        );
        let found = locate_by_metadata(&course_dir, coord);
        if found.is_none() {
            tracing::debug!("Lesson {} not found in '{}'", coord, course_name);
        }
        found
    }
}

/// Lesson directories whose names carry the coordinate's prefixes, sorted.
///
/// No metadata is consulted; used where a lesson's metadata may be missing.
pub(crate) fn prefix_candidates(course_dir: &Path, coord: LessonCoord) -> Vec<PathBuf> {
    let section_prefix = paths::index_prefix(paths::SECTION_PREFIX, coord.section);
    let sub_prefix = paths::index_prefix(paths::SUBSECTION_PREFIX, coord.subsection);
    let lesson_prefix = paths::index_prefix(paths::LESSON_PREFIX, coord.lesson);

    children_with_prefix(course_dir, &section_prefix)
        .iter()
        .flat_map(|section_dir| children_with_prefix(section_dir, &sub_prefix))
        .flat_map(|sub_dir| children_with_prefix(&sub_dir, &lesson_prefix))
        .collect()
}

fn locate_by_prefix(course_dir: &Path, coord: LessonCoord) -> Option<PathBuf> {
    prefix_candidates(course_dir, coord)
        .into_iter()
        .find(|lesson_dir| confirms(lesson_dir, coord))
}

/// Check a prefix hit against metadata.
///
/// The lesson's own record must exist and match. Parent records must match
/// when present; a parent without metadata keeps the name hint.
fn confirms(lesson_dir: &Path, coord: LessonCoord) -> bool {
    if !ConceptInfo::index_matches(lesson_dir, coord.lesson) {
        return false;
    }
    let Some(sub_dir) = lesson_dir.parent() else {
        return false;
    };
    let Some(section_dir) = sub_dir.parent() else {
        return false;
    };
    parent_agrees::<SubsectionInfo>(sub_dir, coord.subsection)
        && parent_agrees::<SectionInfo>(section_dir, coord.section)
}

fn parent_agrees<R: MetadataRecord>(dir: &Path, expected: u32) -> bool {
    !dir.join(R::FILE_NAME).exists() || R::index_matches(dir, expected)
}

fn locate_by_metadata(course_dir: &Path, coord: LessonCoord) -> Option<PathBuf> {
    for section_dir in child_dirs(course_dir) {
        if !SectionInfo::index_matches(&section_dir, coord.section) {
            continue;
        }
        for sub_dir in child_dirs(&section_dir) {
            if !SubsectionInfo::index_matches(&sub_dir, coord.subsection) {
                continue;
            }
            if let Some(lesson_dir) = child_dirs(&sub_dir)
                .into_iter()
                .find(|dir| ConceptInfo::index_matches(dir, coord.lesson))
            {
                return Some(lesson_dir);
            }
        }
    }
    None
}

fn children_with_prefix(dir: &Path, prefix: &str) -> Vec<PathBuf> {
    child_dirs(dir)
        .into_iter()
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(prefix))
        })
        .collect()
}

//! Course-wide progress aggregation.

use serde::Serialize;
use std::path::Path;

use super::records::{ConceptInfo, MetadataRecord, SectionInfo, SubsectionInfo};
use super::{child_dirs, CourseStore, StoreError, StoreResult};

/// Snapshot of a learner's progress through one course
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressReport {
    pub course_name: String,
    pub total_lessons: usize,
    pub completed_lessons: usize,
    pub completion_percentage: f64,
    pub total_time_minutes: i64,
    /// Mean over lessons that have recorded time
    pub average_time_minutes: f64,
    pub modules: Vec<ModuleProgress>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleProgress {
    pub name: String,
    pub index: u32,
    pub submodules: Vec<SubmoduleProgress>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmoduleProgress {
    pub name: String,
    pub index: u32,
    pub lessons: Vec<LessonProgress>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LessonProgress {
    pub name: String,
    pub index: u32,
    pub completed: bool,
    pub agenda: String,
    pub time_spent_minutes: Option<i64>,
}

impl From<ConceptInfo> for LessonProgress {
    fn from(info: ConceptInfo) -> Self {
        Self {
            name: info.name,
            index: info.index,
            completed: info.completed,
            agenda: info.agenda,
            time_spent_minutes: info.total_time_minutes,
        }
    }
}

/// Percentage of `part` in `total`, 0 for an empty total
pub fn calculate_percentage(part: usize, total: usize) -> f64 {
    if total > 0 {
        part as f64 / total as f64 * 100.0
    } else {
        0.0
    }
}

impl CourseStore {
    /// Walk the whole course tree and total up completion and time spent.
    ///
    /// Nodes without metadata are skipped, so a partially written tree still
    /// yields a report for whatever is readable.
    pub fn compute_progress(&self, course_name: &str) -> StoreResult<ProgressReport> {
        let course_dir = self
            .existing_course_dir(course_name)
            .ok_or_else(|| StoreError::CourseNotFound(course_name.to_string()))?;

        let modules: Vec<ModuleProgress> = child_dirs(&course_dir)
            .iter()
            .filter_map(|section_dir| {
                let section = load_node::<SectionInfo>(section_dir)?;
                Some(ModuleProgress {
                    name: section.name,
                    index: section.index,
                    submodules: walk_subsections(section_dir),
                })
            })
            .collect();

        let lessons = || {
            modules
                .iter()
                .flat_map(|m| &m.submodules)
                .flat_map(|s| &s.lessons)
        };
        let total_lessons = lessons().count();
        let completed_lessons = lessons().filter(|l| l.completed).count();
        let timed: Vec<i64> = lessons().filter_map(|l| l.time_spent_minutes).collect();
        let total_time_minutes: i64 = timed.iter().sum();
        let average_time_minutes = if timed.is_empty() {
            0.0
        } else {
            total_time_minutes as f64 / timed.len() as f64
        };

        tracing::debug!(
            "Progress for '{}': {}/{} lessons, {} min",
            course_name,
            completed_lessons,
            total_lessons,
            total_time_minutes
        );

        Ok(ProgressReport {
            course_name: course_name.to_string(),
            total_lessons,
            completed_lessons,
            completion_percentage: calculate_percentage(completed_lessons, total_lessons),
            total_time_minutes,
            average_time_minutes,
            modules,
        })
    }
}

fn walk_subsections(section_dir: &Path) -> Vec<SubmoduleProgress> {
    child_dirs(section_dir)
        .iter()
        .filter_map(|sub_dir| {
            let subsection = load_node::<SubsectionInfo>(sub_dir)?;
            let lessons = child_dirs(sub_dir)
                .iter()
                .filter_map(|lesson_dir| load_node::<ConceptInfo>(lesson_dir))
                .map(LessonProgress::from)
                .collect();
            Some(SubmoduleProgress {
                name: subsection.name,
                index: subsection.index,
                lessons,
            })
        })
        .collect()
}

/// Missing metadata skips the node quietly; unreadable metadata is logged.
fn load_node<R: MetadataRecord>(dir: &Path) -> Option<R> {
    match R::load(dir) {
        Ok(record) => Some(record),
        Err(StoreError::MetadataMissing(_)) => None,
        Err(e) => {
            tracing::warn!("Skipping {} in progress walk: {}", dir.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LessonCoord;
    use crate::testing::{course_document, data_structures_document, TestEnv};
    use chrono::{Duration, TimeZone, Utc};
    use std::fs;

    #[test]
    fn test_calculate_percentage() {
        assert_eq!(calculate_percentage(0, 0), 0.0);
        assert_eq!(calculate_percentage(1, 4), 25.0);
        assert_eq!(calculate_percentage(3, 3), 100.0);
    }

    #[test]
    fn test_fresh_course_progress() {
        let env = TestEnv::new();
        env.store
            .create_course_structure("Data Structures", &data_structures_document())
            .unwrap();

        let report = env.store.compute_progress("Data Structures").unwrap();
        assert_eq!(report.total_lessons, 2);
        assert_eq!(report.completed_lessons, 0);
        assert_eq!(report.completion_percentage, 0.0);
        assert_eq!(report.total_time_minutes, 0);
        assert_eq!(report.average_time_minutes, 0.0);

        assert_eq!(report.modules.len(), 1);
        assert_eq!(report.modules[0].name, "Arrays");
        let lessons = &report.modules[0].submodules[0].lessons;
        assert_eq!(lessons[0].name, "Indexing");
        assert_eq!(lessons[1].index, 2);
    }

    #[test]
    fn test_completed_count_and_percentage() {
        let env = TestEnv::new();
        env.store
            .create_course_structure("Counted", &course_document("Counted", 2, 2, 2))
            .unwrap();

        for coord in [
            LessonCoord::new(1, 1, 1),
            LessonCoord::new(1, 2, 2),
            LessonCoord::new(2, 2, 1),
        ] {
            env.store.mark_completed("Counted", coord).unwrap();
        }
        // Marking twice does not double count
        env.store.mark_completed("Counted", LessonCoord::new(1, 1, 1)).unwrap();

        let report = env.store.compute_progress("Counted").unwrap();
        assert_eq!(report.total_lessons, 8);
        assert_eq!(report.completed_lessons, 3);
        assert_eq!(report.completion_percentage, 37.5);
    }

    #[test]
    fn test_time_totals() {
        let env = TestEnv::new();
        env.store
            .create_course_structure("Timed", &course_document("Timed", 1, 1, 3))
            .unwrap();
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();

        for (lesson, minutes) in [(1, 10), (2, 25)] {
            let coord = LessonCoord::new(1, 1, lesson);
            env.store.save_code_at("Timed", coord, "a", start).unwrap();
            env.store
                .save_code_at("Timed", coord, "b", start + Duration::minutes(minutes))
                .unwrap();
        }

        let report = env.store.compute_progress("Timed").unwrap();
        assert_eq!(report.total_time_minutes, 35);
        assert_eq!(report.average_time_minutes, 17.5);
        let lessons = &report.modules[0].submodules[0].lessons;
        assert_eq!(lessons[2].time_spent_minutes, None);
    }

    #[test]
    fn test_partial_tree_skips_unreadable_nodes() {
        let env = TestEnv::new();
        let root = env
            .store
            .create_course_structure("Partial", &course_document("Partial", 2, 1, 2))
            .unwrap();

        // Lesson with no metadata, section with corrupt metadata
        fs::remove_file(
            root.join("section_01_Section_1/subsection_01_Subsection_1/lesson_02_Concept_2")
                .join(crate::paths::CONCEPT_INFO),
        )
        .unwrap();
        fs::write(
            root.join("section_02_Section_2").join(crate::paths::SECTION_INFO),
            "{ not json",
        )
        .unwrap();

        let report = env.store.compute_progress("Partial").unwrap();
        assert_eq!(report.modules.len(), 1);
        assert_eq!(report.total_lessons, 1);
    }

    #[test]
    fn test_missing_course_is_error() {
        let env = TestEnv::new();
        let result = env.store.compute_progress("Nonexistent");
        assert!(matches!(result, Err(StoreError::CourseNotFound(_))));
        assert!(env.store.locate("Nonexistent", LessonCoord::new(1, 1, 1)).is_none());
    }

    #[test]
    fn test_empty_course_progress() {
        let env = TestEnv::new();
        env.store
            .create_course_structure("Empty", &Default::default())
            .unwrap();

        let report = env.store.compute_progress("Empty").unwrap();
        assert_eq!(report.total_lessons, 0);
        assert_eq!(report.completion_percentage, 0.0);
    }
}

//! Test utilities for course store setup.
//!
//! Provides a store rooted in a temporary directory plus a few sample course
//! documents, so tests never touch the real data directory.

use std::path::Path;
use tempfile::TempDir;

use crate::config::FanOut;
use crate::content::{ConceptDoc, CourseDocument, SectionDoc, SubsectionDoc};
use crate::store::CourseStore;

/// Test environment with a course store in a temporary directory.
///
/// The directory is removed when the environment is dropped.
pub struct TestEnv {
    /// Temporary directory (kept alive for the store's lifetime)
    pub temp: TempDir,
    pub store: CourseStore,
}

impl TestEnv {
    /// Create a store with the default fan-out.
    pub fn new() -> Self {
        Self::with_fan_out(FanOut::default())
    }

    pub fn with_fan_out(fan_out: FanOut) -> Self {
        let temp = TempDir::new().expect("create temp dir");
        let store = CourseStore::open(temp.path().join("courses"), fan_out).expect("open store");
        Self { temp, store }
    }

    /// Get the temporary directory path for creating test files.
    pub fn path(&self) -> &Path {
        self.temp.path()
    }
}

/// One section "Arrays" / one subsection "Basics" / lessons "Indexing" and
/// "Traversal".
pub fn data_structures_document() -> CourseDocument {
    CourseDocument {
        course: Some("Data Structures".to_string()),
        sections: vec![SectionDoc {
            name: "Arrays".to_string(),
            index: None,
            subsections: vec![SubsectionDoc {
                name: "Basics".to_string(),
                index: None,
                concepts: vec![
                    ConceptDoc {
                        name: "Indexing".to_string(),
                        agenda: "Access elements by position".to_string(),
                        index: None,
                    },
                    ConceptDoc {
                        name: "Traversal".to_string(),
                        agenda: "Visit every element in order".to_string(),
                        index: None,
                    },
                ],
            }],
        }],
    }
}

/// Uniform document named "Section i" / "Subsection j" / "Concept k".
pub fn course_document(
    name: &str,
    sections: usize,
    subsections: usize,
    concepts: usize,
) -> CourseDocument {
    CourseDocument {
        course: Some(name.to_string()),
        sections: (1..=sections)
            .map(|s| SectionDoc {
                name: format!("Section {s}"),
                index: None,
                subsections: (1..=subsections)
                    .map(|ss| SubsectionDoc {
                        name: format!("Subsection {ss}"),
                        index: None,
                        concepts: (1..=concepts)
                            .map(|c| ConceptDoc {
                                name: format!("Concept {c}"),
                                agenda: format!("Agenda {s}.{ss}.{c}"),
                                index: None,
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect(),
    }
}

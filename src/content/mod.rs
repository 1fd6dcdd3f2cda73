//! Course content: documents, names and generated-text handling.
//!
//! This module provides the pieces shared by the store and the generation
//! services:
//! - **Documents**: the section → subsection → concept tree and video records
//! - **Sanitizing**: turning titles into directory-name tokens
//! - **Extraction**: recovering JSON from free-form generator output
//! - **Fallbacks**: placeholder course and lesson plan when generation fails

pub mod document;
pub mod extract;
pub mod fallback;
pub mod sanitize;

pub use document::{
    ConceptDoc, CourseDocument, LessonNames, SectionDoc, SubsectionDoc, VideoRecord,
};
pub use extract::{extract_json_object, parse_course_document};
pub use fallback::{fallback_course, fallback_lesson_plan};
pub use sanitize::{sanitize, sanitize_with_len, MAX_SAFE_NAME_LEN};

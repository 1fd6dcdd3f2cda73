//! Application services.
//!
//! Generation is delegated to external collaborators behind traits; the
//! service layer turns their output into store operations.
//!
//! The crate ships no concrete [`ContentGenerator`]. Embedders construct a
//! [`CourseService`] with their own implementation and call it as a library;
//! the HTTP router only serves stored courses. A service writes through its
//! own [`CourseStore`](crate::store::CourseStore) handle, so an embedder that
//! also runs the router serializes the two writers per course itself.

pub mod course_service;
pub mod generator;

pub use course_service::{CourseService, CourseSource, GeneratedCourse};
pub use generator::{ContentGenerator, GenerationError, KnowledgeBase, Message, Role, VideoCurator};

//! Course generation and lesson expansion.
//!
//! Wraps the store with the generator, knowledge base and video curator.
//! Generator failures never reach the store: malformed output degrades to
//! the documented fallback course or lesson plan.

use std::path::PathBuf;
use std::sync::Arc;

use super::generator::{ContentGenerator, KnowledgeBase, Message, VideoCurator};
use crate::config::{COURSE_KNOWLEDGE_RESULTS, LESSON_KNOWLEDGE_RESULTS};
use crate::content::{
    fallback_course, fallback_lesson_plan, parse_course_document, sanitize, CourseDocument,
};
use crate::store::{CourseStore, LessonCoord, StoreError, StoreResult};

const CURRICULUM_SYSTEM: &str =
    "You are a curriculum designer. Return ONLY valid JSON with no additional text or formatting.";

const LESSON_SYSTEM: &str = "You are an expert curriculum designer. Write practical, \
     actionable lesson plans with clear headings and bullet points.";

/// Where a materialized course document came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseSource {
    /// Parsed from the first, knowledge-enriched prompt
    Generated,
    /// Parsed from the shorter retry prompt
    Simplified,
    /// Generator output unusable; placeholder course
    Fallback,
}

/// Result of [`CourseService::generate_course`]
#[derive(Debug, Clone)]
pub struct GeneratedCourse {
    pub name: String,
    pub root: PathBuf,
    pub document: CourseDocument,
    pub source: CourseSource,
}

/// Orchestrates generation against one course store.
#[derive(Clone)]
pub struct CourseService {
    store: CourseStore,
    generator: Arc<dyn ContentGenerator>,
    knowledge: Option<Arc<dyn KnowledgeBase>>,
    curator: Option<Arc<dyn VideoCurator>>,
}

impl CourseService {
    pub fn new(store: CourseStore, generator: Arc<dyn ContentGenerator>) -> Self {
        Self {
            store,
            generator,
            knowledge: None,
            curator: None,
        }
    }

    pub fn with_knowledge(mut self, knowledge: Arc<dyn KnowledgeBase>) -> Self {
        self.knowledge = Some(knowledge);
        self
    }

    pub fn with_curator(mut self, curator: Arc<dyn VideoCurator>) -> Self {
        self.curator = Some(curator);
        self
    }

    pub fn store(&self) -> &CourseStore {
        &self.store
    }

    /// Generate a course for `topic` and materialize it.
    ///
    /// Tries the full prompt, then a simplified one, then falls back to the
    /// placeholder course. Only materialization errors are returned.
    pub async fn generate_course(&self, topic: &str) -> StoreResult<GeneratedCourse> {
        let known = self.knowledge_for(topic, COURSE_KNOWLEDGE_RESULTS).await;

        let (document, source) = match self.request_course(&course_prompt(topic, &known), topic).await {
            Some(document) => (document, CourseSource::Generated),
            None => match self.request_course(&simplified_course_prompt(topic), topic).await {
                Some(document) => (document, CourseSource::Simplified),
                None => {
                    tracing::warn!("Using placeholder course for '{}'", topic);
                    (fallback_course(topic), CourseSource::Fallback)
                }
            },
        };

        let name = document
            .course
            .clone()
            .filter(|name| !sanitize(name).is_empty())
            .unwrap_or_else(|| topic.to_string());
        let root = self.store.create_course_structure(&name, &document)?;

        tracing::info!("Course '{}' ready ({:?})", name, source);
        Ok(GeneratedCourse {
            name,
            root,
            document,
            source,
        })
    }

    /// Expand a lesson's agenda into a detailed plan, store it, and attach
    /// curated videos.
    ///
    /// The plan is saved even when the generator fails (placeholder plan).
    /// Video curation failures are logged and otherwise ignored.
    pub async fn expand_lesson(&self, course_name: &str, coord: LessonCoord) -> StoreResult<String> {
        let not_found = || StoreError::LessonNotFound {
            course: course_name.to_string(),
            coord,
        };

        let agenda = self.store.get_agenda(course_name, coord).ok_or_else(not_found)?;
        let structure = self
            .store
            .get_course_structure(course_name)
            .ok_or_else(|| StoreError::CourseNotFound(course_name.to_string()))?;
        let names = structure
            .lesson_names(coord.section, coord.subsection, coord.lesson)
            .ok_or_else(not_found)?;

        let query = format!("{} {} {}", course_name, names.section, names.subsection);
        let known = self.knowledge_for(&query, LESSON_KNOWLEDGE_RESULTS).await;
        let messages = [
            Message::system(LESSON_SYSTEM),
            Message::user(lesson_prompt(
                course_name,
                &names.section,
                &names.subsection,
                &agenda,
                &known,
            )),
        ];

        let plan = match self.generator.complete(&messages).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                tracing::warn!("Empty lesson plan for '{}' lesson {}", course_name, coord);
                fallback_lesson_plan(&agenda)
            }
            Err(e) => {
                tracing::warn!("Lesson expansion failed for '{}' lesson {}: {}", course_name, coord, e);
                fallback_lesson_plan(&agenda)
            }
        };

        self.store.save_detailed_plan(course_name, coord, &plan)?;
        self.attach_curated_videos(course_name, coord, &plan).await;
        Ok(plan)
    }

    async fn attach_curated_videos(&self, course_name: &str, coord: LessonCoord, plan: &str) {
        let Some(curator) = &self.curator else {
            return;
        };
        match curator.curate(plan).await {
            Ok(videos) if videos.is_empty() => {
                tracing::debug!("No videos found for '{}' lesson {}", course_name, coord);
            }
            Ok(videos) => {
                // Failure is already logged by the store
                let _ = self.store.attach_videos(course_name, coord, &videos);
            }
            Err(e) => {
                tracing::warn!("Video curation failed for '{}' lesson {}: {}", course_name, coord, e);
            }
        }
    }

    async fn request_course(&self, prompt: &str, topic: &str) -> Option<CourseDocument> {
        let messages = [Message::system(CURRICULUM_SYSTEM), Message::user(prompt)];
        match self.generator.complete(&messages).await {
            Ok(text) => {
                let document = parse_course_document(&text, topic);
                if document.is_none() {
                    tracing::warn!("Unparseable course structure for '{}' ({} chars)", topic, text.len());
                }
                document
            }
            Err(e) => {
                tracing::warn!("Course generation failed for '{}': {}", topic, e);
                None
            }
        }
    }

    async fn knowledge_for(&self, text: &str, limit: usize) -> Vec<String> {
        match &self.knowledge {
            Some(knowledge) => knowledge.query(text, limit).await,
            None => Vec::new(),
        }
    }
}

const COURSE_SHAPE: &str = r#"{
  "course": "<title>",
  "sections": [
    {
      "name": "Section Name",
      "subsections": [
        {
          "name": "Subsection Name",
          "concepts": [
            {"name": "Concept Name", "agenda": "Brief learning objective"}
          ]
        }
      ]
    }
  ]
}"#;

fn course_prompt(topic: &str, known: &[String]) -> String {
    let background = if known.is_empty() {
        String::new()
    } else {
        format!("\nThe learner already knows:\n- {}\n", known.join("\n- "))
    };
    format!(
        "Create a course on {topic} with 7 sections, each with 10 subsections, \
         each with 10 concepts.\n{background}\nReturn only JSON of this shape:\n{COURSE_SHAPE}\n\n\
         Keep names short and agendas concise."
    )
}

fn simplified_course_prompt(topic: &str) -> String {
    format!(
        "Create a course on {topic}: exactly 7 sections, 10 subsections each, \
         10 concepts each.\nReturn only JSON of this shape:\n{COURSE_SHAPE}\n\n\
         Use very short names and agendas so the response is not truncated."
    )
}

fn lesson_prompt(
    course: &str,
    section: &str,
    subsection: &str,
    agenda: &str,
    known: &[String],
) -> String {
    let mut prompt = format!(
        "Write a detailed lesson plan.\n\nCourse: {course}\nModule: {section}\n\
         Submodule: {subsection}\nAgenda: {agenda}\n\n\
         Include: learning objectives, lesson structure with timings, detailed content \
         with examples, practice exercises, assessment questions, troubleshooting tips."
    );
    if !known.is_empty() {
        prompt.push_str("\n\nRelated material:\n- ");
        prompt.push_str(&known.join("\n- "));
    }
    prompt
}

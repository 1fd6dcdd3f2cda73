//! Course document model.
//!
//! A course document is the tree of sections → subsections → concepts that an
//! upstream generator (or a learner) supplies for materialization. Every field
//! is tolerant of missing keys so partially generated documents still load.

use serde::{Deserialize, Serialize};

use crate::config::FanOut;

/// Whole course document, as persisted in `course_structure.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseDocument {
    /// Course title as produced by the generator (optional in input)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,

    #[serde(default)]
    pub sections: Vec<SectionDoc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionDoc {
    #[serde(default)]
    pub name: String,

    /// 1-based position, assigned at materialization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,

    #[serde(default)]
    pub subsections: Vec<SubsectionDoc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubsectionDoc {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,

    #[serde(default)]
    pub concepts: Vec<ConceptDoc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConceptDoc {
    #[serde(default)]
    pub name: String,

    /// Learning objective for the lesson
    #[serde(default)]
    pub agenda: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
}

/// Names of the nodes along one lesson coordinate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonNames {
    pub section: String,
    pub subsection: String,
    pub concept: String,
}

impl CourseDocument {
    /// Drop siblings beyond the fan-out cap and write 1-based positions into
    /// every remaining node.
    pub fn annotate_indices(&mut self, fan_out: FanOut) {
        self.sections.truncate(fan_out.sections);
        for (section_pos, section) in self.sections.iter_mut().enumerate() {
            section.index = Some(position(section_pos));
            section.subsections.truncate(fan_out.subsections);

            for (sub_pos, subsection) in section.subsections.iter_mut().enumerate() {
                subsection.index = Some(position(sub_pos));
                subsection.concepts.truncate(fan_out.concepts);

                for (concept_pos, concept) in subsection.concepts.iter_mut().enumerate() {
                    concept.index = Some(position(concept_pos));
                }
            }
        }
    }

    /// Number of concepts in the (possibly capped) document
    pub fn lesson_count(&self) -> usize {
        self.sections
            .iter()
            .flat_map(|s| &s.subsections)
            .map(|ss| ss.concepts.len())
            .sum()
    }

    /// Look up section/subsection/concept names by 1-based positions.
    pub fn lesson_names(&self, section: u32, subsection: u32, concept: u32) -> Option<LessonNames> {
        let section_doc = self.sections.get(zero_based(section)?)?;
        let subsection_doc = section_doc.subsections.get(zero_based(subsection)?)?;
        let concept_doc = subsection_doc.concepts.get(zero_based(concept)?)?;

        let names = LessonNames {
            section: section_doc.name.clone(),
            subsection: subsection_doc.name.clone(),
            concept: concept_doc.name.clone(),
        };
        if names.section.is_empty() || names.subsection.is_empty() || names.concept.is_empty() {
            return None;
        }
        Some(names)
    }
}

fn position(zero_based: usize) -> u32 {
    u32::try_from(zero_based + 1).unwrap_or(u32::MAX)
}

fn zero_based(index: u32) -> Option<usize> {
    (index as usize).checked_sub(1)
}

/// A curated video attached to a lesson.
///
/// Only the first six fields are required by the store; the rest are carried
/// through from the curation service when present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub transcript: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub explanation: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_prompt: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with(sections: usize, subsections: usize, concepts: usize) -> CourseDocument {
        CourseDocument {
            course: Some("Test".into()),
            sections: (0..sections)
                .map(|s| SectionDoc {
                    name: format!("S{s}"),
                    index: None,
                    subsections: (0..subsections)
                        .map(|ss| SubsectionDoc {
                            name: format!("SS{ss}"),
                            index: None,
                            concepts: (0..concepts)
                                .map(|c| ConceptDoc {
                                    name: format!("C{c}"),
                                    agenda: format!("Agenda {c}"),
                                    index: None,
                                })
                                .collect(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_annotate_assigns_positions() {
        let mut doc = doc_with(2, 3, 4);
        doc.annotate_indices(FanOut::default());

        for (s, section) in doc.sections.iter().enumerate() {
            assert_eq!(section.index, Some(s as u32 + 1));
            for (ss, subsection) in section.subsections.iter().enumerate() {
                assert_eq!(subsection.index, Some(ss as u32 + 1));
                for (c, concept) in subsection.concepts.iter().enumerate() {
                    assert_eq!(concept.index, Some(c as u32 + 1));
                }
            }
        }
    }

    #[test]
    fn test_annotate_caps_fan_out() {
        let mut doc = doc_with(9, 12, 11);
        doc.annotate_indices(FanOut::default());

        assert_eq!(doc.sections.len(), 7);
        assert!(doc.sections.iter().all(|s| s.subsections.len() == 10));
        assert_eq!(doc.lesson_count(), 7 * 10 * 10);
    }

    #[test]
    fn test_missing_keys_tolerated() {
        let doc: CourseDocument = serde_json::from_str(r#"{"course": "Empty"}"#).unwrap();
        assert!(doc.sections.is_empty());

        let doc: CourseDocument =
            serde_json::from_str(r#"{"sections": [{"name": "Only", "subsections": [{"name": "Sub"}]}]}"#)
                .unwrap();
        assert_eq!(doc.sections[0].subsections[0].concepts.len(), 0);
    }

    #[test]
    fn test_lesson_names_by_position() {
        let doc = doc_with(1, 2, 2);
        let names = doc.lesson_names(1, 2, 1).unwrap();
        assert_eq!(names.section, "S0");
        assert_eq!(names.subsection, "SS1");
        assert_eq!(names.concept, "C0");

        assert!(doc.lesson_names(0, 1, 1).is_none());
        assert!(doc.lesson_names(1, 3, 1).is_none());
    }

    #[test]
    fn test_video_record_extra_fields_optional() {
        let json = r#"{"title": "Intro", "channel": "CS", "url": "https://example.com/v",
                       "transcript": "t", "summary": "s", "explanation": "e"}"#;
        let video: VideoRecord = serde_json::from_str(json).unwrap();
        assert_eq!(video.title, "Intro");
        assert!(video.id.is_none());

        let out = serde_json::to_value(&video).unwrap();
        assert!(out.get("id").is_none());
    }
}

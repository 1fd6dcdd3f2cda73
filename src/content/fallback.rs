//! Documented fallback content used when generation fails.
//!
//! The placeholder course always has the full default fan-out so a learner can
//! start working even when no generator is reachable.

use super::document::{ConceptDoc, CourseDocument, SectionDoc, SubsectionDoc};

const SECTION_NAMES: [&str; 7] = [
    "Introduction & Fundamentals",
    "Core Concepts",
    "Advanced Topics",
    "Practical Applications",
    "Problem Solving",
    "Real-world Projects",
    "Advanced Techniques",
];

const SUBSECTION_NAMES: [&str; 10] = [
    "Getting Started",
    "Basic Concepts",
    "Intermediate Skills",
    "Advanced Techniques",
    "Practical Examples",
    "Problem Solving",
    "Best Practices",
    "Common Pitfalls",
    "Performance Optimization",
    "Integration & Deployment",
];

/// Concept name and agenda template (`{topic}`, `{area}` are substituted)
const CONCEPTS: [(&str, &str); 10] = [
    ("Foundation Principles", "Understand the fundamental principles of {topic} in {area}"),
    ("Core Implementation", "Implement core {topic} functionality for {area}"),
    ("Advanced Features", "Master advanced {topic} features for {area}"),
    ("Practical Application", "Apply {topic} knowledge to solve real problems in {area}"),
    ("Performance Analysis", "Analyze and optimize {topic} performance in {area}"),
    ("Error Handling", "Implement robust error handling for {topic} in {area}"),
    ("Testing & Debugging", "Test and debug {topic} code in {area}"),
    ("Documentation", "Create comprehensive documentation for {topic} in {area}"),
    ("Integration", "Integrate {topic} with other systems in {area}"),
    ("Deployment", "Deploy and maintain {topic} solutions in {area}"),
];

/// Placeholder 7×10×10 course for `topic`.
pub fn fallback_course(topic: &str) -> CourseDocument {
    let sections = SECTION_NAMES
        .iter()
        .map(|section_name| SectionDoc {
            name: section_name.to_string(),
            index: None,
            subsections: SUBSECTION_NAMES
                .iter()
                .map(|sub_name| {
                    let area = sub_name.to_lowercase();
                    SubsectionDoc {
                        name: sub_name.to_string(),
                        index: None,
                        concepts: CONCEPTS
                            .iter()
                            .map(|(name, agenda)| ConceptDoc {
                                name: name.to_string(),
                                agenda: agenda.replace("{topic}", topic).replace("{area}", &area),
                                index: None,
                            })
                            .collect(),
                    }
                })
                .collect(),
        })
        .collect();

    CourseDocument {
        course: Some(topic.to_string()),
        sections,
    }
}

/// Placeholder lesson plan built from the agenda alone.
pub fn fallback_lesson_plan(agenda: &str) -> String {
    format!(
        "# {agenda}

## LEARNING OBJECTIVES
- Understand the core concepts of {agenda}
- Apply practical knowledge in real-world scenarios
- Develop problem-solving skills related to {agenda}

## LESSON STRUCTURE
- **Introduction (5-10 min)**: Overview and motivation
- **Main Content (30-45 min)**: Core concepts and explanations
- **Practice Activities (15-20 min)**: Hands-on exercises
- **Assessment (10-15 min)**: Check for understanding
- **Summary (5 min)**: Recap and next steps

## PRACTICE EXERCISES
1. **Basic Exercise**: Simple application of concepts
2. **Intermediate Exercise**: More complex problem-solving
3. **Advanced Exercise**: Real-world scenario application

## ASSESSMENT
- Understanding check questions
- Common pitfalls to watch for
- Success criteria for the lesson
"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_course_shape() {
        let doc = fallback_course("Rust");
        assert_eq!(doc.course.as_deref(), Some("Rust"));
        assert_eq!(doc.sections.len(), 7);
        assert_eq!(doc.lesson_count(), 700);
        assert_eq!(doc.sections[0].name, "Introduction & Fundamentals");
    }

    #[test]
    fn test_fallback_agenda_substitution() {
        let doc = fallback_course("Rust");
        let concept = &doc.sections[0].subsections[1].concepts[0];
        assert_eq!(concept.name, "Foundation Principles");
        assert_eq!(
            concept.agenda,
            "Understand the fundamental principles of Rust in basic concepts"
        );
    }

    #[test]
    fn test_fallback_plan_mentions_agenda() {
        let plan = fallback_lesson_plan("Pointer arithmetic");
        assert!(plan.starts_with("# Pointer arithmetic"));
        assert!(plan.contains("## PRACTICE EXERCISES"));
    }
}

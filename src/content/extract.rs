//! Recovering JSON from free-form generator output.
//!
//! Language models wrap JSON in prose or code fences and sometimes stop
//! mid-document. These helpers try progressively looser readings and return
//! `None` when nothing usable remains, so callers can fall back to a
//! documented default instead of surfacing a parse error.

use serde_json::Value;

use super::document::CourseDocument;

/// Extract the first JSON object contained in `text`.
///
/// Tries, in order: the whole text, the text with code fences removed, the
/// span from the first `{` to the last `}`, and finally the span from the
/// first `{` to the end with unclosed strings, arrays and objects closed.
pub fn extract_json_object(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if let Some(value) = parse_object(trimmed) {
        return Some(value);
    }

    let unfenced = strip_code_fences(trimmed);
    if let Some(value) = parse_object(unfenced) {
        return Some(value);
    }

    let start = unfenced.find('{')?;
    if let Some(end) = unfenced.rfind('}')
        && end > start
        && let Some(value) = parse_object(&unfenced[start..=end])
    {
        return Some(value);
    }

    let repaired = close_truncated(&unfenced[start..]);
    tracing::debug!("Attempting truncated JSON repair ({} bytes)", repaired.len());
    parse_object(&repaired)
}

/// Parse generator output as a course document.
///
/// Requires a `sections` array; a missing `course` title defaults to `topic`.
pub fn parse_course_document(text: &str, topic: &str) -> Option<CourseDocument> {
    let value = extract_json_object(text)?;
    if !value.get("sections").is_some_and(Value::is_array) {
        tracing::warn!("Generated JSON has no 'sections' list");
        return None;
    }

    let mut document: CourseDocument = match serde_json::from_value(value) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!("Generated JSON is not a course document: {}", e);
            return None;
        }
    };
    if document.course.as_deref().is_none_or(str::is_empty) {
        document.course = Some(topic.to_string());
    }
    Some(document)
}

fn parse_object(text: &str) -> Option<Value> {
    serde_json::from_str::<Value>(text)
        .ok()
        .filter(Value::is_object)
}

fn strip_code_fences(text: &str) -> &str {
    let Some(after_open) = text.strip_prefix("```") else {
        return text;
    };
    // Skip the language tag on the opening fence
    let body = after_open
        .split_once('\n')
        .map(|(_, rest)| rest)
        .unwrap_or(after_open);
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Close whatever is left open at the end of a truncated JSON fragment.
fn close_truncated(fragment: &str) -> String {
    let mut closers = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for c in fragment.chars() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => closers.push('}'),
            '[' => closers.push(']'),
            '}' | ']' => {
                closers.pop();
            }
            _ => {}
        }
    }

    let mut repaired = fragment.trim_end().to_string();
    if in_string {
        repaired.push('"');
    }
    // A dangling separator would still be invalid after closing
    while repaired.ends_with(',') || repaired.ends_with(':') {
        repaired.pop();
    }
    while let Some(closer) = closers.pop() {
        repaired.push(closer);
    }
    repaired
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json() {
        let value = extract_json_object(r#"{"a": 1}"#).unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn test_prose_wrapped_json() {
        let text = "Sure! Here is your course:\n{\"sections\": []}\nLet me know.";
        let value = extract_json_object(text).unwrap();
        assert!(value["sections"].is_array());
    }

    #[test]
    fn test_fenced_json() {
        let text = "```json\n{\"course\": \"Rust\", \"sections\": []}\n```";
        let value = extract_json_object(text).unwrap();
        assert_eq!(value["course"], "Rust");
    }

    #[test]
    fn test_truncated_json_is_closed() {
        let text = r#"{"course": "Go", "sections": [{"name": "Basics", "subsections": [{"name": "Vars"#;
        let value = extract_json_object(text).unwrap();
        assert_eq!(value["sections"][0]["subsections"][0]["name"], "Vars");
    }

    #[test]
    fn test_truncated_after_separator() {
        let text = r#"{"sections": [{"name": "A"},"#;
        let value = extract_json_object(text).unwrap();
        assert_eq!(value["sections"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_braces_inside_strings_ignored() {
        let text = r#"{"sections": [], "note": "use { and [ freely"#;
        let value = extract_json_object(text).unwrap();
        assert_eq!(value["note"], "use { and [ freely");
    }

    #[test]
    fn test_no_json_at_all() {
        assert!(extract_json_object("I cannot help with that.").is_none());
        assert!(extract_json_object("").is_none());
    }

    #[test]
    fn test_parse_course_document_defaults_title() {
        let doc = parse_course_document(r#"{"sections": [{"name": "Intro"}]}"#, "Python").unwrap();
        assert_eq!(doc.course.as_deref(), Some("Python"));
        assert_eq!(doc.sections[0].name, "Intro");
    }

    #[test]
    fn test_parse_course_document_requires_sections() {
        assert!(parse_course_document(r#"{"course": "Python"}"#, "Python").is_none());
        assert!(parse_course_document(r#"{"sections": "none"}"#, "Python").is_none());
    }
}

//! Metadata records written next to every tree node.
//!
//! The `index` stored in these files is the authority on a node's identity;
//! directory names only carry it as a lookup hint.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::{StoreError, StoreResult};
use crate::paths;

/// A JSON record stored under a fixed file name inside a node directory.
pub trait MetadataRecord: Serialize + DeserializeOwned {
    const FILE_NAME: &'static str;

    /// 1-based position among siblings
    fn index(&self) -> u32;

    /// Load the record from a node directory.
    fn load(dir: &Path) -> StoreResult<Self> {
        let path = dir.join(Self::FILE_NAME);
        if !path.exists() {
            return Err(StoreError::MetadataMissing(path));
        }
        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, dir: &Path) -> StoreResult<()> {
        write_json(&dir.join(Self::FILE_NAME), self)
    }

    /// True if the directory holds a readable record with this index.
    fn index_matches(dir: &Path, expected: u32) -> bool {
        match Self::load(dir) {
            Ok(record) => record.index() == expected,
            Err(StoreError::MetadataMissing(_)) => false,
            Err(e) => {
                tracing::debug!("Unreadable metadata in {}: {}", dir.display(), e);
                false
            }
        }
    }
}

/// `section_info.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionInfo {
    pub name: String,
    pub index: u32,
    #[serde(default)]
    pub created_at: String,
}

impl MetadataRecord for SectionInfo {
    const FILE_NAME: &'static str = paths::SECTION_INFO;

    fn index(&self) -> u32 {
        self.index
    }
}

/// `subsection_info.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsectionInfo {
    pub name: String,
    pub index: u32,
    #[serde(default)]
    pub section_name: String,
    #[serde(default)]
    pub created_at: String,
}

impl MetadataRecord for SubsectionInfo {
    const FILE_NAME: &'static str = paths::SUBSECTION_INFO;

    fn index(&self) -> u32 {
        self.index
    }
}

/// `concept_info.json` - the per-lesson record.
///
/// Timestamps are kept as the strings found on disk so a malformed value
/// never prevents the rest of the record from loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptInfo {
    pub name: String,
    #[serde(default)]
    pub agenda: String,
    pub index: u32,
    #[serde(default)]
    pub subsection_name: String,
    #[serde(default)]
    pub section_name: String,
    #[serde(default)]
    pub created_at: String,

    #[serde(default)]
    pub completed: bool,
    /// Expanded lesson content; written as `null` until the first expansion
    #[serde(default)]
    pub detailed_plan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_code_update: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_code_update: Option<String>,
    /// Minutes between the first and the latest code save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_time_minutes: Option<i64>,

    /// Number of attached videos
    #[serde(
        rename = "youtube_videos",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub video_count: Option<usize>,
    /// File holding the attached video list
    #[serde(
        rename = "youtube_videos_file",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub videos_file: Option<String>,
}

impl MetadataRecord for ConceptInfo {
    const FILE_NAME: &'static str = paths::CONCEPT_INFO;

    fn index(&self) -> u32 {
        self.index
    }
}

impl ConceptInfo {
    /// Fresh record for a newly materialized lesson.
    pub fn new(
        name: &str,
        agenda: &str,
        index: u32,
        subsection_name: &str,
        section_name: &str,
        created_at: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            agenda: agenda.to_string(),
            index,
            subsection_name: subsection_name.to_string(),
            section_name: section_name.to_string(),
            created_at: created_at.to_string(),
            completed: false,
            detailed_plan: None,
            completed_at: None,
            code_file: None,
            first_code_update: None,
            last_code_update: None,
            total_time_minutes: None,
            video_count: None,
            videos_file: None,
        }
    }

    /// Recompute `total_time_minutes` from the code-save timestamps.
    ///
    /// Leaves the previous value in place when either timestamp is missing or
    /// unparseable.
    pub fn recompute_time_spent(&mut self) {
        let first = self.first_code_update.as_deref().and_then(parse_timestamp);
        let last = self.last_code_update.as_deref().and_then(parse_timestamp);
        match (first, last) {
            (Some(first), Some(last)) => {
                self.total_time_minutes = Some((last - first).num_minutes());
            }
            _ => tracing::debug!(
                "Keeping previous time spent for '{}': unreadable code timestamps",
                self.name
            ),
        }
    }
}

/// Current time in the on-disk timestamp format
pub fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339()
}

/// Parse an RFC 3339 timestamp, or a naive ISO-8601 one (read as UTC).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Write a value as pretty-printed JSON.
pub(crate) fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> StoreResult<()> {
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content)?;
    Ok(())
}

/// Read a whole text file, `None` if absent or unreadable.
pub(crate) fn read_text(path: &Path) -> Option<String> {
    if !path.exists() {
        return None;
    }
    match fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", path.display(), e);
            None
        }
    }
}

//! Writing a course document out as a directory tree, and reading the course
//! catalogue back.

use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};

use super::records::{read_text, timestamp, write_json, ConceptInfo, SectionInfo, SubsectionInfo};
use super::{CourseStore, LogOnError, MetadataRecord, StoreError, StoreResult};
use crate::content::{sanitize, CourseDocument};
use crate::paths;

impl CourseStore {
    /// Materialize `document` as the course `course_name`, replacing any
    /// existing course with the same sanitized name.
    ///
    /// The tree is built in a hidden staging directory and swapped into place,
    /// so a failure part-way through leaves the previous course untouched.
    /// Siblings beyond the fan-out cap are dropped. Returns the absolute path
    /// of the course root.
    pub fn create_course_structure(
        &self,
        course_name: &str,
        document: &CourseDocument,
    ) -> StoreResult<PathBuf> {
        let safe_name = sanitize(course_name);
        if safe_name.is_empty() {
            return Err(StoreError::InvalidName(course_name.to_string()));
        }

        let course_dir = self.root.join(&safe_name);
        let staging_dir = self.root.join(paths::staging_dir_name(&safe_name));
        if staging_dir.exists() {
            // Left behind by an interrupted materialization
            fs::remove_dir_all(&staging_dir)?;
        }

        let mut annotated = document.clone();
        annotated.annotate_indices(self.fan_out);

        if let Err(e) = write_course_tree(&staging_dir, &annotated) {
            let _ = fs::remove_dir_all(&staging_dir);
            return Err(e);
        }

        // The retired tree may be the only copy of the previous course
        self.restore_retired(&safe_name);
        let retired_dir = self.root.join(paths::retired_dir_name(&safe_name));
        swap_into_place(&staging_dir, &course_dir, &retired_dir)?;

        tracing::info!(
            "Materialized course '{}' ({} sections, {} lessons) at {}",
            course_name,
            annotated.sections.len(),
            annotated.lesson_count(),
            course_dir.display()
        );
        Ok(course_dir)
    }

    /// The annotated document stored in the course manifest.
    pub fn get_course_structure(&self, course_name: &str) -> Option<CourseDocument> {
        let course_dir = self.existing_course_dir(course_name)?;
        let content = read_text(&course_dir.join(paths::COURSE_MANIFEST))?;
        serde_json::from_str(&content).log_warn(&format!("Corrupt manifest for '{}'", course_name))
    }

    /// Names of all materialized courses (their directory names), sorted.
    pub fn list_courses(&self) -> Vec<String> {
        self.restore_all_retired();
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Failed to list courses in {}: {}", self.root.display(), e);
                return Vec::new();
            }
        };

        let mut courses: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_dir())
            .filter(|e| e.path().join(paths::COURSE_MANIFEST).exists())
            .filter_map(|e| e.file_name().into_string().ok())
            .filter(|name| !name.starts_with('.'))
            .collect();
        courses.sort();
        courses
    }

    /// Rewrite the manifest of an existing course with fresh index fields.
    ///
    /// Repairs manifests written without positions; the directory tree is
    /// left as it is.
    pub fn reindex_course(&self, course_name: &str) -> StoreResult<CourseDocument> {
        let course_dir = self
            .existing_course_dir(course_name)
            .ok_or_else(|| StoreError::CourseNotFound(course_name.to_string()))?;
        let manifest = course_dir.join(paths::COURSE_MANIFEST);
        if !manifest.exists() {
            return Err(StoreError::MetadataMissing(manifest));
        }

        let mut document: CourseDocument = serde_json::from_str(&fs::read_to_string(&manifest)?)?;
        document.annotate_indices(self.fan_out);
        write_json(&manifest, &document)?;

        tracing::info!(
            "Reindexed course '{}' ({} sections)",
            course_name,
            document.sections.len()
        );
        Ok(document)
    }
}

/// Write the manifest and every node of an annotated document under `dir`.
fn write_course_tree(dir: &Path, document: &CourseDocument) -> StoreResult<()> {
    let created_at = timestamp(Utc::now());
    fs::create_dir_all(dir)?;
    write_json(&dir.join(paths::COURSE_MANIFEST), document)?;

    for (section_index, section) in (1u32..).zip(&document.sections) {
        let section_dir = dir.join(paths::section_dir_name(section_index, &sanitize(&section.name)));
        fs::create_dir_all(&section_dir)?;
        SectionInfo {
            name: section.name.clone(),
            index: section_index,
            created_at: created_at.clone(),
        }
        .save(&section_dir)?;

        for (sub_index, subsection) in (1u32..).zip(&section.subsections) {
            let sub_dir = section_dir.join(paths::subsection_dir_name(
                sub_index,
                &sanitize(&subsection.name),
            ));
            fs::create_dir_all(&sub_dir)?;
            SubsectionInfo {
                name: subsection.name.clone(),
                index: sub_index,
                section_name: section.name.clone(),
                created_at: created_at.clone(),
            }
            .save(&sub_dir)?;

            for (concept_index, concept) in (1u32..).zip(&subsection.concepts) {
                let lesson_dir = sub_dir.join(paths::lesson_dir_name(
                    concept_index,
                    &sanitize(&concept.name),
                ));
                fs::create_dir_all(&lesson_dir)?;
                ConceptInfo::new(
                    &concept.name,
                    &concept.agenda,
                    concept_index,
                    &subsection.name,
                    &section.name,
                    &created_at,
                )
                .save(&lesson_dir)?;
                fs::write(lesson_dir.join(paths::AGENDA_FILE), &concept.agenda)?;
            }
        }
    }
    Ok(())
}

/// Replace `target` with `staging`, keeping the old tree until the new one is
/// in place.
fn swap_into_place(staging: &Path, target: &Path, retired: &Path) -> StoreResult<()> {
    let retire = || -> std::io::Result<()> {
        if retired.exists() {
            fs::remove_dir_all(retired)?;
        }
        if target.exists() {
            fs::rename(target, retired)?;
        }
        Ok(())
    };
    if let Err(e) = retire() {
        tracing::error!("Failed to retire course {}: {}", target.display(), e);
        let _ = fs::remove_dir_all(staging);
        return Err(e.into());
    }

    if let Err(e) = fs::rename(staging, target) {
        tracing::error!("Failed to move new course into {}: {}", target.display(), e);
        // Restore the previous course
        if retired.exists() {
            let _ = fs::rename(retired, target);
        }
        let _ = fs::remove_dir_all(staging);
        return Err(e.into());
    }

    if retired.exists()
        && let Err(e) = fs::remove_dir_all(retired)
    {
        tracing::warn!("Failed to remove replaced course {}: {}", retired.display(), e);
    }
    Ok(())
}

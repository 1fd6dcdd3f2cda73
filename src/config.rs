//! Application configuration.
//!
//! Values are resolved with the priority `config.toml` > `.env` / environment >
//! built-in default, mirroring how the store root is located at startup.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::paths;

// ==================== Fan-out Configuration ====================

/// Default number of sections materialized per course
pub const DEFAULT_MAX_SECTIONS: usize = 7;

/// Default number of subsections materialized per section
pub const DEFAULT_MAX_SUBSECTIONS: usize = 10;

/// Default number of concepts materialized per subsection
pub const DEFAULT_MAX_CONCEPTS: usize = 10;

/// Maximum number of siblings processed at each tree level.
///
/// Siblings beyond the cap are silently ignored by the materializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanOut {
    pub sections: usize,
    pub subsections: usize,
    pub concepts: usize,
}

impl Default for FanOut {
    fn default() -> Self {
        Self {
            sections: DEFAULT_MAX_SECTIONS,
            subsections: DEFAULT_MAX_SUBSECTIONS,
            concepts: DEFAULT_MAX_CONCEPTS,
        }
    }
}

// ==================== config.toml ====================

/// Configuration file structure for config.toml
#[derive(Debug, Default, Deserialize)]
struct AppConfig {
    store: Option<StoreSection>,
}

#[derive(Debug, Default, Deserialize)]
struct StoreSection {
    root: Option<String>,
    max_sections: Option<usize>,
    max_subsections: Option<usize>,
    max_concepts: Option<usize>,
}

/// Resolved store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub root: PathBuf,
    pub fan_out: FanOut,
}

impl StoreConfig {
    /// Load from `config.toml` in the working directory, then the environment.
    pub fn load() -> Self {
        // Load .env file if present
        let _ = dotenvy::dotenv();
        Self::load_from(Path::new("config.toml"))
    }

    /// Load with an explicit config file path (missing file = defaults).
    pub fn load_from(config_path: &Path) -> Self {
        let file_config = read_config_file(config_path).unwrap_or_default();
        let store = file_config.store.unwrap_or_default();

        let root = match store.root {
            Some(root) => {
                tracing::info!("Using course store from config.toml: {}", root);
                PathBuf::from(root)
            }
            None => match std::env::var("COURSES_DIR") {
                Ok(root) => {
                    tracing::info!("Using course store from COURSES_DIR env: {}", root);
                    PathBuf::from(root)
                }
                Err(_) => {
                    let default = PathBuf::from(paths::default_courses_dir());
                    tracing::info!("Using default course store: {}", default.display());
                    default
                }
            },
        };

        let defaults = FanOut::default();
        let fan_out = FanOut {
            sections: store.max_sections.unwrap_or(defaults.sections),
            subsections: store.max_subsections.unwrap_or(defaults.subsections),
            concepts: store.max_concepts.unwrap_or(defaults.concepts),
        };

        Self { root, fan_out }
    }
}

fn read_config_file(path: &Path) -> Option<AppConfig> {
    let contents = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<AppConfig>(&contents) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("Ignoring malformed {}: {}", path.display(), e);
            None
        }
    }
}

// ==================== Server Configuration ====================

/// Server address to bind to
pub const SERVER_ADDR: &str = "0.0.0.0";

/// Default server port
pub const SERVER_PORT: u16 = 3000;

/// Server port (PORT env var overrides the default)
pub fn server_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(SERVER_PORT)
}

/// Get the full server bind address
pub fn server_bind_addr() -> String {
    format!("{}:{}", SERVER_ADDR, server_port())
}

// ==================== Generation Configuration ====================

/// Knowledge snippets requested when enriching a course prompt
pub const COURSE_KNOWLEDGE_RESULTS: usize = 12;

/// Knowledge snippets requested when enriching a lesson prompt
pub const LESSON_KNOWLEDGE_RESULTS: usize = 10;

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_fan_out_default() {
        let fan_out = FanOut::default();
        assert_eq!(fan_out.sections, 7);
        assert_eq!(fan_out.subsections, 10);
        assert_eq!(fan_out.concepts, 10);
    }

    #[test]
    fn test_config_file_overrides() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            r#"
            [store]
            root = "/srv/courses"
            max_sections = 3
            "#,
        )
        .unwrap();

        let config = StoreConfig::load_from(&path);
        assert_eq!(config.root, PathBuf::from("/srv/courses"));
        assert_eq!(config.fan_out.sections, 3);
        assert_eq!(config.fan_out.subsections, DEFAULT_MAX_SUBSECTIONS);
        assert_eq!(config.fan_out.concepts, DEFAULT_MAX_CONCEPTS);
    }

    #[test]
    fn test_malformed_config_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[store\nroot = ").unwrap();

        let config = StoreConfig::load_from(&path);
        assert_eq!(config.fan_out, FanOut::default());
    }

    #[test]
    fn test_server_bind_addr_format() {
        assert!(server_bind_addr().starts_with("0.0.0.0:"));
    }
}

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, Result};

/// Directory holding the persisted audit databases.
const AUDIT_DIR: &str = ".audit";
/// Primary relational index filename.
const INDEX_DB_FILE: &str = "repo_index.db";
/// Optional secondary graph store filename.
const GRAPH_DB_FILE: &str = "graphs.db";
/// Config filename.
const CONFIG_FILE: &str = "config.toml";

/// Project-level configuration resolved from the working directory.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory of the audited project.
    pub project_root: PathBuf,
    /// Path to the `.audit/` directory.
    pub audit_dir: PathBuf,
    /// Path to the primary index database.
    pub index_db_path: PathBuf,
    /// Path to the secondary graph store.
    pub graph_db_path: PathBuf,
    /// Path to the config file.
    pub config_path: PathBuf,
    /// User settings loaded from config.toml.
    pub settings: UserSettings,
}

/// User-configurable settings from .audit/config.toml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    /// Output configuration.
    pub output: OutputSettings,
    /// Dead-code detection tuning.
    pub deadcode: DeadCodeSettings,
}

/// Output-related settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Output format: "minified" (default) or "pretty".
    pub format: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            format: "minified".into(),
        }
    }
}

/// Dead-code detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeadCodeSettings {
    /// Path substrings that are never reported as dead.
    pub exclude_patterns: Vec<String>,
    /// Filename substrings treated as conventional entry files.
    pub entry_file_patterns: Vec<String>,
    /// Filename substrings identifying test files (externally invoked).
    pub test_file_patterns: Vec<String>,
}

impl Default for DeadCodeSettings {
    fn default() -> Self {
        Self {
            exclude_patterns: vec![
                "__init__.py".into(),
                "test".into(),
                "__tests__".into(),
                ".test.".into(),
                ".spec.".into(),
                "migration".into(),
                "migrations".into(),
                "__pycache__".into(),
                "node_modules".into(),
                ".venv".into(),
                "dist".into(),
                "build".into(),
                ".next".into(),
                ".nuxt".into(),
                "vendor".into(),
            ],
            entry_file_patterns: vec![
                "cli.py".into(),
                "__main__.py".into(),
                "main.py".into(),
                "manage.py".into(),
                "index.ts".into(),
                "index.js".into(),
                "index.tsx".into(),
                "App.tsx".into(),
                "main.go".into(),
                "main.rs".into(),
            ],
            test_file_patterns: vec![
                "test_".into(),
                ".test.".into(),
                ".spec.".into(),
                "_test.py".into(),
                "_test.go".into(),
            ],
        }
    }
}

impl Config {
    /// Create config for a given project root.
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        let audit_dir = project_root.join(AUDIT_DIR);
        let index_db_path = audit_dir.join(INDEX_DB_FILE);
        let graph_db_path = audit_dir.join(GRAPH_DB_FILE);
        let config_path = audit_dir.join(CONFIG_FILE);

        let settings = Self::load_settings(&config_path).unwrap_or_default();

        Self {
            project_root,
            audit_dir,
            index_db_path,
            graph_db_path,
            config_path,
            settings,
        }
    }

    /// Create config from the current working directory.
    pub fn from_cwd() -> Result<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| QueryError::Config(format!("cannot get cwd: {e}")))?;
        Ok(Self::new(cwd))
    }

    /// Load settings from config.toml if it exists.
    fn load_settings(config_path: &Path) -> Option<UserSettings> {
        if !config_path.exists() {
            return None;
        }
        let content = std::fs::read_to_string(config_path).ok()?;
        toml::from_str(&content).ok()
    }

    /// Save current settings to config.toml.
    pub fn save_settings(&self) -> Result<()> {
        std::fs::create_dir_all(&self.audit_dir)?;
        let content = toml::to_string_pretty(&self.settings)
            .map_err(|e| QueryError::Config(format!("failed to serialize settings: {e}")))?;
        std::fs::write(&self.config_path, content)?;
        Ok(())
    }

    /// Check whether the primary index database exists.
    #[must_use]
    pub fn index_exists(&self) -> bool {
        self.index_db_path.exists()
    }

    /// Check whether the secondary graph store exists.
    #[must_use]
    pub fn graph_store_exists(&self) -> bool {
        self.graph_db_path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn config_new_sets_paths() {
        let cfg = Config::new("/tmp/project");
        assert_eq!(cfg.project_root, PathBuf::from("/tmp/project"));
        assert_eq!(cfg.audit_dir, PathBuf::from("/tmp/project/.audit"));
        assert_eq!(
            cfg.index_db_path,
            PathBuf::from("/tmp/project/.audit/repo_index.db")
        );
        assert_eq!(
            cfg.graph_db_path,
            PathBuf::from("/tmp/project/.audit/graphs.db")
        );
    }

    #[test]
    fn index_exists_returns_false_when_missing() {
        let tmp = TempDir::new().unwrap();
        let cfg = Config::new(tmp.path());
        assert!(!cfg.index_exists());
        assert!(!cfg.graph_store_exists());
    }

    #[test]
    fn save_and_load_settings() {
        let tmp = TempDir::new().unwrap();
        let mut cfg = Config::new(tmp.path());

        cfg.settings.output.format = "pretty".to_string();
        cfg.settings.deadcode.exclude_patterns.push("generated".into());

        cfg.save_settings().unwrap();
        assert!(cfg.config_path.exists());

        let cfg2 = Config::new(tmp.path());
        assert_eq!(cfg2.settings.output.format, "pretty");
        assert!(cfg2
            .settings
            .deadcode
            .exclude_patterns
            .contains(&"generated".to_string()));
    }

    #[test]
    fn default_settings() {
        let settings = UserSettings::default();

        assert_eq!(settings.output.format, "minified");
        assert!(settings
            .deadcode
            .exclude_patterns
            .contains(&"migrations".to_string()));
        assert!(settings
            .deadcode
            .entry_file_patterns
            .contains(&"__main__.py".to_string()));
        assert!(settings
            .deadcode
            .test_file_patterns
            .contains(&"test_".to_string()));
    }

    #[test]
    fn load_invalid_config_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let audit_dir = tmp.path().join(".audit");
        std::fs::create_dir_all(&audit_dir).unwrap();

        let config_path = audit_dir.join("config.toml");
        std::fs::write(&config_path, "invalid toml {{{{").unwrap();

        let cfg = Config::new(tmp.path());
        assert_eq!(cfg.settings.output.format, "minified");
    }
}

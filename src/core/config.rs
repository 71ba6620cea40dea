//! Configuration management for SDD Kit.
//!
//! Handles loading and saving configuration from TOML files.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Name of the per-project metadata directory.
pub const SDD_DIR: &str = ".sdd";

/// Engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where generated files live inside a project root
    pub paths: PathsConfig,

    /// Fallback values for optional operation inputs
    pub defaults: DefaultsConfig,
}

/// File layout settings, relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// State file name inside `.sdd/`
    pub state_file: String,

    /// Template override file name inside `.sdd/`
    pub templates_file: String,

    /// Directory receiving generated documents
    pub docs_dir: String,

    /// Implementation report file name inside the docs directory
    pub report_file: String,
}

/// Defaults applied when an operation input leaves a field empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Highlights used by `implement` when none are supplied
    pub highlights: Vec<String>,

    /// Guiding principles used by `constitution` when none are supplied
    pub guiding_principles: Vec<String>,

    /// Governance model written into a freshly initialized constitution
    pub governance_model: String,

    /// Delivery cadence written into a freshly initialized constitution
    pub delivery_cadence: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            state_file: "state.json".to_string(),
            templates_file: "templates.json".to_string(),
            docs_dir: "docs".to_string(),
            report_file: "implementation-report.md".to_string(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            highlights: vec!["Steady progress maintained".to_string()],
            guiding_principles: vec![
                "Transparency".to_string(),
                "Standardization".to_string(),
                "Self-service automation".to_string(),
            ],
            governance_model: "Bi-weekly cadence review plus a specification review board"
                .to_string(),
            delivery_cadence: "Incremental review every two weeks".to_string(),
        }
    }
}

impl Config {
    /// Load configuration for a project root.
    ///
    /// Looks for config in:
    /// 1. `<root>/.sdd/config.toml`
    /// 2. `~/.config/sdd/config.toml`
    /// 3. Falls back to defaults
    pub fn load(root: &Path) -> anyhow::Result<Self> {
        let local_config = root.join(SDD_DIR).join("config.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Some(config_dir) = Self::config_dir() {
            let global_config = config_dir.join("config.toml");
            if global_config.exists() {
                return Self::load_from_file(&global_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration into a project root.
    pub fn save(&self, root: &Path) -> anyhow::Result<PathBuf> {
        let sdd_dir = root.join(SDD_DIR);
        std::fs::create_dir_all(&sdd_dir)?;

        let config_path = sdd_dir.join("config.toml");
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;

        Ok(config_path)
    }

    /// Get the global config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("sdd"))
    }

    /// Absolute path of the state file for `root`.
    pub fn state_path(&self, root: &Path) -> PathBuf {
        root.join(SDD_DIR).join(&self.paths.state_file)
    }

    /// Absolute path of the template override file for `root`.
    pub fn templates_path(&self, root: &Path) -> PathBuf {
        root.join(SDD_DIR).join(&self.paths.templates_file)
    }

    /// Absolute path of the docs directory for `root`.
    pub fn docs_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.paths.docs_dir)
    }

    /// Absolute path of the implementation report for `root`.
    pub fn report_path(&self, root: &Path) -> PathBuf {
        self.docs_dir(root).join(&self.paths.report_file)
    }
}

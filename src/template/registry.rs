//! Template registry and override persistence.
//!
//! The effective templates are the built-in defaults overlaid key by key
//! with project overrides. Only the overrides are ever written to disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::core::{fs, EngineResult};

/// Sparse map of template name to body.
pub type TemplateOverrides = BTreeMap<String, String>;

/// Effective templates after overrides are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Templates(BTreeMap<String, String>);

impl Templates {
    /// Template body by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Template body by name, falling back to the built-in and then to an empty body.
    pub fn body(&self, name: &str) -> &str {
        self.get(name).or_else(|| defaults::builtin(name)).unwrap_or_default()
    }

    /// Template names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterate over `(name, body)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Merge the built-in defaults with `overrides`.
///
/// Names that are not built in are carried through as extra templates.
pub fn resolve_templates(overrides: &TemplateOverrides) -> Templates {
    let mut templates = defaults::default_templates();
    for (name, body) in overrides {
        templates.insert(name.clone(), body.clone());
    }
    Templates(templates)
}

/// Override set held by an engine together with its resolution.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    overrides: TemplateOverrides,
    resolved: Templates,
}

impl TemplateRegistry {
    /// Create a registry from an initial override set.
    pub fn new(overrides: TemplateOverrides) -> Self {
        let resolved = resolve_templates(&overrides);
        Self { overrides, resolved }
    }

    /// Accumulate `partial` into the override set and re-resolve.
    pub fn merge(&mut self, partial: TemplateOverrides) {
        self.overrides.extend(partial);
        self.resolved = resolve_templates(&self.overrides);
    }

    pub fn overrides(&self) -> &TemplateOverrides {
        &self.overrides
    }

    pub fn resolved(&self) -> &Templates {
        &self.resolved
    }
}

/// Reads and writes the override file of one project root.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    path: PathBuf,
}

impl TemplateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load persisted overrides.
    ///
    /// A missing file yields no overrides. An unreadable or malformed file is
    /// logged and ignored.
    pub async fn load(&self) -> TemplateOverrides {
        match fs::read_json::<TemplateOverrides>(&self.path).await {
            Ok(Some(overrides)) => {
                tracing::debug!(path = %self.path.display(), count = overrides.len(), "loaded template overrides");
                overrides
            }
            Ok(None) => TemplateOverrides::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable template overrides");
                TemplateOverrides::new()
            }
        }
    }

    /// Persist the override set, and nothing else.
    pub async fn save(&self, overrides: &TemplateOverrides) -> EngineResult<()> {
        fs::write_json(&self.path, overrides).await?;
        tracing::debug!(path = %self.path.display(), count = overrides.len(), "saved template overrides");
        Ok(())
    }
}

//! Extension modules.
//!
//! A module is a named capability the engine can dispatch to without
//! knowing what it does. Modules see a snapshot of the project state and
//! can persist a replacement through [`ModuleContext::save_state`]; they
//! never get the state store itself.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use crate::core::{EngineResult, StateStore};
use crate::workflow::ProjectState;

/// A capability registered with the engine under a string key.
#[async_trait]
pub trait EngineModule: Send + Sync {
    /// Run the module once.
    async fn execute(&self, input: Value, ctx: ModuleContext) -> anyhow::Result<Value>;

    /// Short description shown by `sdd modules`.
    fn description(&self) -> &str {
        ""
    }
}

/// What a module may see and do.
pub struct ModuleContext {
    state: ProjectState,
    store: StateStore,
}

impl ModuleContext {
    pub(crate) fn new(state: ProjectState, store: StateStore) -> Self {
        Self { state, store }
    }

    /// Project state as of the call.
    pub fn state(&self) -> &ProjectState {
        &self.state
    }

    /// Persist `state` as the project state.
    pub async fn save_state(&self, state: &ProjectState) -> EngineResult<()> {
        self.store.write(state).await
    }
}

impl fmt::Debug for ModuleContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleContext").field("project", &self.state.metadata.name).finish()
    }
}

/// Registry of modules, cheap to clone and shared between engines.
#[derive(Clone, Default)]
pub struct ModuleRegistry {
    modules: Arc<RwLock<HashMap<String, Arc<dyn EngineModule>>>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `module` under `key`, replacing any previous registration.
    pub fn register(&self, key: impl Into<String>, module: Arc<dyn EngineModule>) {
        let key = key.into();
        if self.modules.write().insert(key.clone(), module).is_some() {
            tracing::debug!(module = %key, "replaced module registration");
        }
    }

    /// Look up a module by key.
    pub fn get(&self, key: &str) -> Option<Arc<dyn EngineModule>> {
        self.modules.read().get(key).cloned()
    }

    /// Registered keys with their descriptions, sorted by key.
    pub fn list(&self) -> Vec<(String, String)> {
        let mut entries: Vec<_> = self
            .modules
            .read()
            .iter()
            .map(|(key, module)| (key.clone(), module.description().to_string()))
            .collect();
        entries.sort();
        entries
    }

    /// Registered keys, sorted.
    pub fn names(&self) -> Vec<String> {
        self.list().into_iter().map(|(key, _)| key).collect()
    }
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRegistry").field("modules", &self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Echo;

    #[async_trait]
    impl EngineModule for Echo {
        async fn execute(&self, input: Value, _ctx: ModuleContext) -> anyhow::Result<Value> {
            Ok(input)
        }

        fn description(&self) -> &str {
            "returns its input"
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = ModuleRegistry::new();
        assert!(registry.names().is_empty());

        registry.register("echo", Arc::new(Echo));
        assert!(registry.get("echo").is_some());
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.list(), vec![("echo".to_string(), "returns its input".to_string())]);
    }

    #[test]
    fn test_clones_share_registrations() {
        let registry = ModuleRegistry::new();
        let shared = registry.clone();
        shared.register("b", Arc::new(Echo));
        shared.register("a", Arc::new(Echo));

        assert_eq!(registry.names(), vec!["a", "b"]);
        assert_eq!(registry.names().len(), 2);
    }

    #[tokio::test]
    async fn test_execute_through_trait_object() {
        let temp = tempfile::TempDir::new().unwrap();
        let store = StateStore::new(temp.path().join("state.json"));
        let state = ProjectState::new(crate::workflow::ProjectMetadata::new("Acme", "", ""));

        let registry = ModuleRegistry::new();
        registry.register("echo", Arc::new(Echo));
        let module = registry.get("echo").unwrap();

        let out = module.execute(json!({"k": 1}), ModuleContext::new(state, store)).await.unwrap();
        assert_eq!(out, json!({"k": 1}));
    }
}

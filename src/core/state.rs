//! Project state persistence.
//!
//! One JSON document per project root, read and written whole. Mutations go
//! through [`StateStore::update`], which runs read, modify and write under a
//! lock shared by every store opened on the same file in this process.
//! Nothing guards against a second process writing the same root.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use once_cell::sync::Lazy;
use tokio::sync::Mutex;

use super::config::Config;
use super::error::EngineResult;
use super::fs;
use crate::workflow::ProjectState;

type FileLock = Arc<Mutex<()>>;

/// Live locks keyed by absolute state file path.
static LOCKS: Lazy<parking_lot::Mutex<HashMap<PathBuf, Weak<Mutex<()>>>>> =
    Lazy::new(|| parking_lot::Mutex::new(HashMap::new()));

fn lock_for(path: &Path) -> FileLock {
    let key = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut locks = LOCKS.lock();

    if let Some(lock) = locks.get(&key).and_then(Weak::upgrade) {
        return lock;
    }

    locks.retain(|_, lock| lock.strong_count() > 0);
    let lock = Arc::new(Mutex::new(()));
    locks.insert(key, Arc::downgrade(&lock));
    lock
}

/// Reads and writes the [`ProjectState`] of one project root.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
    lock: FileLock,
}

impl StateStore {
    /// Open a store on an explicit state file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lock = lock_for(&path);
        Self { path, lock }
    }

    /// Open the store for `root` using the configured file layout.
    pub fn for_root(root: &Path, config: &Config) -> Self {
        Self::new(config.state_path(root))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted state. A missing file reads as `None`.
    pub async fn read(&self) -> EngineResult<Option<ProjectState>> {
        fs::read_json(&self.path).await
    }

    /// Replace the persisted state.
    pub async fn write(&self, state: &ProjectState) -> EngineResult<()> {
        let _guard = self.lock.lock().await;
        self.persist(state).await
    }

    /// Read, apply `updater`, write back and return the new state.
    pub async fn update<F>(&self, updater: F) -> EngineResult<ProjectState>
    where
        F: FnOnce(Option<ProjectState>) -> ProjectState,
    {
        self.try_update(|current| Ok(updater(current))).await
    }

    /// Like [`update`](Self::update), but the updater may refuse the change.
    ///
    /// Nothing is written when the updater returns an error.
    pub async fn try_update<F>(&self, updater: F) -> EngineResult<ProjectState>
    where
        F: FnOnce(Option<ProjectState>) -> EngineResult<ProjectState>,
    {
        let (next, ()) = self.try_update_with(|current| Ok((updater(current)?, ()))).await?;
        Ok(next)
    }

    /// Like [`try_update`](Self::try_update), also handing back a value
    /// computed from the state seen under the lock.
    pub async fn try_update_with<F, R>(&self, updater: F) -> EngineResult<(ProjectState, R)>
    where
        F: FnOnce(Option<ProjectState>) -> EngineResult<(ProjectState, R)>,
    {
        let _guard = self.lock.lock().await;
        let current = self.read().await?;
        let (next, value) = updater(current)?;
        self.persist(&next).await?;
        Ok((next, value))
    }

    async fn persist(&self, state: &ProjectState) -> EngineResult<()> {
        fs::write_json(&self.path, state).await?;
        tracing::debug!(
            path = %self.path.display(),
            stage = %state.stage(),
            snapshots = state.progress_history.len(),
            "state written"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EngineError;
    use crate::workflow::{ProgressSnapshot, ProjectMetadata, StatusCounts};
    use tempfile::TempDir;

    fn state(name: &str) -> ProjectState {
        ProjectState::new(ProjectMetadata::new(name, "retail", "d"))
    }

    fn snapshot() -> ProgressSnapshot {
        ProgressSnapshot {
            timestamp: chrono::Utc::now(),
            counts: StatusCounts::default(),
            remaining_hours: 0,
            burndown_notes: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_missing_state_reads_none() {
        let temp = TempDir::new().unwrap();
        let store = StateStore::for_root(temp.path(), &Config::default());
        assert!(store.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_write_then_read_round_trips() {
        let temp = TempDir::new().unwrap();
        let store = StateStore::for_root(temp.path(), &Config::default());

        let written = state("Acme");
        store.write(&written).await.unwrap();

        assert!(temp.path().join(".sdd").join("state.json").exists());
        assert_eq!(store.read().await.unwrap(), Some(written));
    }

    #[tokio::test]
    async fn test_update_sees_previous_state() {
        let temp = TempDir::new().unwrap();
        let store = StateStore::for_root(temp.path(), &Config::default());

        let first = store.update(|prev| prev.unwrap_or_else(|| state("Acme"))).await.unwrap();
        assert_eq!(first.metadata.name, "Acme");

        let second = store
            .update(|prev| {
                let mut next = prev.unwrap();
                next.metadata.domain = "finance".to_string();
                next
            })
            .await
            .unwrap();
        assert_eq!(second.metadata.name, "Acme");
        assert_eq!(second.metadata.domain, "finance");
    }

    #[tokio::test]
    async fn test_try_update_error_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let store = StateStore::for_root(temp.path(), &Config::default());

        let result = store
            .try_update(|_| Err(EngineError::ModuleNotRegistered("x".to_string())))
            .await;
        assert!(result.is_err());
        assert!(store.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_try_update_with_returns_value_from_locked_state() {
        let temp = TempDir::new().unwrap();
        let store = StateStore::for_root(temp.path(), &Config::default());
        store.write(&state("Acme")).await.unwrap();

        let (next, previous_name) = store
            .try_update_with(|prev| {
                let mut next = prev.unwrap();
                let name = std::mem::replace(&mut next.metadata.name, "Globex".to_string());
                Ok((next, name))
            })
            .await
            .unwrap();

        assert_eq!(previous_name, "Acme");
        assert_eq!(next.metadata.name, "Globex");
        assert_eq!(store.read().await.unwrap().unwrap().metadata.name, "Globex");
    }

    #[tokio::test]
    async fn test_corrupt_state_is_serialization_error() {
        let temp = TempDir::new().unwrap();
        let store = StateStore::for_root(temp.path(), &Config::default());
        std::fs::create_dir_all(temp.path().join(".sdd")).unwrap();
        std::fs::write(store.path(), "{\"metadata\": 42").unwrap();

        let err = store.read().await.unwrap_err();
        assert!(matches!(err, EngineError::Serialization { .. }));
    }

    #[tokio::test]
    async fn test_concurrent_updates_are_not_lost() {
        let temp = TempDir::new().unwrap();
        let config = Config::default();
        StateStore::for_root(temp.path(), &config).write(&state("Acme")).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            // separate stores on the same root share one lock
            let store = StateStore::for_root(temp.path(), &config);
            handles.push(tokio::spawn(async move {
                store
                    .update(|prev| {
                        let mut next = prev.unwrap();
                        next.progress_history.push(snapshot());
                        next
                    })
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let final_state = StateStore::for_root(temp.path(), &config).read().await.unwrap().unwrap();
        assert_eq!(final_state.progress_history.len(), 16);
    }

    #[test]
    fn test_stores_on_same_root_share_lock() {
        let temp = TempDir::new().unwrap();
        let a = StateStore::for_root(temp.path(), &Config::default());
        let b = StateStore::for_root(temp.path(), &Config::default());
        let other = StateStore::new(temp.path().join("elsewhere.json"));

        assert!(Arc::ptr_eq(&a.lock, &b.lock));
        assert!(!Arc::ptr_eq(&a.lock, &other.lock));
    }
}

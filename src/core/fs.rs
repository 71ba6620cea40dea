//! Async filesystem helpers.
//!
//! Every helper maps I/O failures onto [`EngineError::Persistence`] with the
//! offending path attached.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;

use super::error::{EngineError, EngineResult};

/// Create a directory and all of its parents.
pub async fn ensure_dir(path: &Path) -> EngineResult<()> {
    fs::create_dir_all(path).await.map_err(|e| EngineError::persistence(path, e))
}

/// Write `content` to `path`, creating the parent directory first.
pub async fn write_file(path: &Path, content: &str) -> EngineResult<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent).await?;
    }
    fs::write(path, content).await.map_err(|e| EngineError::persistence(path, e))
}

/// Write `content` through a sibling temp file and rename it into place.
///
/// Readers see either the previous file or the new one, never a partial write.
pub async fn write_file_atomic(path: &Path, content: &str) -> EngineResult<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    ensure_dir(parent).await?;

    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("data");
    let tmp = parent.join(format!(".{file_name}.{}.tmp", uuid::Uuid::new_v4().simple()));

    fs::write(&tmp, content).await.map_err(|e| EngineError::persistence(&tmp, e))?;
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(EngineError::persistence(path, e));
    }
    Ok(())
}

/// Read and decode a JSON file. A missing file yields `None`.
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> EngineResult<Option<T>> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(EngineError::persistence(path, e)),
    };

    serde_json::from_str(&content).map(Some).map_err(|e| EngineError::serialization(path, e))
}

/// Encode `value` as pretty JSON and write it atomically.
pub async fn write_json<T: Serialize>(path: &Path, value: &T) -> EngineResult<()> {
    let content =
        serde_json::to_string_pretty(value).map_err(|e| EngineError::serialization(path, e))?;
    write_file_atomic(path, &content).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_read_json_missing_file_is_none() {
        let temp = TempDir::new().unwrap();
        let value: Option<BTreeMap<String, String>> =
            read_json(&temp.path().join("absent.json")).await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_write_json_creates_parents() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("dir").join("data.json");

        let mut map = BTreeMap::new();
        map.insert("key".to_string(), "value".to_string());
        write_json(&path, &map).await.unwrap();

        let loaded: Option<BTreeMap<String, String>> = read_json(&path).await.unwrap();
        assert_eq!(loaded, Some(map));
    }

    #[tokio::test]
    async fn test_atomic_write_leaves_no_temp_files() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state.json");

        write_file_atomic(&path, "{}").await.unwrap();
        write_file_atomic(&path, "{\"a\":1}").await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(temp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"a\":1}");
    }

    #[tokio::test]
    async fn test_read_json_corrupt_file_is_serialization_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();

        let result: EngineResult<Option<BTreeMap<String, String>>> = read_json(&path).await;
        assert!(matches!(result, Err(EngineError::Serialization { .. })));
    }
}

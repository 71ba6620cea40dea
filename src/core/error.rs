//! Engine error types.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Upstream artifact a pipeline stage depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    /// The structured specification produced by `specify`.
    Specification,
    /// The technical plan produced by `plan`.
    Plan,
    /// Either the plan or the specification needed by `tasks`.
    PlanOrSpecification,
    /// The task plan produced by `tasks`.
    TaskPlan,
}

impl Artifact {
    /// Human-readable message naming the missing artifact and the stage that needs it.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Specification => "no specification, cannot build plan",
            Self::Plan => "no technical plan, cannot derive tasks",
            Self::PlanOrSpecification => "missing plan or specification, cannot derive tasks",
            Self::TaskPlan => "no task plan, run tasks first",
        }
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Errors that can occur while driving the workflow engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The operation needs a persisted project state and there is none.
    #[error("Project not initialized: no project state found at {0}")]
    MissingState(PathBuf),

    /// A required upstream artifact is absent on state and was not supplied.
    #[error("Missing artifact: {0}")]
    MissingArtifact(Artifact),

    /// `run_module` was called with a key nobody registered.
    #[error("Module '{0}' is not registered")]
    ModuleNotRegistered(String),

    /// Reading or writing a file failed.
    #[error("Failed to persist {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A persisted file exists but could not be encoded or decoded.
    #[error("Corrupt data in {}: {source}", path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A registered module failed while executing.
    #[error("Module '{name}' failed: {source}")]
    Module {
        name: String,
        #[source]
        source: anyhow::Error,
    },
}

impl EngineError {
    /// Wrap an I/O failure on `path`.
    pub fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persistence { path: path.into(), source }
    }

    /// Wrap a JSON failure on `path`.
    pub fn serialization(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Serialization { path: path.into(), source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_artifact_messages_are_stable() {
        let err = EngineError::MissingArtifact(Artifact::Specification);
        assert_eq!(err.to_string(), "Missing artifact: no specification, cannot build plan");

        let err = EngineError::MissingArtifact(Artifact::TaskPlan);
        assert!(err.to_string().contains("run tasks first"));
    }

    #[test]
    fn test_module_not_registered_names_key() {
        let err = EngineError::ModuleNotRegistered("audit".to_string());
        assert_eq!(err.to_string(), "Module 'audit' is not registered");
    }

    #[test]
    fn test_persistence_error_names_path() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = EngineError::persistence("/tmp/state.json", io);
        assert!(matches!(err, EngineError::Persistence { .. }));
        assert!(err.to_string().contains("/tmp/state.json"));
    }
}

//! Inputs and outputs of engine operations.
//!
//! Every input deserializes from camelCase JSON with missing fields
//! defaulted, so the CLI can read them straight from files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::workflow::{
    ImplementationReport, ProgressSnapshot, Specification, TaskUpdate, TechnicalPlan,
};

/// Input to [`Engine::initialize_project`](super::Engine::initialize_project).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InitOptions {
    pub project_name: String,
    pub domain: String,
    pub description: String,
}

impl InitOptions {
    pub fn new(
        project_name: impl Into<String>,
        domain: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            project_name: project_name.into(),
            domain: domain.into(),
            description: description.into(),
        }
    }
}

/// Input to [`Engine::update_constitution`](super::Engine::update_constitution).
///
/// Empty fields fall back to the configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConstitutionOptions {
    pub guiding_principles: Vec<String>,
    pub governance_model: Option<String>,
    pub delivery_cadence: Option<String>,
}

/// Input to [`Engine::plan`](super::Engine::plan).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanOptions {
    /// Plan from this specification instead of the one on state
    pub specification: Option<Specification>,
}

/// Input to [`Engine::tasks`](super::Engine::tasks).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TasksOptions {
    /// Derive from this plan instead of the one on state
    pub plan: Option<TechnicalPlan>,
}

/// Input to [`Engine::implement`](super::Engine::implement).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImplementationInput {
    pub updates: Vec<TaskUpdate>,
    pub narrative_highlights: Vec<String>,
    pub blockers: Vec<String>,
}

/// Result of one `implement` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImplementationOutcome {
    pub report: ImplementationReport,
    pub file_path: PathBuf,
    pub progress: ProgressSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::TaskStatus;

    #[test]
    fn test_implementation_input_from_partial_json() {
        let input: ImplementationInput = serde_json::from_str(
            r#"{"updates": [{"taskId": "REQ-1", "status": "in_progress", "owner": "dana"}]}"#,
        )
        .unwrap();

        assert_eq!(input.updates.len(), 1);
        assert_eq!(input.updates[0].status, Some(TaskStatus::InProgress));
        assert_eq!(input.updates[0].owner.as_deref(), Some("dana"));
        assert!(input.narrative_highlights.is_empty());
        assert!(input.blockers.is_empty());
    }

    #[test]
    fn test_empty_options_deserialize() {
        let plan: PlanOptions = serde_json::from_str("{}").unwrap();
        assert!(plan.specification.is_none());
        let tasks: TasksOptions = serde_json::from_str("{}").unwrap();
        assert!(tasks.plan.is_none());
    }
}

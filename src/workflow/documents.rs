//! Workflow document structures.
//!
//! Defines the artifacts the engine produces and persists: the project
//! state, specification, technical plan, task plan and progress snapshots.
//! Everything serializes in camelCase to keep the on-disk JSON shape stable.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Project state
// ============================================================================

/// Identity of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadata {
    /// Project name
    pub name: String,

    /// Business domain
    pub domain: String,

    /// Free-text vision statement
    pub description: String,

    /// When the project state was first created
    pub created_at: DateTime<Utc>,
}

impl ProjectMetadata {
    /// Create metadata stamped with the current time.
    pub fn new(
        name: impl Into<String>,
        domain: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
            description: description.into(),
            created_at: Utc::now(),
        }
    }
}

/// Pipeline stage, derived from which artifacts are present on a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Uninitialized,
    Initialized,
    Specified,
    Planned,
    TaskReady,
    Implementing,
}

impl Stage {
    /// Stage of an optional state.
    pub fn of(state: Option<&ProjectState>) -> Self {
        state.map_or(Self::Uninitialized, ProjectState::stage)
    }

    /// Display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Initialized => "initialized",
            Self::Specified => "specified",
            Self::Planned => "planned",
            Self::TaskReady => "task_ready",
            Self::Implementing => "implementing",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single unit of persistence for a project root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectState {
    /// Project identity
    pub metadata: ProjectMetadata,

    /// Structured requirements document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specification: Option<Specification>,

    /// Technical plan derived from the specification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<TechnicalPlan>,

    /// Trackable work items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_plan: Option<TaskPlan>,

    /// Append-only progress snapshots, oldest first
    #[serde(default)]
    pub progress_history: Vec<ProgressSnapshot>,
}

impl ProjectState {
    /// Create a state holding only metadata.
    pub fn new(metadata: ProjectMetadata) -> Self {
        Self {
            metadata,
            specification: None,
            plan: None,
            task_plan: None,
            progress_history: Vec::new(),
        }
    }

    /// Current pipeline stage.
    pub fn stage(&self) -> Stage {
        match (&self.specification, &self.plan, &self.task_plan) {
            (_, _, Some(_)) if !self.progress_history.is_empty() => Stage::Implementing,
            (_, _, Some(_)) => Stage::TaskReady,
            (_, Some(_), None) => Stage::Planned,
            (Some(_), None, None) => Stage::Specified,
            (None, None, None) => Stage::Initialized,
        }
    }

    /// Most recent progress snapshot.
    pub fn latest_progress(&self) -> Option<&ProgressSnapshot> {
        self.progress_history.last()
    }
}

// ============================================================================
// Specification
// ============================================================================

/// Quality and process standards the compliance rules know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StandardId {
    #[serde(rename = "iso-25010")]
    Iso25010,
    #[serde(rename = "owasp-asvs")]
    OwaspAsvs,
    #[serde(rename = "agile-manifesto")]
    AgileManifesto,
    #[serde(rename = "cmmi-dev")]
    CmmiDev,
}

impl StandardId {
    /// Every known standard, in evaluation order.
    pub const ALL: [Self; 4] = [Self::Iso25010, Self::OwaspAsvs, Self::AgileManifesto, Self::CmmiDev];

    /// Wire identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Iso25010 => "iso-25010",
            Self::OwaspAsvs => "owasp-asvs",
            Self::AgileManifesto => "agile-manifesto",
            Self::CmmiDev => "cmmi-dev",
        }
    }
}

impl fmt::Display for StandardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requirement priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

/// Requirement category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequirementCategory {
    Functional,
    NonFunctional,
}

/// Coarse low/medium/high rating used for risks and targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

/// Someone with a stake in the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stakeholder {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub expectations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engagement_model: Option<String>,
}

/// A single requirement. `id` is stable and correlates tasks later on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: RequirementCategory,
    /// Business drivers this requirement serves
    #[serde(default)]
    pub drivers: Vec<String>,
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,
    pub priority: Priority,
}

/// Non-functional target as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NonFunctionalInput {
    pub attribute: String,
    pub metric: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

/// Non-functional target with an assessed risk level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NonFunctionalTarget {
    pub attribute: String,
    pub metric: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    pub risk_level: Level,
}

/// Result of evaluating one standard against the specification input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceFinding {
    pub standard_id: StandardId,
    /// 0-100
    pub score: u8,
    pub summary: String,
    #[serde(default)]
    pub gaps: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// A delivery risk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskItem {
    pub id: String,
    pub title: String,
    pub probability: Level,
    pub impact: Level,
    pub mitigation_plan: String,
}

/// Raw project intent handed to `specify`.
///
/// Every list is optional; empty lists are replaced by deterministic fallbacks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpecificationInput {
    pub project_name: String,
    pub domain: String,
    pub summary: String,
    pub business_drivers: Vec<String>,
    pub stakeholders: Vec<Stakeholder>,
    pub primary_modules: Vec<String>,
    pub non_functional_requirements: Vec<NonFunctionalInput>,
    pub constraints: Vec<String>,
    pub compliance_targets: Vec<StandardId>,
    pub success_criteria: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_timeline_weeks: Option<u32>,
}

impl SpecificationInput {
    /// Minimal input with just the identifying fields set.
    pub fn new(
        project_name: impl Into<String>,
        domain: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            project_name: project_name.into(),
            domain: domain.into(),
            summary: summary.into(),
            ..Self::default()
        }
    }

    /// Set the primary modules.
    pub fn with_modules<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_modules = modules.into_iter().map(Into::into).collect();
        self
    }
}

/// The structured requirements document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specification {
    pub project_name: String,
    pub domain: String,
    pub summary: String,
    pub business_drivers: Vec<String>,
    pub stakeholders: Vec<Stakeholder>,
    pub requirements: Vec<Requirement>,
    pub non_functional_targets: Vec<NonFunctionalTarget>,
    pub constraints: Vec<String>,
    pub compliance_targets: Vec<StandardId>,
    pub success_criteria: Vec<String>,
    pub delivery_timeline_weeks: u32,
    #[serde(default)]
    pub compliance: Vec<ComplianceFinding>,
    #[serde(default)]
    pub risks: Vec<RiskItem>,
}

impl Specification {
    /// Look up a requirement by id.
    pub fn requirement(&self, id: &str) -> Option<&Requirement> {
        self.requirements.iter().find(|r| r.id == id)
    }
}

// ============================================================================
// Technical plan
// ============================================================================

/// Architecture principle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchitecturePrinciple {
    pub name: String,
    pub statement: String,
    pub rationale: String,
    pub practices: Vec<String>,
}

/// Technology recommendation for one layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnologyChoice {
    pub layer: String,
    pub recommendation: String,
    pub justification: String,
    pub alternatives: Vec<String>,
}

/// Delivery phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryPhase {
    pub id: String,
    pub name: String,
    pub duration_weeks: u32,
    pub objectives: Vec<String>,
    pub entry_criteria: Vec<String>,
    pub exit_criteria: Vec<String>,
}

/// Architecture and approach derived from a specification.
///
/// The engine passes this through without inspecting it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TechnicalPlan {
    pub architecture_principles: Vec<ArchitecturePrinciple>,
    pub technology_stack: Vec<TechnologyChoice>,
    pub delivery_phases: Vec<DeliveryPhase>,
    pub automation_backlog: Vec<String>,
    pub quality_gates: Vec<String>,
    pub compliance_follow_ups: Vec<ComplianceFinding>,
}

impl TechnicalPlan {
    /// Total planned duration across all phases.
    pub fn total_weeks(&self) -> u32 {
        self.delivery_phases.iter().map(|p| p.duration_weeks).sum()
    }
}

// ============================================================================
// Tasks
// ============================================================================

/// Task status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Blocked,
    Done,
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl TaskStatus {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Blocked => "blocked",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "blocked" => Ok(Self::Blocked),
            "done" => Ok(Self::Done),
            other => Err(format!("unknown task status '{other}'")),
        }
    }
}

/// Kind of work a task represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    Analysis,
    Planning,
    Build,
    Qa,
    Governance,
}

impl TaskCategory {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Analysis => "analysis",
            Self::Planning => "planning",
            Self::Build => "build",
            Self::Qa => "qa",
            Self::Governance => "governance",
        }
    }
}

/// A trackable work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Same as the requirement id the task was derived from
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    pub category: TaskCategory,
    pub estimate_hours: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Task ids grouped for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskBoard {
    /// Task ids keyed by category
    pub swimlanes: BTreeMap<TaskCategory, Vec<String>>,
    /// Names of the requirements being worked on
    pub focus_areas: Vec<String>,
}

/// Which specification/plan pair produced a task plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskPlanSource {
    pub project_name: String,
    pub requirement_ids: Vec<String>,
    pub phase_ids: Vec<String>,
}

/// Ordered set of tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPlan {
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub board: TaskBoard,
    #[serde(default)]
    pub critical_path: Vec<String>,
    #[serde(default)]
    pub source: TaskPlanSource,
}

impl TaskPlan {
    /// Look up a task by id.
    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Number of tasks in each status.
    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for task in &self.tasks {
            counts.record(task.status);
        }
        counts
    }
}

/// Partial update for one task. `None` fields leave the task untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    pub task_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl TaskUpdate {
    /// Update that only changes the status.
    pub fn status(task_id: impl Into<String>, status: TaskStatus) -> Self {
        Self { task_id: task_id.into(), status: Some(status), owner: None, note: None }
    }
}

// ============================================================================
// Progress
// ============================================================================

/// Number of tasks in each status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub pending: u32,
    pub in_progress: u32,
    pub blocked: u32,
    pub done: u32,
}

impl StatusCounts {
    /// Count one more task in `status`.
    pub fn record(&mut self, status: TaskStatus) {
        match status {
            TaskStatus::Pending => self.pending += 1,
            TaskStatus::InProgress => self.in_progress += 1,
            TaskStatus::Blocked => self.blocked += 1,
            TaskStatus::Done => self.done += 1,
        }
    }

    /// Total number of tasks counted.
    pub fn total(&self) -> u32 {
        self.pending + self.in_progress + self.blocked + self.done
    }

    /// Share of done tasks, rounded to a whole percent.
    pub fn completed_percent(&self) -> u32 {
        let total = self.total();
        if total == 0 {
            0
        } else {
            (f64::from(self.done) / f64::from(total) * 100.0).round() as u32
        }
    }
}

/// Point-in-time aggregate of task statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub counts: StatusCounts,
    /// Estimate hours of every task not yet done
    pub remaining_hours: u32,
    #[serde(default)]
    pub burndown_notes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> ProjectMetadata {
        ProjectMetadata::new("Acme", "retail", "d")
    }

    fn task(id: &str, status: TaskStatus) -> Task {
        Task {
            id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            status,
            category: TaskCategory::Build,
            estimate_hours: 8,
            owner: None,
            note: None,
            tags: Vec::new(),
        }
    }

    #[test]
    fn test_stage_progression() {
        let mut state = ProjectState::new(metadata());
        assert_eq!(state.stage(), Stage::Initialized);

        state.plan = Some(TechnicalPlan::default());
        assert_eq!(state.stage(), Stage::Planned);

        state.task_plan = Some(TaskPlan::default());
        assert_eq!(state.stage(), Stage::TaskReady);

        state.progress_history.push(ProgressSnapshot {
            timestamp: Utc::now(),
            counts: StatusCounts::default(),
            remaining_hours: 0,
            burndown_notes: Vec::new(),
        });
        assert_eq!(state.stage(), Stage::Implementing);
        assert_eq!(Stage::of(None), Stage::Uninitialized);
    }

    #[test]
    fn test_state_serializes_camel_case_and_omits_absent_artifacts() {
        let state = ProjectState::new(metadata());
        let json = serde_json::to_value(&state).unwrap();

        assert!(json["metadata"]["createdAt"].is_string());
        assert!(json.get("specification").is_none());
        assert!(json.get("taskPlan").is_none());
        assert_eq!(json["progressHistory"], serde_json::json!([]));
    }

    #[test]
    fn test_task_status_wire_names() {
        assert_eq!(serde_json::to_string(&TaskStatus::InProgress).unwrap(), "\"in_progress\"");
        assert_eq!("in-progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("DONE".parse::<TaskStatus>().unwrap(), TaskStatus::Done);
        assert!("finished".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_standard_ids_use_kebab_names() {
        let parsed: Vec<StandardId> =
            serde_json::from_str(r#"["iso-25010", "cmmi-dev"]"#).unwrap();
        assert_eq!(parsed, vec![StandardId::Iso25010, StandardId::CmmiDev]);
    }

    #[test]
    fn test_status_counts() {
        let plan = TaskPlan {
            tasks: vec![
                task("REQ-1", TaskStatus::Done),
                task("REQ-2", TaskStatus::Blocked),
                task("REQ-3", TaskStatus::Pending),
                task("REQ-4", TaskStatus::Done),
            ],
            ..TaskPlan::default()
        };

        let counts = plan.counts();
        assert_eq!(counts.done, 2);
        assert_eq!(counts.blocked, 1);
        assert_eq!(counts.total(), 4);
        assert_eq!(counts.completed_percent(), 50);
        assert_eq!(StatusCounts::default().completed_percent(), 0);
    }

    #[test]
    fn test_snapshot_flattens_counts() {
        let snapshot = ProgressSnapshot {
            timestamp: Utc::now(),
            counts: StatusCounts { pending: 1, in_progress: 2, blocked: 0, done: 3 },
            remaining_hours: 12,
            burndown_notes: vec!["note".to_string()],
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["inProgress"], 2);
        assert_eq!(json["done"], 3);

        let back: ProgressSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn test_specification_input_defaults() {
        let input: SpecificationInput =
            serde_json::from_str(r#"{"projectName": "Acme", "primaryModules": ["Billing"]}"#)
                .unwrap();
        assert_eq!(input.project_name, "Acme");
        assert_eq!(input.primary_modules, vec!["Billing"]);
        assert!(input.business_drivers.is_empty());
        assert!(input.delivery_timeline_weeks.is_none());
    }
}

//! Workflow artifacts and the pure services that derive them.
//!
//! Each stage of the pipeline turns the previous artifact into the next:
//!
//! - `generate_specification` - project intent to [`Specification`]
//! - `build_technical_plan` - specification to [`TechnicalPlan`]
//! - `derive_task_plan` - specification and plan to [`TaskPlan`]
//! - `summarize_progress` - task plan to [`ProgressSnapshot`]
//! - `compose_implementation_report` - progress to a markdown report on disk
//!
//! Everything except the report writer is deterministic and side-effect free.

mod compliance;
mod documents;
mod planning;
mod report;
mod specification;
mod tasks;

pub use compliance::{evaluate_compliance, ComplianceContext};
pub use documents::{
    ArchitecturePrinciple, ComplianceFinding, DeliveryPhase, Level, NonFunctionalInput,
    NonFunctionalTarget, Priority, ProgressSnapshot, ProjectMetadata, ProjectState, Requirement,
    RequirementCategory, RiskItem, Specification, SpecificationInput, Stage, Stakeholder,
    StandardId, StatusCounts, Task, TaskBoard, TaskCategory, TaskPlan, TaskPlanSource, TaskStatus,
    TaskUpdate, TechnicalPlan, TechnologyChoice,
};
pub use planning::build_technical_plan;
pub use report::{
    build_report, compose_implementation_report, render_report, ComposedReport,
    ImplementationReport, ReportContext,
};
pub use specification::{generate_specification, requirement_id, DEFAULT_TIMELINE_WEEKS};
pub use tasks::{apply_task_updates, derive_task_plan, summarize_progress, summarize_progress_at};

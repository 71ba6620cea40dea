//! # SDD Kit
//!
//! Stage-gated project workflow engine: turn free-form project intent into a
//! chain of persisted artifacts and track delivery against them.
//!
//! ## Pipeline
//!
//! - **Specify**: project intent becomes a structured specification with
//!   requirements, quality targets, risks and compliance findings
//! - **Plan**: the specification becomes a technical plan with delivery phases
//! - **Tasks**: one trackable task per requirement
//! - **Implement**: task updates, a progress snapshot and a markdown report
//!
//! Everything for a project lives under its root: `.sdd/state.json`,
//! `.sdd/templates.json` and the generated documents in `docs/`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sddkit::{Engine, InitOptions, PlanOptions, SpecificationInput, TasksOptions};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let engine = Engine::open("./acme").await?;
//! engine.initialize_project(InitOptions::new("Acme", "retail", "Modern checkout")).await?;
//! engine
//!     .specify(SpecificationInput::new("Acme", "retail", "modernize checkout").with_modules(["Billing", "Search"]))
//!     .await?;
//! engine.plan(PlanOptions::default()).await?;
//! let tasks = engine.tasks(TasksOptions::default()).await?;
//! assert_eq!(tasks.tasks.len(), 2);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Allow common patterns that are intentional in this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::significant_drop_tightening)]
#![allow(clippy::map_unwrap_or)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::redundant_clone)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::needless_pass_by_value)]

pub mod core;
pub mod engine;
pub mod template;
pub mod workflow;

// Re-export commonly used types
pub use crate::core::{Artifact, Config, EngineError, EngineResult, StateStore, SDD_DIR};
pub use engine::{
    ConstitutionOptions, Engine, EngineBuilder, EngineModule, ImplementationInput,
    ImplementationOutcome, InitOptions, ModuleContext, ModuleRegistry, PlanOptions, TasksOptions,
};
pub use template::{TemplateOverrides, Templates};
pub use workflow::{
    ProgressSnapshot, ProjectMetadata, ProjectState, Specification, SpecificationInput, Stage,
    TaskPlan, TaskStatus, TaskUpdate, TechnicalPlan,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "sdd";

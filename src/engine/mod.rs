//! The stage-gated workflow engine.
//!
//! An [`Engine`] is bound to one project root for its whole life. It
//! sequences the workflow services against the persisted project state:
//!
//! ```text
//! initialize_project -> specify -> plan -> tasks -> implement (repeatable)
//! ```
//!
//! `update_constitution` and `update_templates` can be called at any point.
//! Each operation reads the current state, runs a pure service and writes
//! the result back through the [`StateStore`].

mod module;
mod options;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{json, Value};

pub use module::{EngineModule, ModuleContext, ModuleRegistry};
pub use options::{
    ConstitutionOptions, ImplementationInput, ImplementationOutcome, InitOptions, PlanOptions,
    TasksOptions,
};

use crate::core::{fs, Artifact, Config, EngineError, EngineResult, StateStore};
use crate::template::{
    self, TemplateOverrides, TemplateRegistry, TemplateStore, Templates, CONSTITUTION, PRINCIPLES,
    REPORT,
};
use crate::workflow::{
    apply_task_updates, build_technical_plan, compose_implementation_report,
    derive_task_plan, generate_specification, summarize_progress, ComplianceFinding,
    ProjectMetadata, ProjectState, ReportContext, Specification, SpecificationInput, TaskPlan,
    TechnicalPlan,
};

/// Name given to the state created when a module runs before `init`.
pub const FALLBACK_PROJECT_NAME: &str = "Untitled project";

/// Builder for [`Engine`].
#[derive(Debug)]
pub struct EngineBuilder {
    root: PathBuf,
    config: Option<Config>,
    templates: TemplateOverrides,
    modules: Option<ModuleRegistry>,
}

impl EngineBuilder {
    /// Use this configuration instead of loading one for the root.
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Template overrides layered over the ones persisted in the root.
    ///
    /// These are held in memory only until the next `update_templates`.
    pub fn templates(mut self, overrides: TemplateOverrides) -> Self {
        self.templates = overrides;
        self
    }

    /// Share an existing module registry.
    pub fn modules(mut self, modules: ModuleRegistry) -> Self {
        self.modules = Some(modules);
        self
    }

    /// Load configuration and persisted template overrides, then build.
    pub async fn build(self) -> anyhow::Result<Engine> {
        let config = match self.config {
            Some(config) => config,
            None => Config::load(&self.root)?,
        };

        let store = StateStore::for_root(&self.root, &config);
        let template_store = TemplateStore::new(config.templates_path(&self.root));

        let mut overrides = template_store.load().await;
        overrides.extend(self.templates);

        tracing::debug!(
            root = %self.root.display(),
            overrides = overrides.len(),
            "engine ready"
        );

        Ok(Engine {
            root: self.root,
            config,
            store,
            template_store,
            templates: RwLock::new(TemplateRegistry::new(overrides)),
            modules: self.modules.unwrap_or_default(),
        })
    }
}

/// Workflow engine bound to one project root.
#[derive(Debug)]
pub struct Engine {
    root: PathBuf,
    config: Config,
    store: StateStore,
    template_store: TemplateStore,
    templates: RwLock<TemplateRegistry>,
    modules: ModuleRegistry,
}

impl Engine {
    /// Start building an engine for `root`.
    pub fn builder(root: impl Into<PathBuf>) -> EngineBuilder {
        EngineBuilder {
            root: root.into(),
            config: None,
            templates: TemplateOverrides::new(),
            modules: None,
        }
    }

    /// Build an engine for `root` with everything loaded from disk.
    pub async fn open(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        Self::builder(root).build().await
    }

    /// Build a new engine for another root that shares this engine's modules.
    pub async fn relocate(&self, root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        Self::builder(root).modules(self.modules.clone()).build().await
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The module registry, for sharing with other engines.
    pub fn modules(&self) -> &ModuleRegistry {
        &self.modules
    }

    // ------------------------------------------------------------------
    // Pipeline
    // ------------------------------------------------------------------

    /// Write the constitution and principles documents and a fresh state.
    ///
    /// Any existing state for the root is replaced.
    pub async fn initialize_project(&self, options: InitOptions) -> EngineResult<ProjectState> {
        let docs_dir = self.config.docs_dir(&self.root);
        fs::ensure_dir(&docs_dir).await?;

        let defaults = &self.config.defaults;
        let constitution = self.render(
            CONSTITUTION,
            &json!({
                "projectName": options.project_name,
                "domain": options.domain,
                "description": options.description,
                "principles": defaults.guiding_principles,
                "governanceModel": defaults.governance_model,
                "deliveryCadence": defaults.delivery_cadence,
                "qualityBar": ["Quality gates are measurable", "Security checks shift left"],
                "compliance": [
                    {"standard": "iso-25010", "summary": "Baseline established"},
                    {"standard": "owasp-asvs", "summary": "Threat modeling scheduled"}
                ],
                "generatedAt": chrono::Utc::now().to_rfc3339(),
            }),
        );
        let principles = self.render(
            PRINCIPLES,
            &json!({
                "principles": [
                    {
                        "title": "Standards as product",
                        "statement": "Every standard ships as an executable asset",
                        "impact": "Less drift between intent and delivery",
                        "practices": "Templates, validation and reports"
                    },
                    {
                        "title": "Visible progress",
                        "statement": "The status of every task is visible",
                        "impact": "Supports governance decisions",
                        "practices": "Task board and implementation reports"
                    }
                ]
            }),
        );

        fs::write_file(&docs_dir.join("constitution.md"), &constitution).await?;
        fs::write_file(&docs_dir.join("principles.md"), &principles).await?;

        let state = ProjectState::new(ProjectMetadata::new(
            options.project_name,
            options.domain,
            options.description,
        ));
        self.store.write(&state).await?;

        tracing::info!(project = %state.metadata.name, root = %self.root.display(), "project initialized");
        Ok(state)
    }

    /// Re-render `constitution.md` from the current state and return its path.
    pub async fn update_constitution(&self, options: ConstitutionOptions) -> EngineResult<PathBuf> {
        let state = self.require_state().await?;
        let defaults = &self.config.defaults;

        let principles = if options.guiding_principles.is_empty() {
            defaults.guiding_principles.clone()
        } else {
            options.guiding_principles
        };
        let compliance = state
            .specification
            .as_ref()
            .map(|spec| compliance_entries(&spec.compliance))
            .unwrap_or_default();

        let governance_model =
            options.governance_model.unwrap_or_else(|| defaults.governance_model.clone());
        let delivery_cadence =
            options.delivery_cadence.unwrap_or_else(|| defaults.delivery_cadence.clone());

        let content = self.render(
            CONSTITUTION,
            &json!({
                "projectName": state.metadata.name,
                "domain": state.metadata.domain,
                "description": state.metadata.description,
                "principles": principles,
                "governanceModel": governance_model,
                "deliveryCadence": delivery_cadence,
                "qualityBar": ["Metrics are transparent", "Zero tolerance for known defects"],
                "compliance": compliance,
                "generatedAt": chrono::Utc::now().to_rfc3339(),
            }),
        );

        let path = self.config.docs_dir(&self.root).join("constitution.md");
        fs::write_file(&path, &content).await?;

        tracing::info!(path = %path.display(), "constitution updated");
        Ok(path)
    }

    /// Generate a specification and attach it to state, creating state if needed.
    pub async fn specify(&self, input: SpecificationInput) -> EngineResult<Specification> {
        let specification = generate_specification(&input);

        let state = self
            .store
            .update(|previous| {
                let mut next = previous.unwrap_or_else(|| {
                    ProjectState::new(ProjectMetadata::new(
                        input.project_name.clone(),
                        input.domain.clone(),
                        input.summary.clone(),
                    ))
                });
                next.specification = Some(specification.clone());
                next
            })
            .await?;

        tracing::info!(
            project = %state.metadata.name,
            requirements = specification.requirements.len(),
            stage = %state.stage(),
            "specification generated"
        );
        Ok(specification)
    }

    /// Build a technical plan from the given or stored specification.
    pub async fn plan(&self, options: PlanOptions) -> EngineResult<TechnicalPlan> {
        let (state, plan) = self
            .store
            .try_update_with(|previous| {
                let specification = match options.specification {
                    Some(spec) => spec,
                    None => previous
                        .as_ref()
                        .and_then(|state| state.specification.clone())
                        .ok_or(EngineError::MissingArtifact(Artifact::Specification))?,
                };
                let plan = build_technical_plan(&specification);

                let mut next = previous.unwrap_or_else(|| {
                    ProjectState::new(ProjectMetadata::new(
                        specification.project_name.clone(),
                        specification.domain.clone(),
                        specification.summary.clone(),
                    ))
                });
                next.specification = Some(specification);
                next.plan = Some(plan.clone());
                Ok((next, plan))
            })
            .await?;

        tracing::info!(
            project = %state.metadata.name,
            phases = plan.delivery_phases.len(),
            weeks = plan.total_weeks(),
            "technical plan built"
        );
        Ok(plan)
    }

    /// Derive the task plan from the given or stored plan and the stored specification.
    pub async fn tasks(&self, options: TasksOptions) -> EngineResult<TaskPlan> {
        let missing_state = self.missing_state();

        let (state, task_plan) = self
            .store
            .try_update_with(|previous| {
                let mut next = previous.ok_or(missing_state)?;

                let plan = options.plan.or_else(|| next.plan.clone());
                let (specification, plan) = match (next.specification.as_ref(), plan) {
                    (Some(spec), Some(plan)) => (spec, plan),
                    (Some(_), None) => return Err(EngineError::MissingArtifact(Artifact::Plan)),
                    (None, _) => {
                        return Err(EngineError::MissingArtifact(Artifact::PlanOrSpecification))
                    }
                };

                let task_plan = derive_task_plan(specification, &plan);
                next.plan = Some(plan);
                next.task_plan = Some(task_plan.clone());
                Ok((next, task_plan))
            })
            .await?;

        tracing::info!(
            project = %state.metadata.name,
            tasks = task_plan.tasks.len(),
            critical_path = task_plan.critical_path.len(),
            "task plan derived"
        );
        Ok(task_plan)
    }

    /// Apply task updates, record a progress snapshot and write the report.
    ///
    /// Updates are applied to the task plan as stored when the state lock is
    /// taken, and the snapshot always matches the task plan written with it.
    /// State is written before the report. If the report cannot be written
    /// the error is returned and the recorded progress stays.
    pub async fn implement(&self, input: ImplementationInput) -> EngineResult<ImplementationOutcome> {
        let missing_state = self.missing_state();
        let updates = input.updates;

        let (state, progress) = self
            .store
            .try_update_with(|previous| {
                let mut next = previous.ok_or(missing_state)?;
                let current = next
                    .task_plan
                    .as_ref()
                    .ok_or(EngineError::MissingArtifact(Artifact::TaskPlan))?;

                let updated =
                    if updates.is_empty() { current.clone() } else { apply_task_updates(current, &updates) };
                let progress = summarize_progress(&updated);

                next.task_plan = Some(updated);
                next.progress_history.push(progress.clone());
                Ok((next, progress))
            })
            .await?;

        tracing::info!(
            project = %state.metadata.name,
            done = progress.counts.done,
            total = progress.counts.total(),
            snapshots = state.progress_history.len(),
            "progress recorded"
        );

        let highlights = if input.narrative_highlights.is_empty() {
            self.config.defaults.highlights.clone()
        } else {
            input.narrative_highlights
        };
        let compliance_delta =
            state.specification.as_ref().map(|spec| spec.compliance.as_slice()).unwrap_or_default();
        let template = self.templates.read().resolved().body(REPORT).to_string();
        let path = self.config.report_path(&self.root);

        let composed = compose_implementation_report(&ReportContext {
            project_name: &state.metadata.name,
            progress: &progress,
            highlights: &highlights,
            blockers: &input.blockers,
            compliance_delta,
            template: &template,
            path: &path,
        })
        .await?;

        Ok(ImplementationOutcome { report: composed.report, file_path: composed.file_path, progress })
    }

    /// Current persisted state, if any.
    pub async fn state(&self) -> EngineResult<Option<ProjectState>> {
        self.store.read().await
    }

    // ------------------------------------------------------------------
    // Templates
    // ------------------------------------------------------------------

    /// Merge `partial` into the overrides, persist them and return the effective templates.
    pub async fn update_templates(&self, partial: TemplateOverrides) -> EngineResult<Templates> {
        let (overrides, resolved) = {
            let mut registry = self.templates.write();
            registry.merge(partial);
            (registry.overrides().clone(), registry.resolved().clone())
        };

        self.template_store.save(&overrides).await?;
        tracing::info!(overrides = overrides.len(), "templates updated");
        Ok(resolved)
    }

    /// Effective templates.
    pub fn get_templates(&self) -> Templates {
        self.templates.read().resolved().clone()
    }

    fn render(&self, name: &str, context: &Value) -> String {
        let templates = self.templates.read();
        template::render(templates.resolved().body(name), context)
    }

    // ------------------------------------------------------------------
    // Modules
    // ------------------------------------------------------------------

    /// Register `module` under `key`.
    pub fn register_module(&self, key: impl Into<String>, module: Arc<dyn EngineModule>) {
        self.modules.register(key, module);
    }

    /// Registered module keys, sorted.
    pub fn module_names(&self) -> Vec<String> {
        self.modules.names()
    }

    /// Run the module registered under `key`.
    ///
    /// If no state exists yet, a placeholder state is persisted first so the
    /// module always sees one.
    pub async fn run_module(&self, key: &str, input: Value) -> EngineResult<Value> {
        let module = self
            .modules
            .get(key)
            .ok_or_else(|| EngineError::ModuleNotRegistered(key.to_string()))?;

        let state = match self.store.read().await? {
            Some(state) => state,
            None => {
                let fallback = ProjectState::new(ProjectMetadata::new(FALLBACK_PROJECT_NAME, "", ""));
                self.store.write(&fallback).await?;
                tracing::debug!(module = %key, "persisted fallback state");
                fallback
            }
        };

        tracing::debug!(module = %key, "running module");
        module
            .execute(input, ModuleContext::new(state, self.store.clone()))
            .await
            .map_err(|source| EngineError::Module { name: key.to_string(), source })
    }

    async fn require_state(&self) -> EngineResult<ProjectState> {
        self.store.read().await?.ok_or_else(|| self.missing_state())
    }

    fn missing_state(&self) -> EngineError {
        EngineError::MissingState(self.store.path().to_path_buf())
    }
}

fn compliance_entries(findings: &[ComplianceFinding]) -> Vec<Value> {
    findings
        .iter()
        .map(|finding| json!({"standard": finding.standard_id.as_str(), "summary": finding.summary}))
        .collect()
}

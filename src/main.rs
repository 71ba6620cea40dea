//! SDD Kit - stage-gated project workflow from the command line.
//!
//! Every subcommand maps onto one engine operation against the project
//! root given by `--root` (the current directory by default).

#![allow(clippy::single_match_else)]

use std::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sddkit::{
    Config, ConstitutionOptions, Engine, ImplementationInput, InitOptions, PlanOptions,
    SpecificationInput, TaskStatus, TaskUpdate, TasksOptions, TemplateOverrides,
};

/// Stage-gated project workflow engine
#[derive(Parser)]
#[command(name = "sdd")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,

    /// Project root
    #[arg(short, long, global = true, env = "SDD_ROOT", default_value = ".")]
    root: PathBuf,

    /// Print a JSON envelope instead of human-readable output
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the project state and the constitution and principles documents
    Init {
        /// Project name
        #[arg(short, long)]
        name: String,

        /// Business domain
        #[arg(short, long)]
        domain: String,

        /// Project vision
        #[arg(short, long)]
        summary: String,

        /// Initialize this directory instead of the project root
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Rewrite the constitution
    Constitution {
        /// Guiding principle, repeatable
        #[arg(short, long = "principle")]
        principles: Vec<String>,

        /// Governance model
        #[arg(short, long)]
        governance: Option<String>,

        /// Delivery cadence
        #[arg(short, long)]
        cadence: Option<String>,
    },

    /// Show templates, or merge overrides from a JSON file
    Templates {
        /// JSON object of template name to body
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Print the body of a single template
        #[arg(long, conflicts_with = "file")]
        show: Option<String>,
    },

    /// Generate the specification from a JSON input file
    Specify {
        /// Specification input JSON
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Build the technical plan
    Plan {
        /// Specification input JSON to specify from first
        #[arg(short, long)]
        spec: Option<PathBuf>,
    },

    /// Derive the task plan
    Tasks {
        /// Technical plan JSON to use instead of the stored one
        #[arg(short, long)]
        plan: Option<PathBuf>,
    },

    /// Apply task updates, record progress and write the implementation report
    Implement {
        /// JSON array of task updates
        #[arg(short, long)]
        updates: Option<PathBuf>,

        /// Set a task status, as `TASK=STATUS` (repeatable)
        #[arg(long = "set", value_name = "TASK=STATUS")]
        set: Vec<String>,

        /// Highlights, comma separated
        #[arg(long, value_delimiter = ',')]
        highlights: Vec<String>,

        /// Blockers, comma separated
        #[arg(short, long, value_delimiter = ',')]
        blockers: Vec<String>,
    },

    /// Show the persisted project state
    State,

    /// Show the latest progress snapshot
    Progress {
        /// Show every snapshot
        #[arg(short, long)]
        all: bool,
    },

    /// List extension modules (registered through the library API, the CLI itself registers none)
    Modules,

    /// Show the effective configuration
    Config {
        /// Show config file locations
        #[arg(long)]
        path: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Result of one command: data for `--json`, text otherwise.
struct Output {
    data: Value,
    text: String,
}

impl Output {
    fn new(data: impl Serialize, text: impl Into<String>) -> Result<Self> {
        Ok(Self { data: serde_json::to_value(data)?, text: text.into() })
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose { EnvFilter::new("debug") } else { EnvFilter::new("warn") };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();

    let json_output = cli.json;
    let result = tokio::runtime::Runtime::new()
        .context("Failed to start async runtime")
        .and_then(|rt| rt.block_on(run(cli)));

    match result {
        Ok(output) => {
            if json_output {
                println!("{}", json!({ "success": true, "data": output.data }));
            } else if !output.text.is_empty() {
                println!("{}", output.text.trim_end());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            if json_output {
                println!("{}", json!({ "success": false, "error": format!("{e:#}") }));
            } else {
                eprintln!("Error: {e:#}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<Output> {
    match cli.command {
        Commands::Init { name, domain, summary, output } => {
            let root = output.unwrap_or(cli.root);
            cmd_init(&root, InitOptions::new(name, domain, summary)).await
        }
        Commands::Constitution { principles, governance, cadence } => {
            let options = ConstitutionOptions {
                guiding_principles: principles,
                governance_model: governance,
                delivery_cadence: cadence,
            };
            cmd_constitution(&cli.root, options).await
        }
        Commands::Templates { file, show } => cmd_templates(&cli.root, file, show).await,
        Commands::Specify { input } => cmd_specify(&cli.root, &input).await,
        Commands::Plan { spec } => cmd_plan(&cli.root, spec).await,
        Commands::Tasks { plan } => cmd_tasks(&cli.root, plan).await,
        Commands::Implement { updates, set, highlights, blockers } => {
            let mut input = ImplementationInput {
                updates: match updates {
                    Some(path) => load_json(&path, "task updates").await?,
                    None => Vec::new(),
                },
                narrative_highlights: trimmed(highlights),
                blockers: trimmed(blockers),
            };
            for assignment in &set {
                input.updates.push(parse_assignment(assignment)?);
            }
            cmd_implement(&cli.root, input).await
        }
        Commands::State => cmd_state(&cli.root).await,
        Commands::Progress { all } => cmd_progress(&cli.root, all).await,
        Commands::Modules => cmd_modules(&cli.root).await,
        Commands::Config { path } => cmd_config(&cli.root, path),
        Commands::Completions { shell } => {
            cmd_completions(shell);
            Output::new(Value::Null, "")
        }
    }
}

/// Generate shell completions.
fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "sdd", &mut io::stdout());
}

async fn cmd_init(root: &Path, options: InitOptions) -> Result<Output> {
    let engine = Engine::open(root).await?;
    let state = engine.initialize_project(options).await?;

    let docs = engine.config().docs_dir(root);
    let text = format!(
        "Initialized '{}' in {}\n  {}\n  {}",
        state.metadata.name,
        root.display(),
        docs.join("constitution.md").display(),
        docs.join("principles.md").display()
    );
    Output::new(&state, text)
}

async fn cmd_constitution(root: &Path, options: ConstitutionOptions) -> Result<Output> {
    let engine = Engine::open(root).await?;
    let path = engine.update_constitution(options).await?;
    Output::new(json!({ "filePath": path }), format!("Constitution updated: {}", path.display()))
}

async fn cmd_templates(root: &Path, file: Option<PathBuf>, show: Option<String>) -> Result<Output> {
    let engine = Engine::open(root).await?;

    if let Some(name) = show {
        let templates = engine.get_templates();
        let body = templates
            .get(&name)
            .with_context(|| format!("Unknown template '{name}'"))?
            .to_string();
        return Output::new(json!({ "name": name, "body": body }), body);
    }

    let (templates, heading) = match file {
        Some(path) => {
            let overrides: TemplateOverrides = load_json(&path, "template overrides").await?;
            (engine.update_templates(overrides).await?, "Templates updated")
        }
        None => (engine.get_templates(), "Templates"),
    };

    let mut text = format!("{heading}:\n");
    for (name, body) in templates.iter() {
        let _ = writeln!(text, "  {name:<14} {} lines", body.lines().count());
    }
    Output::new(&templates, text)
}

async fn cmd_specify(root: &Path, input: &Path) -> Result<Output> {
    let engine = Engine::open(root).await?;
    let input: SpecificationInput = load_json(input, "specification input").await?;
    let spec = engine.specify(input).await?;

    let mut text =
        format!("Specification for {}\n{}\n\nRequirements:\n", spec.project_name, spec.summary);
    for req in &spec.requirements {
        let priority = format!("{:?}", req.priority).to_lowercase();
        let _ = writeln!(text, "  {:<7} {:<9} {}", req.id, priority, req.title);
    }
    let _ = writeln!(text, "\nCompliance:");
    for finding in &spec.compliance {
        let _ = writeln!(
            text,
            "  {:<16} {:>3}  {}",
            finding.standard_id.as_str(),
            finding.score,
            finding.summary
        );
    }
    Output::new(&spec, text)
}

async fn cmd_plan(root: &Path, spec: Option<PathBuf>) -> Result<Output> {
    let engine = Engine::open(root).await?;

    let mut options = PlanOptions::default();
    if let Some(path) = spec {
        let input: SpecificationInput = load_json(&path, "specification input").await?;
        options.specification = Some(engine.specify(input).await?);
    }
    let plan = engine.plan(options).await?;

    let mut text = format!("Technical plan ({} weeks)\n", plan.total_weeks());
    for phase in &plan.delivery_phases {
        let _ = writeln!(text, "  {:<11} {:>2}w  {}", phase.id, phase.duration_weeks, phase.name);
    }
    if !plan.compliance_follow_ups.is_empty() {
        let _ = writeln!(text, "\nCompliance follow-ups: {}", plan.compliance_follow_ups.len());
    }
    Output::new(&plan, text)
}

async fn cmd_tasks(root: &Path, plan: Option<PathBuf>) -> Result<Output> {
    let engine = Engine::open(root).await?;

    let mut options = TasksOptions::default();
    if let Some(path) = plan {
        options.plan = Some(load_json(&path, "technical plan").await?);
    }
    let task_plan = engine.tasks(options).await?;

    let mut text = format!("{} tasks\n", task_plan.tasks.len());
    for task in &task_plan.tasks {
        let _ = writeln!(
            text,
            "  {:<7} {:<11} {:>3}h  {}",
            task.id,
            task.status.as_str(),
            task.estimate_hours,
            task.title
        );
    }
    if !task_plan.critical_path.is_empty() {
        let _ = writeln!(text, "\nCritical path: {}", task_plan.critical_path.join(" -> "));
    }
    Output::new(&task_plan, text)
}

async fn cmd_implement(root: &Path, input: ImplementationInput) -> Result<Output> {
    let engine = Engine::open(root).await?;
    let outcome = engine.implement(input).await?;

    let progress = &outcome.progress;
    let mut text = format!("Report written to {}\n", outcome.file_path.display());
    let _ = writeln!(
        text,
        "  done {}/{}  in progress {}  blocked {}  remaining {}h",
        progress.counts.done,
        progress.counts.total(),
        progress.counts.in_progress,
        progress.counts.blocked,
        progress.remaining_hours
    );
    Output::new(&outcome, text)
}

async fn cmd_state(root: &Path) -> Result<Output> {
    let engine = Engine::open(root).await?;
    let state = engine.state().await?;

    let text = match &state {
        Some(state) => {
            let mut text = format!("{} ({})\n", state.metadata.name, state.metadata.domain);
            let _ = writeln!(text, "  stage:     {}", state.stage());
            let _ = writeln!(text, "  created:   {}", state.metadata.created_at.to_rfc3339());
            if let Some(task_plan) = &state.task_plan {
                let _ = writeln!(text, "  tasks:     {}", task_plan.tasks.len());
            }
            let _ = writeln!(text, "  snapshots: {}", state.progress_history.len());
            text
        }
        None => format!("No project state in {}", root.display()),
    };
    Output::new(&state, text)
}

async fn cmd_progress(root: &Path, all: bool) -> Result<Output> {
    let engine = Engine::open(root).await?;
    let state = engine
        .state()
        .await?
        .with_context(|| format!("Project not initialized in {}", root.display()))?;

    let snapshots: Vec<_> = if all {
        state.progress_history.iter().collect()
    } else {
        state.latest_progress().into_iter().collect()
    };

    if snapshots.is_empty() {
        return Output::new(&snapshots, "No progress recorded yet");
    }

    let mut text = String::new();
    for snapshot in &snapshots {
        let _ = writeln!(
            text,
            "{}  {}% done  ({} pending, {} in progress, {} blocked, {} done)  {}h remaining",
            snapshot.timestamp.format("%Y-%m-%d %H:%M"),
            snapshot.counts.completed_percent(),
            snapshot.counts.pending,
            snapshot.counts.in_progress,
            snapshot.counts.blocked,
            snapshot.counts.done,
            snapshot.remaining_hours
        );
    }
    Output::new(&snapshots, text)
}

async fn cmd_modules(root: &Path) -> Result<Output> {
    let engine = Engine::open(root).await?;
    let modules = engine.modules().list();

    let text = if modules.is_empty() {
        "No modules registered. Modules are registered through the library API.".to_string()
    } else {
        modules.iter().fold(String::new(), |mut text, (name, description)| {
            let _ = writeln!(text, "  {name:<20} {description}");
            text
        })
    };
    let names: Vec<_> = modules.into_iter().map(|(name, _)| name).collect();
    Output::new(&names, text)
}

fn cmd_config(root: &Path, path: bool) -> Result<Output> {
    let local = root.join(sddkit::SDD_DIR).join("config.toml");
    let global = Config::config_dir().map(|dir| dir.join("config.toml"));

    if path {
        let mut text = format!("Project config: {}\n", local.display());
        match &global {
            Some(global) => {
                let _ = writeln!(text, "Global config:  {}", global.display());
            }
            None => {
                let _ = writeln!(text, "Global config:  (no config directory)");
            }
        }
        return Output::new(json!({ "project": local, "global": global }), text);
    }

    let config = Config::load(root)?;
    let text = toml::to_string_pretty(&config)?;
    Output::new(&config, text)
}

async fn load_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {what} from {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {what} JSON in {}", path.display()))
}

fn trimmed(items: Vec<String>) -> Vec<String> {
    items.into_iter().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect()
}

/// Parse `TASK=STATUS` into a status update.
fn parse_assignment(assignment: &str) -> Result<TaskUpdate> {
    let (task_id, status) = assignment
        .split_once('=')
        .with_context(|| format!("Expected TASK=STATUS, got '{assignment}'"))?;
    let status: TaskStatus = status.parse().map_err(anyhow::Error::msg)?;
    Ok(TaskUpdate::status(task_id.trim(), status))
}

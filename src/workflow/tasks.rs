//! Task plan derivation, updates and progress aggregation.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::documents::{
    Priority, ProgressSnapshot, Requirement, RequirementCategory, Specification, Task, TaskBoard,
    TaskCategory, TaskPlan, TaskPlanSource, TaskStatus, TaskUpdate, TechnicalPlan,
};

/// Maximum number of tasks on the critical path.
const CRITICAL_PATH_LEN: usize = 5;

/// Derive one pending task per requirement.
pub fn derive_task_plan(spec: &Specification, plan: &TechnicalPlan) -> TaskPlan {
    let tasks: Vec<Task> = spec.requirements.iter().map(task_for_requirement).collect();

    let mut swimlanes: BTreeMap<TaskCategory, Vec<String>> = BTreeMap::new();
    for task in &tasks {
        swimlanes.entry(task.category).or_default().push(task.id.clone());
    }

    let critical_path = spec
        .requirements
        .iter()
        .filter(|req| matches!(req.priority, Priority::Critical | Priority::High))
        .take(CRITICAL_PATH_LEN)
        .map(|req| req.id.clone())
        .collect();

    TaskPlan {
        tasks,
        board: TaskBoard {
            swimlanes,
            focus_areas: spec.requirements.iter().map(|r| r.title.clone()).collect(),
        },
        critical_path,
        source: TaskPlanSource {
            project_name: spec.project_name.clone(),
            requirement_ids: spec.requirements.iter().map(|r| r.id.clone()).collect(),
            phase_ids: plan.delivery_phases.iter().map(|p| p.id.clone()).collect(),
        },
    }
}

fn task_for_requirement(req: &Requirement) -> Task {
    let category = match req.category {
        RequirementCategory::Functional => TaskCategory::Build,
        RequirementCategory::NonFunctional => TaskCategory::Qa,
    };

    Task {
        id: req.id.clone(),
        title: req.title.clone(),
        description: req.description.clone(),
        status: TaskStatus::Pending,
        category,
        estimate_hours: estimate_hours(req),
        owner: None,
        note: None,
        tags: vec![req.title.clone(), category.as_str().to_string()],
    }
}

/// Priority sets the base, every acceptance criterion adds half a day.
fn estimate_hours(req: &Requirement) -> u32 {
    let base = match req.priority {
        Priority::Critical => 24,
        Priority::High => 16,
        Priority::Medium => 12,
        Priority::Low => 8,
    };
    let criteria = u32::try_from(req.acceptance_criteria.len()).unwrap_or(u32::MAX);
    base + criteria.saturating_mul(4)
}

/// Apply partial updates and return the new plan.
///
/// Updates whose `task_id` matches no task are ignored.
pub fn apply_task_updates(plan: &TaskPlan, updates: &[TaskUpdate]) -> TaskPlan {
    let mut next = plan.clone();

    for update in updates {
        let Some(task) = next.tasks.iter_mut().find(|t| t.id == update.task_id) else {
            tracing::debug!(task_id = %update.task_id, "ignoring update for unknown task");
            continue;
        };

        if let Some(status) = update.status {
            task.status = status;
        }
        if let Some(owner) = &update.owner {
            task.owner = Some(owner.clone());
        }
        if let Some(note) = &update.note {
            task.note = Some(note.clone());
        }
    }

    next
}

/// Summarize the plan as of now.
pub fn summarize_progress(plan: &TaskPlan) -> ProgressSnapshot {
    summarize_progress_at(plan, Utc::now())
}

/// Summarize the plan with an explicit timestamp.
pub fn summarize_progress_at(plan: &TaskPlan, timestamp: DateTime<Utc>) -> ProgressSnapshot {
    let counts = plan.counts();
    let remaining_hours = plan
        .tasks
        .iter()
        .filter(|t| t.status != TaskStatus::Done)
        .map(|t| t.estimate_hours)
        .sum();

    let mut burndown_notes = vec![
        format!("Completion {}%", counts.completed_percent()),
        format!("{remaining_hours} hours remaining"),
    ];
    if counts.blocked > 0 {
        burndown_notes.push(format!("{} task(s) blocked", counts.blocked));
    }

    ProgressSnapshot { timestamp, counts, remaining_hours, burndown_notes }
}

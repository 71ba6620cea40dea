//! Specification generation.
//!
//! Turns raw project intent into a structured [`Specification`]. The
//! transform is pure: the same input always yields the same document,
//! requirement and risk ids included.

use once_cell::sync::Lazy;
use regex::Regex;

use super::compliance::{evaluate_compliance, ComplianceContext};
use super::documents::{
    Level, NonFunctionalInput, NonFunctionalTarget, Priority, Requirement, RequirementCategory,
    RiskItem, Specification, SpecificationInput, Stakeholder,
};

/// Timeline used when the input does not give one.
pub const DEFAULT_TIMELINE_WEEKS: u32 = 12;

static STRICT_TARGET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)99|strict|security|secure").expect("valid regex"));
static LIKELY_CONSTRAINT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)legacy|external|dependency").expect("valid regex"));
static SEVERE_CONSTRAINT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)security|compliance|finance").expect("valid regex"));

/// Generate a specification from raw input.
pub fn generate_specification(input: &SpecificationInput) -> Specification {
    let business_drivers = or_default(&input.business_drivers, default_drivers);
    let requirements = build_requirements(&input.primary_modules, &business_drivers);

    let compliance = evaluate_compliance(
        &input.compliance_targets,
        &ComplianceContext {
            business_drivers: &business_drivers,
            non_functional: &input.non_functional_requirements,
            requirements: &requirements,
        },
    );

    let non_functional_targets =
        input.non_functional_requirements.iter().map(assess_target).collect::<Vec<_>>();
    let risks = derive_risks(&input.constraints, &non_functional_targets);

    Specification {
        project_name: input.project_name.clone(),
        domain: input.domain.clone(),
        summary: executive_summary(input),
        business_drivers,
        stakeholders: if input.stakeholders.is_empty() {
            default_stakeholders()
        } else {
            input.stakeholders.clone()
        },
        requirements,
        non_functional_targets,
        constraints: input.constraints.clone(),
        compliance_targets: input.compliance_targets.clone(),
        success_criteria: or_default(&input.success_criteria, default_success_criteria),
        delivery_timeline_weeks: input
            .delivery_timeline_weeks
            .filter(|w| *w > 0)
            .unwrap_or(DEFAULT_TIMELINE_WEEKS),
        compliance,
        risks,
    }
}

fn or_default(values: &[String], fallback: fn() -> Vec<String>) -> Vec<String> {
    if values.is_empty() {
        fallback()
    } else {
        values.to_vec()
    }
}

fn default_drivers() -> Vec<String> {
    vec![
        "Accelerate delivery of business value".to_string(),
        "Keep requirements traceable end to end".to_string(),
    ]
}

fn default_success_criteria() -> Vec<String> {
    vec!["End-to-end observability in place".to_string(), "First usable MVP shipped".to_string()]
}

fn default_stakeholders() -> Vec<Stakeholder> {
    vec![Stakeholder {
        name: "Product Owner".to_string(),
        role: "owner".to_string(),
        expectations: vec![
            "Clear scope for every increment".to_string(),
            "Visible progress against requirements".to_string(),
        ],
        engagement_model: None,
    }]
}

fn executive_summary(input: &SpecificationInput) -> String {
    let modules = if input.primary_modules.is_empty() {
        "its core modules".to_string()
    } else {
        input.primary_modules.join(", ")
    };
    let domain = if input.domain.is_empty() { "its" } else { input.domain.as_str() };

    let mut summary = input.project_name.clone();
    if !input.summary.is_empty() {
        summary.push_str(&format!(" aims to {}.", input.summary.trim_end_matches('.')));
    }
    summary.push_str(&format!(" It serves the {domain} domain through {modules}."));
    summary.trim_start().to_string()
}

/// One requirement per module, `REQ-1..REQ-N` in module order.
fn build_requirements(modules: &[String], drivers: &[String]) -> Vec<Requirement> {
    if modules.is_empty() {
        return vec![Requirement {
            id: requirement_id(0),
            title: "Core experience".to_string(),
            description: "Build the end-to-end experience around the key user value proposition."
                .to_string(),
            category: RequirementCategory::Functional,
            drivers: drivers.to_vec(),
            acceptance_criteria: vec![
                "A positive end-to-end experience is delivered".to_string(),
                "Key metrics reach the release bar".to_string(),
            ],
            priority: Priority::High,
        }];
    }

    modules
        .iter()
        .enumerate()
        .map(|(index, module)| Requirement {
            id: requirement_id(index),
            title: module.clone(),
            description: format!(
                "Implement the {module} module to support the primary business scenarios."
            ),
            category: RequirementCategory::Functional,
            drivers: drivers.to_vec(),
            acceptance_criteria: vec![
                format!("{module} completes an end-to-end flow"),
                format!("Key {module} business metrics meet expectations"),
            ],
            priority: priority_for(index),
        })
        .collect()
}

/// Stable requirement id for the module at `index`.
pub fn requirement_id(index: usize) -> String {
    format!("REQ-{}", index + 1)
}

fn priority_for(index: usize) -> Priority {
    match index {
        0 => Priority::Critical,
        1 | 2 => Priority::High,
        _ => Priority::Medium,
    }
}

fn assess_target(input: &NonFunctionalInput) -> NonFunctionalTarget {
    let text = format!("{} {} {}", input.attribute, input.metric, input.target);
    let risk_level = if STRICT_TARGET.is_match(&text) {
        Level::High
    } else if input.attribute.chars().count() > 8 {
        Level::Medium
    } else {
        Level::Low
    };

    NonFunctionalTarget {
        attribute: input.attribute.clone(),
        metric: input.metric.clone(),
        target: input.target.clone(),
        rationale: input.rationale.clone(),
        risk_level,
    }
}

fn derive_risks(constraints: &[String], targets: &[NonFunctionalTarget]) -> Vec<RiskItem> {
    let constraint_risks = constraints.iter().map(|constraint| {
        (
            constraint.clone(),
            if LIKELY_CONSTRAINT.is_match(constraint) { Level::High } else { Level::Medium },
            if SEVERE_CONSTRAINT.is_match(constraint) { Level::High } else { Level::Medium },
            "Set up a cross-team sync and time-box risk mitigation decisions".to_string(),
        )
    });

    let target_risks = targets.iter().filter(|t| t.risk_level == Level::High).map(|t| {
        (
            format!("{} target is challenging", t.attribute),
            Level::Medium,
            Level::High,
            format!("Reserve {} validation experiments during technical planning", t.attribute),
        )
    });

    constraint_risks
        .chain(target_risks)
        .enumerate()
        .map(|(index, (title, probability, impact, mitigation_plan))| RiskItem {
            id: format!("RISK-{}", index + 1),
            title,
            probability,
            impact,
            mitigation_plan,
        })
        .collect()
}

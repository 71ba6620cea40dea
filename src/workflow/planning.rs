//! Technical plan generation.
//!
//! Derives architecture principles, a technology stack and delivery
//! phases from a specification.

use super::documents::{
    ArchitecturePrinciple, DeliveryPhase, Specification, TechnicalPlan, TechnologyChoice,
};

/// Build a technical plan from a specification.
pub fn build_technical_plan(spec: &Specification) -> TechnicalPlan {
    TechnicalPlan {
        architecture_principles: derive_principles(spec),
        technology_stack: suggest_technology_stack(),
        delivery_phases: build_delivery_phases(spec),
        automation_backlog: vec![
            "Pipeline: static analysis, unit tests, build and deploy".to_string(),
            "Quality gate: block the release when key metrics miss their target".to_string(),
            "Knowledge base: generate specifications and reports automatically".to_string(),
        ],
        quality_gates: vec![
            "Specification review passed".to_string(),
            "Key metrics are measurable".to_string(),
            "Security scan has no blockers".to_string(),
        ],
        compliance_follow_ups: spec
            .compliance
            .iter()
            .filter(|finding| !finding.gaps.is_empty())
            .cloned()
            .collect(),
    }
}

fn derive_principles(spec: &Specification) -> Vec<ArchitecturePrinciple> {
    spec.requirements
        .iter()
        .map(|req| ArchitecturePrinciple {
            name: format!("{} end to end", req.title),
            statement: format!("Build {} as an extensible capability", req.title),
            rationale: format!("{} Requirements must be able to evolve.", req.description),
            practices: vec![
                "Clear module boundaries".to_string(),
                "Observability designed in".to_string(),
                "Automated tests for public contracts".to_string(),
            ],
        })
        .collect()
}

fn suggest_technology_stack() -> Vec<TechnologyChoice> {
    vec![
        TechnologyChoice {
            layer: "Interface".to_string(),
            recommendation: "REST API with a typed schema".to_string(),
            justification: "Serves several client surfaces from one contract".to_string(),
            alternatives: vec!["GraphQL".to_string(), "gRPC".to_string()],
        },
        TechnologyChoice {
            layer: "Experience".to_string(),
            recommendation: "Component-based web UI with a state chart engine".to_string(),
            justification: "Makes the workflow tooling quick to build and inspect".to_string(),
            alternatives: vec!["Server-rendered pages".to_string(), "Terminal UI".to_string()],
        },
        TechnologyChoice {
            layer: "Knowledge store".to_string(),
            recommendation: "JSON document store with a search index".to_string(),
            justification: "Supports specification templates and lookup".to_string(),
            alternatives: vec!["PostgreSQL".to_string(), "SQLite".to_string()],
        },
    ]
}

/// Split the timeline 25/35/40 across discovery, foundation and scale.
fn build_delivery_phases(spec: &Specification) -> Vec<DeliveryPhase> {
    let criteria_weeks = u32::try_from(spec.success_criteria.len() * 2).unwrap_or(u32::MAX);
    let timeline = spec.delivery_timeline_weeks.max(criteria_weeks);
    let weeks = |share: f64| ((f64::from(timeline) * share).round() as u32).max(1);

    vec![
        phase(
            "discovery",
            "Discovery and specification",
            weeks(0.25),
            &["Lock in business drivers", "Complete the specification model"],
            &["Core stakeholders confirmed"],
            &["Specification package v1"],
        ),
        phase(
            "foundation",
            "Technical plan and foundation",
            weeks(0.35),
            &["Complete the technical blueprint", "Set up self-service tooling"],
            &["Specification package is actionable"],
            &["Quality gates passed"],
        ),
        phase(
            "scale",
            "Incremental delivery",
            weeks(0.40),
            &["Deliver tasks iteratively", "Publish implementation reports"],
            &["Foundation live"],
            &["Overall acceptance"],
        ),
    ]
}

fn phase(
    id: &str,
    name: &str,
    duration_weeks: u32,
    objectives: &[&str],
    entry_criteria: &[&str],
    exit_criteria: &[&str],
) -> DeliveryPhase {
    DeliveryPhase {
        id: id.to_string(),
        name: name.to_string(),
        duration_weeks,
        objectives: owned(objectives),
        entry_criteria: owned(entry_criteria),
        exit_criteria: owned(exit_criteria),
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::documents::SpecificationInput;
    use crate::workflow::specification::generate_specification;

    fn spec() -> Specification {
        generate_specification(
            &SpecificationInput::new("Acme", "retail", "d").with_modules(["Billing", "Search"]),
        )
    }

    #[test]
    fn test_principle_per_requirement() {
        let plan = build_technical_plan(&spec());
        assert_eq!(plan.architecture_principles.len(), 2);
        assert!(plan.architecture_principles[0].name.starts_with("Billing"));
    }

    #[test]
    fn test_phases_split_timeline() {
        let plan = build_technical_plan(&spec());
        let ids: Vec<_> = plan.delivery_phases.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["discovery", "foundation", "scale"]);
        // 12 weeks: 3 + 4 + 5
        let weeks: Vec<_> = plan.delivery_phases.iter().map(|p| p.duration_weeks).collect();
        assert_eq!(weeks, vec![3, 4, 5]);
        assert_eq!(plan.total_weeks(), 12);
    }

    #[test]
    fn test_follow_ups_only_for_findings_with_gaps() {
        let spec = spec();
        let plan = build_technical_plan(&spec);
        assert!(!plan.compliance_follow_ups.is_empty());
        assert!(plan.compliance_follow_ups.iter().all(|f| !f.gaps.is_empty()));
    }

    #[test]
    fn test_plan_is_deterministic() {
        let spec = spec();
        assert_eq!(build_technical_plan(&spec), build_technical_plan(&spec));
    }
}

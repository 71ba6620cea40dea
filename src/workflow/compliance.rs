//! Rule-based compliance evaluation.
//!
//! Scores a specification input against a small set of well-known
//! standards. Rules are keyword heuristics; they only need to be
//! deterministic, not clever.

use once_cell::sync::Lazy;
use regex::Regex;

use super::documents::{ComplianceFinding, NonFunctionalInput, Requirement, StandardId};

static RELIABILITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)reliab|uptime|availability").expect("valid regex"));
static SECURITY_ATTRIBUTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)security|privacy|access").expect("valid regex"));
static SECURITY_REQUIREMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)security|auth|encryption|audit|owasp").expect("valid regex"));
static THREAT_DRIVER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)threat|attack|compliance|risk").expect("valid regex"));
static ITERATIVE_DRIVER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)iteration|agile|sprint|feedback|increment").expect("valid regex"));
static GOVERNANCE_REQUIREMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)process|compliance|audit|trace").expect("valid regex"));

/// Inputs the rules look at.
#[derive(Debug, Clone, Copy)]
pub struct ComplianceContext<'a> {
    pub business_drivers: &'a [String],
    pub non_functional: &'a [NonFunctionalInput],
    pub requirements: &'a [Requirement],
}

/// Evaluate the requested standards, or every known standard when none are requested.
pub fn evaluate_compliance(
    requested: &[StandardId],
    context: &ComplianceContext<'_>,
) -> Vec<ComplianceFinding> {
    let standards: &[StandardId] = if requested.is_empty() { &StandardId::ALL } else { requested };
    standards.iter().map(|standard| evaluate(*standard, context)).collect()
}

fn evaluate(standard: StandardId, context: &ComplianceContext<'_>) -> ComplianceFinding {
    match standard {
        StandardId::Iso25010 => iso_25010(context),
        StandardId::OwaspAsvs => owasp_asvs(context),
        StandardId::AgileManifesto => agile_manifesto(context),
        StandardId::CmmiDev => cmmi_dev(context),
    }
}

fn iso_25010(context: &ComplianceContext<'_>) -> ComplianceFinding {
    let coverage = context.non_functional.len();
    let has_reliability = context.non_functional.iter().any(|n| RELIABILITY.is_match(&n.attribute));
    let has_security =
        context.non_functional.iter().any(|n| SECURITY_ATTRIBUTE.is_match(&n.attribute));

    let base = 60 + (coverage * 5).min(25);
    let bonus = usize::from(has_reliability) * 5 + usize::from(has_security) * 5;
    let score = (base + bonus).min(95);

    let mut gaps = Vec::new();
    if !has_reliability {
        gaps.push("No reliability or availability metric defined".to_string());
    }
    if !has_security {
        gaps.push("No security-related metric defined".to_string());
    }

    finding(
        StandardId::Iso25010,
        score,
        "Product quality model coverage",
        gaps,
        &[
            "Define a measurable metric for every quality attribute",
            "Maintain the mapping between metrics and business goals",
        ],
    )
}

fn owasp_asvs(context: &ComplianceContext<'_>) -> ComplianceFinding {
    let security_requirements = context
        .requirements
        .iter()
        .filter(|r| SECURITY_REQUIREMENT.is_match(&format!("{}{}", r.description, r.title)))
        .count();
    let has_threat_model = context.business_drivers.iter().any(|d| THREAT_DRIVER.is_match(d));

    let score = (55 + security_requirements * 6 + usize::from(has_threat_model) * 15).min(90);
    let gaps = if security_requirements < 3 {
        vec!["Too few security requirements; cover authentication, logging and encryption"
            .to_string()]
    } else {
        Vec::new()
    };

    finding(
        StandardId::OwaspAsvs,
        score,
        "Application security control maturity",
        gaps,
        &[
            "Run a threat modeling workshop",
            "Add security acceptance criteria to the quality gates",
        ],
    )
}

fn agile_manifesto(context: &ComplianceContext<'_>) -> ComplianceFinding {
    let iterative = context.business_drivers.iter().filter(|d| ITERATIVE_DRIVER.is_match(d)).count();

    let score = (50 + iterative * 10).min(85);
    let gaps = if iterative == 0 {
        vec!["No iterative delivery driver".to_string()]
    } else {
        Vec::new()
    };

    finding(
        StandardId::AgileManifesto,
        score,
        "Alignment with agile values",
        gaps,
        &["Define the MVP scope and feedback cadence", "Publish a delivery cadence dashboard"],
    )
}

fn cmmi_dev(context: &ComplianceContext<'_>) -> ComplianceFinding {
    let governance = context
        .requirements
        .iter()
        .filter(|r| GOVERNANCE_REQUIREMENT.is_match(&r.description))
        .count();

    let score = (45 + governance * 8).min(80);
    let gaps = if governance < 2 {
        vec!["Process governance activities are not modeled explicitly".to_string()]
    } else {
        Vec::new()
    };

    finding(
        StandardId::CmmiDev,
        score,
        "Process maturity baseline",
        gaps,
        &[
            "Set a checklist for every key milestone",
            "Trace requirements end to end through delivery",
        ],
    )
}

fn finding(
    standard_id: StandardId,
    score: usize,
    summary: &str,
    gaps: Vec<String>,
    recommendations: &[&str],
) -> ComplianceFinding {
    ComplianceFinding {
        standard_id,
        score: score.min(100) as u8,
        summary: summary.to_string(),
        gaps,
        recommendations: recommendations.iter().map(|r| (*r).to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::documents::{Priority, RequirementCategory};

    fn nfr(attribute: &str) -> NonFunctionalInput {
        NonFunctionalInput {
            attribute: attribute.to_string(),
            metric: "m".to_string(),
            target: "t".to_string(),
            rationale: None,
        }
    }

    fn requirement(title: &str, description: &str) -> Requirement {
        Requirement {
            id: "REQ-1".to_string(),
            title: title.to_string(),
            description: description.to_string(),
            category: RequirementCategory::Functional,
            drivers: Vec::new(),
            acceptance_criteria: Vec::new(),
            priority: Priority::High,
        }
    }

    #[test]
    fn test_all_standards_when_none_requested() {
        let context =
            ComplianceContext { business_drivers: &[], non_functional: &[], requirements: &[] };
        let findings = evaluate_compliance(&[], &context);
        let ids: Vec<_> = findings.iter().map(|f| f.standard_id).collect();
        assert_eq!(ids, StandardId::ALL.to_vec());
    }

    #[test]
    fn test_iso_rewards_reliability_and_security() {
        let targets = vec![nfr("Availability"), nfr("Security")];
        let context =
            ComplianceContext { business_drivers: &[], non_functional: &targets, requirements: &[] };
        let findings = evaluate_compliance(&[StandardId::Iso25010], &context);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].score, 80);
        assert!(findings[0].gaps.is_empty());
    }

    #[test]
    fn test_iso_reports_missing_metrics() {
        let context =
            ComplianceContext { business_drivers: &[], non_functional: &[], requirements: &[] };
        let findings = evaluate_compliance(&[StandardId::Iso25010], &context);
        assert_eq!(findings[0].score, 60);
        assert_eq!(findings[0].gaps.len(), 2);
    }

    #[test]
    fn test_owasp_threat_driver_bonus() {
        let drivers = vec!["Reduce attack surface".to_string()];
        let reqs = vec![requirement("Auth", "Single sign-on")];
        let context =
            ComplianceContext { business_drivers: &drivers, non_functional: &[], requirements: &reqs };
        let findings = evaluate_compliance(&[StandardId::OwaspAsvs], &context);
        assert_eq!(findings[0].score, 55 + 6 + 15);
        assert_eq!(findings[0].gaps.len(), 1);
    }

    #[test]
    fn test_agile_and_cmmi_caps() {
        let drivers: Vec<String> = (0..10).map(|i| format!("sprint feedback {i}")).collect();
        let reqs: Vec<Requirement> =
            (0..10).map(|_| requirement("x", "audit trail for process")).collect();
        let context =
            ComplianceContext { business_drivers: &drivers, non_functional: &[], requirements: &reqs };

        let findings =
            evaluate_compliance(&[StandardId::AgileManifesto, StandardId::CmmiDev], &context);
        assert_eq!(findings[0].score, 85);
        assert_eq!(findings[1].score, 80);
        assert!(findings.iter().all(|f| f.gaps.is_empty()));
    }
}

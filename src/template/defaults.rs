//! Built-in document templates.

use std::collections::BTreeMap;

/// Name of the constitution template.
pub const CONSTITUTION: &str = "constitution";

/// Name of the development principles template.
pub const PRINCIPLES: &str = "principles";

/// Name of the implementation report template.
pub const REPORT: &str = "report";

/// Names of every built-in template.
pub const BUILTIN_NAMES: [&str; 3] = [CONSTITUTION, PRINCIPLES, REPORT];

/// Project constitution
const CONSTITUTION_TEMPLATE: &str = r#"# {{projectName}} Engineering Constitution

> Domain: {{domain}}
> Mission: {{description}}

## Delivery principles
{{#principles}}- {{.}}
{{/principles}}

## Governance model
{{governanceModel}}

## Delivery cadence
{{deliveryCadence}}

## Quality bar
{{#qualityBar}}- {{.}}
{{/qualityBar}}

## Compliance alignment
{{#compliance}}- {{standard}}: {{summary}}
{{/compliance}}

---
Generated by SDD Kit at {{generatedAt}}
"#;

/// Development principles
const PRINCIPLES_TEMPLATE: &str = r#"# Development Principles

{{#principles}}## {{title}}
{{statement}}
- Impact: {{impact}}
- Practices: {{practices}}

{{/principles}}"#;

/// Implementation report
const REPORT_TEMPLATE: &str = r#"# {{projectName}} Implementation Report

- Updated: {{generatedAt}}
- Completion: {{completedPercent}}%
- Remaining effort: {{remainingHours}} hours

## Highlights
{{#highlights}}- {{.}}
{{/highlights}}

## Blockers
{{#blockers}}- {{.}}
{{/blockers}}{{^blockers}}- None
{{/blockers}}

## Compliance delta
{{#complianceDelta}}- {{standard}}: {{summary}}
{{/complianceDelta}}

## Next steps
{{#recommendations}}- {{.}}
{{/recommendations}}
"#;

/// Body of a built-in template, if `name` is one.
pub fn builtin(name: &str) -> Option<&'static str> {
    match name {
        CONSTITUTION => Some(CONSTITUTION_TEMPLATE),
        PRINCIPLES => Some(PRINCIPLES_TEMPLATE),
        REPORT => Some(REPORT_TEMPLATE),
        _ => None,
    }
}

/// All built-in templates keyed by name.
pub fn default_templates() -> BTreeMap<String, String> {
    BUILTIN_NAMES
        .iter()
        .filter_map(|name| builtin(name).map(|body| ((*name).to_string(), body.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_builtin_has_a_body() {
        let templates = default_templates();
        assert_eq!(templates.len(), BUILTIN_NAMES.len());
        assert!(templates[CONSTITUTION].contains("{{projectName}}"));
        assert!(templates[PRINCIPLES].contains("{{#principles}}"));
        assert!(templates[REPORT].contains("{{completedPercent}}"));
    }

    #[test]
    fn test_unknown_name_has_no_builtin() {
        assert!(builtin("release-notes").is_none());
    }
}

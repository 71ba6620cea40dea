//! Implementation report composition.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::documents::{ComplianceFinding, ProgressSnapshot};
use crate::core::{fs, EngineResult};
use crate::template;

/// Structured form of an implementation report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImplementationReport {
    pub title: String,
    pub summary: String,
    pub progress: ProgressSnapshot,
    pub highlights: Vec<String>,
    pub blockers: Vec<String>,
    pub compliance_delta: Vec<ComplianceFinding>,
    pub recommendations: Vec<String>,
}

/// Everything needed to compose one report.
#[derive(Debug, Clone, Copy)]
pub struct ReportContext<'a> {
    pub project_name: &'a str,
    pub progress: &'a ProgressSnapshot,
    pub highlights: &'a [String],
    pub blockers: &'a [String],
    pub compliance_delta: &'a [ComplianceFinding],
    /// Body of the effective `report` template
    pub template: &'a str,
    /// Destination file
    pub path: &'a Path,
}

/// A report as written to disk.
#[derive(Debug, Clone)]
pub struct ComposedReport {
    pub report: ImplementationReport,
    pub content: String,
    pub file_path: PathBuf,
}

/// Build the structured report without touching the filesystem.
pub fn build_report(ctx: &ReportContext<'_>) -> ImplementationReport {
    let mut recommendations = vec![
        "Keep a daily sync to track risks".to_string(),
        "Publish the latest specification to the knowledge base".to_string(),
    ];
    if !ctx.blockers.is_empty() {
        recommendations
            .push(format!("Resolve {} blocker(s) before the next increment", ctx.blockers.len()));
    }

    ImplementationReport {
        title: format!("{} Implementation Report", ctx.project_name),
        summary: ctx.highlights.first().cloned().unwrap_or_else(|| "Work in progress".to_string()),
        progress: ctx.progress.clone(),
        highlights: ctx.highlights.to_vec(),
        blockers: ctx.blockers.to_vec(),
        compliance_delta: ctx.compliance_delta.to_vec(),
        recommendations,
    }
}

/// Render `report` with the given template body.
pub fn render_report(project_name: &str, report: &ImplementationReport, template: &str) -> String {
    let progress = &report.progress;
    let compliance: Vec<_> = report
        .compliance_delta
        .iter()
        .map(|finding| {
            json!({
                "standard": finding.standard_id.as_str(),
                "summary": finding.summary,
                "score": finding.score,
            })
        })
        .collect();

    let context = json!({
        "projectName": project_name,
        "generatedAt": progress.timestamp.to_rfc3339(),
        "completedPercent": progress.counts.completed_percent(),
        "remainingHours": progress.remaining_hours,
        "progress": progress.counts,
        "highlights": report.highlights,
        "blockers": report.blockers,
        "complianceDelta": compliance,
        "recommendations": report.recommendations,
    });

    template::render(template, &context)
}

/// Build, render and write the report.
pub async fn compose_implementation_report(ctx: &ReportContext<'_>) -> EngineResult<ComposedReport> {
    let report = build_report(ctx);
    let content = render_report(ctx.project_name, &report, ctx.template);

    fs::write_file(ctx.path, &content).await?;
    tracing::info!(path = %ctx.path.display(), "implementation report written");

    Ok(ComposedReport { report, content, file_path: ctx.path.to_path_buf() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{defaults, REPORT};
    use crate::workflow::documents::{StandardId, StatusCounts};
    use chrono::Utc;
    use tempfile::TempDir;

    fn progress() -> ProgressSnapshot {
        ProgressSnapshot {
            timestamp: Utc::now(),
            counts: StatusCounts { pending: 1, in_progress: 0, blocked: 1, done: 2 },
            remaining_hours: 40,
            burndown_notes: Vec::new(),
        }
    }

    fn finding() -> ComplianceFinding {
        ComplianceFinding {
            standard_id: StandardId::OwaspAsvs,
            score: 61,
            summary: "Application security control maturity".to_string(),
            gaps: Vec::new(),
            recommendations: Vec::new(),
        }
    }

    #[test]
    fn test_build_report_summary_and_recommendations() {
        let progress = progress();
        let highlights = vec!["Billing live".to_string()];
        let blockers = vec!["Payment sandbox down".to_string()];
        let ctx = ReportContext {
            project_name: "Acme",
            progress: &progress,
            highlights: &highlights,
            blockers: &blockers,
            compliance_delta: &[],
            template: "",
            path: Path::new("unused.md"),
        };

        let report = build_report(&ctx);
        assert_eq!(report.title, "Acme Implementation Report");
        assert_eq!(report.summary, "Billing live");
        assert_eq!(report.recommendations.len(), 3);
    }

    #[test]
    fn test_default_template_renders_counts_and_lists() {
        let progress = progress();
        let highlights = vec!["Billing live".to_string()];
        let findings = vec![finding()];
        let ctx = ReportContext {
            project_name: "Acme",
            progress: &progress,
            highlights: &highlights,
            blockers: &[],
            compliance_delta: &findings,
            template: defaults::builtin(REPORT).unwrap(),
            path: Path::new("unused.md"),
        };

        let report = build_report(&ctx);
        let content = render_report("Acme", &report, ctx.template);
        assert!(content.starts_with("# Acme Implementation Report"));
        assert!(content.contains("Completion: 50%"));
        assert!(content.contains("40 hours"));
        assert!(content.contains("- Billing live"));
        assert!(content.contains("## Blockers\n- None"));
        assert!(content.contains("- owasp-asvs: Application security control maturity"));
    }

    #[tokio::test]
    async fn test_compose_writes_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("docs").join("implementation-report.md");
        let progress = progress();
        let ctx = ReportContext {
            project_name: "Acme",
            progress: &progress,
            highlights: &[],
            blockers: &[],
            compliance_delta: &[],
            template: "{{projectName}}: {{progress.done}} done",
            path: &path,
        };

        let composed = compose_implementation_report(&ctx).await.unwrap();
        assert_eq!(composed.file_path, path);
        assert_eq!(composed.content, "Acme: 2 done");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Acme: 2 done");
        assert_eq!(composed.report.summary, "Work in progress");
    }
}

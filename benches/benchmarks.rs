//! Performance benchmarks for SDD Kit.
//!
//! This module contains benchmarks for:
//! - Specification generation with growing module counts
//! - Plan and task plan derivation
//! - Template rendering of the implementation report
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::json;

use sddkit::template::{defaults, render};
use sddkit::workflow::{
    apply_task_updates, build_technical_plan, derive_task_plan, generate_specification,
    summarize_progress,
};
use sddkit::{SpecificationInput, TaskStatus, TaskUpdate};

// ============================================================================
// Fixtures
// ============================================================================

mod fixtures {
    use super::*;

    /// Specification input with `num_modules` primary modules.
    pub fn spec_input(num_modules: usize) -> SpecificationInput {
        let common = ["Billing", "Search", "Catalog", "Checkout", "Loyalty", "Reviews", "Shipping"];
        let modules = (0..num_modules).map(|i| match common.get(i) {
            Some(name) => (*name).to_string(),
            None => format!("Module {i}"),
        });

        let mut input = SpecificationInput::new("Acme", "retail", "modernize checkout")
            .with_modules(modules);
        input.business_drivers =
            vec!["Reduce cart abandonment".to_string(), "Faster releases".to_string()];
        input.constraints = vec!["PCI scope must not grow".to_string()];
        input
    }
}

// ============================================================================
// Pipeline Benchmarks
// ============================================================================

fn bench_specification(c: &mut Criterion) {
    let mut group = c.benchmark_group("specification");

    for size in [5, 50, 500] {
        let input = fixtures::spec_input(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("generate", size), &input, |b, input| {
            b.iter(|| black_box(generate_specification(black_box(input))));
        });
    }

    group.finish();
}

fn bench_task_derivation(c: &mut Criterion) {
    let mut group = c.benchmark_group("tasks");

    for size in [5, 50, 500] {
        let spec = generate_specification(&fixtures::spec_input(size));
        let plan = build_technical_plan(&spec);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("plan", size), &spec, |b, spec| {
            b.iter(|| black_box(build_technical_plan(black_box(spec))));
        });
        group.bench_with_input(BenchmarkId::new("derive", size), &size, |b, _| {
            b.iter(|| black_box(derive_task_plan(black_box(&spec), black_box(&plan))));
        });

        let task_plan = derive_task_plan(&spec, &plan);
        let updates: Vec<_> = task_plan
            .tasks
            .iter()
            .step_by(2)
            .map(|task| TaskUpdate::status(task.id.clone(), TaskStatus::Done))
            .collect();
        group.bench_with_input(BenchmarkId::new("update_and_summarize", size), &size, |b, _| {
            b.iter(|| {
                let updated = apply_task_updates(black_box(&task_plan), black_box(&updates));
                black_box(summarize_progress(&updated))
            });
        });
    }

    group.finish();
}

// ============================================================================
// Template Benchmarks
// ============================================================================

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    let report = defaults::builtin(defaults::REPORT).unwrap_or_default();

    for size in [1, 10, 100] {
        let highlights: Vec<_> = (0..size).map(|i| format!("Highlight {i}")).collect();
        let context = json!({
            "projectName": "Acme",
            "generatedAt": "2026-01-01T00:00:00Z",
            "completedPercent": 40,
            "remainingHours": 96,
            "highlights": highlights,
            "blockers": [],
            "complianceDelta": [{ "standard": "iso-25010", "summary": "Quality attributes covered", "score": 80 }],
            "recommendations": ["Keep the release train on schedule"],
        });

        group.bench_with_input(BenchmarkId::new("report", size), &context, |b, context| {
            b.iter(|| black_box(render(black_box(report), black_box(context))));
        });
    }

    group.bench_function("plain_placeholders", |b| {
        let context = json!({ "a": "one", "b": { "c": "two" } });
        b.iter(|| black_box(render(black_box("{{a}} and {{b.c}} and {{missing}}"), &context)));
    });

    group.finish();
}

criterion_group!(pipeline_benches, bench_specification, bench_task_derivation,);

criterion_group!(template_benches, bench_render,);

criterion_main!(pipeline_benches, template_benches);

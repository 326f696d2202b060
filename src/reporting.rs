//! Turns measured cases into report entries and assembles the overview
//! report around them.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::benches::{suite_of, BenchmarkCase};
use crate::config::{CustomMetadata, RunnerConfig};
use crate::environment::{unclassified_properties, HardwareProperties, RuntimeProperties};
use crate::harness::Measured;
use crate::registry::ScoreConverterRegistry;
use crate::schema::{BenchmarkOverviewReport, BenchmarkReport};
use crate::scores::Metadata;

const UNCATEGORIZED: &str = "CUSTOM";

/// Custom metadata entries that apply to `benchmark_id`.
///
/// Entries may name the simple suite, the qualified suite or the exact
/// benchmark id; more specific entries override less specific ones.
pub fn custom_metadata_for(benchmark_id: &str, custom: &CustomMetadata) -> Metadata {
    let mut names = Vec::with_capacity(3);
    if let Some(suite) = suite_of(benchmark_id) {
        names.push(suite.name.to_string());
        names.push(suite.qualified_name());
    }
    names.push(benchmark_id.to_string());

    let mut out = Metadata::new();
    for name in names {
        if let Some(values) = custom.get(&name) {
            for (k, v) in values {
                out.insert(k.clone(), Value::String(v.clone()));
            }
        }
    }
    out
}

/// Report entry for one measured case.
///
/// Case metadata wins over custom metadata of the same key, so converter
/// inputs recorded by the data set cannot be overridden from configuration.
pub fn benchmark_report(
    case: &BenchmarkCase,
    measured: &Measured,
    registry: &ScoreConverterRegistry,
    custom: &CustomMetadata,
    fingerprint: Option<String>,
) -> BenchmarkReport {
    let mut metadata = custom_metadata_for(&case.id, custom);
    metadata.extend(case.metadata.iter().map(|(k, v)| (k.clone(), v.clone())));

    let score = measured.score();
    let converter = registry.lookup(&case.id);
    let (category, context) = suite_of(&case.id)
        .map(|s| (s.category, s.context))
        .unwrap_or((UNCATEGORIZED, ""));

    BenchmarkReport {
        name: case.id.clone(),
        description: case.description.to_string(),
        category: category.to_string(),
        context: context.to_string(),
        mode: measured.mode,
        score,
        units: measured.mode.unit().to_string(),
        min_score: measured.min(),
        max_score: measured.max(),
        std_dev: measured.std_dev(),
        measurement_count: measured.iteration_scores.len(),
        iteration_scores: measured.iteration_scores.clone(),
        total_ops: measured.total_ops,
        elapsed_ms: measured.elapsed.as_millis() as u64,
        adjusted_score: converter.and_then(|c| c.convert(score, &metadata)),
        adjusted_units: converter.map(|c| c.units().to_string()),
        converter: converter.map(|c| c.name().to_string()),
        fingerprint,
        metadata,
    }
}

pub fn benchmark_settings(config: &RunnerConfig, data_seed: u64) -> BTreeMap<String, Value> {
    let run = &config.run;
    let mut settings = BTreeMap::new();
    settings.insert("benchThreadCount".to_string(), json!(run.threads));
    if let Some(name) = &config.report_name {
        settings.insert("benchReportName".to_string(), json!(name));
    }
    settings.insert("benchForkCount".to_string(), json!(run.forks));
    settings.insert("benchMeasurementIterations".to_string(), json!(run.measurement_iterations));
    settings.insert("benchMeasurementSeconds".to_string(), json!(run.measurement_time.as_secs()));
    settings.insert("benchWarmUpIterations".to_string(), json!(run.warmup_iterations));
    settings.insert("benchWarmUpSeconds".to_string(), json!(run.warmup_time.as_secs()));
    settings.insert("benchDataSeed".to_string(), json!(data_seed));
    settings.insert("benchRunnerVersion".to_string(), json!(env!("CARGO_PKG_VERSION")));
    settings
}

pub fn environment_settings(
    hardware: &HardwareProperties,
    runtime: &RuntimeProperties,
    user_properties: &BTreeMap<String, String>,
) -> BTreeMap<String, Value> {
    let mut settings = BTreeMap::new();
    settings.insert("environment".to_string(), json!(hardware));
    settings.insert("runtimeEnvironment".to_string(), json!(runtime));
    settings.insert("unclassifiedProperties".to_string(), json!(unclassified_properties()));
    settings.insert("userDefinedProperties".to_string(), json!(user_properties));
    settings
}

/// Empty overview report carrying the run's settings and environment.
pub fn overview_report(
    config: &RunnerConfig,
    data_seed: u64,
    hardware: &HardwareProperties,
    runtime: &RuntimeProperties,
    timestamp: chrono::DateTime<chrono::Utc>,
) -> BenchmarkOverviewReport {
    let mut report = BenchmarkOverviewReport::new(timestamp);
    report.upload_status = config.upload_status;
    report.benchmark_settings = benchmark_settings(config, data_seed);
    report.environment_settings = environment_settings(hardware, runtime, &config.user_properties);
    report
}

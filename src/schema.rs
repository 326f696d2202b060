use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::UploadStatus;
use crate::harness::Mode;
use crate::scores::Metadata;

pub const SCHEMA_VERSION: u32 = 1;

/// One benchmark case's result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkReport {
    pub name: String,
    pub description: String,
    pub category: String,
    pub context: String,
    pub mode: Mode,

    /// Raw engine score in `units`; absent when nothing was measured.
    pub score: Option<f64>,
    pub units: String,
    pub min_score: Option<f64>,
    pub max_score: Option<f64>,
    pub std_dev: Option<f64>,
    pub measurement_count: usize,
    pub iteration_scores: Vec<f64>,
    pub total_ops: u64,
    pub elapsed_ms: u64,

    /// Normalized score, present when a converter is registered.
    ///
    /// Non-finite values serialize as `null`.
    pub adjusted_score: Option<f64>,
    pub adjusted_units: Option<String>,
    pub converter: Option<String>,

    pub fingerprint: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkOverviewReport {
    pub schema_version: u32,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub timestamp_utc: String,
    pub upload_status: UploadStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_url: Option<String>,
    /// Results grouped by category.
    pub benchmarks: BTreeMap<String, Vec<BenchmarkReport>>,
    pub environment_settings: BTreeMap<String, serde_json::Value>,
    pub benchmark_settings: BTreeMap<String, serde_json::Value>,
}

impl BenchmarkOverviewReport {
    pub fn new(timestamp: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            timestamp: timestamp.timestamp_millis(),
            timestamp_utc: timestamp.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            upload_status: UploadStatus::default(),
            report_url: None,
            benchmarks: BTreeMap::new(),
            environment_settings: BTreeMap::new(),
            benchmark_settings: BTreeMap::new(),
        }
    }

    pub fn add_benchmark(&mut self, report: BenchmarkReport) {
        self.benchmarks
            .entry(report.category.clone())
            .or_default()
            .push(report);
    }

    pub fn results(&self) -> impl Iterator<Item = &BenchmarkReport> {
        self.benchmarks.values().flatten()
    }

    pub fn result_count(&self) -> usize {
        self.benchmarks.values().map(Vec::len).sum()
    }

    pub fn find(&self, name: &str) -> Option<&BenchmarkReport> {
        self.results().find(|r| r.name == name)
    }

    pub fn is_eligible_for_storing_externally(&self) -> bool {
        self.result_count() > 0
    }
}

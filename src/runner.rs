//! One complete benchmark run: select suites, measure every case, build the
//! report, seal it, optionally upload it and persist it.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::benches::{find_suite, Suite, CATALOG};
use crate::config::RunnerConfig;
use crate::dataset::Workspace;
use crate::delivery::DeliveryService;
use crate::environment::{HardwareProperties, RuntimeProperties};
use crate::error::Result;
use crate::harness::{format_interval, measure_fn};
use crate::registry::ScoreConverterRegistry;
use crate::reporting;
use crate::schema::BenchmarkOverviewReport;
use crate::security::{SealedReport, SecurityBuilder};

pub const REPORT_JSON_FILE: &str = "report.json";
pub const REPORT_CYB_FILE: &str = "report.cyb";

const BANNER: &str =
    "-----------------------------------------------------------------------------------------";

#[derive(Debug)]
pub struct RunOutcome {
    pub report: BenchmarkOverviewReport,
    /// Envelope as written to `report.cyb`; `None` when sealing failed.
    pub sealed: Option<SealedReport>,
    /// Paths written; empty when persisting failed.
    pub written: Vec<PathBuf>,
    pub elapsed: Duration,
}

/// Suites to run, in request order without duplicates.
///
/// Unknown names are logged and skipped. `None` selects the whole catalog.
pub fn select_suites(requested: Option<&[String]>) -> Vec<&'static Suite> {
    let Some(requested) = requested else {
        info!("execute all benchmarks found in the catalog");
        return CATALOG.iter().collect();
    };

    info!(classes = ?requested, "execute benchmarks found in configuration");
    let mut selected: Vec<&'static Suite> = Vec::new();
    for name in requested {
        match find_suite(name) {
            Some(suite) if selected.iter().any(|s| s.name == suite.name) => {
                debug!(suite = suite.name, "suite requested more than once");
            }
            Some(suite) => selected.push(suite),
            None => error!(suite = %name, "benchmark suite not found in the catalog"),
        }
    }
    info!(count = selected.len(), "suites registered for execution");
    selected
}

/// Execute a run with `config`, writing report files into `out_dir`.
///
/// Failures while sealing, uploading or persisting are logged together with
/// the manual submission hint and do not fail the run.
pub fn run(config: &RunnerConfig, out_dir: &Path) -> Result<RunOutcome> {
    let start = Instant::now();
    info!("{BANNER}");
    info!("                                 Starting CyBench benchmarks");
    info!("{BANNER}");

    info!("collecting hardware, software information...");
    let hardware = HardwareProperties::capture();
    info!("collecting runtime properties...");
    let runtime = RuntimeProperties::capture();

    let registry = ScoreConverterRegistry::standard();
    let mut security = SecurityBuilder::new();
    let seed = config.seed.unwrap_or_else(rand::random);
    let mut report =
        reporting::overview_report(config, seed, &hardware, &runtime, chrono::Utc::now());

    let suites = select_suites(config.benchmark_classes.as_deref());
    let workspace = Workspace::create(seed)?;
    debug!(
        path = %workspace.path().display(),
        seed,
        random_file_size = workspace.random_file_size(),
        "benchmark workspace created"
    );
    let pool = config.run.thread_pool()?;

    info!("executing benchmarks...");
    for suite in suites {
        let cases = match (suite.build)(&workspace) {
            Ok(cases) => cases,
            Err(e) => {
                error!(suite = suite.name, error = %e, "failed to prepare benchmark suite");
                continue;
            }
        };

        for case in cases {
            info!(benchmark = %case.id, mode = ?case.mode, "running");
            let measured = match measure_fn(&pool, &config.run, case.mode, &case.op) {
                Ok(m) => m,
                Err(e) => {
                    error!(benchmark = %case.id, error = %e, "benchmark failed");
                    continue;
                }
            };
            let fingerprint = security.register_benchmark(&case.id, &suite.qualified_name());
            let entry = reporting::benchmark_report(
                &case,
                &measured,
                &registry,
                &config.custom_metadata,
                Some(fingerprint),
            );
            info!(
                benchmark = %entry.name,
                score = ?entry.score,
                units = %entry.units,
                adjusted = ?entry.adjusted_score,
                "finished"
            );
            report.add_benchmark(entry);
        }
    }
    info!(count = report.result_count(), "benchmark finished, executed tests count");

    let mut sealed = None;
    let mut written = Vec::new();
    match deliver(config, &mut report, &security, out_dir, workspace) {
        Ok((envelope, paths)) => {
            sealed = Some(envelope);
            written = paths;
        }
        Err(e) => {
            error!(error = %e, "failed to save test results");
            manual_submission_hint(config);
        }
    }

    let elapsed = start.elapsed();
    info!("{BANNER}");
    info!(
        "                                 Finished CyBench Benchmarking ({})",
        format_interval(elapsed)
    );
    info!("{BANNER}");

    Ok(RunOutcome {
        report,
        sealed,
        written,
        elapsed,
    })
}

fn manual_submission_hint(config: &RunnerConfig) {
    info!(
        "You may submit your report '{}' manually at {}",
        REPORT_CYB_FILE, config.upload_url
    );
}

/// Seal, optionally upload, then persist both files and drop the data set.
fn deliver(
    config: &RunnerConfig,
    report: &mut BenchmarkOverviewReport,
    security: &SecurityBuilder,
    out_dir: &Path,
    workspace: Workspace,
) -> Result<(SealedReport, Vec<PathBuf>)> {
    info!("generating JSON report...");
    let sealed = security.seal(report)?;
    let sealed_json = sealed.to_json()?;

    if report.is_eligible_for_storing_externally() && config.send_report {
        let delivery = DeliveryService::new(&config.upload_url)?;
        let url = delivery.send_report_for_storing(&sealed_json)?;
        info!(url = %url, "report stored");
        report.report_url = Some(url);
    } else {
        if !report.is_eligible_for_storing_externally() {
            warn!("report holds no results and is not uploaded");
        }
        manual_submission_hint(config);
    }

    fs::create_dir_all(out_dir)?;
    let json_path = out_dir.join(REPORT_JSON_FILE);
    info!(path = %json_path.display(), "saving test results");
    fs::write(&json_path, serde_json::to_string_pretty(report)?)?;

    let cyb_path = out_dir.join(REPORT_CYB_FILE);
    info!(path = %cyb_path.display(), "saving sealed test results");
    fs::write(&cyb_path, &sealed_json)?;

    info!("removing all temporary auto-generated files...");
    workspace.cleanup()?;

    Ok((sealed, vec![json_path, cyb_path]))
}

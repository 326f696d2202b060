use std::hint::black_box;
use std::io;
use std::time::{Duration, Instant};

use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};

/// Upper bound on score slots reserved before measuring.
const MAX_PREALLOCATED_SCORES: usize = 4_096;

/// How a case's raw score is expressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mode {
    /// Operations per second, summed over benchmark threads.
    Throughput,
    /// Milliseconds per operation, averaged over benchmark threads.
    AverageTime,
}

impl Mode {
    pub fn unit(&self) -> &'static str {
        match self {
            Mode::Throughput => "ops/s",
            Mode::AverageTime => "ms/op",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOptions {
    /// Separate full executions (warm-up + measurement) of each case.
    pub forks: u32,
    pub warmup_iterations: u32,
    pub warmup_time: Duration,
    pub measurement_iterations: u32,
    pub measurement_time: Duration,
    pub threads: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            forks: 1,
            warmup_iterations: 1,
            warmup_time: Duration::from_secs(5),
            measurement_iterations: 5,
            measurement_time: Duration::from_secs(10),
            threads: 1,
        }
    }
}

impl RunOptions {
    pub fn thread_pool(&self) -> io::Result<ThreadPool> {
        ThreadPoolBuilder::new()
            .num_threads(self.threads.max(1))
            .thread_name(|i| format!("cybench-worker-{i}"))
            .build()
            .map_err(io::Error::other)
    }
}

/// Aggregated outcome of measuring one case.
#[derive(Clone, Debug, PartialEq)]
pub struct Measured {
    pub mode: Mode,
    /// Raw score of every measurement iteration, all forks in order.
    pub iteration_scores: Vec<f64>,
    pub total_ops: u64,
    pub elapsed: Duration,
}

impl Measured {
    /// Primary score: mean over all measurement iterations.
    pub fn score(&self) -> Option<f64> {
        if self.iteration_scores.is_empty() {
            return None;
        }
        Some(self.iteration_scores.iter().sum::<f64>() / self.iteration_scores.len() as f64)
    }

    pub fn min(&self) -> Option<f64> {
        self.iteration_scores.iter().copied().reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.iteration_scores.iter().copied().reduce(f64::max)
    }

    /// Sample standard deviation; `None` below two samples.
    pub fn std_dev(&self) -> Option<f64> {
        let n = self.iteration_scores.len();
        if n < 2 {
            return None;
        }
        let mean = self.score()?;
        let var = self
            .iteration_scores
            .iter()
            .map(|s| (s - mean).powi(2))
            .sum::<f64>()
            / (n - 1) as f64;
        Some(var.sqrt())
    }
}

#[derive(Clone, Copy, Debug)]
struct ThreadSample {
    ops: u64,
    elapsed: Duration,
}

/// Run `op` until `budget` is spent; always at least once.
fn run_for<F>(budget: Duration, op: &F) -> io::Result<ThreadSample>
where
    F: Fn() -> io::Result<()> + Sync,
{
    let start = Instant::now();
    let mut ops = 0u64;
    loop {
        black_box(op()?);
        ops += 1;
        if start.elapsed() >= budget {
            break;
        }
    }
    Ok(ThreadSample {
        ops,
        elapsed: start.elapsed(),
    })
}

fn iteration<F>(pool: &ThreadPool, budget: Duration, op: &F) -> io::Result<Vec<ThreadSample>>
where
    F: Fn() -> io::Result<()> + Sync,
{
    pool.broadcast(|_| run_for(budget, op)).into_iter().collect()
}

fn iteration_score(mode: Mode, samples: &[ThreadSample]) -> f64 {
    match mode {
        Mode::Throughput => samples
            .iter()
            .map(|s| s.ops as f64 / s.elapsed.as_secs_f64().max(f64::MIN_POSITIVE))
            .sum(),
        Mode::AverageTime => {
            let per_thread: Vec<f64> = samples
                .iter()
                .map(|s| s.elapsed.as_secs_f64() * 1_000.0 / s.ops.max(1) as f64)
                .collect();
            per_thread.iter().sum::<f64>() / per_thread.len().max(1) as f64
        }
    }
}

fn score_capacity(opts: &RunOptions) -> usize {
    (opts.forks.max(1) as usize)
        .saturating_mul(opts.measurement_iterations as usize)
        .min(MAX_PREALLOCATED_SCORES)
}

/// Measure `op` under `opts`: per fork, warm-up iterations are run and
/// discarded, then each measurement iteration contributes one raw score.
pub fn measure_fn<F>(
    pool: &ThreadPool,
    opts: &RunOptions,
    mode: Mode,
    op: F,
) -> io::Result<Measured>
where
    F: Fn() -> io::Result<()> + Sync,
{
    let start = Instant::now();
    let mut iteration_scores = Vec::with_capacity(score_capacity(opts));
    let mut total_ops = 0u64;

    for _fork in 0..opts.forks.max(1) {
        for _ in 0..opts.warmup_iterations {
            iteration(pool, opts.warmup_time, &op)?;
        }
        for _ in 0..opts.measurement_iterations {
            let samples = iteration(pool, opts.measurement_time, &op)?;
            total_ops += samples.iter().map(|s| s.ops).sum::<u64>();
            iteration_scores.push(iteration_score(mode, &samples));
        }
    }

    Ok(Measured {
        mode,
        iteration_scores,
        total_ops,
        elapsed: start.elapsed(),
    })
}

/// `HH:MM:SS.mmm`
pub fn format_interval(elapsed: Duration) -> String {
    let total_ms = elapsed.as_millis();
    let hr = total_ms / 3_600_000;
    let min = (total_ms / 60_000) % 60;
    let sec = (total_ms / 1_000) % 60;
    let ms = total_ms % 1_000;
    format!("{hr:02}:{min:02}:{sec:02}.{ms:03}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn quick_opts(threads: usize) -> RunOptions {
        RunOptions {
            forks: 2,
            warmup_iterations: 1,
            warmup_time: Duration::ZERO,
            measurement_iterations: 3,
            measurement_time: Duration::ZERO,
            threads,
        }
    }

    #[test]
    fn zero_budget_runs_each_iteration_once_per_thread() {
        let opts = quick_opts(2);
        let pool = opts.thread_pool().unwrap();
        let calls = AtomicU64::new(0);

        let m = measure_fn(&pool, &opts, Mode::Throughput, || {
            calls.fetch_add(1, Ordering::Relaxed);
            Ok(())
        })
        .unwrap();

        // 2 forks * (1 warm-up + 3 measured) * 2 threads
        assert_eq!(calls.load(Ordering::Relaxed), 16);
        assert_eq!(m.iteration_scores.len(), 6);
        assert_eq!(m.total_ops, 12);
        assert!(m.score().unwrap() > 0.0);
    }

    #[test]
    fn average_time_reports_milliseconds_per_op() {
        let opts = RunOptions {
            forks: 1,
            warmup_iterations: 0,
            measurement_iterations: 1,
            measurement_time: Duration::ZERO,
            ..quick_opts(1)
        };
        let pool = opts.thread_pool().unwrap();

        let m = measure_fn(&pool, &opts, Mode::AverageTime, || {
            std::thread::sleep(Duration::from_millis(20));
            Ok(())
        })
        .unwrap();

        assert!(m.score().unwrap() >= 20.0);
        assert_eq!(m.mode.unit(), "ms/op");
    }

    #[test]
    fn failing_op_aborts_measurement() {
        let opts = quick_opts(1);
        let pool = opts.thread_pool().unwrap();
        let err = measure_fn(&pool, &opts, Mode::Throughput, || Err(io::Error::other("disk gone")))
            .unwrap_err();
        assert_eq!(err.to_string(), "disk gone");
    }

    #[test]
    fn statistics_over_iterations() {
        let m = Measured {
            mode: Mode::Throughput,
            iteration_scores: vec![2.0, 4.0, 6.0],
            total_ops: 0,
            elapsed: Duration::ZERO,
        };
        assert_eq!(m.score(), Some(4.0));
        assert_eq!(m.min(), Some(2.0));
        assert_eq!(m.max(), Some(6.0));
        assert_eq!(m.std_dev(), Some(2.0));

        let empty = Measured {
            iteration_scores: vec![],
            ..m
        };
        assert_eq!(empty.score(), None);
        assert_eq!(empty.std_dev(), None);
    }

    #[test]
    fn huge_iteration_counts_do_not_overflow_capacity() {
        let opts = RunOptions {
            forks: u32::MAX,
            measurement_iterations: u32::MAX,
            ..RunOptions::default()
        };
        assert_eq!(score_capacity(&opts), MAX_PREALLOCATED_SCORES);
        assert_eq!(score_capacity(&quick_opts(1)), 6);

        let no_forks = RunOptions {
            forks: 0,
            ..quick_opts(1)
        };
        assert_eq!(score_capacity(&no_forks), 3);
    }

    #[test]
    fn interval_formatting() {
        assert_eq!(format_interval(Duration::from_millis(0)), "00:00:00.000");
        assert_eq!(
            format_interval(Duration::from_millis(3_723_045)),
            "01:02:03.045"
        );
    }
}

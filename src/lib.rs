pub mod benches;
pub mod config;
pub mod dataset;
pub mod delivery;
pub mod environment;
pub mod error;
pub mod harness;
pub mod registry;
pub mod reporting;
pub mod runner;
pub mod schema;
pub mod scores;
pub mod security;

pub use config::RunnerConfig;
pub use error::{Result, RunnerError};
pub use registry::ScoreConverterRegistry;
pub use runner::{run, RunOutcome};
pub use schema::BenchmarkOverviewReport;
pub use scores::ScoreConverter;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use cybench_runner::config::{config_path_from_args, RunnerConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cybench-runner")]
#[command(about = "Runs the CyBench suites and produces a scored, signed report")]
struct Args {
    /// `key=value` tokens; `cfg|config|configuration=<path>` selects the
    /// properties file.
    #[arg(value_name = "KEY=VALUE")]
    args: Vec<String>,

    /// Endpoint receiving the sealed report.
    #[arg(long, env = "CYBENCH_UPLOAD_URL")]
    upload_url: Option<String>,

    /// Directory for `report.json` and `report.cyb`.
    #[arg(long, value_name = "DIR", default_value = ".")]
    out_dir: PathBuf,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("cybench_runner=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let args = Args::parse();
    let config_path = config_path_from_args(&args.args);
    let mut config = RunnerConfig::load(config_path.as_deref())
        .context("failed to load runner configuration")?;
    if let Some(url) = args.upload_url {
        config.upload_url = url;
    }

    cybench_runner::run(&config, &args.out_dir).context("benchmark run failed")?;
    Ok(())
}

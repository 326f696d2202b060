//! Runner configuration.
//!
//! Settings come from a `.properties` file chosen on the command line with a
//! `cfg=<path>` (or `config=`/`configuration=`) token. Unset or empty
//! properties fall back to the defaults below.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, RunnerError};
use crate::harness::RunOptions;

pub const DEFAULT_CONFIG_PATH: &str = "config/cybench-launcher.properties";
pub const DEFAULT_UPLOAD_URL: &str = "https://www.gocypher.com/cybench/upload";

/// Property names understood by the runner.
pub mod keys {
    pub const SHOULD_SEND_REPORT: &str = "sendReport";
    pub const BENCHMARK_REPORT_NAME: &str = "reportName";
    pub const BENCHMARK_RUN_CLASSES: &str = "benchmarkClasses";
    pub const NUMBER_OF_FORKS: &str = "numberOfBenchmarkForks";
    pub const MEASUREMENT_ITERATIONS: &str = "measurementIterations";
    pub const MEASUREMENT_SECONDS: &str = "measurementSeconds";
    pub const WARM_UP_ITERATIONS: &str = "warmUpIterations";
    pub const WARM_UP_SECONDS: &str = "warmUpSeconds";
    pub const BENCHMARK_RUN_THREAD_COUNT: &str = "runThreadCount";
    pub const REPORT_UPLOAD_STATUS: &str = "reportUploadStatus";
    pub const CUSTOM_BENCHMARK_METADATA: &str = "customBenchmarkMetadata";
    pub const BENCHMARK_DATA_SEED: &str = "benchmarkDataSeed";
    /// Any key containing this marker is copied into the report verbatim.
    pub const CUSTOM_PROPERTY_MARKER: &str = "customProp";
}

const CONFIG_ARG_KEYS: &[&str] = &["cfg", "config", "configuration"];

/// Find the configuration path among `key=value` command line tokens.
///
/// The last well-formed token wins. A config token without a value is
/// reported and ignored.
pub fn config_path_from_args<S: AsRef<str>>(args: &[S]) -> Option<PathBuf> {
    let mut path = None;
    for arg in args {
        let arg = arg.as_ref().trim();
        let (key, value) = match arg.split_once('=') {
            Some((k, v)) => (k.trim().trim_start_matches('-'), Some(v.trim())),
            None => (arg.trim_start_matches('-'), None),
        };
        if !CONFIG_ARG_KEYS.contains(&key) {
            info!(argument = arg, "ignoring unrecognised argument");
            continue;
        }
        match value {
            Some(v) if !v.is_empty() => path = Some(PathBuf::from(v)),
            _ => info!(
                "incorrect format, configuration path syntax: \
                 cfg|config|configuration='full-file-path'"
            ),
        }
    }
    path
}

/// Flat key/value settings in Java `.properties` syntax.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Properties {
    entries: BTreeMap<String, String>,
}

impl Properties {
    /// Parse `key=value` / `key:value` lines. `#` and `!` start comments; a
    /// trailing backslash continues the value on the next line.
    pub fn parse(text: &str) -> Self {
        let mut entries = BTreeMap::new();
        let mut pending = String::new();

        for raw in text.lines() {
            let line = raw.trim();
            let comment = line.is_empty() || line.starts_with('#') || line.starts_with('!');
            if pending.is_empty() && comment {
                continue;
            }
            if let Some(stripped) = line.strip_suffix('\\') {
                pending.push_str(stripped);
                continue;
            }
            pending.push_str(line);
            let logical = std::mem::take(&mut pending);

            let split = logical.find(['=', ':']);
            let (key, value) = match split {
                Some(i) => (&logical[..i], &logical[i + 1..]),
                None => (logical.as_str(), ""),
            };
            let key = key.trim();
            if !key.is_empty() {
                entries.insert(key.to_string(), value.trim().to_string());
            }
        }

        Self { entries }
    }

    pub fn load(path: &Path) -> io::Result<Self> {
        Ok(Self::parse(&fs::read_to_string(path)?))
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Value of `key` when present and non-empty.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn parse_or<T: std::str::FromStr>(
        &self,
        key: &str,
        default: T,
        expected: &'static str,
    ) -> Result<T> {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => raw.parse().map_err(|_| RunnerError::InvalidProperty {
                key: key.to_string(),
                value: raw.to_string(),
                expected,
            }),
        }
    }
}

/// Benchmark name -> (key -> value), from the custom metadata mini-format.
pub type CustomMetadata = BTreeMap<String, BTreeMap<String, String>>;

/// Split on `sep`, dropping trailing empty fields.
fn fields(text: &str, sep: char) -> Vec<&str> {
    let mut parts: Vec<&str> = text.split(sep).collect();
    while parts.last().is_some_and(|p| p.is_empty()) {
        parts.pop();
    }
    parts
}

/// Parse `name1=key1:val1,key2:val2;name2=key1:val1`.
///
/// An entry must hold exactly one `=` and a pair exactly one `:`; anything
/// else is skipped.
pub fn parse_custom_benchmark_metadata(raw: &str) -> CustomMetadata {
    let mut out = CustomMetadata::new();
    for entry in raw.split(';') {
        let (name, pairs) = match fields(entry, '=').as_slice() {
            [name, pairs] => (*name, *pairs),
            _ => continue,
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let values = out.entry(name.to_string()).or_default();
        for pair in pairs.split(',') {
            if let [k, v] = fields(pair, ':').as_slice() {
                let k = k.trim();
                if !k.is_empty() {
                    values.insert(k.to_string(), v.trim().to_string());
                }
            }
        }
    }
    out
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    #[default]
    Public,
    Private,
}

impl UploadStatus {
    /// `private` selects private; anything else, including absence, is public.
    pub fn from_property(raw: Option<&str>) -> Self {
        match raw {
            Some("private") => UploadStatus::Private,
            _ => UploadStatus::Public,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RunnerConfig {
    pub run: RunOptions,
    /// Explicit suite selection; `None` runs the whole catalog.
    pub benchmark_classes: Option<Vec<String>>,
    pub custom_metadata: CustomMetadata,
    pub report_name: Option<String>,
    pub upload_status: UploadStatus,
    pub send_report: bool,
    pub user_properties: BTreeMap<String, String>,
    pub upload_url: String,
    /// Seed of the IO data set; `None` draws a fresh one per run.
    pub seed: Option<u64>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            run: RunOptions::default(),
            benchmark_classes: None,
            custom_metadata: CustomMetadata::new(),
            report_name: None,
            upload_status: UploadStatus::Public,
            send_report: true,
            user_properties: BTreeMap::new(),
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
            seed: None,
        }
    }
}

impl RunnerConfig {
    pub fn from_properties(props: &Properties) -> Result<Self> {
        let defaults = RunOptions::default();
        let run = RunOptions {
            forks: props.parse_or(keys::NUMBER_OF_FORKS, defaults.forks, "a positive integer")?,
            measurement_iterations: props.parse_or(
                keys::MEASUREMENT_ITERATIONS,
                defaults.measurement_iterations,
                "a non-negative integer",
            )?,
            measurement_time: Duration::from_secs(props.parse_or(
                keys::MEASUREMENT_SECONDS,
                defaults.measurement_time.as_secs(),
                "a number of seconds",
            )?),
            warmup_iterations: props.parse_or(
                keys::WARM_UP_ITERATIONS,
                defaults.warmup_iterations,
                "a non-negative integer",
            )?,
            warmup_time: Duration::from_secs(props.parse_or(
                keys::WARM_UP_SECONDS,
                defaults.warmup_time.as_secs(),
                "a number of seconds",
            )?),
            threads: props.parse_or(
                keys::BENCHMARK_RUN_THREAD_COUNT,
                defaults.threads,
                "a positive integer",
            )?,
        };

        let benchmark_classes = props.get(keys::BENCHMARK_RUN_CLASSES).map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        });

        let custom_metadata = props
            .get(keys::CUSTOM_BENCHMARK_METADATA)
            .map(parse_custom_benchmark_metadata)
            .unwrap_or_default();

        let send_report = props
            .get(keys::SHOULD_SEND_REPORT)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(true);

        let user_properties = props
            .iter()
            .filter(|(k, _)| k.contains(keys::CUSTOM_PROPERTY_MARKER))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let seed = props
            .get(keys::BENCHMARK_DATA_SEED)
            .map(|raw| {
                raw.parse().map_err(|_| RunnerError::InvalidProperty {
                    key: keys::BENCHMARK_DATA_SEED.to_string(),
                    value: raw.to_string(),
                    expected: "an unsigned 64-bit integer",
                })
            })
            .transpose()?;

        Ok(Self {
            run,
            benchmark_classes,
            custom_metadata,
            report_name: props.get(keys::BENCHMARK_REPORT_NAME).map(String::from),
            upload_status: UploadStatus::from_property(props.get(keys::REPORT_UPLOAD_STATUS)),
            send_report,
            user_properties,
            seed,
            ..Self::default()
        })
    }

    /// Load from `path`, or the default location when `None`.
    ///
    /// A missing file is not an error: the defaults apply.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
        let props = match Properties::load(path) {
            Ok(props) => {
                info!(path = %path.display(), "loaded configuration");
                props
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "configuration file not found, using defaults");
                Properties::default()
            }
            Err(e) => return Err(e.into()),
        };
        Self::from_properties(&props)
    }
}

//! Environment captured alongside benchmark results.
//!
//! Everything is best effort: values that cannot be read on the current
//! platform are left empty rather than failing the run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sysinfo::System;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwareProperties {
    pub cpu_model: Option<String>,
    pub available_processors: usize,
    pub total_memory_bytes: Option<u64>,
    pub os_name: String,
    pub os_version: Option<String>,
    pub kernel_version: Option<String>,
    pub arch: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeProperties {
    pub runner_name: String,
    pub runner_version: String,
    pub target_os: String,
    pub target_arch: String,
    pub target_family: String,
    pub pointer_width: u32,
    pub build_profile: String,
}

impl HardwareProperties {
    pub fn capture() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu();
        sys.refresh_memory();

        let cpu_model = sys
            .cpus()
            .first()
            .map(|cpu| cpu.brand().trim().to_string())
            .filter(|brand| !brand.is_empty());
        let total_memory_bytes = Some(sys.total_memory()).filter(|bytes| *bytes > 0);

        Self {
            cpu_model,
            available_processors: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or_else(|_| sys.cpus().len().max(1)),
            total_memory_bytes,
            os_name: System::name().unwrap_or_else(|| std::env::consts::OS.to_string()),
            os_version: System::long_os_version().or_else(System::os_version),
            kernel_version: System::kernel_version(),
            arch: std::env::consts::ARCH.to_string(),
        }
    }
}

impl RuntimeProperties {
    pub fn capture() -> Self {
        Self {
            runner_name: env!("CARGO_PKG_NAME").to_string(),
            runner_version: env!("CARGO_PKG_VERSION").to_string(),
            target_os: std::env::consts::OS.to_string(),
            target_arch: std::env::consts::ARCH.to_string(),
            target_family: std::env::consts::FAMILY.to_string(),
            pointer_width: usize::BITS,
            build_profile: if cfg!(debug_assertions) { "debug" } else { "release" }.to_string(),
        }
    }
}

/// Process facts that fit neither hardware nor runtime.
pub fn unclassified_properties() -> BTreeMap<String, String> {
    let mut props = BTreeMap::new();
    if let Ok(dir) = std::env::current_dir() {
        props.insert("workingDirectory".to_string(), dir.display().to_string());
    }
    if let Ok(exe) = std::env::current_exe() {
        props.insert("executable".to_string(), exe.display().to_string());
    }
    props.insert("processId".to_string(), std::process::id().to_string());
    props.insert(
        "tempDirectory".to_string(),
        std::env::temp_dir().display().to_string(),
    );
    for (key, var) in [("locale", "LANG"), ("timezone", "TZ")] {
        if let Ok(v) = std::env::var(var) {
            props.insert(key.to_string(), v);
        }
    }
    if let Some(host) = System::host_name() {
        props.insert("hostname".to_string(), host);
    }
    props
}

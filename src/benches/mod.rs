//! Statically known benchmark suites.
//!
//! A suite groups related cases under one fully qualified name (the
//! identifier prefix of its cases). The runner selects suites by that name or
//! by the simple suite name.

use std::io;

use crate::dataset::Workspace;
use crate::harness::Mode;
use crate::registry::BENCHMARK_NAMESPACE;
use crate::scores::Metadata;

pub mod numbers;

pub type BenchOp = Box<dyn Fn() -> io::Result<()> + Send + Sync>;

/// One measurable benchmark case.
pub struct BenchmarkCase {
    pub id: String,
    pub mode: Mode,
    pub description: &'static str,
    /// Facts about the run the converters may need (e.g. data file size).
    pub metadata: Metadata,
    pub op: BenchOp,
}

impl BenchmarkCase {
    pub fn new(
        id: String,
        mode: Mode,
        description: &'static str,
        op: impl Fn() -> io::Result<()> + Send + Sync + 'static,
    ) -> Self {
        Self {
            id,
            mode,
            description,
            metadata: Metadata::new(),
            op: Box::new(op),
        }
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}

impl std::fmt::Debug for BenchmarkCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BenchmarkCase")
            .field("id", &self.id)
            .field("mode", &self.mode)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// Catalog entry: a suite and how to build its cases.
#[derive(Clone, Copy, Debug)]
pub struct Suite {
    pub name: &'static str,
    pub category: &'static str,
    pub context: &'static str,
    pub build: fn(&Workspace) -> io::Result<Vec<BenchmarkCase>>,
}

impl Suite {
    pub fn qualified_name(&self) -> String {
        format!("{BENCHMARK_NAMESPACE}.{}", self.name)
    }

    pub fn matches(&self, requested: &str) -> bool {
        requested == self.name || requested == self.qualified_name()
    }
}

pub const CATALOG: &[Suite] = &[
    numbers::SUITE,
    strings::SUITE,
    io_seek::SYNC_SUITE,
    io_seek::ASYNC_SUITE,
    io_copy::SYNC_SUITE,
    io_copy::ASYNC_SUITE,
];

pub fn find_suite(requested: &str) -> Option<&'static Suite> {
    CATALOG.iter().find(|s| s.matches(requested))
}

/// Suite owning `benchmark_id`, if it belongs to the catalog.
pub fn suite_of(benchmark_id: &str) -> Option<&'static Suite> {
    let (suite, _method) = benchmark_id.rsplit_once('.')?;
    CATALOG.iter().find(|s| s.qualified_name() == suite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ScoreConverterRegistry;

    #[test]
    fn suites_resolve_by_simple_or_qualified_name() {
        assert_eq!(find_suite("NumberBenchmarks").unwrap().name, "NumberBenchmarks");
        let qualified = format!("{BENCHMARK_NAMESPACE}.StringBenchmarks");
        assert_eq!(find_suite(&qualified).unwrap().name, "StringBenchmarks");
        assert!(find_suite("NumberBenchmark").is_none());
        assert!(find_suite("com.example.NumberBenchmarks").is_none());
    }

    #[test]
    fn every_case_has_a_converter() {
        let registry = ScoreConverterRegistry::standard();
        let ws = Workspace::create(1).unwrap();

        // Building the non-IO suites is cheap; the IO ones only need their ids.
        let mut ids = Vec::new();
        for suite in [numbers::SUITE, strings::SUITE] {
            ids.extend((suite.build)(&ws).unwrap().into_iter().map(|c| c.id));
        }
        ids.extend(io_seek::case_ids(&io_seek::SYNC_SUITE));
        ids.extend(io_seek::case_ids(&io_seek::ASYNC_SUITE));
        ids.extend(io_copy::case_ids(&io_copy::SYNC_SUITE));
        ids.extend(io_copy::case_ids(&io_copy::ASYNC_SUITE));

        assert_eq!(ids.len(), registry.len());
        for id in &ids {
            assert!(registry.lookup(id).is_some(), "no converter for {id}");
            assert!(suite_of(id).is_some(), "no suite for {id}");
        }
    }
}

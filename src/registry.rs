//! Benchmark identifier -> score converter mapping.

use std::collections::HashMap;

use crate::scores::ScoreConverter;

/// Package prefix shared by every built-in benchmark identifier.
pub const BENCHMARK_NAMESPACE: &str = "com.gocypher.benchmarks.rust.client.tests";

const SEEK_METHODS: &[&str] = &[
    "seekAndReadFileUsingSmallChunks",
    "seekAndReadFileUsingHugeChunks",
    "seekAndWriteFileUsingSmallChunks",
    "seekAndWriteFileUsingHugeChunks",
    "seekAndCopyFileUsingSmallChunks",
    "seekAndCopyFileUsingHugeChunks",
];

const COPY_METHODS: &[&str] = &[
    "copyFileUsingMappedByteBuffer",
    "copyFileUsingFileStreamAndSmallChunks",
    "copyFileUsingFileStreamAndHugeChunks",
    "copyFileUsingBufferedStreamAndSmallChunks",
    "copyFileUsingBufferedStreamAndHugeChunks",
    "copyFileUsingDirectBufferedStreamAndSmallChunks",
    "copyFileUsingDirectBufferedStreamAndHugeChunks",
];

const STRING_METHODS: &[&str] = &[
    "stringConcatMultiChars",
    "stringBufferConcatMultiChars",
    "stringReplaceAll",
    "stringBufferReplaceAll",
    "findRegexCompiled",
    "findRegexUnCompiled",
];

const NUMBER_METHODS: &[&str] = &[
    "generateAndAddDoubleNumbers",
    "generateAndAddAtomicNumbers",
    "generateAndAddBigDecimalNumbers",
    "generateAndLogarithmDoubleNumbers",
    "generateAndPowerDoubleNumbers",
];

const STANDARD_MAPPING: &[(&str, &[&str], ScoreConverter)] = &[
    ("IOAsyncFileSeekBenchmarks", SEEK_METHODS, ScoreConverter::IoSeek),
    ("IOSyncFileSeekBenchmarks", SEEK_METHODS, ScoreConverter::IoSyncSeek),
    ("IOAsyncAPIComparisonBenchmarks", COPY_METHODS, ScoreConverter::IoReadWrite),
    ("IOSyncAPIComparisonBenchmarks", COPY_METHODS, ScoreConverter::IoSyncReadWrite),
    ("StringBenchmarks", STRING_METHODS, ScoreConverter::StringBuffer),
    ("NumberBenchmarks", NUMBER_METHODS, ScoreConverter::Numbers),
];

/// Fully qualified identifier of a built-in benchmark case.
pub fn benchmark_id(suite: &str, method: &str) -> String {
    format!("{BENCHMARK_NAMESPACE}.{suite}.{method}")
}

/// Immutable lookup table from benchmark identifier to converter.
///
/// Built once at startup and handed to whoever needs it; there is no way to
/// register further entries afterwards.
#[derive(Clone, Debug, Default)]
pub struct ScoreConverterRegistry {
    converters: HashMap<String, ScoreConverter>,
}

impl ScoreConverterRegistry {
    /// The mapping for every built-in benchmark case.
    pub fn standard() -> Self {
        Self::from_entries(STANDARD_MAPPING.iter().flat_map(|(suite, methods, converter)| {
            methods
                .iter()
                .map(move |method| (benchmark_id(suite, method), *converter))
        }))
    }

    /// Later duplicates of a key replace earlier ones.
    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, ScoreConverter)>,
        K: Into<String>,
    {
        Self {
            converters: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Exact-match lookup.
    pub fn lookup(&self, benchmark_id: &str) -> Option<ScoreConverter> {
        self.converters.get(benchmark_id).copied()
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}

//! Score converters.
//!
//! The engine reports raw numbers in the unit of the benchmark mode (ops/s
//! for throughput cases, ms/op for average-time cases). A converter turns that
//! raw number into a comparable, unit-bearing score. Converters are pure; an
//! absent raw score stays absent.
//!
//! Denominators are not guarded: a raw score of `0.0` yields `inf` (or `NaN`
//! for `0/0`) and is carried into the report unchanged.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Arbitrary per-result metadata handed to converters.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Metadata key carrying the size of the randomly sized copy source file.
pub const RANDOM_FILE_SIZE_KEY: &str = "randomFileSizeBytes";

/// Size of the file copied by the async read/write suite.
pub const HUGE_FILE_SIZE_BYTES: u64 = 256 * BYTES_PER_MB;

/// Bytes moved by one op of the seek suites (1 GiB).
pub const SEEK_VOLUME_MB: f64 = 1_024.0;

pub const BYTES_PER_MB: u64 = 1_048_576;

const MS_PER_SECOND: f64 = 1_000.0;

/// One normalization formula.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScoreConverter {
    /// Async seek suites: `1024 / (ms / 1000)`.
    IoSeek,
    /// Sync seek suites: same formula as [`ScoreConverter::IoSeek`].
    IoSyncSeek,
    /// Async copy suites: huge file MB over seconds per op.
    IoReadWrite,
    /// Sync copy suites: random file MB (from metadata) over seconds per op.
    IoSyncReadWrite,
    /// String suites: `ops/s / 1000`.
    StringBuffer,
    /// Number suites: `ops/s / 10_000`.
    Numbers,
}

impl ScoreConverter {
    pub const ALL: [ScoreConverter; 6] = [
        ScoreConverter::IoSeek,
        ScoreConverter::IoSyncSeek,
        ScoreConverter::IoReadWrite,
        ScoreConverter::IoSyncReadWrite,
        ScoreConverter::StringBuffer,
        ScoreConverter::Numbers,
    ];

    pub fn convert(&self, score: Option<f64>, metadata: &Metadata) -> Option<f64> {
        let score = score?;
        match self {
            ScoreConverter::IoSeek | ScoreConverter::IoSyncSeek => {
                Some(SEEK_VOLUME_MB / (score / MS_PER_SECOND))
            }
            ScoreConverter::IoReadWrite => {
                let file_mb = HUGE_FILE_SIZE_BYTES as f64 / BYTES_PER_MB as f64;
                Some(file_mb / (score / MS_PER_SECOND))
            }
            ScoreConverter::IoSyncReadWrite => {
                let file_bytes = metadata.get(RANDOM_FILE_SIZE_KEY)?.as_f64()?;
                let file_mb = file_bytes / BYTES_PER_MB as f64;
                Some(file_mb / (score / MS_PER_SECOND))
            }
            ScoreConverter::StringBuffer => Some(score / 1_000.0),
            ScoreConverter::Numbers => Some(score / 10_000.0),
        }
    }

    pub fn units(&self) -> &'static str {
        match self {
            ScoreConverter::IoSeek
            | ScoreConverter::IoSyncSeek
            | ScoreConverter::IoReadWrite
            | ScoreConverter::IoSyncReadWrite => "MB/s",
            ScoreConverter::StringBuffer => "k ops/s",
            ScoreConverter::Numbers => "10k ops/s",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScoreConverter::IoSeek => "IOSeekScoreConverter",
            ScoreConverter::IoSyncSeek => "IOSyncSeekScoreConverter",
            ScoreConverter::IoReadWrite => "IOReadWriteScoreConverter",
            ScoreConverter::IoSyncReadWrite => "IOSyncReadWriteScoreConverter",
            ScoreConverter::StringBuffer => "StringBufferScoreConverter",
            ScoreConverter::Numbers => "NumbersScoreConverter",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn no_meta() -> Metadata {
        Metadata::new()
    }

    #[test]
    fn seek_scales_one_gib_over_seconds() {
        let got = ScoreConverter::IoSeek.convert(Some(1024.0), &no_meta());
        assert_eq!(got, Some(1000.0));
        assert_eq!(ScoreConverter::IoSeek.units(), "MB/s");

        let got = ScoreConverter::IoSyncSeek.convert(Some(2048.0), &no_meta());
        assert_eq!(got, Some(500.0));
    }

    #[test]
    fn numbers_divide_by_ten_thousand() {
        let got = ScoreConverter::Numbers.convert(Some(50_000.0), &no_meta());
        assert_eq!(got, Some(5.0));
        assert_eq!(ScoreConverter::Numbers.units(), "10k ops/s");
    }

    #[test]
    fn strings_divide_by_thousand() {
        let got = ScoreConverter::StringBuffer.convert(Some(2_500.0), &no_meta());
        assert_eq!(got, Some(2.5));
        assert_eq!(ScoreConverter::StringBuffer.units(), "k ops/s");
    }

    #[test]
    fn sync_read_write_uses_random_file_size() {
        let mut meta = no_meta();
        meta.insert(RANDOM_FILE_SIZE_KEY.to_string(), json!(4 * BYTES_PER_MB));
        // 4 MB copied in 500 ms.
        let got = ScoreConverter::IoSyncReadWrite.convert(Some(500.0), &meta);
        assert_eq!(got, Some(8.0));
    }

    #[test]
    fn sync_read_write_without_file_size_is_absent() {
        assert_eq!(
            ScoreConverter::IoSyncReadWrite.convert(Some(500.0), &no_meta()),
            None
        );

        let mut meta = no_meta();
        meta.insert(RANDOM_FILE_SIZE_KEY.to_string(), json!("big"));
        assert_eq!(ScoreConverter::IoSyncReadWrite.convert(Some(500.0), &meta), None);
    }

    #[test]
    fn async_read_write_uses_huge_file_size() {
        // 256 MB copied in 2 s.
        let got = ScoreConverter::IoReadWrite.convert(Some(2_000.0), &no_meta());
        assert_eq!(got, Some(128.0));
    }

    #[test]
    fn absent_score_stays_absent() {
        let mut meta = no_meta();
        meta.insert(RANDOM_FILE_SIZE_KEY.to_string(), json!(BYTES_PER_MB));
        for converter in ScoreConverter::ALL {
            assert_eq!(converter.convert(None, &meta), None, "{}", converter.name());
        }
    }

    #[test]
    fn zero_score_propagates_non_finite() {
        let got = ScoreConverter::IoSeek.convert(Some(0.0), &no_meta()).unwrap();
        assert!(got.is_infinite());
        let got = ScoreConverter::Numbers.convert(Some(0.0), &no_meta()).unwrap();
        assert_eq!(got, 0.0);
    }
}

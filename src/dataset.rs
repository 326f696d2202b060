//! Data files for the IO suites.
//!
//! Files are filled with deterministic pseudo-random bytes so repeated runs
//! with the same seed read and copy identical content. Everything lives in a
//! temporary workspace directory that is removed after the report is written
//! (or when the workspace is dropped).
//!
//! # Generation
//!
//! ```text
//! file = block[0] ++ block[1] ++ ... ++ block[n-1]   (last block truncated)
//! block[i] = ChaCha8(seed_i) bytes, BLOCK_SIZE long
//! seed_i   = (seed + i) * 0x517cc1b727220a95
//! ```

use rand::Rng;
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

use crate::scores::{BYTES_PER_MB, HUGE_FILE_SIZE_BYTES};

/// Generation block size.
const BLOCK_SIZE: usize = 64 * 1024;

/// Blocks generated in parallel before being written out.
const BATCH_BLOCKS: usize = 64;

/// File traversed by the seek suites.
pub const SEEK_FILE_SIZE_BYTES: u64 = 64 * BYTES_PER_MB;

/// Bounds of the randomly sized copy source, in MB.
const RANDOM_FILE_MIN_MB: u64 = 1;
const RANDOM_FILE_MAX_MB: u64 = 16;

pub const SEEK_SOURCE_FILE: &str = "seek-source.bin";
pub const HUGE_SOURCE_FILE: &str = "huge-source.bin";
pub const RANDOM_SOURCE_FILE: &str = "random-source.bin";

fn per_block_seed(master_seed: u64, index: usize) -> u64 {
    master_seed
        .wrapping_add(index as u64)
        .wrapping_mul(0x517cc1b727220a95)
}

fn generate_block(seed: u64, len: usize) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut block = vec![0u8; len];
    rng.fill_bytes(&mut block);
    block
}

/// Write `size` deterministic bytes to `path`.
///
/// Blocks are generated in parallel batches; peak memory is bounded by
/// `BATCH_BLOCKS * BLOCK_SIZE`.
pub fn write_random_file<P: AsRef<Path>>(path: P, size: u64, seed: u64) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::with_capacity(BLOCK_SIZE, file);

    let blocks = size.div_ceil(BLOCK_SIZE as u64) as usize;
    let mut start = 0usize;
    while start < blocks {
        let end = (start + BATCH_BLOCKS).min(blocks);

        let batch: Vec<Vec<u8>> = (start..end)
            .into_par_iter()
            .map(|i| {
                let offset = i as u64 * BLOCK_SIZE as u64;
                let len = (size - offset).min(BLOCK_SIZE as u64) as usize;
                generate_block(per_block_seed(seed, i), len)
            })
            .collect();

        for block in &batch {
            writer.write_all(block)?;
        }

        start = end;
    }

    writer.flush()?;
    Ok(())
}

/// Pick the size of the randomly sized copy source: whole MB within bounds.
pub fn random_file_size(rng: &mut ChaCha8Rng) -> u64 {
    rng.gen_range(RANDOM_FILE_MIN_MB..=RANDOM_FILE_MAX_MB) * BYTES_PER_MB
}

/// Temporary directory holding the IO suites' data files.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
    seed: u64,
    random_file_size: u64,
}

impl Workspace {
    pub fn create(seed: u64) -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("cybench-").tempdir()?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Ok(Self {
            dir,
            seed,
            random_file_size: random_file_size(&mut rng),
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn random_file_size(&self) -> u64 {
        self.random_file_size
    }

    /// Path of `name` inside the workspace, without creating it.
    pub fn scratch_file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Path of a data file, generating it on first use.
    pub fn data_file(&self, name: &str, size: u64) -> io::Result<PathBuf> {
        let path = self.scratch_file(name);
        let up_to_date = path.metadata().map(|m| m.len() == size).unwrap_or(false);
        if !up_to_date {
            debug!(file = %path.display(), size, "generating benchmark data file");
            write_random_file(&path, size, self.seed)?;
        }
        Ok(path)
    }

    pub fn seek_source(&self) -> io::Result<PathBuf> {
        self.data_file(SEEK_SOURCE_FILE, SEEK_FILE_SIZE_BYTES)
    }

    pub fn huge_source(&self) -> io::Result<PathBuf> {
        self.data_file(HUGE_SOURCE_FILE, HUGE_FILE_SIZE_BYTES)
    }

    pub fn random_source(&self) -> io::Result<PathBuf> {
        self.data_file(RANDOM_SOURCE_FILE, self.random_file_size)
    }

    /// Remove the workspace and everything in it.
    pub fn cleanup(self) -> io::Result<()> {
        self.dir.close()
    }
}

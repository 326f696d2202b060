//! Benchmark fingerprints and the sealed report envelope.
//!
//! The sealed report is what gets uploaded and written to `report.cyb`: the
//! compact report JSON (hex), its SHA-256, an Ed25519 signature over the
//! payload bytes made with a per-run key, and the matching verifying key.

use std::collections::BTreeMap;

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Result, RunnerError};
use crate::schema::BenchmarkOverviewReport;

pub const SEALED_FORMAT: &str = "cybench-sealed-v1";

/// Fingerprint of a benchmark implementation as shipped in this runner.
pub fn benchmark_fingerprint(benchmark_id: &str, suite: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(benchmark_id.as_bytes());
    hasher.update(b"\n");
    hasher.update(suite.as_bytes());
    hasher.update(b"\n");
    hasher.update(env!("CARGO_PKG_VERSION").as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealedReport {
    pub format: String,
    /// Hex of the compact report JSON.
    pub payload: String,
    pub sha256: String,
    pub signature: String,
    pub public_key: String,
    pub benchmark_fingerprints: BTreeMap<String, String>,
}

impl SealedReport {
    /// Check digest and signature; returns the payload bytes.
    pub fn verify(&self) -> Result<Vec<u8>> {
        if self.format != SEALED_FORMAT {
            return Err(RunnerError::Seal(format!("unknown format {}", self.format)));
        }
        let payload = hex::decode(&self.payload)
            .map_err(|e| RunnerError::Seal(format!("payload: {e}")))?;

        let digest = hex::encode(Sha256::digest(&payload));
        if digest != self.sha256 {
            return Err(RunnerError::Seal("digest mismatch".to_string()));
        }

        let key_bytes: [u8; 32] = hex::decode(&self.public_key)
            .map_err(|e| RunnerError::Seal(format!("public key: {e}")))?
            .try_into()
            .map_err(|_| RunnerError::Seal("public key must be 32 bytes".to_string()))?;
        let key = VerifyingKey::from_bytes(&key_bytes)
            .map_err(|e| RunnerError::Seal(format!("public key: {e}")))?;

        let sig_bytes = hex::decode(&self.signature)
            .map_err(|e| RunnerError::Seal(format!("signature: {e}")))?;
        let signature = Signature::from_slice(&sig_bytes)
            .map_err(|e| RunnerError::Seal(format!("signature: {e}")))?;

        key.verify(&payload, &signature)
            .map_err(|_| RunnerError::Seal("signature invalid".to_string()))?;
        Ok(payload)
    }

    /// Verify and decode the report inside.
    pub fn open(&self) -> Result<BenchmarkOverviewReport> {
        let payload = self.verify()?;
        Ok(serde_json::from_slice(&payload)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Collects fingerprints during a run and seals the final report.
pub struct SecurityBuilder {
    signing_key: SigningKey,
    fingerprints: BTreeMap<String, String>,
}

impl SecurityBuilder {
    /// Builder with a fresh random signing key.
    pub fn new() -> Self {
        Self::from_secret(rand::random())
    }

    pub fn from_secret(secret: [u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&secret),
            fingerprints: BTreeMap::new(),
        }
    }

    pub fn register_benchmark(&mut self, benchmark_id: &str, suite: &str) -> String {
        let fp = benchmark_fingerprint(benchmark_id, suite);
        self.fingerprints.insert(benchmark_id.to_string(), fp.clone());
        fp
    }

    pub fn fingerprints(&self) -> &BTreeMap<String, String> {
        &self.fingerprints
    }

    pub fn verifying_key_hex(&self) -> String {
        hex::encode(self.signing_key.verifying_key().as_bytes())
    }

    pub fn seal(&self, report: &BenchmarkOverviewReport) -> Result<SealedReport> {
        let payload = serde_json::to_vec(report)?;
        let signature = self.signing_key.sign(&payload);
        Ok(SealedReport {
            format: SEALED_FORMAT.to_string(),
            sha256: hex::encode(Sha256::digest(&payload)),
            payload: hex::encode(&payload),
            signature: hex::encode(signature.to_bytes()),
            public_key: self.verifying_key_hex(),
            benchmark_fingerprints: self.fingerprints.clone(),
        })
    }
}

impl Default for SecurityBuilder {
    fn default() -> Self {
        Self::new()
    }
}

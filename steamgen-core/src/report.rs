//! Generation report: what a `proto` run produced.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub const REPORT_SCHEMA: &str = "steamgen.report.v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportToolInfo {
    pub name: String,
    pub version: String,
}

impl Default for ReportToolInfo {
    fn default() -> Self {
        Self {
            name: "steamgen".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// One generated target file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    pub group: String,
    pub schema: String,
    pub target: Utf8PathBuf,
    pub bytes: u64,
    pub sha256: String,

    #[serde(default)]
    pub removed_imports: u64,
    #[serde(default)]
    pub renamed_symbols: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub schema: String,
    pub tool: ReportToolInfo,

    #[serde(default)]
    pub files: Vec<GeneratedFile>,
}

impl Default for GenerationReport {
    fn default() -> Self {
        Self {
            schema: REPORT_SCHEMA.to_string(),
            tool: ReportToolInfo::default(),
            files: Vec::new(),
        }
    }
}

impl GenerationReport {
    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.bytes).sum()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#![forbid(unsafe_code)]

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::assets::encode::Encoded;
use crate::assets::error::AssetResult;
use crate::assets::io::blake3_hex;

/// File name written next to a built container.
pub const SUMMARY_FILE: &str = "assets_summary.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    pub name: String,
    pub size: u32,
}

/// Machine-readable description of a freshly written container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_files: u32,
    /// Rendered as `0xXXXX`.
    pub checksum: String,
    pub size_bytes: u64,
    pub blake3: String,
    pub files: Vec<FileSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub truncated_names: Vec<String>,
}

impl Summary {
    pub fn from_encoded(enc: &Encoded) -> Self {
        let files = enc
            .names
            .iter()
            .zip(&enc.sizes)
            .map(|(name, &size)| FileSummary {
                name: name.clone(),
                size,
            })
            .collect();

        Self {
            total_files: enc.header.entry_count,
            checksum: format!("0x{:04X}", enc.header.checksum),
            size_bytes: enc.bytes.len() as u64,
            blake3: blake3_hex(&enc.bytes),
            files,
            truncated_names: enc.warnings.iter().map(|w| w.original.clone()).collect(),
        }
    }

    pub fn write(&self, path: &Path) -> AssetResult<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

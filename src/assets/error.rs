#![forbid(unsafe_code)]

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("truncated {what}: need {needed} bytes, {available} available")]
    Truncated {
        what: &'static str,
        needed: u64,
        available: u64,
    },

    #[error("corrupt container: {0}")]
    Corrupt(String),

    #[error("name exceeds {limit} bytes: {name}")]
    NameTooLong { name: String, limit: usize },

    #[error("framing marker missing for {0}")]
    BadMarker(String),

    #[error("{0} does not fit a 32-bit field")]
    TooLarge(String),

    #[error("no entries collected from {}", .0.display())]
    NoEntries(PathBuf),

    #[error("path is outside input dir: {0}")]
    Outside(String),

    #[error("invalid: {0}")]
    Invalid(String),
}

pub type AssetResult<T> = Result<T, AssetError>;

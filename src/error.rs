//! Error types for the load/save edges of the game.
//!
//! The per-frame simulation itself is infallible: settings are validated once
//! up front, and a size tier outside the closed set cannot be constructed.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error enum for Lemonoids
#[derive(Debug, Error)]
pub enum SimError {
    /// The save file does not exist
    #[error("save file not found: {}", path.display())]
    SaveMissing { path: PathBuf },

    /// The save file exists but its record could not be parsed
    #[error("malformed save record: {line:?}")]
    SaveMalformed { line: String },

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings JSON could not be parsed
    #[error("settings parse error: {0}")]
    Settings(#[from] serde_json::Error),

    /// A size tier outside 1..=4 was requested
    #[error("unknown lemonoid size tier: {0}")]
    UnknownSizeTier(u8),

    /// A tuning value failed validation
    #[error("invalid setting '{name}': {reason}")]
    InvalidSetting { name: &'static str, reason: String },
}

/// Convenience alias: a `Result` using `SimError` as the error type.
pub type SimResult<T> = Result<T, SimError>;

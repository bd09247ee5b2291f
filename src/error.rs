use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading rule books from configuration.
///
/// Rewriting and interpretation never fail; only I/O and parsing can.
#[derive(Debug, Error)]
pub enum LsysError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON rule book: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid TOML rule book: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unsupported rule book format: {} (expected .json or .toml)", .0.display())]
    UnsupportedFormat(PathBuf),
}

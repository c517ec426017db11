//! Dataset loading errors.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to open '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{dataset} CSV parse error at line {line}: {message}")]
    Csv {
        dataset: &'static str,
        line: usize,
        message: String,
    },
}

/// Result type alias for dataset loading.
pub type LoadResult<T> = Result<T, LoadError>;

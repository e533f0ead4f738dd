use std::path::{Path, PathBuf};

/// Errors raised while resolving the scan set or loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum AshError {
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk '{}': {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Invalid ignore pattern: {0}")]
    IgnorePattern(#[from] ignore::Error),

    #[error("Invalid config file '{}': {message}", path.display())]
    Config { path: PathBuf, message: String },
}

impl AshError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        AshError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, AshError>;

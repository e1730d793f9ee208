use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Why a conversion failed.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("TeX source is empty")]
    EmptySource,

    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// MathJax rejected the input.
    #[error("failed to render TeX: {0}")]
    Render(String),

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The embedded MathJax bundle could not be loaded or misbehaved.
    #[error("MathJax engine error: {0}")]
    Engine(String),
}

impl ConversionError {
    pub(crate) fn engine(message: impl Into<String>) -> Self {
        Self::Engine(message.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

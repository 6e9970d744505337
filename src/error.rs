use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while moving a single file.
///
/// None of these escape a scan cycle: the relocator records them in
/// [`crate::utils::RelocateResult::Abandoned`] and the loop moves on.
#[derive(Error, Debug)]
pub enum JanitorError {
    #[error("{operation} failed on {path:?}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Destination already exists: {path:?}")]
    DestinationExists { path: PathBuf },

    #[error("Source file does not exist: {path:?}")]
    SourceMissing { path: PathBuf },

    #[error("Source and destination are the same file: {path:?}")]
    SamePath { path: PathBuf },

    #[error("{path:?} is not under search root {root:?}")]
    OutsideSearchRoot { path: PathBuf, root: PathBuf },
}

impl JanitorError {
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    /// True when the failure is a naming collision at the destination.
    pub fn is_collision(&self) -> bool {
        match self {
            JanitorError::DestinationExists { .. } => true,
            JanitorError::Io { source, .. } => source.kind() == std::io::ErrorKind::AlreadyExists,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, JanitorError>;

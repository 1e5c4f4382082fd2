/// Error types shared across the whole crate.
///
/// Every failure is fatal at the point of detection: the CLI layer prints a
/// single formatted message and exits with status 1. There is no retry policy
/// and no rollback beyond what has already been renamed and logged.
use std::path::PathBuf;

/// Errors that can occur while classifying, planning, renaming, or logging.
#[derive(Debug)]
pub enum RelameError {
    /// A path that was expected to exist is missing.
    NotFound { path: PathBuf },
    /// A symlink, socket, FIFO, or device was given where a regular file or
    /// directory is required.
    InvalidEntryType { path: PathBuf },
    /// The base path exists but is not a directory.
    NotADirectory { path: PathBuf },
    /// A planned destination already exists and differs from its source, or
    /// two planned pairs share a destination.
    DestinationCollision { destination: PathBuf },
    /// Two planned pairs share a source.
    SourceCollision { source: PathBuf },
    /// A type subdirectory already exists and is not empty.
    NonEmptyTarget { path: PathBuf },
    /// The operation log is unreadable, unparsable, or schema-invalid.
    LogCorrupt { path: PathBuf, reason: String },
    /// Writing the operation log failed.
    LogWriteFailure {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Any other filesystem failure.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for RelameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { path } => {
                write!(f, "No such file or directory: {}", path.display())
            }
            Self::InvalidEntryType { path } => {
                write!(
                    f,
                    "Not a regular file or directory: {}",
                    path.display()
                )
            }
            Self::NotADirectory { path } => {
                write!(f, "Not a directory: {}", path.display())
            }
            Self::DestinationCollision { destination } => {
                write!(
                    f,
                    "Destination already taken: {}",
                    destination.display()
                )
            }
            Self::SourceCollision { source } => {
                write!(f, "Source listed twice: {}", source.display())
            }
            Self::NonEmptyTarget { path } => {
                write!(
                    f,
                    "Target directory exists and is not empty: {}",
                    path.display()
                )
            }
            Self::LogCorrupt { path, reason } => {
                write!(f, "Corrupt log file {}: {}", path.display(), reason)
            }
            Self::LogWriteFailure { path, source } => {
                write!(f, "Failed to write log file {}: {}", path.display(), source)
            }
            Self::Io { path, source } => {
                write!(f, "{}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for RelameError {}

/// Result type used throughout the crate.
pub type RelameResult<T> = Result<T, RelameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_collision() {
        let err = RelameError::DestinationCollision {
            destination: PathBuf::from("/tmp/x.jpg"),
        };
        assert_eq!(err.to_string(), "Destination already taken: /tmp/x.jpg");
    }

    #[test]
    fn test_display_log_corrupt() {
        let err = RelameError::LogCorrupt {
            path: PathBuf::from("/tmp/common.log"),
            reason: "not a JSON array".to_string(),
        };
        assert!(err.to_string().contains("common.log"));
        assert!(err.to_string().contains("not a JSON array"));
    }
}

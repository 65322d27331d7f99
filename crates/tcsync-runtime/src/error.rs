use std::fmt;
use std::path::PathBuf;

/// Result type for tcsync-runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that end a check run. Everything else is recorded in the
/// transcript and counted instead of being returned.
#[derive(Debug)]
pub enum Error {
    /// The diagnostic report could not be created or written
    Report {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Report { path, source } => {
                write!(f, "Failed to write report {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Report { source, .. } => Some(source),
        }
    }
}

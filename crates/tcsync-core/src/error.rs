use std::fmt;
use std::path::PathBuf;

/// Result type for tcsync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types raised while loading configuration or building inputs
#[derive(Debug)]
pub enum Error {
    /// IO operation failed
    Io(std::io::Error),

    /// Configuration file could not be parsed or resolved
    Config(String),

    /// An explicitly requested configuration file does not exist
    ConfigNotFound(PathBuf),

    /// Time range bounds are inverted or out of range
    InvalidRange(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            Error::InvalidRange(msg) => write!(f, "Invalid time range: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Config(_) | Error::ConfigNotFound(_) | Error::InvalidRange(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

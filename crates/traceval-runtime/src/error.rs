use std::fmt;
use std::path::PathBuf;

/// Result type for traceval-runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while resolving trajectory assets
#[derive(Debug)]
pub enum Error {
    /// IO operation failed
    Io(std::io::Error),

    /// Inline data URL payload was not valid base64
    Decode(base64::DecodeError),

    /// Referenced screenshot file exists neither as given nor under the
    /// trajectory root
    MissingFile(PathBuf),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Decode(err) => write!(f, "Base64 decode error: {}", err),
            Error::MissingFile(path) => {
                write!(f, "Referenced file not found: {}", path.display())
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Decode(err) => Some(err),
            Error::MissingFile(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error::Decode(err)
    }
}

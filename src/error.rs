use std::path::PathBuf;

/// The primary error type for all operations in the `volpack` crate.
#[derive(Debug)]
pub enum PackError {
    /// An I/O error occurred, typically while sampling or copying a file.
    /// Includes the path where the error happened.
    Io { source: std::io::Error, path: PathBuf },

    /// An error occurred when trying to strip a prefix from a file path.
    StripPrefix { prefix: PathBuf, path: PathBuf },

    /// Invalid or contradictory configuration (bad size string, unknown sort
    /// policy, non-positive partition count). Fatal before any packing work.
    Config(String),

    /// The overflow-resolution loop failed to drain the overflow partition
    /// after the size multiplier passed the largest single-file estimate.
    /// This indicates a defect, not a packable input.
    Convergence { passes: u64 },

    /// A zip backend error.
    Zip(zip::result::ZipError),

    /// An error during serialization of the JSON index.
    SerdeJson(serde_json::Error),

    /// An external archiver process exited with a failure status.
    Archiver { command: String, status: Option<i32> },

    /// A wrapper for any other error that doesn't fit the specific variants.
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl std::fmt::Display for PackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PackError::Io { source, path } => {
                write!(f, "I/O error on path '{}': {}", path.display(), source)
            }
            PackError::StripPrefix { prefix, path } => write!(
                f,
                "Could not strip prefix '{}' from path '{}'",
                prefix.display(),
                path.display()
            ),
            PackError::Config(msg) => write!(f, "Configuration error: {}", msg),
            PackError::Convergence { passes } => write!(
                f,
                "Overflow resolution did not converge after {} passes",
                passes
            ),
            PackError::Zip(e) => write!(f, "Zip error: {}", e),
            PackError::SerdeJson(e) => write!(f, "Serialization error: {}", e),
            PackError::Archiver { command, status } => match status {
                Some(code) => write!(f, "Archiver '{}' exited with status {}", command, code),
                None => write!(f, "Archiver '{}' was terminated by a signal", command),
            },
            PackError::Other(e) => write!(f, "An unexpected error occurred: {}", e),
        }
    }
}

impl std::error::Error for PackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PackError::Io { source, .. } => Some(source),
            PackError::Zip(e) => Some(e),
            PackError::SerdeJson(e) => Some(e),
            PackError::Other(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for PackError {
    fn from(err: serde_json::Error) -> Self {
        PackError::SerdeJson(err)
    }
}

impl From<zip::result::ZipError> for PackError {
    fn from(err: zip::result::ZipError) -> Self {
        PackError::Zip(err)
    }
}

// Generic IO error conversion that doesn't carry a path
impl From<std::io::Error> for PackError {
    fn from(err: std::io::Error) -> Self {
        PackError::Io { source: err, path: PathBuf::new() }
    }
}

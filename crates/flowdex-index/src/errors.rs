//! Host-facing error types.
//!
//! Absence of a component is never an error anywhere in this crate; these
//! errors cover only the host capability surface (enumeration, reads, watch
//! installation). The index itself logs and degrades rather than
//! propagating them.

use thiserror::Error;

/// Errors raised by a workspace host implementation.
#[derive(Error, Debug)]
pub enum HostError {
    #[error("workspace I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid glob pattern: {0}")]
    Pattern(String),

    #[error("file watching is not supported by this host: {0}")]
    WatchUnsupported(String),

    #[error("failed to install file watcher: {0}")]
    WatchFailed(String),
}

impl From<globset::Error> for HostError {
    fn from(error: globset::Error) -> Self {
        HostError::Pattern(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_error_display() {
        let error = HostError::WatchUnsupported("fake host".into());
        assert_eq!(
            format!("{}", error),
            "file watching is not supported by this host: fake host"
        );
    }
}

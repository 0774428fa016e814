//! Validated send requests
//!
//! The sender itself never checks its inputs. Callers build a [`SendRequest`]
//! first, which rejects an empty destination or a missing source before any
//! connection is attempted.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::constants::{ERR_EMPTY_HOST, ERR_NO_SOURCE, ERR_SOURCE_NOT_FILE, ERR_SOURCE_NOT_FOUND};

/// Error type for rejected send requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// Destination text is empty
    EmptyHost,
    /// No source was selected
    NoSource,
    /// Source path does not exist
    SourceNotFound(PathBuf),
    /// Source path is not a regular file
    SourceNotFile(PathBuf),
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyHost => write!(f, "{}", ERR_EMPTY_HOST),
            Self::NoSource => write!(f, "{}", ERR_NO_SOURCE),
            Self::SourceNotFound(path) => write!(f, "{}{}", ERR_SOURCE_NOT_FOUND, path.display()),
            Self::SourceNotFile(path) => write!(f, "{}{}", ERR_SOURCE_NOT_FILE, path.display()),
        }
    }
}

impl std::error::Error for RequestError {}

/// One image to push to one receiver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendRequest {
    host: String,
    port: u16,
    source: PathBuf,
}

impl SendRequest {
    /// Validate the caller's input
    ///
    /// The host is trimmed; it is resolved only when the send runs.
    pub fn new(host: &str, port: u16, source: &Path) -> Result<Self, RequestError> {
        let host = host.trim();
        if host.is_empty() {
            return Err(RequestError::EmptyHost);
        }
        if source.as_os_str().is_empty() {
            return Err(RequestError::NoSource);
        }

        let metadata = std::fs::metadata(source)
            .map_err(|_| RequestError::SourceNotFound(source.to_path_buf()))?;
        if !metadata.is_file() {
            return Err(RequestError::SourceNotFile(source.to_path_buf()));
        }

        Ok(Self {
            host: host.to_string(),
            port,
            source: source.to_path_buf(),
        })
    }

    /// Destination host, as entered
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Destination port
    pub fn port(&self) -> u16 {
        self.port
    }

    /// File whose bytes will be sent
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// `host:port` for display
    pub fn destination(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_valid_request() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("photo.png");
        std::fs::write(&source, b"png").unwrap();

        let request = SendRequest::new("  192.168.1.20 ", 9999, &source).unwrap();

        assert_eq!(request.host(), "192.168.1.20");
        assert_eq!(request.port(), 9999);
        assert_eq!(request.source(), source.as_path());
        assert_eq!(request.destination(), "192.168.1.20:9999");
    }

    #[test]
    fn test_rejects_empty_host() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("photo.png");
        std::fs::write(&source, b"png").unwrap();

        assert_eq!(
            SendRequest::new("", 9999, &source),
            Err(RequestError::EmptyHost)
        );
        assert_eq!(
            SendRequest::new("   ", 9999, &source),
            Err(RequestError::EmptyHost)
        );
    }

    #[test]
    fn test_rejects_missing_source() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing.png");

        assert_eq!(
            SendRequest::new("localhost", 9999, Path::new("")),
            Err(RequestError::NoSource)
        );
        assert_eq!(
            SendRequest::new("localhost", 9999, &missing),
            Err(RequestError::SourceNotFound(missing))
        );
    }

    #[test]
    fn test_rejects_directory_source() {
        let temp = TempDir::new().unwrap();

        assert_eq!(
            SendRequest::new("localhost", 9999, temp.path()),
            Err(RequestError::SourceNotFile(temp.path().to_path_buf()))
        );
    }
}

//! Error types for configuration operations.

use std::path::PathBuf;

use meld_core::GraphError;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Session not found
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// A node record names a unit the factory cannot create
    #[error("unknown unit '{identifier}' on node {node}")]
    UnknownUnit {
        /// Id of the node record.
        node: u32,
        /// Unit identifier that was not recognized.
        identifier: String,
    },

    /// The restored graph refused a record
    #[error("session rejected by graph: {0}")]
    Graph(#[from] GraphError),

    /// Validation errors
    #[error("validation failed: {0}")]
    Validation(#[from] crate::validation::ValidationError),

    /// Failed to create directory
    #[error("failed to create directory '{path}': {source}")]
    CreateDir {
        /// Path of the directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write file error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::WriteFile {
            path: path.into(),
            source,
        }
    }

    /// Create a create directory error.
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::CreateDir {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meld_core::{Connection, ConnectionRejection, NodeId};
    use std::error::Error;

    fn mock_io_err() -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::NotFound, "mock")
    }

    // --- factory methods ---

    #[test]
    fn read_file_factory_produces_correct_variant() {
        let err = ConfigError::read_file("/some/path", mock_io_err());
        assert!(
            matches!(err, ConfigError::ReadFile { ref path, .. } if path == std::path::Path::new("/some/path"))
        );
    }

    #[test]
    fn write_file_factory_produces_correct_variant() {
        let err = ConfigError::write_file("/out/path", mock_io_err());
        assert!(
            matches!(err, ConfigError::WriteFile { ref path, .. } if path == std::path::Path::new("/out/path"))
        );
    }

    #[test]
    fn create_dir_factory_produces_correct_variant() {
        let err = ConfigError::create_dir("/dir/path", mock_io_err());
        assert!(
            matches!(err, ConfigError::CreateDir { ref path, .. } if path == std::path::Path::new("/dir/path"))
        );
    }

    // --- Display formatting ---

    #[test]
    fn read_file_display() {
        let err = ConfigError::read_file("/a/b.toml", mock_io_err());
        let msg = err.to_string();
        assert!(msg.contains("failed to read file"), "got: {msg}");
        assert!(msg.contains("/a/b.toml"), "got: {msg}");
    }

    #[test]
    fn unknown_unit_display() {
        let err = ConfigError::UnknownUnit {
            node: 4,
            identifier: "vendor.fuzz".to_string(),
        };
        assert_eq!(err.to_string(), "unknown unit 'vendor.fuzz' on node 4");
    }

    #[test]
    fn graph_error_display_carries_reason() {
        let err = ConfigError::from(GraphError::InvalidConnection {
            connection: Connection::audio(NodeId::from_raw(1), 0, NodeId::from_raw(2), 0),
            reason: ConnectionRejection::Duplicate,
        });
        let msg = err.to_string();
        assert!(msg.contains("connection already exists"), "got: {msg}");
        assert!(msg.contains("1:out:0 -> 2:in:0"), "got: {msg}");
    }

    #[test]
    fn session_not_found_display() {
        let err = ConfigError::SessionNotFound("rig".to_string());
        assert_eq!(err.to_string(), "session not found: rig");
    }

    // --- Error::source() chain for I/O-wrapping variants ---

    #[test]
    fn read_file_source_is_some() {
        let err = ConfigError::read_file("/x", mock_io_err());
        assert!(err.source().is_some(), "ReadFile must expose I/O source");
    }

    #[test]
    fn write_file_source_is_some() {
        let err = ConfigError::write_file("/x", mock_io_err());
        assert!(err.source().is_some(), "WriteFile must expose I/O source");
    }

    #[test]
    fn unknown_unit_source_is_none() {
        let err = ConfigError::UnknownUnit {
            node: 1,
            identifier: "x".to_string(),
        };
        assert!(err.source().is_none());
    }
}

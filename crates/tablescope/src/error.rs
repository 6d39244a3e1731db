// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for locating and inspecting table files

use crate::descriptor::DescriptorField;
use filemeta::ExtractError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InspectError {
    #[error("{field} not found in table definition")]
    ParseIncomplete { field: DescriptorField },

    #[error("Root path not found for external volume '{volume}'")]
    VolumeNotFound { volume: String },

    #[error("No registered mount contains '{root_path}' (external volume '{volume}')")]
    MountNotResolved { volume: String, root_path: String },

    #[error("'{query}' matches {} files, choose one of: {}", .candidates.len(), .candidates.join(", "))]
    AmbiguousSelection {
        query: String,
        candidates: Vec<String>,
    },

    #[error("No files found in mount '{mount_id}' matching '{pattern}'")]
    NoObjectsFound { mount_id: String, pattern: String },

    #[error("No listed file matches '{query}'")]
    NoMatchingFile { query: String },

    #[error("Unsupported file type '.{extension}' for {name}")]
    UnsupportedFormat { extension: String, name: String },

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Unknown mount '{0}'")]
    UnknownMount(String),

    #[error("External service failure: {0}")]
    ExternalServiceFailure(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Extraction error: {0}")]
    Extract(ExtractError),

    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<ExtractError> for InspectError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::UnsupportedFormat { extension, name } => {
                InspectError::UnsupportedFormat { extension, name }
            }
            other => InspectError::Extract(other),
        }
    }
}

impl InspectError {
    /// Errors that end an inspection request outright. Everything else is
    /// either absorbed into partial data or a plain infrastructure failure.
    pub fn is_fatal_lookup(&self) -> bool {
        matches!(
            self,
            InspectError::VolumeNotFound { .. }
                | InspectError::MountNotResolved { .. }
                | InspectError::NoObjectsFound { .. }
                | InspectError::UnsupportedFormat { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_format_is_lifted() {
        let err: InspectError = ExtractError::unsupported("orc", "t/part.orc").into();
        assert!(matches!(err, InspectError::UnsupportedFormat { .. }));
        assert!(err.is_fatal_lookup());
        assert_eq!(err.to_string(), "Unsupported file type '.orc' for t/part.orc");
    }

    #[test]
    fn test_ambiguous_lists_candidates() {
        let err = InspectError::AmbiguousSelection {
            query: "part".to_string(),
            candidates: vec!["a.parquet".to_string(), "b.parquet".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "'part' matches 2 files, choose one of: a.parquet, b.parquet"
        );
        assert!(!err.is_fatal_lookup());
    }
}

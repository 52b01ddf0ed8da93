//! Accessor configuration

use convenient_target::VisitationOrder;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Errors loading [`AccessorOptions`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File system I/O error
    #[error("IO error reading {0}: {1}")]
    IoError(PathBuf, String),

    /// JSON parsing error
    #[error("Parse error in {0}: {1}")]
    ParseError(PathBuf, String),

    /// JSON parsing error for in-memory input
    #[error("Parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Options controlling how the accessor visits and reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessorOptions {
    /// Order in which `select()` branches are visited
    pub visitation_order: VisitationOrder,

    /// Report labels that fail to resolve to the error sink
    ///
    /// Unresolved labels are skipped either way.
    pub report_dangling_labels: bool,
}

impl Default for AccessorOptions {
    fn default() -> Self {
        Self {
            visitation_order: VisitationOrder::Declared,
            report_dangling_labels: true,
        }
    }
}

impl AccessorOptions {
    /// Options producing stable output across configurations.
    #[must_use]
    pub fn deterministic() -> Self {
        Self {
            visitation_order: VisitationOrder::ByCondition,
            ..Default::default()
        }
    }

    /// Parse options from a JSON document; missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] if the document is not valid.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load options from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IoError`] if the file cannot be read and
    /// [`ConfigError::ParseError`] if it is not valid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e.to_string()))?;

        let options = serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
        tracing::debug!(path = %path.display(), ?options, "Loaded accessor options");
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let options = AccessorOptions::default();
        assert_eq!(options.visitation_order, VisitationOrder::Declared);
        assert!(options.report_dangling_labels);
        assert_eq!(
            AccessorOptions::deterministic().visitation_order,
            VisitationOrder::ByCondition
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let options = AccessorOptions::from_json_str(r#"{"visitation_order": "by_condition"}"#)
            .unwrap();
        assert_eq!(options.visitation_order, VisitationOrder::ByCondition);
        assert!(options.report_dangling_labels);

        let options = AccessorOptions::from_json_str("{}").unwrap();
        assert_eq!(options, AccessorOptions::default());
    }

    #[test]
    fn test_invalid_json() {
        let err = AccessorOptions::from_json_str(r#"{"visitation_order": "random"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"report_dangling_labels": false}}"#).unwrap();

        let options = AccessorOptions::load(file.path()).unwrap();
        assert!(!options.report_dangling_labels);
        assert_eq!(options.visitation_order, VisitationOrder::Declared);
    }

    #[test]
    fn test_load_errors() {
        let err = AccessorOptions::load("/nonexistent/accessor.json").unwrap_err();
        assert!(matches!(err, ConfigError::IoError(..)));

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = AccessorOptions::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(..)));
    }
}

//! Target labels
//!
//! A label names exactly one target in the build graph: `//package/path:name`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Errors produced while parsing or constructing a label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LabelError {
    /// Label does not start with `//`
    #[error("invalid label '{0}': must start with '//'")]
    NotAbsolute(String),

    /// Target name is empty
    #[error("invalid label '{0}': empty target name")]
    EmptyName(String),

    /// More than one `:` separator
    #[error("invalid label '{0}': multiple ':' separators")]
    MultipleSeparators(String),

    /// Package path has an empty or absolute component
    #[error("invalid label '{0}': malformed package path")]
    MalformedPackage(String),
}

/// Unique identifier of a target.
///
/// Ordered by package, then name, so sorted label sets print the way
/// `query --output=label` does.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Label {
    package: String,
    name: String,
}

impl Label {
    /// Create a label from a package path and a target name.
    ///
    /// # Errors
    ///
    /// Returns a [`LabelError`] if the package path is malformed, the name is
    /// empty, or the name contains a `:`.
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Result<Self, LabelError> {
        let package = package.into();
        let name = name.into();
        let display = format!("//{package}:{name}");

        if name.is_empty() {
            return Err(LabelError::EmptyName(display));
        }
        if name.contains(':') || package.contains(':') {
            return Err(LabelError::MultipleSeparators(display));
        }
        if !package.is_empty() && package.split('/').any(str::is_empty) {
            return Err(LabelError::MalformedPackage(display));
        }

        Ok(Self { package, name })
    }

    /// Package path without the leading `//` (empty for the root package).
    #[must_use]
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Target name within the package.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Label of a sibling target in the same package.
    ///
    /// # Errors
    ///
    /// Returns a [`LabelError`] if `name` is not a valid target name.
    pub fn sibling(&self, name: impl Into<String>) -> Result<Self, LabelError> {
        Self::new(self.package.clone(), name)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "//{}:{}", self.package, self.name)
    }
}

impl FromStr for Label {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix("//")
            .ok_or_else(|| LabelError::NotAbsolute(s.to_string()))?;

        let (package, name) = match rest.split_once(':') {
            Some((package, name)) => (package, name),
            // `//foo/bar` is shorthand for `//foo/bar:bar`
            None => (rest, rest.rsplit('/').next().unwrap_or(rest)),
        };

        Self::new(package, name).map_err(|e| match e {
            LabelError::EmptyName(_) => LabelError::EmptyName(s.to_string()),
            LabelError::MultipleSeparators(_) => LabelError::MultipleSeparators(s.to_string()),
            LabelError::MalformedPackage(_) => LabelError::MalformedPackage(s.to_string()),
            other => other,
        })
    }
}

impl TryFrom<String> for Label {
    type Error = LabelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Label> for String {
    fn from(label: Label) -> Self {
        label.to_string()
    }
}

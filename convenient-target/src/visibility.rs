//! Package specifications and visibility
//!
//! Visibility is a set of package specifications attached to a target. The
//! provider holds it immutably so it can be shared between analysis threads.

use crate::label::Label;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Errors produced while parsing a package specification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PackageSpecError {
    /// Specification does not start with `//`
    #[error("invalid package specification '{0}': must start with '//'")]
    NotAbsolute(String),

    /// Target name other than `__pkg__` or `__subpackages__`
    #[error("invalid package specification '{0}': unsupported target name")]
    UnsupportedName(String),

    /// Package path has an empty component
    #[error("invalid package specification '{0}': malformed package path")]
    MalformedPackage(String),
}

/// A pattern over packages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageSpecification {
    /// `//...`: every package
    Everything,
    /// `//foo`: exactly one package
    Package(String),
    /// `//foo/...`: a package and everything beneath it
    AllBeneath(String),
}

impl PackageSpecification {
    /// Whether `label` lives in a package matched by this specification.
    #[must_use]
    pub fn contains(&self, label: &Label) -> bool {
        match self {
            PackageSpecification::Everything => true,
            PackageSpecification::Package(package) => label.package() == package,
            PackageSpecification::AllBeneath(package) => {
                package.is_empty()
                    || label
                        .package()
                        .strip_prefix(package.as_str())
                        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
            }
        }
    }
}

impl fmt::Display for PackageSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageSpecification::Everything => f.write_str("//..."),
            PackageSpecification::Package(package) => write!(f, "//{package}"),
            PackageSpecification::AllBeneath(package) => write!(f, "//{package}/..."),
        }
    }
}

fn check_package(spec: &str, package: &str) -> Result<(), PackageSpecError> {
    if !package.is_empty() && package.split('/').any(str::is_empty) {
        return Err(PackageSpecError::MalformedPackage(spec.to_string()));
    }
    Ok(())
}

impl FromStr for PackageSpecification {
    type Err = PackageSpecError;

    /// Accepts `//...`, `//foo`, `//foo/...`, and the label forms
    /// `//foo:__pkg__` and `//foo:__subpackages__`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix("//")
            .ok_or_else(|| PackageSpecError::NotAbsolute(s.to_string()))?;

        if rest == "..." {
            return Ok(PackageSpecification::Everything);
        }

        if let Some((package, name)) = rest.split_once(':') {
            check_package(s, package)?;
            return match name {
                "__pkg__" => Ok(PackageSpecification::Package(package.to_string())),
                "__subpackages__" if package.is_empty() => Ok(PackageSpecification::Everything),
                "__subpackages__" => Ok(PackageSpecification::AllBeneath(package.to_string())),
                _ => Err(PackageSpecError::UnsupportedName(s.to_string())),
            };
        }

        if let Some(package) = rest.strip_suffix("/...") {
            check_package(s, package)?;
            return Ok(PackageSpecification::AllBeneath(package.to_string()));
        }

        check_package(s, rest)?;
        Ok(PackageSpecification::Package(rest.to_string()))
    }
}

/// Access to the visibility of a configured target.
pub trait VisibilityProvider {
    /// The package specifications this target is visible to.
    fn visibility(&self) -> &[PackageSpecification];

    /// Whether a target in `label`'s package may depend on this one.
    fn is_visible_to(&self, label: &Label) -> bool {
        self.visibility().iter().any(|spec| spec.contains(label))
    }
}

/// Immutable visibility holder.
///
/// Specifications keep their first-seen order and duplicates are dropped on
/// construction. Clones share the same storage.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VisibilityProviderImpl {
    visibility: Arc<[PackageSpecification]>,
}

impl VisibilityProviderImpl {
    /// Create a provider from any collection of specifications.
    pub fn new(visibility: impl IntoIterator<Item = PackageSpecification>) -> Self {
        let mut seen = BTreeSet::new();
        Self {
            visibility: visibility
                .into_iter()
                .filter(|spec| seen.insert(spec.clone()))
                .collect(),
        }
    }

    /// Visible to every package.
    #[must_use]
    pub fn public() -> Self {
        Self::new([PackageSpecification::Everything])
    }

    /// Visible only within the target's own package.
    #[must_use]
    pub fn private(package: &str) -> Self {
        Self::new([PackageSpecification::Package(package.to_string())])
    }
}

impl VisibilityProvider for VisibilityProviderImpl {
    fn visibility(&self) -> &[PackageSpecification] {
        &self.visibility
    }
}

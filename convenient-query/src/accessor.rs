//! Attribute access for query functions
//!
//! [`TargetAccessor`] is what query functions such as `labels()`, `attr()`,
//! `kind()` and `tests()` use to look into targets. It resolves label-valued
//! attributes to targets through a [`TargetStore`], reporting dangling labels
//! to an [`ErrorSink`] instead of failing, and projects attribute values into
//! the strings the query language compares against.

use crate::config::AccessorOptions;
use crate::sink::ErrorSink;
use convenient_target::{
    AttributeMapperError, AttributeType, AttributeValue, ConfigurableAttributeMapper, Label,
    NonconfigurableAttributeMapper, Rule, Target, TargetNotFound, TargetStore,
    legacy_boolean_code,
};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Misuse of the accessor by its caller.
///
/// These are never reported to the error sink: they indicate a query
/// function asked a question that does not apply to the target.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    /// Attribute access on a target that is not a rule
    #[error("target '{label}' is a {kind}, not a rule")]
    NotARule {
        /// Target that was accessed
        label: Label,
        /// Its kind
        kind: String,
    },

    /// Single-value read that does not fit the attribute
    #[error(transparent)]
    Attribute(#[from] AttributeMapperError),
}

/// Result type for accessor operations.
pub type AccessResult<T> = Result<T, AccessError>;

/// Reads targets on behalf of query functions.
pub struct TargetAccessor<'a, S: ?Sized, E: ?Sized> {
    store: &'a S,
    sink: &'a E,
    options: AccessorOptions,
}

impl<'a, S, E> TargetAccessor<'a, S, E>
where
    S: TargetStore + ?Sized,
    E: ErrorSink + ?Sized,
{
    /// Create an accessor with default options.
    pub fn new(store: &'a S, sink: &'a E) -> Self {
        Self {
            store,
            sink,
            options: AccessorOptions::default(),
        }
    }

    /// Replace the options.
    #[must_use]
    pub fn with_options(mut self, options: AccessorOptions) -> Self {
        self.options = options;
        self
    }

    /// Current options.
    pub fn options(&self) -> &AccessorOptions {
        &self.options
    }

    /// Kind string of the target, e.g. `"cc_library rule"` or `"source file"`.
    pub fn target_kind<'t>(&self, target: &'t Target) -> &'t str {
        target.kind()
    }

    /// Canonical label string of the target.
    pub fn label(&self, target: &Target) -> String {
        target.label().to_string()
    }

    /// Targets referenced by a label-typed attribute.
    ///
    /// Every possible value of the attribute is visited. Labels that do not
    /// resolve are reported to the sink as `error_prefix` followed by the
    /// lookup error, attributed to `caller`, and skipped; the remaining
    /// labels are still resolved. Unresolvable computed defaults are skipped.
    ///
    /// Returns an empty list if the rule has no such attribute.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::NotARule`] if `target` is not a rule.
    pub fn label_list_attr(
        &self,
        caller: &dyn fmt::Display,
        target: &Target,
        attr_name: &str,
        error_prefix: &str,
    ) -> AccessResult<Vec<Arc<Target>>> {
        let rule = require_rule(target)?;
        let mapper = self.mapper(rule);
        let Some(attr_type) = mapper.attribute_type(attr_name) else {
            return Ok(Vec::new());
        };
        trace!(rule = %rule.label(), attr_name, %attr_type, "Visiting label attribute");

        let mut result = Vec::new();
        for value in mapper.visit_attribute(attr_name).into_iter().flatten() {
            for label in value.labels() {
                match self.store.target(label) {
                    Ok(dep) => result.push(dep),
                    Err(e) => self.dangling(caller, error_prefix, &e),
                }
            }
        }

        Ok(result)
    }

    fn dangling(&self, caller: &dyn fmt::Display, error_prefix: &str, error: &TargetNotFound) {
        debug!(label = %error.label, caller = %caller, "Skipping unresolved label");
        if self.options.report_dangling_labels {
            self.sink.report(caller, format!("{error_prefix}{error}"));
        }
    }

    /// The value of a nonconfigurable `list(string)` attribute.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::NotARule`] for non-rule targets and
    /// [`AccessError::Attribute`] if the attribute is undeclared, not a
    /// `list(string)`, configurable, or unset.
    pub fn string_list_attr(&self, target: &Target, attr_name: &str) -> AccessResult<Vec<String>> {
        let rule = require_rule(target)?;
        match NonconfigurableAttributeMapper::of(rule).get(attr_name, AttributeType::StringList)? {
            AttributeValue::StringList(list) => Ok(list.clone()),
            other => Err(type_mismatch(rule, attr_name, AttributeType::StringList, other)),
        }
    }

    /// The value of a nonconfigurable `string` attribute.
    ///
    /// # Errors
    ///
    /// Same as [`TargetAccessor::string_list_attr`], for `string`.
    pub fn string_attr(&self, target: &Target, attr_name: &str) -> AccessResult<String> {
        let rule = require_rule(target)?;
        match NonconfigurableAttributeMapper::of(rule).get(attr_name, AttributeType::String)? {
            AttributeValue::String(s) => Ok(s.clone()),
            other => Err(type_mismatch(rule, attr_name, AttributeType::String, other)),
        }
    }

    /// Every possible value of an attribute as a string, for `attr()`.
    ///
    /// Booleans are rendered `"1"`/`"0"` and tristates `"-1"`/`"0"`/`"1"`,
    /// the integer forms older query output used. Other values use their
    /// natural string form. Values that cannot be resolved without a
    /// configuration are kept as `None`.
    ///
    /// Returns an empty list if the rule has no such attribute.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::NotARule`] if `target` is not a rule.
    pub fn attr_as_strings(
        &self,
        target: &Target,
        attr_name: &str,
    ) -> AccessResult<Vec<Option<String>>> {
        let rule = require_rule(target)?;
        Ok(self
            .mapper(rule)
            .visit_attribute(attr_name)
            .into_iter()
            .map(|value| value.map(legacy_string))
            .collect())
    }

    /// Whether the target is a rule.
    pub fn is_rule(&self, target: &Target) -> bool {
        target.is_rule()
    }

    /// Whether the target is a test rule.
    pub fn is_test_rule(&self, target: &Target) -> bool {
        target.as_rule().is_some_and(Rule::is_test)
    }

    /// Whether the target is a `test_suite`.
    pub fn is_test_suite(&self, target: &Target) -> bool {
        target.as_rule().is_some_and(Rule::is_test_suite)
    }

    fn mapper<'r>(&self, rule: &'r Rule) -> ConfigurableAttributeMapper<'r> {
        ConfigurableAttributeMapper::of(rule).with_order(self.options.visitation_order)
    }
}

fn require_rule(target: &Target) -> AccessResult<&Rule> {
    target.as_rule().ok_or_else(|| AccessError::NotARule {
        label: target.label().clone(),
        kind: target.kind().to_string(),
    })
}

fn type_mismatch(
    rule: &Rule,
    attr_name: &str,
    requested: AttributeType,
    value: &AttributeValue,
) -> AccessError {
    AccessError::Attribute(AttributeMapperError::TypeMismatch {
        rule: rule.label().clone(),
        attribute: attr_name.to_string(),
        requested,
        actual: value.attribute_type(),
    })
}

fn legacy_string(value: &AttributeValue) -> String {
    match value {
        AttributeValue::Boolean(b) => legacy_boolean_code(*b).to_string(),
        AttributeValue::Tristate(t) => t.legacy_code().to_string(),
        other => other.to_string(),
    }
}

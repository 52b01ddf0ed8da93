//! Attribute lookup over a rule
//!
//! Two views of a rule's attributes:
//!
//! - [`ConfigurableAttributeMapper`] enumerates every value an attribute may
//!   take across configurations (the "visitation").
//! - [`NonconfigurableAttributeMapper`] reads attributes that have exactly one
//!   value regardless of configuration.

use crate::attribute::{AttributeSource, AttributeType, AttributeValue, SelectBranch};
use crate::label::Label;
use crate::target::Rule;
use serde::{Deserialize, Serialize};

/// Order in which `select()` branches are visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitationOrder {
    /// Branch order as written in the build file
    #[default]
    Declared,
    /// Sorted by condition label, `//conditions:default` last
    ByCondition,
}

/// Errors from single-value attribute reads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttributeMapperError {
    /// The rule class has no such attribute
    #[error("rule '{rule}' has no attribute '{attribute}'")]
    Undeclared {
        /// Rule that was read
        rule: Label,
        /// Requested attribute
        attribute: String,
    },

    /// Declared type differs from the requested one
    #[error("attribute '{attribute}' of rule '{rule}' is of type {actual}, not {requested}")]
    TypeMismatch {
        /// Rule that was read
        rule: Label,
        /// Requested attribute
        attribute: String,
        /// Type the caller asked for
        requested: AttributeType,
        /// Declared type
        actual: AttributeType,
    },

    /// The value depends on the configuration
    #[error("attribute '{attribute}' of rule '{rule}' is configurable")]
    Configurable {
        /// Rule that was read
        rule: Label,
        /// Requested attribute
        attribute: String,
    },

    /// No value and no default
    #[error("attribute '{attribute}' of rule '{rule}' has no value")]
    Unset {
        /// Rule that was read
        rule: Label,
        /// Requested attribute
        attribute: String,
    },
}

/// Visits every possible value of a rule's attributes.
#[derive(Debug, Clone, Copy)]
pub struct ConfigurableAttributeMapper<'a> {
    rule: &'a Rule,
    order: VisitationOrder,
}

impl<'a> ConfigurableAttributeMapper<'a> {
    /// Mapper over `rule` visiting branches in declared order.
    #[must_use]
    pub fn of(rule: &'a Rule) -> Self {
        Self {
            rule,
            order: VisitationOrder::Declared,
        }
    }

    /// Change the branch visitation order.
    #[must_use]
    pub fn with_order(mut self, order: VisitationOrder) -> Self {
        self.order = order;
        self
    }

    /// Declared type of `name`, or `None` if the rule class lacks it.
    #[must_use]
    pub fn attribute_type(&self, name: &str) -> Option<AttributeType> {
        self.rule.attribute_definition(name).map(|a| a.attr_type())
    }

    /// Every value `name` may take.
    ///
    /// `None` entries stand for values that cannot be resolved without a
    /// configuration: unresolvable computed defaults, and label attributes
    /// with neither a value nor a default. Undeclared attributes visit
    /// nothing.
    #[must_use]
    pub fn visit_attribute(&self, name: &str) -> Vec<Option<&'a AttributeValue>> {
        let Some(attribute) = self.rule.attribute_definition(name) else {
            return Vec::new();
        };

        match self.rule.explicit_source(name) {
            Some(AttributeSource::Value(value)) => vec![Some(value)],
            Some(AttributeSource::Select(branches)) => self
                .ordered(branches)
                .into_iter()
                .map(|branch| Some(&branch.value))
                .collect(),
            Some(AttributeSource::ComputedDefault(values)) => {
                values.iter().map(Option::as_ref).collect()
            }
            None => vec![attribute.default_value()],
        }
    }

    fn ordered(&self, branches: &'a [SelectBranch]) -> Vec<&'a SelectBranch> {
        let mut ordered: Vec<&SelectBranch> = branches.iter().collect();
        if self.order == VisitationOrder::ByCondition {
            ordered.sort_by(|a, b| {
                a.is_default()
                    .cmp(&b.is_default())
                    .then_with(|| a.condition.cmp(&b.condition))
            });
        }
        ordered
    }
}

/// Reads attributes whose value does not depend on the configuration.
#[derive(Debug, Clone, Copy)]
pub struct NonconfigurableAttributeMapper<'a> {
    rule: &'a Rule,
}

impl<'a> NonconfigurableAttributeMapper<'a> {
    /// Mapper over `rule`.
    #[must_use]
    pub fn of(rule: &'a Rule) -> Self {
        Self { rule }
    }

    /// The single value of `name`, checked against `requested`.
    ///
    /// # Errors
    ///
    /// Returns an [`AttributeMapperError`] if the attribute is undeclared,
    /// declared with another type, set with a `select()` or computed
    /// default, or has no value at all.
    pub fn get(
        &self,
        name: &str,
        requested: AttributeType,
    ) -> Result<&'a AttributeValue, AttributeMapperError> {
        let rule = self.rule;
        let attribute =
            rule.attribute_definition(name)
                .ok_or_else(|| AttributeMapperError::Undeclared {
                    rule: rule.label().clone(),
                    attribute: name.to_string(),
                })?;

        if attribute.attr_type() != requested {
            return Err(AttributeMapperError::TypeMismatch {
                rule: rule.label().clone(),
                attribute: name.to_string(),
                requested,
                actual: attribute.attr_type(),
            });
        }

        match rule.explicit_source(name) {
            Some(AttributeSource::Value(value)) => Ok(value),
            Some(AttributeSource::Select(_) | AttributeSource::ComputedDefault(_)) => {
                Err(AttributeMapperError::Configurable {
                    rule: rule.label().clone(),
                    attribute: name.to_string(),
                })
            }
            None => attribute
                .default_value()
                .ok_or_else(|| AttributeMapperError::Unset {
                    rule: rule.label().clone(),
                    attribute: name.to_string(),
                }),
        }
    }
}

//! Targets and rules
//!
//! A [`Target`] is a node of the build graph. Only [`Rule`] targets carry
//! attributes; files and package groups are leaves as far as attribute
//! queries are concerned.

use crate::attribute::{Attribute, AttributeSource, AttributeType, AttributeValue, SelectBranch};
use crate::label::Label;
use crate::visibility::{PackageSpecification, VisibilityProviderImpl};
use std::collections::BTreeMap;

/// Errors produced while assembling a rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// Value set for an attribute the rule class does not declare
    #[error("rule '{rule}': no such attribute '{attribute}'")]
    UndeclaredAttribute {
        /// Rule being built
        rule: Label,
        /// Offending attribute
        attribute: String,
    },

    /// Attribute declared twice
    #[error("rule '{rule}': attribute '{attribute}' declared more than once")]
    DuplicateAttribute {
        /// Rule being built
        rule: Label,
        /// Offending attribute
        attribute: String,
    },

    /// Value of the wrong type
    #[error("rule '{rule}': attribute '{attribute}' expects {expected}, got {actual}")]
    TypeMismatch {
        /// Rule being built
        rule: Label,
        /// Offending attribute
        attribute: String,
        /// Declared type
        expected: AttributeType,
        /// Type of the supplied value
        actual: AttributeType,
    },

    /// `select()` on a nonconfigurable attribute
    #[error("rule '{rule}': attribute '{attribute}' is not configurable")]
    NotConfigurable {
        /// Rule being built
        rule: Label,
        /// Offending attribute
        attribute: String,
    },
}

/// A target with a rule class and typed, named attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    label: Label,
    rule_class: String,
    kind: String,
    attributes: BTreeMap<String, Attribute>,
    sources: BTreeMap<String, AttributeSource>,
}

impl Rule {
    /// Start building a rule of the given class.
    pub fn builder(label: Label, rule_class: impl Into<String>) -> RuleBuilder {
        RuleBuilder {
            label,
            rule_class: rule_class.into(),
            attributes: Vec::new(),
            sources: Vec::new(),
        }
    }

    /// Rule label.
    #[must_use]
    pub fn label(&self) -> &Label {
        &self.label
    }

    /// Rule class name, e.g. `cc_library`.
    #[must_use]
    pub fn rule_class(&self) -> &str {
        &self.rule_class
    }

    /// Attribute declaration, if the rule class has one with this name.
    #[must_use]
    pub fn attribute_definition(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// All attribute declarations, sorted by name.
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.values()
    }

    /// Value source set explicitly on this rule.
    ///
    /// `None` means the attribute takes its declared default.
    #[must_use]
    pub fn explicit_source(&self, name: &str) -> Option<&AttributeSource> {
        self.sources.get(name)
    }

    /// Whether the rule set `name` explicitly.
    #[must_use]
    pub fn is_attribute_set(&self, name: &str) -> bool {
        self.sources.contains_key(name)
    }

    /// Test rules are those whose class name ends in `_test`.
    #[must_use]
    pub fn is_test(&self) -> bool {
        self.rule_class.ends_with("_test")
    }

    /// Whether this is a `test_suite`.
    #[must_use]
    pub fn is_test_suite(&self) -> bool {
        self.rule_class == "test_suite"
    }
}

/// Builder for [`Rule`], validating values against declarations.
#[derive(Debug, Clone)]
pub struct RuleBuilder {
    label: Label,
    rule_class: String,
    attributes: Vec<Attribute>,
    sources: Vec<(String, AttributeSource)>,
}

impl RuleBuilder {
    /// Declare an attribute.
    #[must_use]
    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Set a plain value.
    #[must_use]
    pub fn value(self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.source(name, AttributeSource::Value(value))
    }

    /// Set a `select()` over configuration conditions.
    #[must_use]
    pub fn select(self, name: impl Into<String>, branches: Vec<SelectBranch>) -> Self {
        self.source(name, AttributeSource::Select(branches))
    }

    /// Set the possible values of a computed default.
    #[must_use]
    pub fn computed_default(
        self,
        name: impl Into<String>,
        values: Vec<Option<AttributeValue>>,
    ) -> Self {
        self.source(name, AttributeSource::ComputedDefault(values))
    }

    fn source(mut self, name: impl Into<String>, source: AttributeSource) -> Self {
        self.sources.push((name.into(), source));
        self
    }

    /// Validate and assemble the rule.
    ///
    /// # Errors
    ///
    /// Returns a [`RuleError`] if an attribute is declared twice, a value is
    /// set for an undeclared attribute, a value or default has the wrong type,
    /// or a nonconfigurable attribute is given a `select()`.
    pub fn build(self) -> Result<Rule, RuleError> {
        let label = self.label;
        let mut attributes = BTreeMap::new();

        for attribute in self.attributes {
            if let Some(default) = attribute.default_value() {
                check_type(&label, &attribute, default)?;
            }
            let name = attribute.name().to_string();
            if attributes.insert(name.clone(), attribute).is_some() {
                return Err(RuleError::DuplicateAttribute {
                    rule: label,
                    attribute: name,
                });
            }
        }

        let mut sources = BTreeMap::new();
        for (name, source) in self.sources {
            let Some(attribute) = attributes.get(&name) else {
                return Err(RuleError::UndeclaredAttribute {
                    rule: label,
                    attribute: name,
                });
            };
            if !attribute.is_configurable() && !matches!(source, AttributeSource::Value(_)) {
                return Err(RuleError::NotConfigurable {
                    rule: label,
                    attribute: name,
                });
            }
            for value in source.concrete_values() {
                check_type(&label, attribute, value)?;
            }
            let _ = sources.insert(name, source);
        }

        let kind = format!("{} rule", self.rule_class);
        Ok(Rule {
            label,
            rule_class: self.rule_class,
            kind,
            attributes,
            sources,
        })
    }
}

fn check_type(rule: &Label, attribute: &Attribute, value: &AttributeValue) -> Result<(), RuleError> {
    if value.attribute_type() == attribute.attr_type() {
        Ok(())
    } else {
        Err(RuleError::TypeMismatch {
            rule: rule.clone(),
            attribute: attribute.name().to_string(),
            expected: attribute.attr_type(),
            actual: value.attribute_type(),
        })
    }
}

/// A source file checked into a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    /// File label
    pub label: Label,
}

/// A file produced by a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    /// File label
    pub label: Label,
    /// Rule that generates the file
    pub generating_rule: Label,
}

/// A named set of packages, used in visibility declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageGroup {
    /// Group label
    pub label: Label,
    /// Packages in the group
    pub packages: Vec<PackageSpecification>,
}

impl PackageGroup {
    /// Visibility granted by referencing this group.
    #[must_use]
    pub fn visibility(&self) -> VisibilityProviderImpl {
        VisibilityProviderImpl::new(self.packages.iter().cloned())
    }
}

/// A node of the build graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A rule instance
    Rule(Rule),
    /// A source file
    InputFile(InputFile),
    /// A generated file
    OutputFile(OutputFile),
    /// A package group
    PackageGroup(PackageGroup),
}

impl Target {
    /// Target label.
    #[must_use]
    pub fn label(&self) -> &Label {
        match self {
            Target::Rule(rule) => rule.label(),
            Target::InputFile(file) => &file.label,
            Target::OutputFile(file) => &file.label,
            Target::PackageGroup(group) => &group.label,
        }
    }

    /// Kind string as printed by `query --output=label_kind`.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Target::Rule(rule) => &rule.kind,
            Target::InputFile(_) => "source file",
            Target::OutputFile(_) => "generated file",
            Target::PackageGroup(_) => "package group",
        }
    }

    /// The rule, if this target is one.
    #[must_use]
    pub fn as_rule(&self) -> Option<&Rule> {
        match self {
            Target::Rule(rule) => Some(rule),
            _ => None,
        }
    }

    /// Whether this target is a rule.
    #[must_use]
    pub fn is_rule(&self) -> bool {
        matches!(self, Target::Rule(_))
    }
}

impl From<Rule> for Target {
    fn from(rule: Rule) -> Self {
        Target::Rule(rule)
    }
}

impl From<InputFile> for Target {
    fn from(file: InputFile) -> Self {
        Target::InputFile(file)
    }
}

impl From<OutputFile> for Target {
    fn from(file: OutputFile) -> Self {
        Target::OutputFile(file)
    }
}

impl From<PackageGroup> for Target {
    fn from(group: PackageGroup) -> Self {
        Target::PackageGroup(group)
    }
}

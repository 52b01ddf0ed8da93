//! Typed attribute definitions and values
//!
//! Every rule attribute has a declared [`AttributeType`] drawn from a closed
//! set. Values are carried as [`AttributeValue`], a tagged union with one
//! variant per type, so dispatch on the attribute kind is an exhaustive match.

use crate::label::Label;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Condition label that selects the default branch of a `select()`.
pub const DEFAULT_CONDITION: &str = "//conditions:default";

/// Declared type of a rule attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    /// A single string
    String,
    /// A list of strings
    StringList,
    /// A single dependency label
    Label,
    /// A list of dependency labels
    LabelList,
    /// A boolean, queried as `"1"`/`"0"`
    Boolean,
    /// A three-valued flag, queried as `"-1"`/`"0"`/`"1"`
    Tristate,
    /// A signed integer
    Integer,
    /// A string to string dictionary
    StringDict,
    /// A dictionary keyed by dependency labels
    LabelKeyedStringDict,
    /// A single declared output file
    Output,
    /// A list of declared output files
    OutputList,
}

impl AttributeType {
    /// Type name as written in rule definitions.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            AttributeType::String => "string",
            AttributeType::StringList => "list(string)",
            AttributeType::Label => "label",
            AttributeType::LabelList => "list(label)",
            AttributeType::Boolean => "boolean",
            AttributeType::Tristate => "tristate",
            AttributeType::Integer => "int",
            AttributeType::StringDict => "dict(string, string)",
            AttributeType::LabelKeyedStringDict => "dict(label, string)",
            AttributeType::Output => "output",
            AttributeType::OutputList => "list(output)",
        }
    }

    /// Whether values of this type can carry dependency edges.
    ///
    /// Outputs name files the rule produces, not targets it depends on.
    #[must_use]
    pub const fn embeds_labels(self) -> bool {
        matches!(
            self,
            AttributeType::Label | AttributeType::LabelList | AttributeType::LabelKeyedStringDict
        )
    }

    /// Value an attribute of this type takes when the rule does not set it.
    ///
    /// Label and output attributes have no implicit value.
    #[must_use]
    pub fn default_value(self) -> Option<AttributeValue> {
        match self {
            AttributeType::String => Some(AttributeValue::String(String::new())),
            AttributeType::StringList => Some(AttributeValue::StringList(Vec::new())),
            AttributeType::LabelList => Some(AttributeValue::LabelList(Vec::new())),
            AttributeType::Boolean => Some(AttributeValue::Boolean(false)),
            AttributeType::Tristate => Some(AttributeValue::Tristate(TriState::Auto)),
            AttributeType::Integer => Some(AttributeValue::Integer(0)),
            AttributeType::StringDict => Some(AttributeValue::StringDict(BTreeMap::new())),
            AttributeType::LabelKeyedStringDict => {
                Some(AttributeValue::LabelKeyedStringDict(BTreeMap::new()))
            }
            AttributeType::OutputList => Some(AttributeValue::OutputList(Vec::new())),
            AttributeType::Label | AttributeType::Output => None,
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Three-valued flag used by attributes such as `flaky` or `stamp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriState {
    /// Let the build decide
    Auto,
    /// Explicitly off
    No,
    /// Explicitly on
    Yes,
}

impl TriState {
    /// Integer code historically printed by `attr` queries.
    #[must_use]
    pub const fn legacy_code(self) -> &'static str {
        match self {
            TriState::Auto => "-1",
            TriState::No => "0",
            TriState::Yes => "1",
        }
    }

    /// Inverse of [`TriState::legacy_code`].
    #[must_use]
    pub fn from_legacy_code(code: &str) -> Option<Self> {
        match code {
            "-1" => Some(TriState::Auto),
            "0" => Some(TriState::No),
            "1" => Some(TriState::Yes),
            _ => None,
        }
    }
}

impl fmt::Display for TriState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TriState::Auto => "auto",
            TriState::No => "no",
            TriState::Yes => "yes",
        })
    }
}

/// Integer code historically printed by `attr` queries for a boolean.
#[must_use]
pub const fn legacy_boolean_code(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

/// Inverse of [`legacy_boolean_code`].
#[must_use]
pub fn boolean_from_legacy_code(code: &str) -> Option<bool> {
    match code {
        "1" => Some(true),
        "0" => Some(false),
        _ => None,
    }
}

/// A resolved attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    /// `string`
    String(String),
    /// `list(string)`
    StringList(Vec<String>),
    /// `label`
    Label(Label),
    /// `list(label)`
    LabelList(Vec<Label>),
    /// `boolean`
    Boolean(bool),
    /// `tristate`
    Tristate(TriState),
    /// `int`
    Integer(i64),
    /// `dict(string, string)`
    StringDict(BTreeMap<String, String>),
    /// `dict(label, string)`
    LabelKeyedStringDict(BTreeMap<Label, String>),
    /// `output`
    Output(Label),
    /// `list(output)`
    OutputList(Vec<Label>),
}

impl AttributeValue {
    /// The type this value belongs to.
    #[must_use]
    pub const fn attribute_type(&self) -> AttributeType {
        match self {
            AttributeValue::String(_) => AttributeType::String,
            AttributeValue::StringList(_) => AttributeType::StringList,
            AttributeValue::Label(_) => AttributeType::Label,
            AttributeValue::LabelList(_) => AttributeType::LabelList,
            AttributeValue::Boolean(_) => AttributeType::Boolean,
            AttributeValue::Tristate(_) => AttributeType::Tristate,
            AttributeValue::Integer(_) => AttributeType::Integer,
            AttributeValue::StringDict(_) => AttributeType::StringDict,
            AttributeValue::LabelKeyedStringDict(_) => AttributeType::LabelKeyedStringDict,
            AttributeValue::Output(_) => AttributeType::Output,
            AttributeValue::OutputList(_) => AttributeType::OutputList,
        }
    }

    /// Dependency labels embedded in this value, in value order.
    ///
    /// Dictionary keys come back in label order, not the order they were
    /// written in.
    #[must_use]
    pub fn labels(&self) -> Vec<&Label> {
        match self {
            AttributeValue::Label(label) => vec![label],
            AttributeValue::LabelList(labels) => labels.iter().collect(),
            AttributeValue::LabelKeyedStringDict(dict) => dict.keys().collect(),
            AttributeValue::String(_)
            | AttributeValue::StringList(_)
            | AttributeValue::Boolean(_)
            | AttributeValue::Tristate(_)
            | AttributeValue::Integer(_)
            | AttributeValue::StringDict(_)
            | AttributeValue::Output(_)
            | AttributeValue::OutputList(_) => Vec::new(),
        }
    }

    /// Borrow the string if this is a `string` value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the strings if this is a `list(string)` value.
    #[must_use]
    pub fn as_string_list(&self) -> Option<&[String]> {
        match self {
            AttributeValue::StringList(list) => Some(list),
            _ => None,
        }
    }

    /// The flag if this is a `boolean` value.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// The flag if this is a `tristate` value.
    #[must_use]
    pub const fn as_tristate(&self) -> Option<TriState> {
        match self {
            AttributeValue::Tristate(t) => Some(*t),
            _ => None,
        }
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    f.write_str("[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    f.write_str("]")
}

fn write_dict<K: fmt::Display>(f: &mut fmt::Formatter<'_>, dict: &BTreeMap<K, String>) -> fmt::Result {
    f.write_str("{")?;
    for (i, (key, value)) in dict.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{key}={value}")?;
    }
    f.write_str("}")
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::String(s) => f.write_str(s),
            AttributeValue::StringList(list) => write_list(f, list),
            AttributeValue::Label(label) | AttributeValue::Output(label) => write!(f, "{label}"),
            AttributeValue::LabelList(labels) | AttributeValue::OutputList(labels) => {
                write_list(f, labels)
            }
            AttributeValue::Boolean(b) => write!(f, "{b}"),
            AttributeValue::Tristate(t) => write!(f, "{t}"),
            AttributeValue::Integer(i) => write!(f, "{i}"),
            AttributeValue::StringDict(dict) => write_dict(f, dict),
            AttributeValue::LabelKeyedStringDict(dict) => write_dict(f, dict),
        }
    }
}

/// Declaration of an attribute on a rule class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    name: String,
    attr_type: AttributeType,
    default: Option<AttributeValue>,
    configurable: bool,
}

impl Attribute {
    /// Declare a configurable attribute with the type's implicit default.
    pub fn new(name: impl Into<String>, attr_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attr_type,
            default: attr_type.default_value(),
            configurable: true,
        }
    }

    /// Replace the default value.
    #[must_use]
    pub fn with_default(mut self, value: AttributeValue) -> Self {
        self.default = Some(value);
        self
    }

    /// Forbid `select()` on this attribute.
    #[must_use]
    pub fn nonconfigurable(mut self) -> Self {
        self.configurable = false;
        self
    }

    /// Attribute name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type.
    #[must_use]
    pub const fn attr_type(&self) -> AttributeType {
        self.attr_type
    }

    /// Value used when the rule does not set the attribute.
    #[must_use]
    pub const fn default_value(&self) -> Option<&AttributeValue> {
        self.default.as_ref()
    }

    /// Whether the attribute accepts `select()`.
    #[must_use]
    pub const fn is_configurable(&self) -> bool {
        self.configurable
    }
}

/// One `condition: value` arm of a `select()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectBranch {
    /// Configuration condition, e.g. `//config:linux`
    pub condition: Label,
    /// Value chosen when the condition matches
    pub value: AttributeValue,
}

impl SelectBranch {
    /// Create a branch for the given condition.
    pub fn new(condition: Label, value: AttributeValue) -> Self {
        Self { condition, value }
    }

    /// Whether this is the `//conditions:default` arm.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.condition.package() == "conditions" && self.condition.name() == "default"
    }
}

/// Where an attribute's value comes from on a concrete rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeSource {
    /// Same value in every configuration
    Value(AttributeValue),

    /// One value per configuration condition
    Select(Vec<SelectBranch>),

    /// Possible values of a computed default; `None` marks a value that
    /// cannot be computed without a configuration
    ComputedDefault(Vec<Option<AttributeValue>>),
}

impl AttributeSource {
    /// Every concrete value this source may take, unresolved ones excluded.
    pub fn concrete_values(&self) -> impl Iterator<Item = &AttributeValue> {
        let values: Vec<&AttributeValue> = match self {
            AttributeSource::Value(value) => vec![value],
            AttributeSource::Select(branches) => branches.iter().map(|b| &b.value).collect(),
            AttributeSource::ComputedDefault(values) => values.iter().flatten().collect(),
        };
        values.into_iter()
    }
}

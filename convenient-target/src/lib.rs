//! Target, rule and typed attribute model for build graph queries.
//!
//! This crate provides the read-only snapshot of the build graph that query
//! tooling works against:
//! - [`Label`]s identifying targets
//! - [`Target`]s, of which [`Rule`]s carry typed, named attributes
//! - A closed set of [`AttributeType`]s with matching [`AttributeValue`]s
//! - Configurable attribute sources (`select()`, computed defaults) and the
//!   mappers that enumerate their possible values
//! - The [`TargetStore`] lookup trait with an in-memory implementation
//! - Package specifications and an immutable [`VisibilityProvider`]
//!
//! # Example
//!
//! ```
//! use convenient_target::{
//!     Attribute, AttributeType, AttributeValue, ConfigurableAttributeMapper, Label, Rule,
//! };
//!
//! let lib: Label = "//app:lib".parse().unwrap();
//! let rule = Rule::builder(lib, "cc_library")
//!     .attribute(Attribute::new("deps", AttributeType::LabelList))
//!     .value(
//!         "deps",
//!         AttributeValue::LabelList(vec!["//base:strings".parse().unwrap()]),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let mapper = ConfigurableAttributeMapper::of(&rule);
//! let values = mapper.visit_attribute("deps");
//! assert_eq!(values.len(), 1);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(unused_results)]

pub mod attribute;
pub mod label;
pub mod mapper;
pub mod store;
pub mod target;
pub mod visibility;

pub use attribute::{
    Attribute, AttributeSource, AttributeType, AttributeValue, DEFAULT_CONDITION, SelectBranch,
    TriState, boolean_from_legacy_code, legacy_boolean_code,
};
pub use label::{Label, LabelError};
pub use mapper::{
    AttributeMapperError, ConfigurableAttributeMapper, NonconfigurableAttributeMapper,
    VisitationOrder,
};
pub use store::{InMemoryTargetStore, TargetNotFound, TargetStore};
pub use target::{InputFile, OutputFile, PackageGroup, Rule, RuleBuilder, RuleError, Target};
pub use visibility::{
    PackageSpecError, PackageSpecification, VisibilityProvider, VisibilityProviderImpl,
};

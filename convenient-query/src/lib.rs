//! Attribute access for build graph queries
//!
//! Query functions walk the build graph one `(target, attribute)` pair at a
//! time. This crate answers the two questions they ask:
//!
//! - **Which targets does this attribute point at?** Label-valued attributes
//!   are resolved through a [`TargetStore`](convenient_target::TargetStore).
//!   A label that resolves to nothing is reported to an [`ErrorSink`] and
//!   skipped, so one dangling dependency never loses the rest of the result.
//! - **What does this attribute say?** Values are projected to strings,
//!   with booleans and tristates in their historical integer encoding.
//!
//! # Example
//!
//! ```
//! use convenient_query::{CollectingErrorSink, TargetAccessor};
//! use convenient_target::{
//!     Attribute, AttributeType, AttributeValue, InMemoryTargetStore, Rule, TargetStore,
//! };
//!
//! let rule = Rule::builder("//app:lib".parse().unwrap(), "cc_library")
//!     .attribute(Attribute::new("testonly", AttributeType::Boolean))
//!     .value("testonly", AttributeValue::Boolean(true))
//!     .build()
//!     .unwrap();
//! let store: InMemoryTargetStore = [rule].into_iter().collect();
//! let sink = CollectingErrorSink::new();
//! let accessor = TargetAccessor::new(&store, &sink);
//!
//! let target = store.target(&"//app:lib".parse().unwrap()).unwrap();
//! let values = accessor.attr_as_strings(&target, "testonly").unwrap();
//! assert_eq!(values, vec![Some("1".to_string())]);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(unused_results)]

pub mod accessor;
pub mod config;
pub mod sink;

pub use accessor::{AccessError, AccessResult, TargetAccessor};
pub use config::{AccessorOptions, ConfigError};
pub use sink::{CollectingErrorSink, ErrorSink, ReportedError, TracingErrorSink};

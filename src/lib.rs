//! Declarative validation and sanitization of request parameters.
//!
//! This crate sits between an HTTP front end and application handlers. An
//! operator configures an ordered table of chains; each chain pairs a
//! parameter-name pattern and a request-path pattern with an ordered list of
//! rules. For every parameter of every request:
//! - **Selection**: each chain whose patterns (optionally negated) match the
//!   parameter name and path applies, in table order
//! - **Execution**: the chain's rules run in order, each seeing the values
//!   left by the previous one; a rule may rewrite the values or reject them
//! - **Modes**: an enforcing table rejects the request on the first failure,
//!   a monitoring table logs it, drops that rule's effect and carries on
//!
//! Rewritten values never modify the original request. They are exposed
//! through a [`FilteredRequest`] that reads through to the original for
//! anything untouched.
//!
//! # Core Types
//!
//! - [`ChainTable`]: Ordered chains plus the enforcing flag
//! - [`Chain`]: Name and path [`Selector`]s with a list of [`RuleDescriptor`]s
//! - [`Rule`]: Batch transform over a parameter's values
//! - [`RuleRegistry`]: Rule identifiers mapped to factories
//! - [`Loader`]: Builds tables from configuration documents
//! - [`web::filter_request`]: Filters a whole request
//!
//! # Examples
//!
//! ```
//! use param_guard::web::{filter_request, FilterOutcome, RequestAdapter};
//! use param_guard::{Loader, ParamSource, RuleRegistry};
//! use std::sync::Arc;
//!
//! let table = Loader::new(Arc::new(RuleRegistry::with_builtins()))
//!     .load_str(
//!         r#"{
//!             "enforcing": true,
//!             "chains": [
//!                 {
//!                     "param_name_pattern": "^comment$",
//!                     "path_pattern": "^/posts",
//!                     "rules": [
//!                         { "rule": "trim" },
//!                         { "rule": "sanitize-html" }
//!                     ]
//!                 },
//!                 {
//!                     "param_name_pattern": "^id$",
//!                     "path_pattern": "",
//!                     "rules": [
//!                         { "rule": "fail-if-not-regex-match", "settings": { "pattern": "^[0-9]+$" } }
//!                     ]
//!                 }
//!             ]
//!         }"#,
//!     )
//!     .expect("valid configuration");
//!
//! let request = RequestAdapter::new("req-123", "/posts/new")
//!     .with_params([("comment", " <b>hi</b><script>evil()</script> "), ("id", "42")]);
//!
//! match filter_request(&table, &request).expect("rules resolve") {
//!     FilterOutcome::Pass(filtered) => {
//!         assert_eq!(filtered.param("comment"), Some("<b>hi</b>"));
//!         assert_eq!(filtered.param("id"), Some("42"));
//!     }
//!     FilterOutcome::Reject(rejection) => panic!("rejected: {rejection}"),
//! }
//!
//! let bad = RequestAdapter::new("req-124", "/posts/new").with_params([("id", "42 OR 1=1")]);
//! let outcome = filter_request(&table, &bad).expect("rules resolve");
//! assert_eq!(outcome.public_message(), Some("Invalid parameter data"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod chain;
mod config;
mod descriptor;
mod engine;
mod error;
mod logging;
mod overlay;
mod pattern;
mod registry;
mod request;
mod rule;
pub mod rules;
mod settings;
mod snapshot;
mod table;
pub mod web;

pub use chain::Chain;
pub use config::{ChainConfig, ChainTableConfig, ConfigFormat, JsonFormat, Loader, RuleConfig};
pub use descriptor::RuleDescriptor;
pub use engine::{apply, apply_logged, Verdict};
pub use error::{
    ConfigError, ContractViolation, EngineError, Error, PatternField, Rejection, ResolutionError,
    SettingsError, ValidationFailure, GENERIC_REJECTION,
};
pub use logging::{RequestLog, UNKNOWN_REQUEST};
pub use overlay::{FilteredRequest, ParamOverlay};
pub use pattern::Selector;
pub use registry::{RuleFactory, RuleRegistry};
pub use request::ParamSource;
pub use rule::{check_present, map_present, ParamValue, PassThrough, RejectAll, Rule, Target};
pub use settings::RuleSettings;
pub use snapshot::ParameterSnapshot;
pub use table::{ChainTable, TableHandle};

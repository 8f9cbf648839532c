//! Web framework integration surface.
//!
//! This module is the boundary between HTTP frameworks and the validation
//! engine. It contains no framework-specific code; it defines the types a
//! framework integration fills in and the call that filters a request.
//!
//! Framework-specific integrations should:
//! 1. Build a [`RequestAdapter`] from the framework request, or implement
//!    [`ParamSource`](crate::ParamSource) on it directly
//! 2. Call [`filter_request`] (or [`ParamFilter::filter`] for reloadable tables)
//! 3. On [`FilterOutcome::Pass`], hand the [`FilteredRequest`](crate::FilteredRequest)
//!    to the application instead of the raw parameters
//! 4. On [`FilterOutcome::Reject`] or an error, answer with [`REJECT_STATUS`]
//!    and the generic public message; details are in the logs
//!
//! No global state is involved. The chain table flows through values.

mod adapter;
mod extract;
mod middleware;

pub use adapter::RequestAdapter;
pub use extract::ExtractParams;
pub use middleware::{filter_request, FilterOutcome, ParamFilter, REJECT_STATUS};

//! Client library for the Branch deep-link API.
//!
//! # Overview
//! Builds deep links locally as `https://{branch_domain}/a/{api_key}?{query}`
//! and, when such a link would be too long to use, registers it through the
//! remote link API instead.
//!
//! # Design
//! - `LinkResource` owns its `Config`; there is no global state.
//! - Query encoding is deterministic (sorted tokens), so equal parameters
//!   always produce byte-identical links.
//! - All network I/O goes through the `Transport` trait. `UreqTransport` is
//!   the blocking default; tests substitute their own.
//! - Remote failures never reach the caller as errors: they are passed to an
//!   optional `ErrorReporter` and replaced by a fallback value.

pub mod config;
pub mod error;
pub mod http;
pub mod link;
pub mod query;
pub mod report;
pub mod types;

pub use config::{Config, BRANCH_API_ENDPOINT};
pub use error::{ApiResponseError, BranchError};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use link::{BuiltLink, LinkResource, UpdateOutcome, LINK_LENGTH_LIMIT};
pub use query::to_query;
pub use report::{ErrorReporter, TracingReporter};
pub use types::{LinkParams, LinkRequest, LinkResponse, Params};

/// Version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

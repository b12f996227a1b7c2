//! DevOps resource library backend.
//!
//! A session-authenticated JSON API over a shared library of categorised
//! resources, with role-based visibility and user administration.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;

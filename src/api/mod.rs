//! API gateway - the only code that performs outbound HTTP on behalf of the client.
//!
//! # Components
//!
//! - [`ApiClient`]: joins paths onto the base URL, attaches the bearer token, picks the body
//!   encoding and decodes responses into typed schemas
//! - [`Transport`]: the seam a request crosses to reach the network. [`HttpTransport`] is the
//!   reqwest implementation; tests substitute mocks
//! - [`ApiError`]: the single error kind every action stores as a message
//! - [`error_message`]: ordered fallback used to turn a server error body into that message
//! - [`endpoints`]: REST paths consumed by the services
//!
//! One call issues exactly one request. There is no retry and no cancellation.

pub mod client;
pub mod endpoints;
pub mod error;
pub mod request;
pub mod transport;

pub use client::ApiClient;
pub use error::{ApiError, error_message};
pub use request::{FilePart, FormPayload, PreparedBody, PreparedRequest, RawResponse, RequestBody, RequestOptions};
pub use transport::{HttpTransport, Transport};

#[cfg(test)]
pub use transport::MockTransport;

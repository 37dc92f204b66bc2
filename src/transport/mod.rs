//! Outbound transport abstraction
//!
//! The dispatcher sends control requests through the [`ControlTransport`]
//! trait. The real implementation posts over HTTP with reqwest; tests
//! inject mocks. A non-success status and a failed connection surface
//! through the same error channel - the dispatcher does not distinguish
//! transport failures from application failures.

mod http;

pub use http::ReqwestTransport;

#[cfg(test)]
pub use http::tests::{MockTransport, PendingTransport};

use std::future::Future;

use thiserror::Error;

/// Errors that can occur while sending a control request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request could not be sent or the connection failed.
    #[error("request failed: {0}")]
    Request(String),

    /// The remote node replied with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },
}

/// Trait for posting control requests to remote nodes.
///
/// Implementations perform at most one attempt per call; retry policy
/// belongs to the caller of the dispatcher, not to the transport.
pub trait ControlTransport: Send + Sync {
    /// Posts a JSON body to `url` with the given headers.
    ///
    /// Returns `Ok(())` only when the remote node accepted the request
    /// with a success status.
    fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &str,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}

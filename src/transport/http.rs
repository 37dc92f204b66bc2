//! HTTP transport implementation over reqwest.

use std::time::Duration;

use tracing::{debug, trace, warn};

use super::TransportError;

/// Real control transport using the async reqwest client.
///
/// Connections to node agents are pooled and kept warm; the head node
/// addresses the same fleet of agents for the lifetime of the process.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport with the given request timeout.
    pub fn new(timeout_secs: u64) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(30))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| TransportError::Request(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl super::ControlTransport for ReqwestTransport {
    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &str,
    ) -> Result<(), TransportError> {
        trace!(url = url, "control request starting");

        let mut request = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .body(body.to_string());

        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = match request.send().await {
            Ok(resp) => {
                debug!(
                    url = url,
                    status = resp.status().as_u16(),
                    "control response received"
                );
                resp
            }
            Err(e) => {
                warn!(
                    url = url,
                    error = %e,
                    is_connect = e.is_connect(),
                    is_timeout = e.is_timeout(),
                    "control request failed"
                );
                return Err(TransportError::Request(format!("request failed: {}", e)));
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(url = url, status = status.as_u16(), "HTTP error status");
            return Err(TransportError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
pub mod tests {
    use super::super::{ControlTransport, TransportError};
    use std::sync::Mutex;

    /// A request recorded by [`MockTransport`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct RecordedRequest {
        pub url: String,
        pub headers: Vec<(String, String)>,
        pub body: String,
    }

    /// Mock transport with a scripted response and a request log.
    pub struct MockTransport {
        response: Result<(), TransportError>,
        requests: Mutex<Vec<RecordedRequest>>,
    }

    impl MockTransport {
        /// A transport whose every request succeeds.
        pub fn succeeding() -> Self {
            Self::with_response(Ok(()))
        }

        /// A transport whose every request fails with the given error.
        pub fn with_response(response: Result<(), TransportError>) -> Self {
            Self {
                response,
                requests: Mutex::new(Vec::new()),
            }
        }

        /// All requests sent through this transport so far.
        pub fn requests(&self) -> Vec<RecordedRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl ControlTransport for MockTransport {
        async fn post_json(
            &self,
            url: &str,
            headers: &[(&str, &str)],
            body: &str,
        ) -> Result<(), TransportError> {
            self.requests.lock().unwrap().push(RecordedRequest {
                url: url.to_string(),
                headers: headers
                    .iter()
                    .map(|(n, v)| (n.to_string(), v.to_string()))
                    .collect(),
                body: body.to_string(),
            });
            self.response.clone()
        }
    }

    /// Transport whose requests never complete.
    ///
    /// Used to test cancellation of in-flight sends.
    pub struct PendingTransport;

    impl ControlTransport for PendingTransport {
        async fn post_json(
            &self,
            _url: &str,
            _headers: &[(&str, &str)],
            _body: &str,
        ) -> Result<(), TransportError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn mock_transport_records_requests() {
        let mock = MockTransport::succeeding();

        mock.post_json("http://node1:50001/api/node1/ping", &[("X-Test", "1")], "null")
            .await
            .unwrap();

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "http://node1:50001/api/node1/ping");
        assert_eq!(requests[0].headers, vec![("X-Test".to_string(), "1".to_string())]);
        assert_eq!(requests[0].body, "null");
    }

    #[tokio::test]
    async fn mock_transport_scripted_failure() {
        let mock = MockTransport::with_response(Err(TransportError::Status {
            status: 500,
            url: "http://node1:50001/api/node1/starttask".to_string(),
        }));

        let result = mock.post_json("http://node1:50001/api/node1/starttask", &[], "{}").await;
        assert!(matches!(result, Err(TransportError::Status { status: 500, .. })));
    }
}

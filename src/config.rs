//! Communicator configuration.
//!
//! Pure data types describing the cluster identity and addressing scheme.
//! Validation happens once, at initialization; a configuration problem is
//! fatal to startup rather than surfaced per request.

use thiserror::Error;

/// Default port the monitoring sink listens on at the head node.
pub const DEFAULT_MONITORING_PORT: u16 = 9894;

/// Default port the node agent service listens on for control requests.
pub const DEFAULT_NODE_SERVICE_PORT: u16 = 50001;

/// Default timeout in seconds for outbound control requests.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Errors raised by configuration validation.
///
/// All of these prevent `initialize()` from completing. None of them are
/// recoverable per request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The cluster head node address is missing.
    #[error("cluster head node address is not configured")]
    MissingHeadNode,

    /// The inbound listener base address is empty or not an HTTP URL.
    #[error("invalid listener base address: {0}")]
    InvalidListenerBase(String),
}

/// Configuration for the communicator.
///
/// `head_node` and `listener_base` have no usable defaults and must be
/// supplied by the embedding process; everything else defaults to the
/// cluster's conventional ports.
#[derive(Debug, Clone)]
pub struct CommunicatorConfig {
    /// Address of the cluster head node. Required; checked at initialization.
    pub head_node: Option<String>,

    /// Externally reachable base address of the inbound listener,
    /// e.g. `http://headnode:50000`. Used verbatim to build the callback
    /// address embedded in every outbound request.
    pub listener_base: String,

    /// Port of the monitoring sink at the head node.
    pub monitoring_port: u16,

    /// Port the node agent service listens on.
    pub node_service_port: u16,

    /// Optional override of the host used in outbound resource addresses.
    /// When absent, the target node's own name is used as the host.
    pub service_host: Option<String>,

    /// Timeout in seconds for outbound control requests.
    pub request_timeout_secs: u64,
}

impl CommunicatorConfig {
    /// Creates a configuration with the required fields and default ports.
    pub fn new(head_node: impl Into<String>, listener_base: impl Into<String>) -> Self {
        Self {
            head_node: Some(head_node.into()),
            listener_base: listener_base.into(),
            monitoring_port: DEFAULT_MONITORING_PORT,
            node_service_port: DEFAULT_NODE_SERVICE_PORT,
            service_host: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    /// Sets the service host override used for outbound resource addresses.
    pub fn with_service_host(mut self, host: impl Into<String>) -> Self {
        self.service_host = Some(host.into());
        self
    }

    /// Sets the monitoring sink port.
    pub fn with_monitoring_port(mut self, port: u16) -> Self {
        self.monitoring_port = port;
        self
    }

    /// Returns the head node address, or the error that makes startup fatal.
    pub fn require_head_node(&self) -> Result<&str, ConfigError> {
        match self.head_node.as_deref() {
            Some(head) if !head.is_empty() => Ok(head),
            _ => Err(ConfigError::MissingHeadNode),
        }
    }

    /// Validates the configuration.
    ///
    /// Called once at initialization; any error here is fatal.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.require_head_node()?;

        let base = self.listener_base.trim_end_matches('/');
        if base.is_empty() || !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::InvalidListenerBase(
                self.listener_base.clone(),
            ));
        }

        Ok(())
    }
}

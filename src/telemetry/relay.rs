//! Metric relay: identity validation and forwarding to the sink.

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tracing::{trace, warn};

use crate::identity::{NodeId, NodeIdentityCache};
use crate::scheduler::SchedulerDirectory;

use super::sample::MetricSample;

/// Errors raised by the monitoring sink.
#[derive(Debug, Clone, Error)]
pub enum SinkError {
    /// The sink connection could not be established.
    #[error("failed to open monitoring connection: {0}")]
    Connect(String),

    /// A sample could not be written to the sink.
    #[error("failed to send metric data: {0}")]
    Send(String),
}

/// Trait for the monitoring sink that stores telemetry.
///
/// The sink owns its durability and ordering guarantees; the relay forwards
/// samples unchanged and exactly once per delivery.
pub trait MonitoringSink: Send + Sync {
    /// Opens the connection to the sink.
    fn open_connection(
        &self,
        host: &str,
        port: u16,
    ) -> impl Future<Output = Result<(), SinkError>> + Send;

    /// Writes one sample for the node with the given durable identity.
    fn send_data(
        &self,
        node_id: NodeId,
        counter_ids: &[u64],
        values: &[f64],
        tick_count: u64,
    ) -> impl Future<Output = Result<(), SinkError>> + Send;

    /// Closes the connection.
    fn close_connection(&self) -> impl Future<Output = ()> + Send;
}

/// Validates inbound metric samples and forwards them to the sink.
///
/// A sample whose node cannot be resolved - even after a directory refresh -
/// is logged and dropped. Telemetry loss for an unknown or transient node
/// must never destabilize the pipeline, so nothing propagates upward.
pub struct MetricRelay<D: SchedulerDirectory, S: MonitoringSink> {
    cache: Arc<NodeIdentityCache>,
    directory: Arc<D>,
    sink: Arc<S>,
}

impl<D: SchedulerDirectory, S: MonitoringSink> MetricRelay<D, S> {
    /// Creates a relay forwarding to `sink`.
    pub fn new(cache: Arc<NodeIdentityCache>, directory: Arc<D>, sink: Arc<S>) -> Self {
        Self {
            cache,
            directory,
            sink,
        }
    }

    /// Delivers one sample.
    pub async fn deliver(&self, sample: MetricSample) {
        if !sample.is_well_formed() {
            warn!(
                node = %sample.node_name,
                counter_ids = sample.counter_ids.len(),
                values = sample.values.len(),
                "dropping malformed metric sample"
            );
            return;
        }

        let Some(node_id) = self
            .cache
            .resolve(&sample.node_name, self.directory.as_ref())
            .await
        else {
            warn!(node = %sample.node_name, "ignoring metric data from unknown node");
            return;
        };

        if let Err(e) = self
            .sink
            .send_data(node_id, &sample.counter_ids, &sample.values, sample.tick_count)
            .await
        {
            warn!(node = %sample.node_name, id = %node_id, error = %e, "metric forward failed");
            return;
        }

        trace!(node = %sample.node_name, id = %node_id, "metric data forwarded");
    }
}

//! Inbound metric telemetry.
//!
//! Remote nodes push counter samples to the inbound listener; the relay
//! validates the node identity and forwards normalized samples to the
//! monitoring sink unchanged. This layer performs no aggregation, buffering,
//! or reordering - durability and ordering are the sink's concern.
//!
//! Telemetry is purely inbound-push: there is no caller waiting on a
//! sample, so a sample that cannot be delivered is logged and dropped
//! rather than surfaced as an error.

mod relay;
mod sample;

pub use relay::{MetricRelay, MonitoringSink, SinkError};
pub use sample::MetricSample;

#[cfg(test)]
pub use relay::tests::MockSink;

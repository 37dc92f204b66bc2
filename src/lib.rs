//! NodeLink - asynchronous control-plane adapter for remote compute nodes
//!
//! This library lets a cluster head node drive job/task lifecycle operations
//! (start task, start job and task, end task, end job, ping) on a fleet of
//! remote compute nodes over HTTP, and receive back completion notifications
//! and periodic metric telemetry without blocking the caller.
//!
//! # High-Level API
//!
//! The [`runtime`] module provides the lifecycle controller that wires the
//! pieces together:
//!
//! ```ignore
//! use nodelink::runtime::Communicator;
//! use nodelink::config::CommunicatorConfig;
//!
//! let config = CommunicatorConfig::new("headnode", "http://headnode:50000");
//! let mut comm = Communicator::new(config, transport, directory, sink)?;
//!
//! comm.initialize().await?;
//! let dispatcher = comm.start()?;
//!
//! dispatcher.ping("node1");
//! ```
//!
//! Outbound requests carry a callback address in a `CallbackUri` header so
//! the remote node can report completion through the inbound channel. The
//! inbound listener itself is an external collaborator; it hands parsed
//! [`inbound::TaskCompletion`] and [`telemetry::MetricSample`] messages to
//! the [`inbound::CompletionRouter`] and [`telemetry::MetricRelay`].

pub mod config;
pub mod dispatch;
pub mod identity;
pub mod inbound;
pub mod logging;
pub mod runtime;
pub mod scheduler;
pub mod telemetry;
pub mod transport;

/// Version of the NodeLink library.
///
/// Defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

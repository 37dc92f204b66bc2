//! The communicator: lifecycle controller for the control-plane adapter.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::{CommunicatorConfig, ConfigError};
use crate::dispatch::Dispatcher;
use crate::identity::NodeIdentityCache;
use crate::inbound::{CompletionRouter, SchedulerCallbacks};
use crate::scheduler::{DirectoryError, SchedulerDirectory};
use crate::telemetry::{MetricRelay, MonitoringSink, SinkError};
use crate::transport::ControlTransport;

/// Process-wide guard: at most one communicator is active at a time.
static INSTANCE_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Lifecycle states of the communicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommunicatorState {
    /// Constructed, not yet initialized.
    Uninitialized,
    /// Sink connected and identity cache loaded; not accepting work.
    Initialized,
    /// Dispatch scope active; outbound sends and inbound traffic flowing.
    Running,
    /// Dispatch scope cancelled and released; can be started again.
    Stopped,
}

/// Errors raised by lifecycle operations.
#[derive(Debug, Error)]
pub enum CommunicatorError {
    /// Another communicator is already active in this process.
    #[error("a communicator instance is already active")]
    AlreadyActive,

    /// Configuration is invalid; fatal at initialization.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The authoritative node list could not be loaded.
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// The monitoring sink connection could not be established.
    #[error(transparent)]
    Sink(#[from] SinkError),

    /// The operation is not valid in the current state.
    #[error("operation not valid in state {0:?}")]
    InvalidState(CommunicatorState),
}

/// Owns the dispatch scope, the identity cache, and the start/stop of the
/// monitoring connection.
///
/// The transport, scheduler directory, and monitoring sink are injected;
/// the communicator wires them to the dispatcher, router, and relay.
pub struct Communicator<T, D, S>
where
    T: ControlTransport + 'static,
    D: SchedulerDirectory,
    S: MonitoringSink,
{
    config: Arc<CommunicatorConfig>,
    transport: Arc<T>,
    directory: Arc<D>,
    sink: Arc<S>,
    cache: Arc<NodeIdentityCache>,
    listener: Option<Arc<dyn SchedulerCallbacks>>,
    state: CommunicatorState,
    scope: Option<CancellationToken>,
}

impl<T, D, S> Communicator<T, D, S>
where
    T: ControlTransport + 'static,
    D: SchedulerDirectory,
    S: MonitoringSink,
{
    /// Creates a new communicator, claiming the process-wide instance slot.
    ///
    /// # Errors
    ///
    /// Fails with [`CommunicatorError::AlreadyActive`] if another instance
    /// exists and has not been dropped.
    pub fn new(
        config: CommunicatorConfig,
        transport: T,
        directory: D,
        sink: S,
    ) -> Result<Self, CommunicatorError> {
        if INSTANCE_ACTIVE
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(CommunicatorError::AlreadyActive);
        }

        Ok(Self {
            config: Arc::new(config),
            transport: Arc::new(transport),
            directory: Arc::new(directory),
            sink: Arc::new(sink),
            cache: Arc::new(NodeIdentityCache::new()),
            listener: None,
            state: CommunicatorState::Uninitialized,
            scope: None,
        })
    }

    /// Registers the listener that receives inbound completion reports.
    pub fn accept(&mut self, listener: Arc<dyn SchedulerCallbacks>) {
        self.listener = Some(listener);
    }

    /// Current lifecycle state.
    pub fn state(&self) -> CommunicatorState {
        self.state
    }

    /// Shared identity cache.
    pub fn identity_cache(&self) -> Arc<NodeIdentityCache> {
        Arc::clone(&self.cache)
    }

    /// Validates configuration, connects the monitoring sink, and
    /// bulk-loads the identity cache from the scheduler.
    ///
    /// A missing head node address is fatal: the process cannot proceed.
    pub async fn initialize(&mut self) -> Result<(), CommunicatorError> {
        if self.state != CommunicatorState::Uninitialized {
            return Err(CommunicatorError::InvalidState(self.state));
        }

        info!("initializing communicator");
        self.config.validate()?;
        let head_node = self.config.require_head_node()?.to_string();

        self.sink
            .open_connection(&head_node, self.config.monitoring_port)
            .await?;

        let nodes = self.directory.list_nodes().await?;
        self.cache.bulk_load(&nodes);

        self.state = CommunicatorState::Initialized;
        info!(nodes = nodes.len(), head_node = %head_node, "communicator initialized");
        Ok(())
    }

    /// Creates a fresh dispatch scope and returns a dispatcher bound to it.
    ///
    /// Valid from `Initialized` or `Stopped`; each start gets a new scope.
    pub fn start(&mut self) -> Result<Dispatcher<T>, CommunicatorError> {
        match self.state {
            CommunicatorState::Initialized | CommunicatorState::Stopped => {}
            other => return Err(CommunicatorError::InvalidState(other)),
        }

        info!("starting communicator");
        let scope = CancellationToken::new();
        self.scope = Some(scope.clone());
        self.state = CommunicatorState::Running;

        Ok(Dispatcher::new(
            Arc::clone(&self.transport),
            Arc::clone(&self.config),
            scope,
        ))
    }

    /// Cancels the dispatch scope and releases it.
    ///
    /// Every in-flight outbound send settles with a cancellation failure
    /// delivered to its completion handler.
    pub fn stop(&mut self) -> Result<(), CommunicatorError> {
        if self.state != CommunicatorState::Running {
            return Err(CommunicatorError::InvalidState(self.state));
        }

        info!("stopping communicator");
        if let Some(scope) = self.scope.take() {
            scope.cancel();
        }
        self.state = CommunicatorState::Stopped;
        Ok(())
    }

    /// Builds a metric relay sharing this communicator's cache and sink.
    pub fn metric_relay(&self) -> MetricRelay<D, S> {
        MetricRelay::new(
            Arc::clone(&self.cache),
            Arc::clone(&self.directory),
            Arc::clone(&self.sink),
        )
    }

    /// Builds a completion router delivering to the registered listener.
    ///
    /// Returns `None` until a listener has been registered via
    /// [`Communicator::accept`].
    pub fn completion_router(&self) -> Option<CompletionRouter<D>> {
        let listener = self.listener.as_ref()?;
        Some(CompletionRouter::new(
            Arc::clone(&self.cache),
            Arc::clone(&self.directory),
            Arc::clone(listener),
        ))
    }

    /// Stops if running, closes the monitoring connection, and releases
    /// the process-wide instance slot.
    pub async fn shutdown(mut self) {
        info!("shutting down communicator");
        if self.state == CommunicatorState::Running {
            // In-flight sends settle with a cancellation failure.
            let _ = self.stop();
        }
        self.sink.close_connection().await;
    }
}

impl<T, D, S> Drop for Communicator<T, D, S>
where
    T: ControlTransport + 'static,
    D: SchedulerDirectory,
    S: MonitoringSink,
{
    fn drop(&mut self) {
        if let Some(scope) = self.scope.take() {
            scope.cancel();
        }
        INSTANCE_ACTIVE.store(false, Ordering::SeqCst);
    }
}

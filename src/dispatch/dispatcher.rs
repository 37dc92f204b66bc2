//! The dispatcher: one outbound control request per invocation.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

use crate::config::CommunicatorConfig;
use crate::transport::{ControlTransport, TransportError};

use super::action::{
    ControlAction, EndJobArgs, EndTaskArgs, ProcessStartInfo, StartJobAndTaskArgs, StartTaskArgs,
};
use super::callback::{callback_uri, resource_uri, CALLBACK_URI_HEADER};

/// Errors delivered to (or returned instead of registering) a completion
/// handler.
///
/// Transport-level failures and non-success remote statuses share the
/// `Transport` variant: at this layer there is no distinction between "could
/// not reach the node" and "the node refused".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The target node name was empty. Returned synchronously from `send`;
    /// the handler is never registered.
    #[error("target node name is empty")]
    EmptyTarget,

    /// The payload could not be serialized. Returned synchronously from
    /// `send`; the handler is never registered.
    #[error("payload serialization failed: {0}")]
    Serialize(String),

    /// The transport call failed or the remote node replied non-success.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The dispatch scope was cancelled while the request was in flight.
    #[error("request cancelled")]
    Cancelled,
}

/// Wire body for the start actions: the scheduler payload plus the process
/// launch description, posted as one document.
#[derive(Serialize)]
struct StartRequestBody<'a, A: Serialize> {
    args: &'a A,
    start_info: &'a ProcessStartInfo,
}

/// Sends control requests to remote compute nodes.
///
/// Each `send` performs at most one attempt and resolves its completion
/// handler exactly once, asynchronously, once the transport either returns
/// a response or fails. Handlers run on a background task, never on the
/// caller's stack. Every request issued through this dispatcher is bound to
/// the dispatch scope that was active when the dispatcher was created;
/// cancelling the scope fails all in-flight sends with
/// [`DispatchError::Cancelled`].
///
/// No retries happen here - callers decide whether to re-invoke.
pub struct Dispatcher<T: ControlTransport + 'static> {
    transport: Arc<T>,
    config: Arc<CommunicatorConfig>,
    scope: CancellationToken,
}

impl<T: ControlTransport + 'static> Clone for Dispatcher<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            config: Arc::clone(&self.config),
            scope: self.scope.clone(),
        }
    }
}

impl<T: ControlTransport + 'static> Dispatcher<T> {
    /// Creates a dispatcher bound to the given dispatch scope.
    pub(crate) fn new(
        transport: Arc<T>,
        config: Arc<CommunicatorConfig>,
        scope: CancellationToken,
    ) -> Self {
        Self {
            transport,
            config,
            scope,
        }
    }

    /// Sends a control request and registers `on_complete` for its
    /// settlement.
    ///
    /// The payload is serialized as the request body and handed back to the
    /// handler unchanged. `on_complete(node, payload, error)` fires exactly
    /// once: `error` is `None` when the remote node accepted the request,
    /// and carries the failure otherwise. Acceptance is not completion -
    /// the node's own completion report arrives later through the inbound
    /// channel.
    ///
    /// # Errors
    ///
    /// Returns an error without registering the handler when the target
    /// node name is empty or the payload cannot be serialized.
    pub fn send<P, F>(
        &self,
        action: ControlAction,
        target_node: &str,
        payload: P,
        on_complete: F,
    ) -> Result<(), DispatchError>
    where
        P: Serialize + Send + 'static,
        F: FnOnce(&str, P, Option<DispatchError>) + Send + 'static,
    {
        let body = serde_json::to_string(&payload)
            .map_err(|e| DispatchError::Serialize(e.to_string()))?;
        self.submit(action, target_node, body, payload, on_complete)
    }

    /// Starts a task within an already-running job on `target_node`.
    pub fn start_task<F>(
        &self,
        target_node: &str,
        args: StartTaskArgs,
        start_info: ProcessStartInfo,
        on_complete: F,
    ) -> Result<(), DispatchError>
    where
        F: FnOnce(&str, StartTaskArgs, Option<DispatchError>) + Send + 'static,
    {
        let body = serde_json::to_string(&StartRequestBody {
            args: &args,
            start_info: &start_info,
        })
        .map_err(|e| DispatchError::Serialize(e.to_string()))?;
        self.submit(ControlAction::StartTask, target_node, body, args, on_complete)
    }

    /// Starts a job and its first task in one call on `target_node`.
    pub fn start_job_and_task<F>(
        &self,
        target_node: &str,
        args: StartJobAndTaskArgs,
        start_info: ProcessStartInfo,
        on_complete: F,
    ) -> Result<(), DispatchError>
    where
        F: FnOnce(&str, StartJobAndTaskArgs, Option<DispatchError>) + Send + 'static,
    {
        let body = serde_json::to_string(&StartRequestBody {
            args: &args,
            start_info: &start_info,
        })
        .map_err(|e| DispatchError::Serialize(e.to_string()))?;
        self.submit(
            ControlAction::StartJobAndTask,
            target_node,
            body,
            args,
            on_complete,
        )
    }

    /// Ends a running task on `target_node`.
    pub fn end_task<F>(
        &self,
        target_node: &str,
        args: EndTaskArgs,
        on_complete: F,
    ) -> Result<(), DispatchError>
    where
        F: FnOnce(&str, EndTaskArgs, Option<DispatchError>) + Send + 'static,
    {
        self.send(ControlAction::EndTask, target_node, args, on_complete)
    }

    /// Ends a job and everything running under it on `target_node`.
    pub fn end_job<F>(
        &self,
        target_node: &str,
        args: EndJobArgs,
        on_complete: F,
    ) -> Result<(), DispatchError>
    where
        F: FnOnce(&str, EndJobArgs, Option<DispatchError>) + Send + 'static,
    {
        self.send(ControlAction::EndJob, target_node, args, on_complete)
    }

    /// Probes `target_node` for liveness.
    ///
    /// The outcome is traced; callers wanting the result programmatically
    /// use [`Dispatcher::send`] with [`ControlAction::Ping`] directly.
    pub fn ping(&self, target_node: &str) -> Result<(), DispatchError> {
        self.send(ControlAction::Ping, target_node, (), |name, _, error| {
            match error {
                None => trace!(node = name, "compute node pinged"),
                Some(e) => warn!(node = name, error = %e, "compute node ping failed"),
            }
        })
    }

    /// Builds the request and spawns its settlement task.
    fn submit<P, F>(
        &self,
        action: ControlAction,
        target_node: &str,
        body: String,
        payload: P,
        on_complete: F,
    ) -> Result<(), DispatchError>
    where
        P: Send + 'static,
        F: FnOnce(&str, P, Option<DispatchError>) + Send + 'static,
    {
        if target_node.is_empty() {
            return Err(DispatchError::EmptyTarget);
        }

        let url = resource_uri(&self.config, target_node, action);
        let callback = callback_uri(&self.config, target_node, action);
        let transport = Arc::clone(&self.transport);
        let token = self.scope.clone();
        let node = target_node.to_string();

        trace!(node = %node, action = %action, url = %url, "dispatching control request");

        tokio::spawn(async move {
            let headers = [(CALLBACK_URI_HEADER, callback.as_str())];
            let error = tokio::select! {
                biased;
                _ = token.cancelled() => Some(DispatchError::Cancelled),
                result = transport.post_json(&url, &headers, &body) => {
                    result.err().map(DispatchError::from)
                }
            };

            match &error {
                None => trace!(node = %node, action = %action, "control request accepted"),
                Some(e) => {
                    warn!(node = %node, action = %action, error = %e, "control request failed")
                }
            }

            on_complete(&node, payload, error);
        });

        Ok(())
    }
}

//! Outbound control request dispatch.
//!
//! The dispatcher composes one control request per invocation, embeds the
//! callback address the remote node should report completion to, and
//! submits the request over the transport under the current dispatch
//! scope's cancellation token. The caller-supplied completion handler is
//! resolved exactly once - with a transport failure, a cancellation, or
//! success - and never on the caller's stack.
//!
//! # Architecture
//!
//! ```text
//! caller ──► Dispatcher::send ──► transport ──► remote node agent
//!                 │                                    │
//!                 │ (spawned task)                     │ executes, later
//!                 ▼                                    ▼
//!          on_complete(node,                 inbound completion call
//!            payload, error)                  (handled by CompletionRouter,
//!                                              NOT wired back here)
//! ```
//!
//! `on_complete` means "the remote node accepted the request, or the
//! transport failed". The node's own asynchronous completion report is a
//! logically separate protocol event delivered through the inbound channel.
//! Conflating the two would silently change observable semantics, so the
//! dispatcher keeps them apart.

mod action;
mod callback;
mod dispatcher;

pub use action::{
    ControlAction, EndJobArgs, EndTaskArgs, ProcessStartInfo, StartJobAndTaskArgs, StartTaskArgs,
};
pub use callback::{callback_uri, resource_uri, CALLBACK_URI_HEADER};
pub use dispatcher::{DispatchError, Dispatcher};

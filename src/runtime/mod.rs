//! Communicator runtime lifecycle.
//!
//! The [`Communicator`] owns the pieces that make up the control-plane
//! adapter and walks them through a fixed lifecycle:
//!
//! ```text
//! Uninitialized ──initialize()──► Initialized ──start()──► Running
//!                                      ▲                      │
//!                                      └───── start() ── stop()
//!                                                            ▼
//!                                                         Stopped
//! ```
//!
//! `start` creates the dispatch scope - the cancellation boundary covering
//! every outbound request issued while running. `stop` cancels it, which
//! settles all in-flight sends with a cancellation failure rather than
//! letting them hang. Re-entering `start` after `stop` gets a fresh scope.
//!
//! One communicator may be active per process; a second construction while
//! one is alive fails with [`CommunicatorError::AlreadyActive`].

mod communicator;

pub use communicator::{Communicator, CommunicatorError, CommunicatorState};

//! Scheduler directory abstraction.
//!
//! The cluster scheduler is the authoritative source of node names and
//! their durable identifiers. This module specifies only the interface
//! boundary; the identity cache queries it at bulk load and on cache miss.

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identity::NodeId;

/// Errors that can occur while querying the scheduler directory.
#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    /// The scheduler could not be reached.
    #[error("scheduler unreachable: {0}")]
    Unreachable(String),

    /// The scheduler returned a response that could not be interpreted.
    #[error("invalid directory response: {0}")]
    InvalidResponse(String),
}

/// One row of the authoritative node list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeEntry {
    /// The node's name as known to the scheduler. Matching against this
    /// name is case-insensitive; callers normalize before comparing.
    pub name: String,

    /// The node's durable cluster identifier.
    pub id: NodeId,
}

impl NodeEntry {
    /// Creates a new directory entry.
    pub fn new(name: impl Into<String>, id: NodeId) -> Self {
        Self {
            name: name.into(),
            id,
        }
    }
}

/// Trait for querying the authoritative node list.
///
/// Implementors connect to the cluster scheduler and return all nodes it
/// currently knows about. The identity cache treats the returned list as
/// a full snapshot: every entry not already cached is added.
pub trait SchedulerDirectory: Send + Sync {
    /// Returns all nodes currently registered with the scheduler.
    fn list_nodes(&self)
        -> impl Future<Output = Result<Vec<NodeEntry>, DirectoryError>> + Send;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Mock directory with a mutable node list and a query counter.
    ///
    /// Tests use the counter to assert that cache hits never reach the
    /// scheduler.
    pub struct MockDirectory {
        nodes: Mutex<Vec<NodeEntry>>,
        queries: AtomicUsize,
    }

    impl MockDirectory {
        pub fn new(nodes: Vec<NodeEntry>) -> Self {
            Self {
                nodes: Mutex::new(nodes),
                queries: AtomicUsize::new(0),
            }
        }

        /// Replaces the node list, simulating fleet growth.
        pub fn set_nodes(&self, nodes: Vec<NodeEntry>) {
            *self.nodes.lock().unwrap() = nodes;
        }

        /// Number of times `list_nodes` has been called.
        pub fn query_count(&self) -> usize {
            self.queries.load(Ordering::SeqCst)
        }
    }

    impl SchedulerDirectory for MockDirectory {
        async fn list_nodes(&self) -> Result<Vec<NodeEntry>, DirectoryError> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            Ok(self.nodes.lock().unwrap().clone())
        }
    }

    /// Mock directory that always fails, for error-path tests.
    pub struct FailingDirectory;

    impl SchedulerDirectory for FailingDirectory {
        async fn list_nodes(&self) -> Result<Vec<NodeEntry>, DirectoryError> {
            Err(DirectoryError::Unreachable("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn mock_directory_counts_queries() {
        let dir = MockDirectory::new(vec![NodeEntry::new("node1", NodeId::new())]);
        assert_eq!(dir.query_count(), 0);

        let nodes = dir.list_nodes().await.unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(dir.query_count(), 1);
    }

    #[tokio::test]
    async fn failing_directory_returns_error() {
        let dir = FailingDirectory;
        assert!(dir.list_nodes().await.is_err());
    }
}

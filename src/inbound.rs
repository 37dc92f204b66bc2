//! Inbound completion routing.
//!
//! A remote node reports completion by calling the callback address that was
//! embedded in the outbound request. That report is a logically separate
//! protocol event from the outbound call's own settlement: the dispatcher's
//! handler already fired when the node *accepted* the request. The router's
//! job is to match the arriving report to the node it concerns and hand it
//! to whoever is listening - typically the embedding scheduler.
//!
//! The inbound HTTP listener itself is an external collaborator; it parses
//! request bodies into [`TaskCompletion`] values and calls
//! [`CompletionRouter::route`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::identity::{NodeId, NodeIdentityCache};
use crate::scheduler::SchedulerDirectory;

/// A completion report delivered by a remote node to the callback address.
///
/// Carries the identifiers of the work it concerns, echoed back from the
/// original payload, plus the outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCompletion {
    /// Name of the reporting node.
    pub node_name: String,
    /// Job the report concerns.
    pub job_id: u64,
    /// Task the report concerns. Zero for job-level reports.
    pub task_id: u64,
    /// Process exit code, when the work ran to an end.
    pub exit_code: i32,
    /// Free-form detail from the node agent.
    pub message: String,
}

/// Callbacks through which the embedding scheduler receives inbound events.
///
/// Implementations must not block: these fire on the listener's delivery
/// context.
pub trait SchedulerCallbacks: Send + Sync {
    /// A node reported completion of a task or job.
    fn on_task_completed(&self, node_id: NodeId, completion: &TaskCompletion);

    /// A node's reachability changed.
    fn on_node_status_change(&self, node_name: &str, reachable: bool);
}

/// Routes inbound completion reports to the registered listener.
///
/// Matching uses the identity cache, including its refresh-on-miss path, so
/// a report from a node added after initialization still finds its way.
/// Reports from unknown nodes are logged and dropped - there is no caller
/// waiting to notify.
pub struct CompletionRouter<D: SchedulerDirectory> {
    cache: Arc<NodeIdentityCache>,
    directory: Arc<D>,
    listener: Arc<dyn SchedulerCallbacks>,
}

impl<D: SchedulerDirectory> CompletionRouter<D> {
    /// Creates a router delivering to `listener`.
    pub fn new(
        cache: Arc<NodeIdentityCache>,
        directory: Arc<D>,
        listener: Arc<dyn SchedulerCallbacks>,
    ) -> Self {
        Self {
            cache,
            directory,
            listener,
        }
    }

    /// Routes one completion report.
    pub async fn route(&self, completion: TaskCompletion) {
        let Some(node_id) = self
            .cache
            .resolve(&completion.node_name, self.directory.as_ref())
            .await
        else {
            warn!(
                node = %completion.node_name,
                job_id = completion.job_id,
                task_id = completion.task_id,
                "ignoring completion report from unknown node"
            );
            return;
        };

        debug!(
            node = %completion.node_name,
            job_id = completion.job_id,
            task_id = completion.task_id,
            exit_code = completion.exit_code,
            "routing completion report"
        );
        self.listener.on_task_completed(node_id, &completion);
    }

    /// Forwards a node reachability change to the listener.
    pub fn node_status_change(&self, node_name: &str, reachable: bool) {
        debug!(node = %node_name, reachable, "node status change");
        self.listener.on_node_status_change(node_name, reachable);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::tests::MockDirectory;
    use crate::scheduler::NodeEntry;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingListener {
        completions: Mutex<Vec<(NodeId, TaskCompletion)>>,
        status_changes: Mutex<Vec<(String, bool)>>,
    }

    impl SchedulerCallbacks for RecordingListener {
        fn on_task_completed(&self, node_id: NodeId, completion: &TaskCompletion) {
            self.completions
                .lock()
                .unwrap()
                .push((node_id, completion.clone()));
        }

        fn on_node_status_change(&self, node_name: &str, reachable: bool) {
            self.status_changes
                .lock()
                .unwrap()
                .push((node_name.to_string(), reachable));
        }
    }

    fn completion(node: &str) -> TaskCompletion {
        TaskCompletion {
            node_name: node.to_string(),
            job_id: 42,
            task_id: 7,
            exit_code: 0,
            message: "done".to_string(),
        }
    }

    #[tokio::test]
    async fn known_node_completion_reaches_listener_once() {
        let node1 = NodeEntry::new("node1", NodeId::new());
        let cache = Arc::new(NodeIdentityCache::new());
        cache.bulk_load(std::slice::from_ref(&node1));

        let listener = Arc::new(RecordingListener::default());
        let router = CompletionRouter::new(
            cache,
            Arc::new(MockDirectory::new(vec![node1.clone()])),
            Arc::clone(&listener) as Arc<dyn SchedulerCallbacks>,
        );

        router.route(completion("node1")).await;

        let delivered = listener.completions.lock().unwrap();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].0, node1.id);
        assert_eq!(delivered[0].1, completion("node1"));
    }

    #[tokio::test]
    async fn unknown_node_completion_is_dropped() {
        let cache = Arc::new(NodeIdentityCache::new());
        let listener = Arc::new(RecordingListener::default());
        let router = CompletionRouter::new(
            cache,
            Arc::new(MockDirectory::new(vec![])),
            Arc::clone(&listener) as Arc<dyn SchedulerCallbacks>,
        );

        router.route(completion("ghost")).await;

        assert!(listener.completions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn late_added_node_completion_resolves_through_refresh() {
        let node2 = NodeEntry::new("node2", NodeId::new());
        let cache = Arc::new(NodeIdentityCache::new());

        let listener = Arc::new(RecordingListener::default());
        let router = CompletionRouter::new(
            cache,
            Arc::new(MockDirectory::new(vec![node2.clone()])),
            Arc::clone(&listener) as Arc<dyn SchedulerCallbacks>,
        );

        // Not bulk-loaded; the router's resolve refreshes and finds it.
        router.route(completion("NODE2")).await;

        let delivered = listener.completions.lock().unwrap();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].0, node2.id);
    }

    #[tokio::test]
    async fn status_changes_pass_through() {
        let cache = Arc::new(NodeIdentityCache::new());
        let listener = Arc::new(RecordingListener::default());
        let router = CompletionRouter::new(
            cache,
            Arc::new(MockDirectory::new(vec![])),
            Arc::clone(&listener) as Arc<dyn SchedulerCallbacks>,
        );

        router.node_status_change("node1", false);

        assert_eq!(
            *listener.status_changes.lock().unwrap(),
            vec![("node1".to_string(), false)]
        );
    }
}

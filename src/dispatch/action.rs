//! Control actions and their payload types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The five control actions a head node can issue against a compute node.
///
/// Each action has one canonical payload type; `Ping` has none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlAction {
    /// Start a task within an already-started job.
    StartTask,
    /// Start a job and its first task in one call.
    StartJobAndTask,
    /// End a running task.
    EndTask,
    /// End a job and everything running under it.
    EndJob,
    /// Liveness probe.
    Ping,
}

impl ControlAction {
    /// The action segment of the outbound resource address.
    pub fn action_name(&self) -> &'static str {
        match self {
            ControlAction::StartTask => "starttask",
            ControlAction::StartJobAndTask => "startjobandtask",
            ControlAction::EndTask => "endtask",
            ControlAction::EndJob => "endjob",
            ControlAction::Ping => "ping",
        }
    }

    /// The completion-notification action name embedded in the callback
    /// address. Deliberately distinct from the control action itself: the
    /// remote node reports *what happened*, not *what was asked*.
    pub fn callback_action(&self) -> &'static str {
        match self {
            ControlAction::StartTask
            | ControlAction::StartJobAndTask
            | ControlAction::EndTask
            | ControlAction::EndJob => "taskcompleted",
            ControlAction::Ping => "computenodereported",
        }
    }
}

impl std::fmt::Display for ControlAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.action_name())
    }
}

/// Process launch description shipped with the start actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessStartInfo {
    /// Command line to execute on the remote node.
    pub command_line: String,
    /// Working directory for the process.
    pub working_directory: String,
    /// Environment variables set for the process.
    pub environment_variables: HashMap<String, String>,
}

/// Payload for [`ControlAction::StartTask`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartTaskArgs {
    pub job_id: u64,
    pub task_id: u64,
    /// How many times the scheduler has requeued this task.
    pub task_requeue_count: u32,
}

/// Payload for [`ControlAction::StartJobAndTask`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartJobAndTaskArgs {
    pub job_id: u64,
    pub task_id: u64,
    pub task_requeue_count: u32,
}

/// Payload for [`ControlAction::EndTask`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndTaskArgs {
    pub job_id: u64,
    pub task_id: u64,
    /// Seconds the node should wait for graceful exit before killing.
    pub task_cancel_grace_period_secs: u32,
}

/// Payload for [`ControlAction::EndJob`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndJobArgs {
    pub job_id: u64,
}

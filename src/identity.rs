//! Node identity resolution.
//!
//! Maps a node's mutable name to its durable cluster identifier. The
//! mapping is append-only: entries are bulk-loaded at initialization and
//! added on cache miss, never overwritten or removed. Stale entries are
//! harmless - a renamed or removed node simply stops being addressed.
//!
//! # Refresh on miss
//!
//! Node additions are rare relative to lookups, so a miss triggers a full
//! resync against the scheduler directory rather than a single-node query.
//! This self-heals from races with fleet growth and amortizes to O(1) once
//! the cache is warm. Concurrent misses may refresh in parallel; the
//! append-only insert discipline makes overlapping refreshes idempotent.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::scheduler::{NodeEntry, SchedulerDirectory};

/// Durable cluster identifier for a node.
///
/// Distinct from the node's mutable name. Identifiers are never reused
/// for a different name within a process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Generates a fresh random identifier.
    ///
    /// In production identifiers come from the scheduler; this is used by
    /// tests and by directory implementations that mint them.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing identifier.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Append-only cache of node name to durable identifier.
///
/// Keys are lower-cased node names. Shared read/write across concurrent
/// resolution calls; the sharded map avoids a global lock on the hot path.
pub struct NodeIdentityCache {
    map: DashMap<String, NodeId>,
}

impl NodeIdentityCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            map: DashMap::new(),
        }
    }

    /// Bulk-populates the cache from the authoritative node list.
    ///
    /// Existing entries are never overwritten.
    pub fn bulk_load(&self, entries: &[NodeEntry]) {
        for entry in entries {
            self.map
                .entry(entry.name.to_lowercase())
                .or_insert(entry.id);
        }
        debug!(nodes = self.map.len(), "identity cache populated");
    }

    /// Returns the cached identity for `name` without consulting the
    /// directory. Case-insensitive.
    pub fn peek(&self, name: &str) -> Option<NodeId> {
        self.map.get(&name.to_lowercase()).map(|entry| *entry)
    }

    /// Number of cached identities.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if no identities are cached.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Resolves `name` to its durable identifier.
    ///
    /// On a hit this is O(1) with no network call. On a miss the full
    /// authoritative list is fetched and every absent entry added, then the
    /// lookup is retried. Returns `None` if the name is still unknown after
    /// the refresh, or if the refresh itself fails; callers treat `None` as
    /// "drop and log", not as a hard failure.
    pub async fn resolve<D>(&self, name: &str, directory: &D) -> Option<NodeId>
    where
        D: SchedulerDirectory,
    {
        if name.is_empty() {
            return None;
        }

        let key = name.to_lowercase();
        if let Some(id) = self.map.get(&key) {
            return Some(*id);
        }

        // New node added? Refresh the whole mapping from the scheduler.
        debug!(node = %name, "identity cache miss, refreshing from scheduler");
        let entries = match directory.list_nodes().await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(node = %name, error = %e, "directory refresh failed");
                return None;
            }
        };

        let mut resolved = None;
        for entry in &entries {
            let entry_key = entry.name.to_lowercase();
            if entry_key == key {
                resolved = Some(entry.id);
            }
            self.map.entry(entry_key).or_insert(entry.id);
        }

        resolved
    }
}

impl Default for NodeIdentityCache {
    fn default() -> Self {
        Self::new()
    }
}

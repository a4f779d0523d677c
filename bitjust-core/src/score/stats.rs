//! Scoring statistics.

use std::time::Duration;

use serde::Serialize;

/// Counters accumulated over all scoring calls of a context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScoreStats {
    /// Entries added to the depth table.
    pub depth_nodes_scored: u64,

    /// Entries added to the application table.
    pub app_nodes_scored: u64,

    /// Application sets dropped early under compact retention.
    pub sets_evicted: u64,

    /// Local searches for applications below a child without a cached set.
    pub fallback_searches: u64,

    /// Entries removed by the dual-propagation filter.
    pub dual_prop_entries_pruned: u64,

    /// Time spent merging child sets into their parent's set.
    pub merge_time: Duration,
}

impl ScoreStats {
    /// Render the counters as JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

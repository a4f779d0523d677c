//! Scoring Configuration
//!
//! Selects which justification heuristic the engine computes scores for and
//! how aggressively intermediate score sets are kept.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// The justification heuristic.
///
/// The numeric option ids are `0..=4` in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JustHeuristic {
    /// No scores. Every scoring entry point is a no-op.
    #[default]
    None,

    /// Minimum depth to the inputs over the whole formula.
    MinDepth,

    /// Minimum depth to the inputs, treating applications as inputs.
    MinDepthSkeleton,

    /// Minimum number of unique applications on a justification path.
    MinApp,

    /// Minimum number of unique applications, not looking into them.
    MinAppSkeleton,
}

impl JustHeuristic {
    /// Every heuristic, in option id order.
    pub const ALL: [JustHeuristic; 5] = [
        JustHeuristic::None,
        JustHeuristic::MinDepth,
        JustHeuristic::MinDepthSkeleton,
        JustHeuristic::MinApp,
        JustHeuristic::MinAppSkeleton,
    ];

    /// Numeric option id.
    pub fn id(&self) -> u8 {
        match self {
            JustHeuristic::None => 0,
            JustHeuristic::MinDepth => 1,
            JustHeuristic::MinDepthSkeleton => 2,
            JustHeuristic::MinApp => 3,
            JustHeuristic::MinAppSkeleton => 4,
        }
    }

    /// Kebab-case name, as accepted by `FromStr`.
    pub fn name(&self) -> &'static str {
        match self {
            JustHeuristic::None => "none",
            JustHeuristic::MinDepth => "min-depth",
            JustHeuristic::MinDepthSkeleton => "min-depth-skeleton",
            JustHeuristic::MinApp => "min-app",
            JustHeuristic::MinAppSkeleton => "min-app-skeleton",
        }
    }

    /// Scores live in the depth table.
    pub fn is_depth(&self) -> bool {
        matches!(self, JustHeuristic::MinDepth | JustHeuristic::MinDepthSkeleton)
    }

    /// Scores live in the application table.
    pub fn is_app(&self) -> bool {
        matches!(self, JustHeuristic::MinApp | JustHeuristic::MinAppSkeleton)
    }

    /// Applications are treated as opaque leaves.
    pub fn is_skeleton(&self) -> bool {
        matches!(
            self,
            JustHeuristic::MinDepthSkeleton | JustHeuristic::MinAppSkeleton
        )
    }
}

impl TryFrom<u8> for JustHeuristic {
    type Error = ConfigError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        JustHeuristic::ALL
            .get(id as usize)
            .copied()
            .ok_or(ConfigError::InvalidHeuristicId(id))
    }
}

impl FromStr for JustHeuristic {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        JustHeuristic::ALL
            .into_iter()
            .find(|h| h.name() == normalized)
            .ok_or_else(|| ConfigError::UnknownHeuristic(s.to_string()))
    }
}

impl fmt::Display for JustHeuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How long application score sets are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoreRetention {
    /// Every computed set stays in the table.
    #[default]
    Full,

    /// Sets of nodes nobody will ask about are dropped as soon as all
    /// their parents have consumed them. Scores of the remaining entries
    /// are identical to `Full`.
    Compact,
}

/// Options of the scoring engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub heuristic: JustHeuristic,
    pub retention: ScoreRetention,
}

impl ScoringConfig {
    /// Create a configuration with default retention.
    pub fn new(heuristic: JustHeuristic) -> Self {
        Self {
            heuristic,
            ..Self::default()
        }
    }

    pub fn with_retention(mut self, retention: ScoreRetention) -> Self {
        self.retention = retention;
        self
    }

    /// Parse a configuration from JSON, e.g. `{"heuristic": "min-app"}`.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

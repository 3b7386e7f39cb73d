use serde::{Deserialize, Serialize};

use super::domain::{Capacity, RelevanceScore};
use super::strategy::StrategyKind;

/// How directory capacities are resolved before a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityPolicy {
    /// Applied to reviewers whose directory entry carries no capacity.
    pub default_capacity: Option<u32>,
    /// Replaces every reviewer's capacity when set.
    pub capacity_override: Option<u32>,
}

impl CapacityPolicy {
    /// Zero, whether declared or configured, means unlimited.
    pub fn resolve(&self, declared: Option<u32>) -> Capacity {
        match (self.capacity_override, declared, self.default_capacity) {
            (Some(forced), _, _) => Capacity::from_declared(forced),
            (None, Some(declared), _) => Capacity::from_declared(declared),
            (None, None, Some(default)) => Capacity::from_declared(default),
            (None, None, None) => Capacity::Unlimited,
        }
    }
}

/// Tunables for one allocation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationSettings {
    pub strategy: StrategyKind,
    /// Process only the first N papers.
    pub test_limit: Option<usize>,
    /// Score only the top N keyword matches per paper.
    pub candidates_per_paper: Option<usize>,
    pub capacity: CapacityPolicy,
    /// Maximum deduction applied to a reviewer sitting at full capacity.
    pub load_penalty: f32,
    /// Denominator for load penalties of reviewers with no capacity limit.
    pub penalty_reference_capacity: u32,
    /// Headroom above the even-split cap used by the global strategy.
    pub cap_slack: u32,
    /// Score substituted when the oracle fails or a pair was never scored.
    pub neutral_score: RelevanceScore,
    pub scoring_concurrency: usize,
    /// Completed oracle calls between score checkpoint flushes.
    pub checkpoint_every: usize,
    /// Classify papers that arrive without a method label.
    pub classify_missing: bool,
}

impl Default for AllocationSettings {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::ScarcityFirst,
            test_limit: None,
            candidates_per_paper: None,
            capacity: CapacityPolicy::default(),
            load_penalty: 2.0,
            penalty_reference_capacity: 10,
            cap_slack: 1,
            neutral_score: RelevanceScore::MIN,
            scoring_concurrency: 4,
            checkpoint_every: 20,
            classify_missing: false,
        }
    }
}

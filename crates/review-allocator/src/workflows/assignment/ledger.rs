use std::collections::BTreeMap;

use tracing::warn;

use super::domain::{Capacity, Reviewer, ReviewerId};

/// Errors raised on the single mutation path of the ledger.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("reviewer '{0}' is not tracked by the capacity ledger")]
    UnknownReviewer(ReviewerId),
    #[error("reviewer '{reviewer}' is already at capacity ({limit})")]
    AtCapacity { reviewer: ReviewerId, limit: u32 },
}

/// Capacity and running load for one reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerEntry {
    pub capacity: Capacity,
    pub load: u32,
}

impl LedgerEntry {
    pub const fn has_room(&self) -> bool {
        self.capacity.admits(self.load)
    }
}

/// Per-reviewer load tracking for one allocation run.
///
/// Loads only ever go up within a run. Seeding happens before the first
/// commit and reflects assignments that were committed by earlier runs.
#[derive(Debug, Clone, Default)]
pub struct CapacityLedger {
    entries: BTreeMap<ReviewerId, LedgerEntry>,
}

impl CapacityLedger {
    pub fn new<'a, I>(reviewers: I) -> Self
    where
        I: IntoIterator<Item = &'a Reviewer>,
    {
        let entries = reviewers
            .into_iter()
            .map(|reviewer| {
                (
                    reviewer.id.clone(),
                    LedgerEntry {
                        capacity: reviewer.capacity,
                        load: 0,
                    },
                )
            })
            .collect();
        Self { entries }
    }

    /// Records an assignment committed outside this run.
    ///
    /// Externally committed work is authoritative, so a seed may push a
    /// reviewer past capacity; that reviewer simply receives nothing new.
    pub fn seed(&mut self, reviewer: &ReviewerId) -> Result<u32, LedgerError> {
        let entry = self
            .entries
            .get_mut(reviewer)
            .ok_or_else(|| LedgerError::UnknownReviewer(reviewer.clone()))?;
        entry.load += 1;
        if let Some(limit) = entry.capacity.limit() {
            if entry.load > limit {
                warn!(reviewer_id = %reviewer, load = entry.load, limit, "seeded load exceeds capacity");
            }
        }
        Ok(entry.load)
    }

    /// Increments the reviewer's load, refusing to cross the hard cap.
    pub fn commit(&mut self, reviewer: &ReviewerId) -> Result<u32, LedgerError> {
        let entry = self
            .entries
            .get_mut(reviewer)
            .ok_or_else(|| LedgerError::UnknownReviewer(reviewer.clone()))?;
        if !entry.has_room() {
            return Err(LedgerError::AtCapacity {
                reviewer: reviewer.clone(),
                limit: entry.capacity.limit().unwrap_or(u32::MAX),
            });
        }
        entry.load += 1;
        Ok(entry.load)
    }

    pub fn has_room(&self, reviewer: &ReviewerId) -> bool {
        self.entries
            .get(reviewer)
            .map(LedgerEntry::has_room)
            .unwrap_or(false)
    }

    pub fn load(&self, reviewer: &ReviewerId) -> u32 {
        self.entries
            .get(reviewer)
            .map(|entry| entry.load)
            .unwrap_or(0)
    }

    pub fn entry(&self, reviewer: &ReviewerId) -> Option<&LedgerEntry> {
        self.entries.get(reviewer)
    }

    /// Fraction of capacity in use. Unlimited reviewers are measured against
    /// `reference_capacity` so their penalty still grows with load.
    pub fn utilization(&self, reviewer: &ReviewerId, reference_capacity: u32) -> f32 {
        let Some(entry) = self.entries.get(reviewer) else {
            return 0.0;
        };
        let denominator = entry
            .capacity
            .limit()
            .unwrap_or(reference_capacity)
            .max(1);
        entry.load as f32 / denominator as f32
    }

    pub fn total_load(&self) -> u32 {
        self.entries.values().map(|entry| entry.load).sum()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&ReviewerId, &LedgerEntry)> {
        self.entries.iter()
    }
}

//! Reviewer allocation for a single review cycle.
//!
//! Papers and reviewers are validated into a [`roster::Roster`], scored
//! through a [`scoring::ScoringOracle`], and committed two reviewers per paper
//! by the configured [`strategy::StrategyKind`]. Every commit passes through
//! the [`ledger::CapacityLedger`], so no reviewer ever exceeds capacity.

pub mod classify;
pub mod domain;
pub mod eligibility;
pub mod intake;
pub mod ledger;
pub mod report;
pub mod roster;
pub mod scoring;
pub mod service;
pub mod settings;
pub mod strategy;

#[cfg(test)]
mod tests;

pub use domain::{
    Assignment, AssignmentOrigin, Capacity, MethodClass, Paper, PaperId, RelevanceScore,
    Reviewer, ReviewerCapability, ReviewerId, REVIEWERS_PER_PAPER,
};
pub use eligibility::is_eligible;
pub use intake::{ExistingAssignments, IntakeError, PaperSource, ReviewerDirectory, ReviewerEntry};
pub use ledger::{CapacityLedger, LedgerError};
pub use report::{write_assignments_csv, AssignmentReport, AssignmentReportSummary};
pub use roster::{Roster, ValidationError};
pub use scoring::{
    CheckpointError, KeywordOverlapOracle, OracleError, Relevance, ScoreCheckpoint, ScoreTable,
    ScoringOracle,
};
pub use service::{AssignmentError, AssignmentRequest, AssignmentRun, AssignmentService};
pub use settings::{AllocationSettings, CapacityPolicy};
pub use strategy::{AllocationOutcome, Shortfall, ShortfallReason, StrategyKind};

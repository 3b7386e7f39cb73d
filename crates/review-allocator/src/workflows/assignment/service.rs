use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::classify::classify_missing;
use super::domain::{Paper, Reviewer};
use super::intake::ExistingAssignments;
use super::ledger::CapacityLedger;
use super::report::AssignmentReport;
use super::roster::{Roster, ValidationError};
use super::scoring::{CandidatePlan, ScoreCheckpoint, ScoreCollector, ScoreTable, ScoringOracle};
use super::settings::AllocationSettings;
use super::strategy::{allocate, AllocationOutcome};

/// Inputs for one allocation run.
#[derive(Debug, Clone, Default)]
pub struct AssignmentRequest {
    pub papers: Vec<Paper>,
    pub reviewers: Vec<Reviewer>,
    /// Assignments committed by earlier runs.
    pub existing: ExistingAssignments,
    /// Previously collected scores; these pairs are not rescored.
    pub scores: ScoreTable,
}

/// Everything a run produced. The score table is returned so callers can
/// checkpoint it.
#[derive(Debug, Clone)]
pub struct AssignmentRun {
    pub report: AssignmentReport,
    pub outcome: AllocationOutcome,
    pub scores: ScoreTable,
}

/// Runs validation, scoring, and allocation against one scoring oracle.
pub struct AssignmentService<O: ?Sized> {
    oracle: Arc<O>,
    settings: AllocationSettings,
    checkpoint: Option<PathBuf>,
}

impl<O> AssignmentService<O>
where
    O: ScoringOracle + ?Sized + 'static,
{
    pub fn new(oracle: Arc<O>, settings: AllocationSettings) -> Self {
        Self {
            oracle,
            settings,
            checkpoint: None,
        }
    }

    /// Flush scores to `path` while scoring runs, every
    /// `settings.checkpoint_every` completed calls and once at the end.
    pub fn with_checkpoint(mut self, path: impl Into<PathBuf>) -> Self {
        self.checkpoint = Some(path.into());
        self
    }

    pub fn settings(&self) -> &AllocationSettings {
        &self.settings
    }

    /// Same oracle, different settings.
    pub fn with_settings(&self, settings: AllocationSettings) -> Self {
        Self {
            oracle: Arc::clone(&self.oracle),
            settings,
            checkpoint: self.checkpoint.clone(),
        }
    }

    pub async fn run(&self, request: AssignmentRequest) -> Result<AssignmentRun, AssignmentError> {
        let AssignmentRequest {
            mut papers,
            reviewers,
            existing,
            scores,
        } = request;

        if let Some(limit) = self.settings.test_limit {
            if papers.len() > limit {
                info!(limit, total = papers.len(), "test limit active; truncating papers");
                papers.truncate(limit);
            }
        }

        if self.settings.classify_missing {
            let labelled = classify_missing(&mut papers);
            if labelled > 0 {
                info!(labelled, "classified papers without a method label");
            }
        }

        let roster = Roster::new(papers, reviewers)?;
        for (position, paper) in roster.papers().iter().enumerate() {
            if roster.eligible_count(position) == 0 {
                warn!(paper_id = %paper.id, method = paper.method.label(), "no reviewer is eligible for paper");
            }
        }

        let mut ledger = CapacityLedger::new(roster.reviewers());
        let plan = CandidatePlan::build(&roster, self.settings.candidates_per_paper);
        let collector = ScoreCollector::new(
            Arc::clone(&self.oracle),
            self.settings.scoring_concurrency,
            self.settings.neutral_score,
        )
        .with_checkpoint(
            self.checkpoint
                .as_ref()
                .map(|path| ScoreCheckpoint::new(path, self.settings.checkpoint_every)),
        );
        let scores = collector.collect(&roster, &plan, scores).await;

        let outcome = allocate(&roster, &scores, &mut ledger, &self.settings, &existing);
        let report = AssignmentReport::build(&roster, &ledger, &outcome, Utc::now());

        let totals = report.totals();
        info!(
            strategy = outcome.strategy.label(),
            papers = totals.papers,
            fully_assigned = totals.fully_assigned,
            partially_assigned = totals.partially_assigned,
            unassigned = totals.unassigned,
            new_assignments = totals.new_assignments,
            substituted_scores = scores.substituted_count(),
            "allocation complete"
        );

        Ok(AssignmentRun {
            report,
            outcome,
            scores,
        })
    }
}

/// Error raised by the assignment service.
#[derive(Debug, thiserror::Error)]
pub enum AssignmentError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

mod global;
mod scarcity;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::domain::{
    Assignment, AssignmentOrigin, PaperId, RelevanceScore, REVIEWERS_PER_PAPER,
};
use super::intake::ExistingAssignments;
use super::ledger::{CapacityLedger, LedgerError};
use super::roster::Roster;
use super::scoring::ScoreTable;
use super::settings::AllocationSettings;

use global::GlobalScore;
use scarcity::ScarcityFirst;

/// Selectable allocation heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Most constrained papers first, load-penalized ranking, least-loaded fallback.
    #[serde(alias = "scarcity")]
    ScarcityFirst,
    /// Single pass over all candidate pairs in descending score order.
    #[serde(alias = "global")]
    GlobalScore,
}

impl StrategyKind {
    pub fn from_label(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "a" | "scarcity" | "scarcity_first" | "scarcity-first" => Some(Self::ScarcityFirst),
            "b" | "global" | "global_score" | "global-score" => Some(Self::GlobalScore),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::ScarcityFirst => "scarcity-first",
            Self::GlobalScore => "global-score",
        }
    }

    fn strategy(self) -> &'static dyn AllocationStrategy {
        match self {
            Self::ScarcityFirst => &ScarcityFirst,
            Self::GlobalScore => &GlobalScore,
        }
    }
}

/// Ordering heuristic plugged into the shared commit machinery.
trait AllocationStrategy: Sync {
    fn allocate(&self, ctx: &mut AllocationContext<'_>);
}

/// Why a commit was refused. Strategies check before committing, so these
/// only surface as debug logs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum CommitRejection {
    #[error("paper already has a full reviewer panel")]
    PaperFull,
    #[error("reviewer already assigned to this paper")]
    DuplicatePair,
    #[error("reviewer is not eligible for this paper's method")]
    Ineligible,
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Why a paper ended the run with fewer than two reviewers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortfallReason {
    /// Not enough reviewers pass the method filter.
    InsufficientEligible,
    /// Every eligible reviewer not already on the paper is at capacity.
    CapacityExhausted,
    /// Eligible reviewers with room remained but were outside the scored
    /// candidates or over the even-split cap.
    CandidatesExhausted,
}

impl ShortfallReason {
    pub const fn label(self) -> &'static str {
        match self {
            Self::InsufficientEligible => "insufficient eligible reviewers",
            Self::CapacityExhausted => "eligible reviewers at capacity",
            Self::CandidatesExhausted => "scored candidates exhausted",
        }
    }
}

/// Diagnostic for an under-assigned paper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortfall {
    pub paper_id: PaperId,
    pub assigned: usize,
    pub eligible: usize,
    pub reason: ShortfallReason,
}

/// Result of one allocation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationOutcome {
    pub strategy: StrategyKind,
    /// Assignments per paper, indexed by roster position, in commit order.
    pub per_paper: Vec<Vec<Assignment>>,
    pub shortfalls: Vec<Shortfall>,
    /// Seeded pairs kept despite failing the method filter.
    pub ineligible_seeds: Vec<Assignment>,
}

impl AllocationOutcome {
    pub fn assignments(&self) -> impl Iterator<Item = &Assignment> {
        self.per_paper.iter().flatten()
    }

    pub fn new_assignments(&self) -> impl Iterator<Item = &Assignment> {
        self.assignments()
            .filter(|assignment| assignment.origin != AssignmentOrigin::Seeded)
    }
}

/// Runs the chosen strategy over a static score table.
///
/// Existing assignments are seeded into the ledger (and onto their papers)
/// before the strategy starts; they are never committed a second time.
pub fn allocate(
    roster: &Roster,
    scores: &ScoreTable,
    ledger: &mut CapacityLedger,
    settings: &AllocationSettings,
    existing: &ExistingAssignments,
) -> AllocationOutcome {
    let mut ctx = AllocationContext::new(roster, scores, ledger, settings);
    ctx.seed(existing);
    settings.strategy.strategy().allocate(&mut ctx);
    ctx.finish(settings.strategy)
}

/// Shared commit path. Every assignment the strategies make goes through
/// [`AllocationContext::try_commit`], which enforces the per-paper limit,
/// pair uniqueness, eligibility, and the ledger's hard cap.
pub(crate) struct AllocationContext<'a> {
    roster: &'a Roster,
    scores: &'a ScoreTable,
    ledger: &'a mut CapacityLedger,
    settings: &'a AllocationSettings,
    assigned: Vec<Vec<Assignment>>,
    ineligible_seeds: Vec<Assignment>,
}

impl<'a> AllocationContext<'a> {
    fn new(
        roster: &'a Roster,
        scores: &'a ScoreTable,
        ledger: &'a mut CapacityLedger,
        settings: &'a AllocationSettings,
    ) -> Self {
        Self {
            roster,
            scores,
            ledger,
            settings,
            assigned: vec![Vec::new(); roster.papers().len()],
            ineligible_seeds: Vec::new(),
        }
    }

    pub(crate) fn roster(&self) -> &'a Roster {
        self.roster
    }

    pub(crate) fn scores(&self) -> &'a ScoreTable {
        self.scores
    }

    pub(crate) fn settings(&self) -> &'a AllocationSettings {
        self.settings
    }

    pub(crate) fn open_slots(&self, paper: usize) -> usize {
        REVIEWERS_PER_PAPER.saturating_sub(self.assigned[paper].len())
    }

    pub(crate) fn is_assigned(&self, paper: usize, reviewer: usize) -> bool {
        let reviewer_id = &self.roster.reviewer(reviewer).id;
        self.assigned[paper]
            .iter()
            .any(|assignment| &assignment.reviewer_id == reviewer_id)
    }

    pub(crate) fn has_room(&self, reviewer: usize) -> bool {
        self.ledger.has_room(&self.roster.reviewer(reviewer).id)
    }

    pub(crate) fn load(&self, reviewer: usize) -> u32 {
        self.ledger.load(&self.roster.reviewer(reviewer).id)
    }

    /// Base score minus the load penalty, which grows linearly to
    /// `load_penalty` as the reviewer approaches capacity.
    pub(crate) fn effective_score(&self, reviewer: usize, base: RelevanceScore) -> f32 {
        let utilization = self.ledger.utilization(
            &self.roster.reviewer(reviewer).id,
            self.settings.penalty_reference_capacity,
        );
        base.value() - utilization * self.settings.load_penalty
    }

    pub(crate) fn score_or_neutral(&self, paper: usize, reviewer: usize) -> RelevanceScore {
        self.scores.score_or(
            &self.roster.paper(paper).id,
            &self.roster.reviewer(reviewer).id,
            self.settings.neutral_score,
        )
    }

    pub(crate) fn try_commit(
        &mut self,
        paper: usize,
        reviewer: usize,
        score: RelevanceScore,
        origin: AssignmentOrigin,
    ) -> Result<(), CommitRejection> {
        if self.open_slots(paper) == 0 {
            return Err(CommitRejection::PaperFull);
        }
        if self.is_assigned(paper, reviewer) {
            return Err(CommitRejection::DuplicatePair);
        }
        if !self.roster.is_eligible(paper, reviewer) {
            return Err(CommitRejection::Ineligible);
        }

        let roster = self.roster;
        let paper_id = &roster.paper(paper).id;
        let reviewer_id = &roster.reviewer(reviewer).id;
        let load = self.ledger.commit(reviewer_id)?;
        debug!(
            paper_id = %paper_id,
            reviewer_id = %reviewer_id,
            score = score.value(),
            load,
            origin = origin.label(),
            "assignment committed"
        );
        self.assigned[paper].push(Assignment {
            paper_id: paper_id.clone(),
            reviewer_id: reviewer_id.clone(),
            score,
            origin,
        });
        Ok(())
    }

    /// Commit, logging refusals instead of propagating them.
    pub(crate) fn commit_or_skip(
        &mut self,
        paper: usize,
        reviewer: usize,
        score: RelevanceScore,
        origin: AssignmentOrigin,
    ) -> bool {
        match self.try_commit(paper, reviewer, score, origin) {
            Ok(()) => true,
            Err(rejection) => {
                debug!(
                    paper_id = %self.roster.paper(paper).id,
                    reviewer_id = %self.roster.reviewer(reviewer).id,
                    %rejection,
                    "commit skipped"
                );
                false
            }
        }
    }

    fn seed(&mut self, existing: &ExistingAssignments) {
        for (reviewer_id, paper_id) in existing.pairs() {
            let Some(reviewer) = self.roster.reviewer_position(reviewer_id) else {
                warn!(reviewer_id = %reviewer_id, paper_id = %paper_id, "existing assignment names an unknown reviewer; ignored");
                continue;
            };
            let paper = self.roster.paper_position(paper_id);

            if let Some(paper) = paper {
                if self.is_assigned(paper, reviewer) {
                    warn!(reviewer_id = %reviewer_id, paper_id = %paper_id, "duplicate existing assignment ignored");
                    continue;
                }
                if self.open_slots(paper) == 0 {
                    warn!(reviewer_id = %reviewer_id, paper_id = %paper_id, "paper already has a full panel; extra existing assignment ignored");
                    continue;
                }
            }

            if let Err(err) = self.ledger.seed(reviewer_id) {
                warn!(error = %err, "failed to seed existing assignment");
                continue;
            }

            if let Some(paper) = paper {
                let assignment = Assignment {
                    paper_id: paper_id.clone(),
                    reviewer_id: reviewer_id.clone(),
                    score: self.score_or_neutral(paper, reviewer),
                    origin: AssignmentOrigin::Seeded,
                };
                if !self.roster.is_eligible(paper, reviewer) {
                    warn!(
                        reviewer_id = %reviewer_id,
                        paper_id = %paper_id,
                        method = self.roster.paper(paper).method.label(),
                        capability = self.roster.reviewer(reviewer).capability.label(),
                        "existing assignment fails the method filter; kept as committed"
                    );
                    self.ineligible_seeds.push(assignment.clone());
                }
                self.assigned[paper].push(assignment);
            }
        }
    }

    fn finish(self, strategy: StrategyKind) -> AllocationOutcome {
        let mut shortfalls = Vec::new();

        for (paper, assigned) in self.assigned.iter().enumerate() {
            if assigned.len() >= REVIEWERS_PER_PAPER {
                continue;
            }

            let eligible = self.roster.eligible_count(paper);
            let reason = if eligible < REVIEWERS_PER_PAPER {
                ShortfallReason::InsufficientEligible
            } else if self
                .roster
                .eligible_reviewers(paper)
                .iter()
                .filter(|&&reviewer| {
                    let id = &self.roster.reviewer(reviewer).id;
                    !assigned.iter().any(|assignment| &assignment.reviewer_id == id)
                })
                .any(|&reviewer| self.ledger.has_room(&self.roster.reviewer(reviewer).id))
            {
                ShortfallReason::CandidatesExhausted
            } else {
                ShortfallReason::CapacityExhausted
            };

            let paper_id = self.roster.paper(paper).id.clone();
            warn!(
                paper_id = %paper_id,
                assigned = assigned.len(),
                eligible,
                reason = reason.label(),
                "paper could not receive a full reviewer panel"
            );
            shortfalls.push(Shortfall {
                paper_id,
                assigned: assigned.len(),
                eligible,
                reason,
            });
        }

        AllocationOutcome {
            strategy,
            per_paper: self.assigned,
            shortfalls,
            ineligible_seeds: self.ineligible_seeds,
        }
    }
}

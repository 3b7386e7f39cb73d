use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::workflows::assignment::domain::{
    Capacity, MethodClass, Paper, PaperId, RelevanceScore, Reviewer, ReviewerCapability,
    ReviewerId, REVIEWERS_PER_PAPER,
};
use crate::workflows::assignment::intake::ExistingAssignments;
use crate::workflows::assignment::ledger::CapacityLedger;
use crate::workflows::assignment::roster::Roster;
use crate::workflows::assignment::scoring::{
    OracleError, Relevance, ScoreTable, ScoringOracle,
};
use crate::workflows::assignment::settings::AllocationSettings;
use crate::workflows::assignment::strategy::{allocate, AllocationOutcome, StrategyKind};

pub(super) fn paper(id: &str, method: MethodClass) -> Paper {
    Paper {
        id: PaperId::from(id),
        title: format!("Paper {id}"),
        abstract_text: String::new(),
        keywords: Vec::new(),
        method,
    }
}

pub(super) fn reviewer(id: &str, capability: ReviewerCapability, capacity: Capacity) -> Reviewer {
    Reviewer {
        id: ReviewerId::from(id),
        name: format!("Reviewer {id}"),
        capability,
        capacity,
        expertise: Vec::new(),
    }
}

pub(super) fn settings(strategy: StrategyKind) -> AllocationSettings {
    AllocationSettings {
        strategy,
        ..AllocationSettings::default()
    }
}

pub(super) fn score_table(scores: &[(&str, &str, f32)]) -> ScoreTable {
    let mut table = ScoreTable::new();
    for &(paper, reviewer, score) in scores {
        table.record(PaperId::from(paper), ReviewerId::from(reviewer), Relevance::new(score));
    }
    table
}

/// Every eligible pair at `score`, for scenarios where ranking is irrelevant.
pub(super) fn flat_scores(roster: &Roster, score: f32) -> ScoreTable {
    let mut table = ScoreTable::new();
    for (position, paper) in roster.papers().iter().enumerate() {
        for &reviewer in roster.eligible_reviewers(position) {
            table.record(
                paper.id.clone(),
                roster.reviewer(reviewer).id.clone(),
                Relevance::new(score),
            );
        }
    }
    table
}

pub(super) struct Allocation {
    pub roster: Roster,
    pub ledger: CapacityLedger,
    pub outcome: AllocationOutcome,
}

impl Allocation {
    pub fn reviewers_of(&self, paper: &str) -> Vec<&str> {
        self.roster
            .paper_position(&PaperId::from(paper))
            .map(|position| {
                self.outcome.per_paper[position]
                    .iter()
                    .map(|assignment| assignment.reviewer_id.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn load(&self, reviewer: &str) -> u32 {
        self.ledger.load(&ReviewerId::from(reviewer))
    }
}

pub(super) fn run_allocation(
    papers: Vec<Paper>,
    reviewers: Vec<Reviewer>,
    scores: &ScoreTable,
    settings: &AllocationSettings,
    existing: &ExistingAssignments,
) -> Allocation {
    let roster = Roster::new(papers, reviewers).expect("valid roster");
    let mut ledger = CapacityLedger::new(roster.reviewers());
    let outcome = allocate(&roster, scores, &mut ledger, settings, existing);
    Allocation {
        roster,
        ledger,
        outcome,
    }
}

/// Panel size, pair uniqueness, eligibility, and capacity for every paper.
pub(super) fn assert_invariants(allocation: &Allocation) {
    let roster = &allocation.roster;
    let mut counted: HashMap<&ReviewerId, u32> = HashMap::new();

    for (position, assignments) in allocation.outcome.per_paper.iter().enumerate() {
        assert!(assignments.len() <= REVIEWERS_PER_PAPER);
        let mut seen = HashSet::new();
        for assignment in assignments {
            assert!(
                seen.insert(&assignment.reviewer_id),
                "reviewer repeated on {}",
                roster.paper(position).id
            );
            let reviewer = roster
                .reviewer_position(&assignment.reviewer_id)
                .expect("assigned reviewer is on the roster");
            assert!(roster.is_eligible(position, reviewer));
            *counted.entry(&assignment.reviewer_id).or_default() += 1;
        }
    }

    for reviewer in roster.reviewers() {
        let load = allocation.ledger.load(&reviewer.id);
        assert_eq!(load, counted.get(&reviewer.id).copied().unwrap_or(0));
        if let Capacity::Limited(limit) = reviewer.capacity {
            assert!(load <= limit, "{} over capacity", reviewer.id);
        }
    }
}

/// Scores from a fixed table; unknown pairs score `fallback`, listed pairs
/// can be made to fail. Counts calls so resumed runs can be checked.
pub(super) struct TableOracle {
    scores: HashMap<(String, String), f32>,
    failing: HashSet<(String, String)>,
    fallback: f32,
    calls: AtomicUsize,
}

impl TableOracle {
    pub fn new(scores: &[(&str, &str, f32)], fallback: f32) -> Self {
        Self {
            scores: scores
                .iter()
                .map(|&(paper, reviewer, score)| ((paper.to_string(), reviewer.to_string()), score))
                .collect(),
            failing: HashSet::new(),
            fallback,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_on(mut self, paper: &str, reviewer: &str) -> Self {
        self.failing.insert((paper.to_string(), reviewer.to_string()));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ScoringOracle for TableOracle {
    fn score(&self, paper: &Paper, reviewer: &Reviewer) -> Result<Relevance, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let key = (paper.id.to_string(), reviewer.id.to_string());
        if self.failing.contains(&key) {
            return Err(OracleError::Unavailable("model timed out".to_string()));
        }
        let score = self.scores.get(&key).copied().unwrap_or(self.fallback);
        Ok(Relevance::new(score))
    }
}

/// Deterministic mid-sized roster mixing every method and capability.
pub(super) fn mixed_roster() -> (Vec<Paper>, Vec<Reviewer>, ScoreTable) {
    let methods = MethodClass::ordered();
    let capabilities = [
        ReviewerCapability::Quantitative,
        ReviewerCapability::Qualitative,
        ReviewerCapability::Mixed,
        ReviewerCapability::ConceptualAny,
    ];

    let papers: Vec<Paper> = (0..24)
        .map(|n| paper(&format!("P{n:02}"), methods[n % methods.len()]))
        .collect();
    let reviewers: Vec<Reviewer> = (0..9)
        .map(|n| {
            let capacity = match n % 3 {
                0 => Capacity::Unlimited,
                1 => Capacity::Limited(3),
                _ => Capacity::Limited(5),
            };
            reviewer(&format!("R{n}"), capabilities[n % capabilities.len()], capacity)
        })
        .collect();

    let mut scores = ScoreTable::new();
    let mut state: u32 = 17;
    for paper in &papers {
        for reviewer in &reviewers {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let score = (state >> 16) % 101;
            scores.record(paper.id.clone(), reviewer.id.clone(), Relevance::new(score as f32));
        }
    }
    (papers, reviewers, scores)
}

pub(super) fn neutral() -> RelevanceScore {
    AllocationSettings::default().neutral_score
}

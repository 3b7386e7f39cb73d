//! Boundary with the relevance scoring collaborator.
//!
//! The allocator only ever sees a fully materialized [`ScoreTable`]. How the
//! table gets filled (keyword overlap, a remote model, a checkpoint file) is
//! decided by the [`ScoringOracle`] handed to the [`ScoreCollector`].

mod candidates;
mod checkpoint;
mod collector;
mod keyword;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{Paper, PaperId, RelevanceScore, Reviewer, ReviewerId};

pub use candidates::CandidatePlan;
pub use checkpoint::{CheckpointError, ScoreCheckpoint};
pub use collector::ScoreCollector;
pub use keyword::{keyword_similarity, KeywordOverlapOracle, KeywordSet};

/// Score returned by the oracle for one pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relevance {
    pub score: RelevanceScore,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

impl Relevance {
    pub fn new(score: f32) -> Self {
        Self {
            score: RelevanceScore::new(score),
            rationale: None,
        }
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }
}

/// External collaborator computing paper/reviewer fit.
pub trait ScoringOracle: Send + Sync {
    fn score(&self, paper: &Paper, reviewer: &Reviewer) -> Result<Relevance, OracleError>;
}

/// Failure reported by a scoring oracle for a single pair.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("scoring oracle unavailable: {0}")]
    Unavailable(String),
    #[error("scoring oracle returned an unusable response: {0}")]
    Malformed(String),
}

/// One scored (paper, reviewer) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPair {
    pub score: RelevanceScore,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    /// True when the oracle failed and the neutral floor was substituted.
    #[serde(default)]
    pub substituted: bool,
}

/// Static score table consumed by the allocator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreTable {
    entries: BTreeMap<PaperId, BTreeMap<ReviewerId, ScoredPair>>,
}

impl ScoreTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, paper: PaperId, reviewer: ReviewerId, pair: ScoredPair) {
        self.entries.entry(paper).or_default().insert(reviewer, pair);
    }

    pub fn record(&mut self, paper: PaperId, reviewer: ReviewerId, relevance: Relevance) {
        self.insert(
            paper,
            reviewer,
            ScoredPair {
                score: relevance.score,
                rationale: relevance.rationale,
                substituted: false,
            },
        );
    }

    pub fn record_substitute(
        &mut self,
        paper: PaperId,
        reviewer: ReviewerId,
        floor: RelevanceScore,
        reason: String,
    ) {
        self.insert(
            paper,
            reviewer,
            ScoredPair {
                score: floor,
                rationale: Some(reason),
                substituted: true,
            },
        );
    }

    pub fn get(&self, paper: &PaperId, reviewer: &ReviewerId) -> Option<&ScoredPair> {
        self.entries.get(paper)?.get(reviewer)
    }

    pub fn contains(&self, paper: &PaperId, reviewer: &ReviewerId) -> bool {
        self.get(paper, reviewer).is_some()
    }

    pub fn score_or(
        &self,
        paper: &PaperId,
        reviewer: &ReviewerId,
        floor: RelevanceScore,
    ) -> RelevanceScore {
        self.get(paper, reviewer)
            .map(|pair| pair.score)
            .unwrap_or(floor)
    }

    /// Scored candidates for one paper, ordered by reviewer id.
    pub fn candidates(&self, paper: &PaperId) -> impl Iterator<Item = (&ReviewerId, &ScoredPair)> {
        self.entries.get(paper).into_iter().flatten()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PaperId, &ReviewerId, &ScoredPair)> {
        self.entries.iter().flat_map(|(paper, reviewers)| {
            reviewers
                .iter()
                .map(move |(reviewer, pair)| (paper, reviewer, pair))
        })
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn substituted_count(&self) -> usize {
        self.iter().filter(|(_, _, pair)| pair.substituted).count()
    }
}

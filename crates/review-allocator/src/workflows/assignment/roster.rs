use std::collections::HashMap;

use super::domain::{Paper, PaperId, Reviewer, ReviewerId};
use super::eligibility::is_eligible;

/// Input defects that must be rejected before any allocation begins.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("paper at position {position} has no id")]
    MissingPaperId { position: usize },
    #[error("reviewer at position {position} has no id")]
    MissingReviewerId { position: usize },
    #[error("paper id '{0}' appears more than once")]
    DuplicatePaper(PaperId),
    #[error("reviewer id '{0}' appears more than once")]
    DuplicateReviewer(ReviewerId),
}

/// Validated papers and reviewers plus the precomputed eligibility index.
///
/// Positions in `papers()` and `reviewers()` are the input order and double as
/// the deterministic tie-breaker for every ranking in the allocator.
#[derive(Debug, Clone)]
pub struct Roster {
    papers: Vec<Paper>,
    reviewers: Vec<Reviewer>,
    paper_positions: HashMap<PaperId, usize>,
    reviewer_positions: HashMap<ReviewerId, usize>,
    eligible: Vec<Vec<usize>>,
}

impl Roster {
    pub fn new(papers: Vec<Paper>, reviewers: Vec<Reviewer>) -> Result<Self, ValidationError> {
        let mut paper_positions = HashMap::with_capacity(papers.len());
        for (position, paper) in papers.iter().enumerate() {
            if paper.id.as_str().trim().is_empty() {
                return Err(ValidationError::MissingPaperId { position });
            }
            if paper_positions.insert(paper.id.clone(), position).is_some() {
                return Err(ValidationError::DuplicatePaper(paper.id.clone()));
            }
        }

        let mut reviewer_positions = HashMap::with_capacity(reviewers.len());
        for (position, reviewer) in reviewers.iter().enumerate() {
            if reviewer.id.as_str().trim().is_empty() {
                return Err(ValidationError::MissingReviewerId { position });
            }
            if reviewer_positions
                .insert(reviewer.id.clone(), position)
                .is_some()
            {
                return Err(ValidationError::DuplicateReviewer(reviewer.id.clone()));
            }
        }

        let eligible = papers
            .iter()
            .map(|paper| {
                reviewers
                    .iter()
                    .enumerate()
                    .filter(|(_, reviewer)| is_eligible(paper.method, reviewer.capability))
                    .map(|(position, _)| position)
                    .collect()
            })
            .collect();

        Ok(Self {
            papers,
            reviewers,
            paper_positions,
            reviewer_positions,
            eligible,
        })
    }

    pub fn papers(&self) -> &[Paper] {
        &self.papers
    }

    pub fn reviewers(&self) -> &[Reviewer] {
        &self.reviewers
    }

    pub fn paper(&self, position: usize) -> &Paper {
        &self.papers[position]
    }

    pub fn reviewer(&self, position: usize) -> &Reviewer {
        &self.reviewers[position]
    }

    pub fn paper_position(&self, id: &PaperId) -> Option<usize> {
        self.paper_positions.get(id).copied()
    }

    pub fn reviewer_position(&self, id: &ReviewerId) -> Option<usize> {
        self.reviewer_positions.get(id).copied()
    }

    /// Reviewer positions allowed to review the paper, in roster order.
    pub fn eligible_reviewers(&self, paper: usize) -> &[usize] {
        &self.eligible[paper]
    }

    pub fn eligible_count(&self, paper: usize) -> usize {
        self.eligible[paper].len()
    }

    pub fn is_eligible(&self, paper: usize, reviewer: usize) -> bool {
        is_eligible(self.papers[paper].method, self.reviewers[reviewer].capability)
    }
}

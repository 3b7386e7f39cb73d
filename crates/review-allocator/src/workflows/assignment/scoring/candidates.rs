use super::keyword::{keyword_similarity, KeywordSet};
use crate::workflows::assignment::roster::Roster;

/// Reviewer positions to score for each paper.
///
/// With a cutoff, eligible reviewers are ranked by keyword similarity (ties
/// keep roster order) and only the top `cutoff` are kept; without one every
/// eligible reviewer is a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePlan {
    per_paper: Vec<Vec<usize>>,
}

impl CandidatePlan {
    pub fn build(roster: &Roster, cutoff: Option<usize>) -> Self {
        let Some(cutoff) = cutoff else {
            let per_paper = (0..roster.papers().len())
                .map(|paper| roster.eligible_reviewers(paper).to_vec())
                .collect();
            return Self { per_paper };
        };

        let reviewer_terms: Vec<KeywordSet> = roster
            .reviewers()
            .iter()
            .map(KeywordSet::for_reviewer)
            .collect();

        let per_paper = roster
            .papers()
            .iter()
            .enumerate()
            .map(|(position, paper)| {
                let paper_terms = KeywordSet::for_paper(paper);
                let mut ranked: Vec<(usize, f32)> = roster
                    .eligible_reviewers(position)
                    .iter()
                    .map(|&reviewer| {
                        (
                            reviewer,
                            keyword_similarity(&paper_terms, &reviewer_terms[reviewer]),
                        )
                    })
                    .collect();
                ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
                ranked
                    .into_iter()
                    .take(cutoff)
                    .map(|(reviewer, _)| reviewer)
                    .collect()
            })
            .collect();

        Self { per_paper }
    }

    pub fn candidates(&self, paper: usize) -> &[usize] {
        &self.per_paper[paper]
    }

    pub fn pair_count(&self) -> usize {
        self.per_paper.iter().map(Vec::len).sum()
    }
}

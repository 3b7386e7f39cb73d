use std::collections::BTreeSet;

use super::{OracleError, Relevance, ScoringOracle};
use crate::workflows::assignment::domain::{Paper, Reviewer};

const ABSTRACT_STOPWORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "can", "had", "her", "was", "one",
    "our", "out", "has", "have", "been", "were", "being", "their", "there", "this", "that",
    "with", "they", "from", "which", "will", "would", "could", "should", "about", "into",
    "through", "during", "before", "after", "above", "below", "between", "under", "also",
    "only", "other", "such", "than", "then", "these", "those", "some", "what", "when", "where",
    "while", "more", "most", "each", "both", "find", "found", "study", "paper", "research",
    "results", "using", "based", "show", "shows",
];

/// Per-overlap bonus added on top of the coverage ratio.
const OVERLAP_BONUS: f32 = 0.1;

/// Normalized terms used for keyword overlap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordSet(BTreeSet<String>);

impl KeywordSet {
    /// Keyword phrases (longer than two characters) and their words longer
    /// than three characters, plus abstract words longer than four
    /// characters that are not stopwords.
    pub fn for_paper(paper: &Paper) -> Self {
        let mut terms = BTreeSet::new();
        for keyword in &paper.keywords {
            let keyword = keyword.trim().to_lowercase();
            if keyword.chars().count() > 2 {
                add_phrase(&mut terms, &keyword);
            }
        }

        let abstract_text = paper.abstract_text.to_lowercase();
        for word in abstract_text
            .split(|c: char| !c.is_ascii_lowercase())
            .filter(|word| word.len() > 4)
            .filter(|word| !ABSTRACT_STOPWORDS.contains(word))
        {
            terms.insert(word.to_string());
        }

        Self(terms)
    }

    pub fn for_reviewer(reviewer: &Reviewer) -> Self {
        let mut terms = BTreeSet::new();
        for keyword in &reviewer.expertise {
            let keyword = keyword.trim().to_lowercase();
            if !keyword.is_empty() {
                add_phrase(&mut terms, &keyword);
            }
        }
        Self(terms)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn overlap(&self, other: &Self) -> usize {
        self.0.intersection(&other.0).count()
    }
}

fn add_phrase(terms: &mut BTreeSet<String>, phrase: &str) {
    terms.insert(phrase.to_string());
    for word in phrase.split_whitespace().filter(|word| word.len() > 3) {
        terms.insert(word.to_string());
    }
}

/// Share of the reviewer's expertise found in the paper, plus a small bonus
/// per shared term, capped at 1.0.
pub fn keyword_similarity(paper: &KeywordSet, reviewer: &KeywordSet) -> f32 {
    if paper.is_empty() || reviewer.is_empty() {
        return 0.0;
    }
    let overlap = paper.overlap(reviewer) as f32;
    let coverage = overlap / reviewer.len() as f32;
    (coverage + overlap * OVERLAP_BONUS).min(1.0)
}

/// Oracle scoring pairs by keyword overlap, scaled onto 0–100.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordOverlapOracle;

impl ScoringOracle for KeywordOverlapOracle {
    fn score(&self, paper: &Paper, reviewer: &Reviewer) -> Result<Relevance, OracleError> {
        let paper_terms = KeywordSet::for_paper(paper);
        let reviewer_terms = KeywordSet::for_reviewer(reviewer);
        let overlap = paper_terms.overlap(&reviewer_terms);
        let similarity = keyword_similarity(&paper_terms, &reviewer_terms);
        Ok(Relevance::new(similarity * 100.0).with_rationale(format!(
            "{overlap} shared term(s) across {} reviewer keyword(s)",
            reviewer_terms.len()
        )))
    }
}

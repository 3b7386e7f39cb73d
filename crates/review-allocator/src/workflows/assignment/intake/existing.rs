use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::IntakeError;
use crate::workflows::assignment::domain::{PaperId, ReviewerId};

/// Assignments committed by earlier runs, keyed by reviewer.
///
/// Stored as `{"reviewer_id": ["paper_id", ...]}`. Reviewer order follows id
/// order and paper order follows the stored list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExistingAssignments {
    by_reviewer: BTreeMap<ReviewerId, Vec<PaperId>>,
}

impl ExistingAssignments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, R, P>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (R, P)>,
        R: Into<ReviewerId>,
        P: Into<PaperId>,
    {
        let mut existing = Self::new();
        for (reviewer, paper) in pairs {
            existing.push(reviewer.into(), paper.into());
        }
        existing
    }

    pub fn push(&mut self, reviewer: ReviewerId, paper: PaperId) {
        self.by_reviewer.entry(reviewer).or_default().push(paper);
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, IntakeError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Entries whose value is not a list of ids are treated as empty.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, IntakeError> {
        let raw: BTreeMap<String, Value> = serde_json::from_reader(reader)?;
        let mut existing = Self::new();

        for (reviewer, value) in raw {
            let Value::Array(items) = value else {
                warn!(reviewer_id = %reviewer, "existing assignments entry is not a list; ignoring");
                continue;
            };
            for item in items {
                match item {
                    Value::String(paper) if !paper.trim().is_empty() => {
                        existing.push(ReviewerId::from(reviewer.as_str()), PaperId(paper))
                    }
                    other => {
                        warn!(reviewer_id = %reviewer, value = %other, "skipping malformed paper id")
                    }
                }
            }
        }

        Ok(existing)
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&ReviewerId, &PaperId)> + '_ {
        self.by_reviewer
            .iter()
            .flat_map(|(reviewer, papers)| papers.iter().map(move |paper| (reviewer, paper)))
    }

    pub fn papers_for(&self, reviewer: &ReviewerId) -> &[PaperId] {
        self.by_reviewer
            .get(reviewer)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn total(&self) -> usize {
        self.by_reviewer.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

use std::ffi::OsString;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{ScoreTable, ScoredPair};
use crate::workflows::assignment::domain::{PaperId, RelevanceScore, ReviewerId};

/// Errors raised while reading or writing a score checkpoint.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("failed to access score checkpoint: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid score checkpoint data: {0}")]
    Csv(#[from] csv::Error),
}

/// Destination for score table snapshots taken while scoring is under way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreCheckpoint {
    path: PathBuf,
    every: usize,
}

impl ScoreCheckpoint {
    /// Flush after every `every` completed oracle calls (at least one).
    pub fn new(path: impl Into<PathBuf>, every: usize) -> Self {
        Self {
            path: path.into(),
            every: every.max(1),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn is_due(&self, completed: usize) -> bool {
        completed > 0 && completed % self.every == 0
    }

    /// Writes a sibling `.partial` file and renames it over the target, so an
    /// interrupted flush leaves the previous snapshot intact.
    pub fn flush(&self, table: &ScoreTable) -> Result<(), CheckpointError> {
        let mut staging = OsString::from(self.path.as_os_str());
        staging.push(".partial");
        let staging = PathBuf::from(staging);

        table.write_checkpoint(&staging)?;
        std::fs::rename(&staging, &self.path)?;
        debug!(path = %self.path.display(), pairs = table.len(), "score checkpoint flushed");
        Ok(())
    }

    /// Flush, logging failures instead of interrupting scoring.
    pub(crate) fn flush_or_warn(&self, table: &ScoreTable) {
        if let Err(err) = self.flush(table) {
            warn!(path = %self.path.display(), error = %err, "score checkpoint flush failed");
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CheckpointRow {
    paper_id: String,
    reviewer_id: String,
    score: f32,
    #[serde(default)]
    rationale: Option<String>,
    #[serde(default)]
    substituted: Option<bool>,
}

impl ScoreTable {
    pub fn read_checkpoint<P: AsRef<Path>>(path: P) -> Result<Self, CheckpointError> {
        let file = std::fs::File::open(path)?;
        Self::from_checkpoint_reader(file)
    }

    /// Loads `paper_id,reviewer_id,score,rationale[,substituted]` rows.
    ///
    /// Substituted rows are dropped so the pair gets another chance with the
    /// oracle when scoring resumes.
    pub fn from_checkpoint_reader<R: Read>(reader: R) -> Result<Self, CheckpointError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut table = ScoreTable::new();

        for row in csv_reader.deserialize::<CheckpointRow>() {
            let row = row?;
            if row.substituted.unwrap_or(false) {
                continue;
            }
            if row.paper_id.is_empty() || row.reviewer_id.is_empty() {
                continue;
            }
            table.insert(
                PaperId(row.paper_id),
                ReviewerId(row.reviewer_id),
                ScoredPair {
                    score: RelevanceScore::new(row.score),
                    rationale: row.rationale.filter(|text| !text.is_empty()),
                    substituted: false,
                },
            );
        }

        Ok(table)
    }

    pub fn write_checkpoint<P: AsRef<Path>>(&self, path: P) -> Result<(), CheckpointError> {
        let file = std::fs::File::create(path)?;
        self.to_checkpoint_writer(file)
    }

    pub fn to_checkpoint_writer<W: Write>(&self, writer: W) -> Result<(), CheckpointError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for (paper, reviewer, pair) in self.iter() {
            csv_writer.serialize(CheckpointRow {
                paper_id: paper.0.clone(),
                reviewer_id: reviewer.0.clone(),
                score: pair.score.value(),
                rationale: pair.rationale.clone(),
                substituted: Some(pair.substituted),
            })?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::candidates::CandidatePlan;
use super::checkpoint::ScoreCheckpoint;
use super::{OracleError, Relevance, ScoreTable, ScoringOracle};
use crate::workflows::assignment::domain::{Paper, PaperId, RelevanceScore, Reviewer, ReviewerId};
use crate::workflows::assignment::roster::Roster;

type ScoreJob = (PaperId, ReviewerId, Result<Relevance, OracleError>);

/// Fills a score table by calling the oracle for every planned pair.
///
/// Calls run on the blocking pool with at most `concurrency` in flight and
/// are recorded in completion order. Pairs already present in the seed table
/// are left alone so an interrupted scoring phase can resume from a
/// checkpoint. Any pair whose call fails or panics is recorded at the
/// neutral floor.
pub struct ScoreCollector<O: ?Sized> {
    oracle: Arc<O>,
    concurrency: usize,
    neutral: RelevanceScore,
    checkpoint: Option<ScoreCheckpoint>,
}

impl<O> ScoreCollector<O>
where
    O: ScoringOracle + ?Sized + 'static,
{
    pub fn new(oracle: Arc<O>, concurrency: usize, neutral: RelevanceScore) -> Self {
        Self {
            oracle,
            concurrency: concurrency.max(1),
            neutral,
            checkpoint: None,
        }
    }

    /// Snapshot the table while scoring runs and once it completes.
    pub fn with_checkpoint(mut self, checkpoint: Option<ScoreCheckpoint>) -> Self {
        self.checkpoint = checkpoint;
        self
    }

    pub async fn collect(
        &self,
        roster: &Roster,
        plan: &CandidatePlan,
        mut table: ScoreTable,
    ) -> ScoreTable {
        let pending: Vec<(usize, usize)> = (0..roster.papers().len())
            .flat_map(|paper| plan.candidates(paper).iter().map(move |&r| (paper, r)))
            .filter(|&(paper, reviewer)| {
                !table.contains(&roster.paper(paper).id, &roster.reviewer(reviewer).id)
            })
            .collect();

        if pending.is_empty() {
            debug!(cached = table.len(), "score table already complete");
            return table;
        }

        info!(
            pending = pending.len(),
            cached = table.len(),
            concurrency = self.concurrency,
            "scoring candidate pairs"
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut jobs: JoinSet<ScoreJob> = JoinSet::new();

        for &(paper, reviewer) in &pending {
            let semaphore = Arc::clone(&semaphore);
            let oracle = Arc::clone(&self.oracle);
            let paper: Paper = roster.paper(paper).clone();
            let reviewer: Reviewer = roster.reviewer(reviewer).clone();
            jobs.spawn(async move {
                let paper_id = paper.id.clone();
                let reviewer_id = reviewer.id.clone();
                let outcome = match semaphore.acquire_owned().await {
                    Ok(permit) => tokio::task::spawn_blocking(move || {
                        let _permit = permit;
                        oracle.score(&paper, &reviewer)
                    })
                    .await
                    .unwrap_or_else(|err| {
                        Err(OracleError::Unavailable(format!("scoring task failed: {err}")))
                    }),
                    Err(err) => Err(OracleError::Unavailable(err.to_string())),
                };
                (paper_id, reviewer_id, outcome)
            });
        }

        let mut completed = 0;
        while let Some(joined) = jobs.join_next().await {
            match joined {
                Ok((paper, reviewer, Ok(relevance))) => {
                    table.record(paper, reviewer, relevance);
                }
                Ok((paper, reviewer, Err(err))) => {
                    warn!(paper_id = %paper, reviewer_id = %reviewer, error = %err, "scoring failed; using neutral score");
                    table.record_substitute(paper, reviewer, self.neutral, err.to_string());
                }
                Err(err) => {
                    warn!(error = %err, "scoring task aborted");
                    continue;
                }
            }

            completed += 1;
            if let Some(checkpoint) = &self.checkpoint {
                if checkpoint.is_due(completed) {
                    checkpoint.flush_or_warn(&table);
                }
            }
        }

        // Tasks that were aborted never reported their pair; floor them here.
        for (paper, reviewer) in pending {
            let paper = &roster.paper(paper).id;
            let reviewer = &roster.reviewer(reviewer).id;
            if !table.contains(paper, reviewer) {
                table.record_substitute(
                    paper.clone(),
                    reviewer.clone(),
                    self.neutral,
                    "scoring task did not complete".to_string(),
                );
            }
        }

        if let Some(checkpoint) = &self.checkpoint {
            checkpoint.flush_or_warn(&table);
        }

        table
    }
}

//! Read-only projections of an allocation outcome.

mod export;
mod views;

pub use export::{write_assignments_csv, TITLE_CHAR_LIMIT};
pub use views::{
    AssignedReviewerView, AssignmentReportSummary, AssignmentTotals, MethodCountEntry,
    PaperAssignmentRow, ReviewerLoadEntry, ShortfallView,
};

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use super::domain::{AssignmentOrigin, MethodClass, REVIEWERS_PER_PAPER};
use super::intake::ExistingAssignments;
use super::ledger::CapacityLedger;
use super::roster::Roster;
use super::strategy::{AllocationOutcome, Shortfall};

/// Final assignments for every paper in the run plus the ledger's view of
/// each reviewer.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentReport {
    summary: AssignmentReportSummary,
}

impl AssignmentReport {
    pub fn build(
        roster: &Roster,
        ledger: &CapacityLedger,
        outcome: &AllocationOutcome,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let rows: Vec<PaperAssignmentRow> = roster
            .papers()
            .iter()
            .zip(&outcome.per_paper)
            .map(|(paper, assignments)| PaperAssignmentRow {
                paper_id: paper.id.clone(),
                title: paper.title.clone(),
                method: paper.method,
                reviewers: assignments
                    .iter()
                    .map(|assignment| AssignedReviewerView {
                        reviewer_id: assignment.reviewer_id.clone(),
                        reviewer_name: roster
                            .reviewer_position(&assignment.reviewer_id)
                            .map(|reviewer| roster.reviewer(reviewer).display_name().to_string())
                            .unwrap_or_else(|| assignment.reviewer_id.to_string()),
                        score: assignment.score,
                        origin: assignment.origin,
                    })
                    .collect(),
            })
            .collect();

        let mut papers_by_reviewer: BTreeMap<_, Vec<_>> = BTreeMap::new();
        for row in &rows {
            for reviewer in &row.reviewers {
                papers_by_reviewer
                    .entry(reviewer.reviewer_id.clone())
                    .or_default()
                    .push(row.paper_id.clone());
            }
        }

        let mut reviewer_load: Vec<ReviewerLoadEntry> = roster
            .reviewers()
            .iter()
            .filter_map(|reviewer| {
                ledger.entry(&reviewer.id).map(|entry| ReviewerLoadEntry {
                    reviewer_id: reviewer.id.clone(),
                    reviewer_name: reviewer.display_name().to_string(),
                    load: entry.load,
                    capacity: entry.capacity,
                    capacity_label: entry.capacity.label(),
                    papers: papers_by_reviewer.remove(&reviewer.id).unwrap_or_default(),
                })
            })
            .collect();
        reviewer_load.sort_by(|a, b| a.reviewer_id.cmp(&b.reviewer_id));

        let mut counts: BTreeMap<MethodClass, usize> = BTreeMap::new();
        for paper in roster.papers() {
            *counts.entry(paper.method).or_default() += 1;
        }
        let method_distribution = MethodClass::ordered()
            .into_iter()
            .filter_map(|method| {
                counts.get(&method).map(|&papers| MethodCountEntry {
                    method,
                    method_label: if method == MethodClass::Unclassified {
                        "Unclassified"
                    } else {
                        method.label()
                    },
                    papers,
                })
            })
            .collect();

        let mut totals = AssignmentTotals {
            papers: rows.len(),
            ..AssignmentTotals::default()
        };
        for row in &rows {
            match row.reviewers.len() {
                0 => totals.unassigned += 1,
                n if n >= REVIEWERS_PER_PAPER => totals.fully_assigned += 1,
                _ => totals.partially_assigned += 1,
            }
            for reviewer in &row.reviewers {
                if reviewer.origin == AssignmentOrigin::Seeded {
                    totals.seeded_assignments += 1;
                } else {
                    totals.new_assignments += 1;
                }
            }
        }

        let shortfalls = outcome.shortfalls.iter().map(Shortfall::to_view).collect();

        Self {
            summary: AssignmentReportSummary {
                strategy: outcome.strategy,
                strategy_label: outcome.strategy.label(),
                generated_at,
                totals,
                rows,
                reviewer_load,
                shortfalls,
                method_distribution,
            },
        }
    }

    pub fn summary(&self) -> &AssignmentReportSummary {
        &self.summary
    }

    pub fn into_summary(self) -> AssignmentReportSummary {
        self.summary
    }

    /// Rows in paper input order.
    pub fn rows(&self) -> &[PaperAssignmentRow] {
        &self.summary.rows
    }

    pub fn row(&self, paper_id: &str) -> Option<&PaperAssignmentRow> {
        self.summary
            .rows
            .iter()
            .find(|row| row.paper_id.as_str() == paper_id)
    }

    pub fn reviewer_load(&self) -> &[ReviewerLoadEntry] {
        &self.summary.reviewer_load
    }

    pub fn shortfalls(&self) -> &[ShortfallView] {
        &self.summary.shortfalls
    }

    pub fn totals(&self) -> AssignmentTotals {
        self.summary.totals
    }

    /// Reviewer-keyed view in the persistence store's shape. Covers the
    /// papers of this run only, seeded pairs included.
    pub fn reviewer_assignments(&self) -> ExistingAssignments {
        ExistingAssignments::from_pairs(self.summary.reviewer_load.iter().flat_map(|entry| {
            entry
                .papers
                .iter()
                .map(move |paper| (entry.reviewer_id.clone(), paper.clone()))
        }))
    }

    /// Plain-text load table, one reviewer per line, busiest first.
    pub fn load_distribution(&self) -> String {
        let mut entries: Vec<&ReviewerLoadEntry> = self.summary.reviewer_load.iter().collect();
        entries.sort_by(|a, b| b.load.cmp(&a.load).then(a.reviewer_id.cmp(&b.reviewer_id)));

        let mut out = String::new();
        for entry in entries {
            let _ = writeln!(
                out,
                "{:<32} {:>3}/{}",
                entry.reviewer_name, entry.load, entry.capacity_label
            );
        }
        out
    }
}

impl Shortfall {
    pub fn to_view(&self) -> ShortfallView {
        ShortfallView {
            paper_id: self.paper_id.clone(),
            assigned: self.assigned,
            eligible: self.eligible,
            reason: self.reason,
            reason_label: self.reason.label(),
        }
    }
}

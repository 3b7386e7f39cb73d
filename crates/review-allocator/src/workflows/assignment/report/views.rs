use super::super::domain::{AssignmentOrigin, Capacity, MethodClass, PaperId, RelevanceScore, ReviewerId};
use super::super::strategy::{ShortfallReason, StrategyKind};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignedReviewerView {
    pub reviewer_id: ReviewerId,
    pub reviewer_name: String,
    pub score: RelevanceScore,
    pub origin: AssignmentOrigin,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaperAssignmentRow {
    pub paper_id: PaperId,
    pub title: String,
    pub method: MethodClass,
    pub reviewers: Vec<AssignedReviewerView>,
}

impl PaperAssignmentRow {
    pub fn reviewer(&self, slot: usize) -> Option<&AssignedReviewerView> {
        self.reviewers.get(slot)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewerLoadEntry {
    pub reviewer_id: ReviewerId,
    pub reviewer_name: String,
    pub load: u32,
    pub capacity: Capacity,
    pub capacity_label: String,
    pub papers: Vec<PaperId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortfallView {
    pub paper_id: PaperId,
    pub assigned: usize,
    pub eligible: usize,
    pub reason: ShortfallReason,
    pub reason_label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodCountEntry {
    pub method: MethodClass,
    pub method_label: &'static str,
    pub papers: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AssignmentTotals {
    pub papers: usize,
    pub fully_assigned: usize,
    pub partially_assigned: usize,
    pub unassigned: usize,
    pub seeded_assignments: usize,
    pub new_assignments: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentReportSummary {
    pub strategy: StrategyKind,
    pub strategy_label: &'static str,
    pub generated_at: DateTime<Utc>,
    pub totals: AssignmentTotals,
    pub rows: Vec<PaperAssignmentRow>,
    pub reviewer_load: Vec<ReviewerLoadEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shortfalls: Vec<ShortfallView>,
    pub method_distribution: Vec<MethodCountEntry>,
}

use std::io::Write;

use serde::Serialize;

use super::views::PaperAssignmentRow;

pub const TITLE_CHAR_LIMIT: usize = 60;

#[derive(Debug, Serialize)]
struct AssignmentCsvRow<'a> {
    paper_id: &'a str,
    title: String,
    method: &'static str,
    reviewer_1: Option<&'a str>,
    reviewer_2: Option<&'a str>,
    score_1: Option<String>,
    score_2: Option<String>,
}

impl<'a> From<&'a PaperAssignmentRow> for AssignmentCsvRow<'a> {
    fn from(row: &'a PaperAssignmentRow) -> Self {
        let reviewer = |slot: usize| row.reviewer(slot).map(|view| view.reviewer_id.as_str());
        let score = |slot: usize| row.reviewer(slot).map(|view| view.score.to_string());
        Self {
            paper_id: row.paper_id.as_str(),
            title: row.title.chars().take(TITLE_CHAR_LIMIT).collect(),
            method: row.method.label(),
            reviewer_1: reviewer(0),
            reviewer_2: reviewer(1),
            score_1: score(0),
            score_2: score(1),
        }
    }
}

/// Writes one row per paper. Empty slots leave their reviewer and score
/// cells blank.
pub fn write_assignments_csv<W: Write>(
    writer: W,
    rows: &[PaperAssignmentRow],
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    if rows.is_empty() {
        csv_writer.write_record([
            "paper_id",
            "title",
            "method",
            "reviewer_1",
            "reviewer_2",
            "score_1",
            "score_2",
        ])?;
    }
    for row in rows {
        csv_writer.serialize(AssignmentCsvRow::from(row))?;
    }
    csv_writer.flush()?;
    Ok(())
}

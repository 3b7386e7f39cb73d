//! Loaders for the external paper source, reviewer directory, and the store
//! of assignments committed by earlier runs.

mod directory;
mod existing;
mod papers;

pub use directory::{parse_expertise, ReviewerDirectory, ReviewerEntry};
pub use existing::ExistingAssignments;
pub use papers::PaperSource;

/// Failure to read or decode one of the input documents.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid CSV input: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),
}

use clap::{Args, ValueEnum};
use review_allocator::config::AppConfig;
use review_allocator::error::AppError;
use review_allocator::telemetry;
use review_allocator::workflows::assignment::{
    write_assignments_csv, AllocationSettings, AssignmentReport, AssignmentRequest,
    AssignmentService, ExistingAssignments, KeywordOverlapOracle, PaperSource, ReviewerDirectory,
    ScoreTable, StrategyKind,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum StrategyArg {
    /// Most constrained papers first, load-penalized ranking
    Scarcity,
    /// One pass over all pairs in descending score order
    Global,
}

impl From<StrategyArg> for StrategyKind {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Scarcity => StrategyKind::ScarcityFirst,
            StrategyArg::Global => StrategyKind::GlobalScore,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct AssignArgs {
    /// Paper export (CSV: id,title,abstract,keywords[,method])
    #[arg(long)]
    pub(crate) papers: PathBuf,
    /// Reviewer directory export (JSON)
    #[arg(long)]
    pub(crate) reviewers: PathBuf,
    /// Where to write the paper-centric assignment CSV
    #[arg(long, default_value = "assignments.csv")]
    pub(crate) output: PathBuf,
    /// Assignments committed by earlier runs (JSON keyed by reviewer id)
    #[arg(long)]
    pub(crate) existing: Option<PathBuf>,
    /// Write the reviewer-keyed assignments (JSON) for the persistence store
    #[arg(long)]
    pub(crate) reviewer_output: Option<PathBuf>,
    /// Score checkpoint (CSV); read when present and flushed while scoring runs
    #[arg(long)]
    pub(crate) checkpoint: Option<PathBuf>,
    /// Completed oracle calls between checkpoint flushes
    #[arg(long)]
    pub(crate) checkpoint_every: Option<usize>,
    /// Allocation strategy (defaults to ASSIGN_STRATEGY)
    #[arg(long, value_enum)]
    pub(crate) strategy: Option<StrategyArg>,
    /// Process only the first N papers
    #[arg(long)]
    pub(crate) limit: Option<usize>,
    /// Score only the top N keyword matches per paper
    #[arg(long)]
    pub(crate) candidates: Option<usize>,
    /// Capacity for reviewers whose entry has none (0 = unlimited)
    #[arg(long)]
    pub(crate) default_capacity: Option<u32>,
    /// Capacity applied to every reviewer (0 = unlimited)
    #[arg(long)]
    pub(crate) capacity_override: Option<u32>,
    /// Classify papers that arrive without a method label
    #[arg(long)]
    pub(crate) classify: bool,
}

impl AssignArgs {
    fn apply(&self, settings: &mut AllocationSettings) {
        if let Some(strategy) = self.strategy {
            settings.strategy = strategy.into();
        }
        if self.limit.is_some() {
            settings.test_limit = self.limit;
        }
        if self.candidates.is_some() {
            settings.candidates_per_paper = self.candidates;
        }
        if self.default_capacity.is_some() {
            settings.capacity.default_capacity = self.default_capacity;
        }
        if self.capacity_override.is_some() {
            settings.capacity.capacity_override = self.capacity_override;
        }
        if let Some(every) = self.checkpoint_every {
            settings.checkpoint_every = every;
        }
        if self.classify {
            settings.classify_missing = true;
        }
    }
}

pub(crate) async fn run_assign(args: AssignArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let mut settings = config.allocation;
    args.apply(&mut settings);

    let papers = PaperSource::from_path(&args.papers)?;
    let reviewers = ReviewerDirectory::from_path(&args.reviewers, &settings.capacity)?;
    let existing = match &args.existing {
        Some(path) => ExistingAssignments::from_path(path)?,
        None => ExistingAssignments::default(),
    };
    let scores = match &args.checkpoint {
        Some(path) if path.exists() => ScoreTable::read_checkpoint(path)?,
        _ => ScoreTable::new(),
    };
    info!(
        papers = papers.len(),
        reviewers = reviewers.len(),
        existing = existing.total(),
        cached_scores = scores.len(),
        "inputs loaded"
    );

    let mut service = AssignmentService::new(Arc::new(KeywordOverlapOracle), settings);
    if let Some(path) = &args.checkpoint {
        service = service.with_checkpoint(path);
    }
    let run = service
        .run(AssignmentRequest {
            papers,
            reviewers,
            existing,
            scores,
        })
        .await?;

    write_assignments_csv(BufWriter::new(File::create(&args.output)?), run.report.rows())?;

    if let Some(path) = &args.reviewer_output {
        let file = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(file, &run.report.reviewer_assignments())
            .map_err(std::io::Error::from)?;
    }

    render_summary(&run.report, &args);
    Ok(())
}

fn render_summary(report: &AssignmentReport, args: &AssignArgs) {
    let summary = report.summary();
    let totals = summary.totals;

    println!("Reviewer allocation ({})", summary.strategy_label);
    println!(
        "- {} papers | {} fully assigned | {} partial | {} unassigned",
        totals.papers, totals.fully_assigned, totals.partially_assigned, totals.unassigned
    );
    println!(
        "- {} new assignments | {} carried over",
        totals.new_assignments, totals.seeded_assignments
    );

    println!("Method distribution:");
    for entry in &summary.method_distribution {
        println!("  - {}: {}", entry.method_label, entry.papers);
    }

    if !summary.shortfalls.is_empty() {
        println!("Under-assigned papers:");
        for shortfall in &summary.shortfalls {
            println!(
                "  - {} ({} of 2, {} eligible): {}",
                shortfall.paper_id, shortfall.assigned, shortfall.eligible, shortfall.reason_label
            );
        }
    }

    println!("Reviewer load:");
    print!("{}", report.load_distribution());
    println!("Assignments written to {}", args.output.display());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> AssignArgs {
        AssignArgs {
            papers: PathBuf::from("papers.csv"),
            reviewers: PathBuf::from("reviewers.json"),
            output: PathBuf::from("assignments.csv"),
            existing: None,
            reviewer_output: None,
            checkpoint: None,
            checkpoint_every: None,
            strategy: None,
            limit: None,
            candidates: None,
            default_capacity: None,
            capacity_override: None,
            classify: false,
        }
    }

    #[test]
    fn flags_override_configured_settings() {
        let mut settings = AllocationSettings {
            test_limit: Some(50),
            candidates_per_paper: Some(10),
            ..AllocationSettings::default()
        };
        let args = AssignArgs {
            strategy: Some(StrategyArg::Global),
            candidates: Some(4),
            capacity_override: Some(3),
            checkpoint_every: Some(5),
            classify: true,
            ..args()
        };

        args.apply(&mut settings);

        assert_eq!(settings.strategy, StrategyKind::GlobalScore);
        assert_eq!(settings.test_limit, Some(50));
        assert_eq!(settings.candidates_per_paper, Some(4));
        assert_eq!(settings.capacity.capacity_override, Some(3));
        assert_eq!(settings.checkpoint_every, 5);
        assert!(settings.classify_missing);
    }

    #[test]
    fn absent_flags_leave_settings_alone() {
        let mut settings = AllocationSettings::default();
        args().apply(&mut settings);
        assert_eq!(settings, AllocationSettings::default());
    }
}

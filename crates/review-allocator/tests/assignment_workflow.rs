use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use review_allocator::workflows::assignment::{
    write_assignments_csv, AllocationSettings, AssignmentOrigin, AssignmentRequest,
    AssignmentService, CapacityPolicy, ExistingAssignments, KeywordOverlapOracle, OracleError,
    Paper, PaperSource, Relevance, Reviewer, ReviewerDirectory, ScoreTable, ScoringOracle,
    StrategyKind,
};

const PAPERS: &str = "id,title,abstract,keywords,method\n\
P1,Platform entry and pricing,We estimate entry effects with panel data.,\"platform competition, pricing\",Quantitative\n\
P2,Craft communities,,\"craft knowledge, ethnography\",Qualitative\n\
P3,Theorizing ties,,network theory,Conceptual\n\
P4,Untitled draft,,,\n";

const DIRECTORY: &str = r#"{
    "r1": {"name": "Janet", "expertise": "Method: Quantitative | Keywords: platform competition, pricing", "maxPapers": 2},
    "r2": {"name": "Danielle", "expertise": "Method: Qualitative | Keywords: craft knowledge, ethnography", "maxPapers": 2},
    "r3": {"name": "Tony", "expertise": "Method: Quant/Mixed | Keywords: network theory", "maxPapers": 0},
    "r4": {"name": "Ana", "expertise": "pricing, network theory", "maxPapers": 3}
}"#;

const EXISTING: &str = r#"{"r1": ["P1"]}"#;

struct CountingOracle {
    calls: AtomicUsize,
}

impl ScoringOracle for CountingOracle {
    fn score(&self, paper: &Paper, reviewer: &Reviewer) -> Result<Relevance, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        KeywordOverlapOracle.score(paper, reviewer)
    }
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("review-allocator-{name}-{}", std::process::id()));
    fs::create_dir_all(&dir).expect("scratch dir");
    dir
}

fn request(scores: ScoreTable) -> AssignmentRequest {
    let policy = CapacityPolicy::default();
    AssignmentRequest {
        papers: PaperSource::from_reader(PAPERS.as_bytes()).expect("papers parse"),
        reviewers: ReviewerDirectory::from_reader(DIRECTORY.as_bytes(), &policy)
            .expect("directory parses"),
        existing: ExistingAssignments::from_reader(EXISTING.as_bytes()).expect("existing parses"),
        scores,
    }
}

#[tokio::test]
async fn file_inputs_flow_through_to_csv_and_checkpoint() {
    let settings = AllocationSettings {
        strategy: StrategyKind::ScarcityFirst,
        ..AllocationSettings::default()
    };
    let dir = scratch_dir("flow");
    let checkpoint = dir.join("scores.csv");
    let service = AssignmentService::new(Arc::new(KeywordOverlapOracle), settings)
        .with_checkpoint(&checkpoint);
    let run = service
        .run(request(ScoreTable::new()))
        .await
        .expect("allocation succeeds");

    let report = &run.report;
    assert_eq!(report.totals().papers, 4);
    assert_eq!(report.totals().fully_assigned, 4);
    assert_eq!(report.totals().seeded_assignments, 1);

    let p1 = report.row("P1").expect("P1 row");
    assert_eq!(p1.reviewers[0].reviewer_id.as_str(), "r1");
    assert_eq!(p1.reviewers[0].origin, AssignmentOrigin::Seeded);
    assert_eq!(p1.reviewers[1].reviewer_id.as_str(), "r4");

    let p2 = report.row("P2").expect("P2 row");
    assert_eq!(p2.reviewers[0].reviewer_id.as_str(), "r2");
    assert!(p2.reviewers.iter().all(|view| view.reviewer_id.as_str() != "r1"));

    for entry in report.reviewer_load() {
        if let Some(limit) = entry.capacity.limit() {
            assert!(entry.load <= limit, "{} over capacity", entry.reviewer_id);
        }
    }

    let csv_path = dir.join("assignments.csv");
    let file = fs::File::create(&csv_path).expect("csv file");
    write_assignments_csv(file, report.rows()).expect("csv writes");
    let written = fs::read_to_string(&csv_path).expect("csv readable");
    assert_eq!(written.lines().count(), 5);
    assert!(written.starts_with("paper_id,title,method,reviewer_1,reviewer_2,score_1,score_2"));

    let restored = ScoreTable::read_checkpoint(&checkpoint).expect("checkpoint reads");
    assert_eq!(restored.len(), run.scores.len());

    let counting = Arc::new(CountingOracle {
        calls: AtomicUsize::new(0),
    });
    let resumed = AssignmentService::new(counting.clone(), AllocationSettings::default())
        .run(request(restored))
        .await
        .expect("resumed allocation succeeds");
    assert_eq!(counting.calls.load(Ordering::SeqCst), 0);
    assert_eq!(resumed.report.rows(), report.rows());

    fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn global_strategy_respects_capacity_overrides() {
    let policy = CapacityPolicy {
        default_capacity: None,
        capacity_override: Some(2),
    };
    let reviewers =
        ReviewerDirectory::from_reader(DIRECTORY.as_bytes(), &policy).expect("directory parses");
    let settings = AllocationSettings {
        strategy: StrategyKind::GlobalScore,
        capacity: policy,
        ..AllocationSettings::default()
    };

    let run = AssignmentService::new(Arc::new(KeywordOverlapOracle), settings)
        .run(AssignmentRequest {
            papers: PaperSource::from_reader(PAPERS.as_bytes()).expect("papers parse"),
            reviewers,
            ..AssignmentRequest::default()
        })
        .await
        .expect("allocation succeeds");

    assert!(run.report.reviewer_load().iter().all(|entry| entry.load <= 2));
    assert_eq!(run.report.summary().strategy_label, "global-score");
    let assigned: usize = run.report.rows().iter().map(|row| row.reviewers.len()).sum();
    assert_eq!(assigned, 8);
}

use super::common::*;
use crate::workflows::assignment::domain::{
    AssignmentOrigin, Capacity, MethodClass, Paper, Reviewer, ReviewerCapability,
};
use crate::workflows::assignment::intake::ExistingAssignments;
use crate::workflows::assignment::strategy::{ShortfallReason, StrategyKind};

const STRATEGIES: [StrategyKind; 2] = [StrategyKind::ScarcityFirst, StrategyKind::GlobalScore];

fn scarce_qualitative_roster() -> (Vec<Paper>, Vec<Reviewer>) {
    let papers = vec![
        paper("P2", MethodClass::Quantitative),
        paper("P3", MethodClass::Quantitative),
        paper("P1", MethodClass::Qualitative),
    ];
    let reviewers = vec![
        reviewer("R1", ReviewerCapability::Mixed, Capacity::Limited(1)),
        reviewer("R2", ReviewerCapability::Quantitative, Capacity::Limited(1)),
        reviewer("R3", ReviewerCapability::Quantitative, Capacity::Limited(1)),
    ];
    (papers, reviewers)
}

const SCARCE_SCORES: &[(&str, &str, f32)] = &[
    ("P2", "R1", 95.0),
    ("P2", "R2", 60.0),
    ("P2", "R3", 55.0),
    ("P3", "R1", 90.0),
    ("P3", "R2", 50.0),
    ("P3", "R3", 45.0),
    ("P1", "R1", 40.0),
];

#[test]
fn scarcity_first_serves_the_most_constrained_paper_first() {
    let (papers, reviewers) = scarce_qualitative_roster();
    let allocation = run_allocation(
        papers,
        reviewers,
        &score_table(SCARCE_SCORES),
        &settings(StrategyKind::ScarcityFirst),
        &ExistingAssignments::default(),
    );

    assert_invariants(&allocation);
    assert_eq!(allocation.reviewers_of("P1"), vec!["R1"]);
    assert_eq!(allocation.reviewers_of("P2"), vec!["R2", "R3"]);
    assert!(allocation.reviewers_of("P3").is_empty());

    let shortfalls = &allocation.outcome.shortfalls;
    assert_eq!(shortfalls.len(), 2);
    assert_eq!(shortfalls[0].paper_id.as_str(), "P3");
    assert_eq!(shortfalls[0].reason, ShortfallReason::CapacityExhausted);
    assert_eq!(shortfalls[1].paper_id.as_str(), "P1");
    assert_eq!(shortfalls[1].reason, ShortfallReason::InsufficientEligible);
    assert_eq!(shortfalls[1].eligible, 1);
}

#[test]
fn global_score_lets_high_scores_starve_the_constrained_paper() {
    let (papers, reviewers) = scarce_qualitative_roster();
    let allocation = run_allocation(
        papers,
        reviewers,
        &score_table(SCARCE_SCORES),
        &settings(StrategyKind::GlobalScore),
        &ExistingAssignments::default(),
    );

    assert_invariants(&allocation);
    assert_eq!(allocation.reviewers_of("P2"), vec!["R1", "R2"]);
    assert_eq!(allocation.reviewers_of("P3"), vec!["R3"]);
    assert!(allocation.reviewers_of("P1").is_empty());
}

#[test]
fn global_score_never_exceeds_declared_capacity() {
    let papers = vec![
        paper("P1", MethodClass::Mixed),
        paper("P2", MethodClass::Mixed),
        paper("P3", MethodClass::Mixed),
    ];
    let reviewers = vec![
        reviewer("RA", ReviewerCapability::Mixed, Capacity::Limited(2)),
        reviewer("RB", ReviewerCapability::Mixed, Capacity::Unlimited),
        reviewer("RC", ReviewerCapability::Mixed, Capacity::Unlimited),
        reviewer("RD", ReviewerCapability::Mixed, Capacity::Unlimited),
    ];
    let scores = score_table(&[
        ("P1", "RA", 95.0),
        ("P2", "RA", 94.0),
        ("P3", "RA", 93.0),
        ("P1", "RB", 80.0),
        ("P2", "RB", 70.0),
        ("P3", "RB", 60.0),
        ("P1", "RC", 75.0),
        ("P2", "RC", 65.0),
        ("P3", "RC", 55.0),
        ("P1", "RD", 50.0),
        ("P2", "RD", 50.0),
        ("P3", "RD", 50.0),
    ]);

    let allocation = run_allocation(
        papers,
        reviewers,
        &scores,
        &settings(StrategyKind::GlobalScore),
        &ExistingAssignments::default(),
    );

    assert_invariants(&allocation);
    assert_eq!(allocation.load("RA"), 2);
    assert_eq!(allocation.reviewers_of("P1"), vec!["RA", "RB"]);
    assert_eq!(allocation.reviewers_of("P2"), vec!["RA", "RB"]);
    assert_eq!(allocation.reviewers_of("P3"), vec!["RB", "RC"]);
    assert!(allocation.outcome.shortfalls.is_empty());
}

#[test]
fn global_score_spreads_unlimited_reviewers_with_the_even_split_cap() {
    let papers: Vec<_> = ["P1", "P2", "P3", "P4"]
        .into_iter()
        .map(|id| paper(id, MethodClass::Mixed))
        .collect();
    let reviewers: Vec<_> = ["R1", "R2", "R3", "R4"]
        .into_iter()
        .map(|id| reviewer(id, ReviewerCapability::Mixed, Capacity::Unlimited))
        .collect();
    let mut raw = Vec::new();
    for paper_id in ["P1", "P2", "P3", "P4"] {
        raw.push((paper_id, "R1", 99.0));
        raw.push((paper_id, "R2", 80.0));
        raw.push((paper_id, "R3", 70.0));
        raw.push((paper_id, "R4", 60.0));
    }
    let mut tight = settings(StrategyKind::GlobalScore);
    tight.cap_slack = 0;

    let allocation = run_allocation(
        papers,
        reviewers,
        &score_table(&raw),
        &tight,
        &ExistingAssignments::default(),
    );

    assert_invariants(&allocation);
    for reviewer_id in ["R1", "R2", "R3", "R4"] {
        assert_eq!(allocation.load(reviewer_id), 2, "{reviewer_id}");
    }
    assert_eq!(allocation.reviewers_of("P4"), vec!["R3", "R4"]);
}

#[test]
fn load_penalty_steers_later_papers_away_from_busy_reviewers() {
    let papers = vec![paper("P1", MethodClass::Mixed), paper("P2", MethodClass::Mixed)];
    let reviewers: Vec<_> = ["R1", "R2", "R3"]
        .into_iter()
        .map(|id| reviewer(id, ReviewerCapability::Mixed, Capacity::Unlimited))
        .collect();
    let scores = score_table(&[
        ("P1", "R1", 50.5),
        ("P1", "R2", 50.0),
        ("P1", "R3", 49.0),
        ("P2", "R1", 50.5),
        ("P2", "R2", 50.0),
        ("P2", "R3", 49.0),
    ]);

    let mut heavy = settings(StrategyKind::ScarcityFirst);
    heavy.load_penalty = 20.0;
    let penalized = run_allocation(
        papers.clone(),
        reviewers.clone(),
        &scores,
        &heavy,
        &ExistingAssignments::default(),
    );
    assert_eq!(penalized.reviewers_of("P1"), vec!["R1", "R2"]);
    assert_eq!(penalized.reviewers_of("P2"), vec!["R3", "R1"]);

    let mut flat = settings(StrategyKind::ScarcityFirst);
    flat.load_penalty = 0.0;
    let unpenalized =
        run_allocation(papers, reviewers, &scores, &flat, &ExistingAssignments::default());
    assert_eq!(unpenalized.reviewers_of("P2"), vec!["R1", "R2"]);
}

#[test]
fn scarce_papers_are_filled_while_their_reviewers_have_room() {
    let papers = vec![
        paper("PB", MethodClass::Mixed),
        paper("PC", MethodClass::Mixed),
        paper("PA", MethodClass::Quantitative),
    ];
    let reviewers = vec![
        reviewer("Q1", ReviewerCapability::Quantitative, Capacity::Limited(1)),
        reviewer("Q2", ReviewerCapability::Quantitative, Capacity::Limited(1)),
        reviewer("L1", ReviewerCapability::Qualitative, Capacity::Limited(2)),
        reviewer("L2", ReviewerCapability::Qualitative, Capacity::Limited(2)),
    ];
    let scores = score_table(&[
        ("PB", "Q1", 99.0),
        ("PB", "Q2", 98.0),
        ("PB", "L1", 10.0),
        ("PB", "L2", 10.0),
        ("PC", "Q1", 97.0),
        ("PC", "Q2", 96.0),
        ("PC", "L1", 10.0),
        ("PC", "L2", 10.0),
        ("PA", "Q1", 20.0),
        ("PA", "Q2", 20.0),
    ]);

    let allocation = run_allocation(
        papers,
        reviewers,
        &scores,
        &settings(StrategyKind::ScarcityFirst),
        &ExistingAssignments::default(),
    );

    assert_invariants(&allocation);
    assert_eq!(allocation.reviewers_of("PA"), vec!["Q1", "Q2"]);
    assert_eq!(allocation.reviewers_of("PB"), vec!["L1", "L2"]);
    assert_eq!(allocation.reviewers_of("PC"), vec!["L1", "L2"]);
    assert!(allocation.outcome.shortfalls.is_empty());
}

#[test]
fn scarcity_first_falls_back_to_unscored_eligible_reviewers() {
    let papers = vec![paper("P1", MethodClass::Mixed)];
    let reviewers = vec![
        reviewer("R1", ReviewerCapability::Mixed, Capacity::Unlimited),
        reviewer("R2", ReviewerCapability::Mixed, Capacity::Unlimited),
    ];
    let scores = score_table(&[("P1", "R1", 80.0)]);

    let allocation = run_allocation(
        papers,
        reviewers,
        &scores,
        &settings(StrategyKind::ScarcityFirst),
        &ExistingAssignments::default(),
    );

    let assigned = &allocation.outcome.per_paper[0];
    assert_eq!(assigned.len(), 2);
    assert_eq!(assigned[0].origin, AssignmentOrigin::Ranked);
    assert_eq!(assigned[1].reviewer_id.as_str(), "R2");
    assert_eq!(assigned[1].origin, AssignmentOrigin::Fallback);
    assert_eq!(assigned[1].score, neutral());
}

#[test]
fn global_score_reports_unscored_reviewers_as_exhausted_candidates() {
    let papers = vec![paper("P1", MethodClass::Mixed)];
    let reviewers = vec![
        reviewer("R1", ReviewerCapability::Mixed, Capacity::Unlimited),
        reviewer("R2", ReviewerCapability::Mixed, Capacity::Unlimited),
    ];
    let scores = score_table(&[("P1", "R1", 80.0)]);

    let allocation = run_allocation(
        papers,
        reviewers,
        &scores,
        &settings(StrategyKind::GlobalScore),
        &ExistingAssignments::default(),
    );

    assert_eq!(allocation.reviewers_of("P1"), vec!["R1"]);
    let shortfall = &allocation.outcome.shortfalls[0];
    assert_eq!(shortfall.assigned, 1);
    assert_eq!(shortfall.eligible, 2);
    assert_eq!(shortfall.reason, ShortfallReason::CandidatesExhausted);
}

#[test]
fn seeded_assignments_count_toward_load_and_are_not_recommitted() {
    let papers = vec![paper("P1", MethodClass::Mixed), paper("P2", MethodClass::Mixed)];
    let reviewers = vec![
        reviewer("R1", ReviewerCapability::Mixed, Capacity::Limited(1)),
        reviewer("R2", ReviewerCapability::Mixed, Capacity::Unlimited),
        reviewer("R3", ReviewerCapability::Mixed, Capacity::Unlimited),
    ];
    let scores = score_table(&[
        ("P1", "R1", 90.0),
        ("P1", "R2", 50.0),
        ("P1", "R3", 40.0),
        ("P2", "R1", 90.0),
        ("P2", "R2", 50.0),
        ("P2", "R3", 40.0),
    ]);
    let existing = ExistingAssignments::from_pairs([("R1", "P1"), ("RX", "P2")]);

    for strategy in STRATEGIES {
        let allocation = run_allocation(
            papers.clone(),
            reviewers.clone(),
            &scores,
            &settings(strategy),
            &existing,
        );

        assert_invariants(&allocation);
        assert_eq!(allocation.load("R1"), 1, "{strategy:?}");
        assert_eq!(allocation.reviewers_of("P1"), vec!["R1", "R2"], "{strategy:?}");
        assert_eq!(allocation.reviewers_of("P2"), vec!["R2", "R3"], "{strategy:?}");
        assert_eq!(allocation.outcome.per_paper[0][0].origin, AssignmentOrigin::Seeded);
        assert_eq!(allocation.outcome.per_paper[0][0].score.value(), 90.0);
        assert_eq!(allocation.outcome.new_assignments().count(), 3);
    }
}

#[test]
fn seeds_for_papers_outside_the_run_still_consume_capacity() {
    let papers = vec![paper("P1", MethodClass::Mixed)];
    let reviewers = vec![
        reviewer("R1", ReviewerCapability::Mixed, Capacity::Limited(1)),
        reviewer("R2", ReviewerCapability::Mixed, Capacity::Unlimited),
        reviewer("R3", ReviewerCapability::Mixed, Capacity::Unlimited),
    ];
    let scores = score_table(&[("P1", "R1", 99.0), ("P1", "R2", 50.0), ("P1", "R3", 40.0)]);
    let existing = ExistingAssignments::from_pairs([("R1", "P9")]);

    let allocation = run_allocation(
        papers,
        reviewers,
        &scores,
        &settings(StrategyKind::ScarcityFirst),
        &existing,
    );

    assert_eq!(allocation.load("R1"), 1);
    assert_eq!(allocation.reviewers_of("P1"), vec!["R2", "R3"]);
}

#[test]
fn ineligible_seeds_are_kept_but_flagged() {
    let papers = vec![paper("P1", MethodClass::Quantitative)];
    let reviewers = vec![
        reviewer("L1", ReviewerCapability::Qualitative, Capacity::Unlimited),
        reviewer("Q1", ReviewerCapability::Quantitative, Capacity::Unlimited),
    ];
    let scores = score_table(&[("P1", "Q1", 70.0)]);
    let existing = ExistingAssignments::from_pairs([("L1", "P1")]);

    for strategy in STRATEGIES {
        let allocation =
            run_allocation(papers.clone(), reviewers.clone(), &scores, &settings(strategy), &existing);

        assert_eq!(allocation.reviewers_of("P1"), vec!["L1", "Q1"]);
        assert_eq!(allocation.outcome.ineligible_seeds.len(), 1);
        let flagged = &allocation.outcome.ineligible_seeds[0];
        assert_eq!(flagged.reviewer_id.as_str(), "L1");
        assert_eq!(flagged.paper_id.as_str(), "P1");
        assert_eq!(flagged.origin, AssignmentOrigin::Seeded);
    }

    let clean = run_allocation(
        papers,
        reviewers,
        &scores,
        &settings(StrategyKind::ScarcityFirst),
        &ExistingAssignments::from_pairs([("Q1", "P1")]),
    );
    assert!(clean.outcome.ineligible_seeds.is_empty());
}

#[test]
fn both_strategies_hold_invariants_on_a_mixed_roster() {
    let (papers, reviewers, scores) = mixed_roster();
    for strategy in STRATEGIES {
        let allocation = run_allocation(
            papers.clone(),
            reviewers.clone(),
            &scores,
            &settings(strategy),
            &ExistingAssignments::default(),
        );
        assert_invariants(&allocation);
        assert_eq!(allocation.outcome.strategy, strategy);
        for shortfall in &allocation.outcome.shortfalls {
            assert!(shortfall.assigned < 2);
        }
    }
}

#[test]
fn identical_inputs_yield_identical_assignments() {
    let (papers, reviewers, scores) = mixed_roster();
    let existing = ExistingAssignments::from_pairs([("R1", "P00"), ("R4", "P03")]);
    for strategy in STRATEGIES {
        let first = run_allocation(
            papers.clone(),
            reviewers.clone(),
            &scores,
            &settings(strategy),
            &existing,
        );
        let second = run_allocation(
            papers.clone(),
            reviewers.clone(),
            &scores,
            &settings(strategy),
            &existing,
        );
        assert_eq!(first.outcome, second.outcome, "{strategy:?}");
    }
}

#[test]
fn unscored_roster_is_still_allocated_by_scarcity_fallback() {
    let (papers, reviewers, _) = mixed_roster();
    let allocation = run_allocation(
        papers.clone(),
        reviewers,
        &Default::default(),
        &settings(StrategyKind::ScarcityFirst),
        &ExistingAssignments::default(),
    );
    assert_invariants(&allocation);
    assert!(allocation
        .outcome
        .assignments()
        .all(|assignment| assignment.origin == AssignmentOrigin::Fallback));

    let scored = flat_scores(&allocation.roster, 50.0);
    let ranked = run_allocation(
        papers,
        allocation.roster.reviewers().to_vec(),
        &scored,
        &settings(StrategyKind::ScarcityFirst),
        &ExistingAssignments::default(),
    );
    assert_invariants(&ranked);
}

use tracing::debug;

use super::{AllocationContext, AllocationStrategy};
use crate::workflows::assignment::domain::{AssignmentOrigin, RelevanceScore};

/// Papers with the fewest eligible reviewers pick first.
///
/// Each paper ranks its scored candidates by load-penalized score and takes
/// the best two with room. Any slot still open is filled from the whole
/// eligible pool, least loaded first. Commits are final.
pub(super) struct ScarcityFirst;

impl AllocationStrategy for ScarcityFirst {
    fn allocate(&self, ctx: &mut AllocationContext<'_>) {
        let roster = ctx.roster();
        let mut order: Vec<usize> = (0..roster.papers().len()).collect();
        order.sort_by_key(|&paper| (roster.eligible_count(paper), paper));

        for paper in order {
            if ctx.open_slots(paper) == 0 {
                continue;
            }

            fill_from_ranking(ctx, paper);

            if ctx.open_slots(paper) > 0 {
                debug!(
                    paper_id = %roster.paper(paper).id,
                    open = ctx.open_slots(paper),
                    "ranked candidates exhausted; scanning eligible pool"
                );
                fill_from_pool(ctx, paper);
            }
        }
    }
}

fn fill_from_ranking(ctx: &mut AllocationContext<'_>, paper: usize) {
    let roster = ctx.roster();
    let paper_id = &roster.paper(paper).id;

    let mut ranked: Vec<(usize, RelevanceScore, f32)> = ctx
        .scores()
        .candidates(paper_id)
        .filter_map(|(reviewer_id, pair)| {
            roster
                .reviewer_position(reviewer_id)
                .map(|reviewer| (reviewer, pair.score))
        })
        .filter(|&(reviewer, _)| roster.is_eligible(paper, reviewer))
        .map(|(reviewer, score)| (reviewer, score, ctx.effective_score(reviewer, score)))
        .collect();
    ranked.sort_by(|a, b| b.2.total_cmp(&a.2).then(a.0.cmp(&b.0)));

    for (reviewer, score, _) in ranked {
        if ctx.open_slots(paper) == 0 {
            break;
        }
        if !ctx.has_room(reviewer) || ctx.is_assigned(paper, reviewer) {
            continue;
        }
        ctx.commit_or_skip(paper, reviewer, score, AssignmentOrigin::Ranked);
    }
}

fn fill_from_pool(ctx: &mut AllocationContext<'_>, paper: usize) {
    let roster = ctx.roster();
    let mut pool: Vec<(u32, usize)> = roster
        .eligible_reviewers(paper)
        .iter()
        .filter(|&&reviewer| !ctx.is_assigned(paper, reviewer))
        .map(|&reviewer| (ctx.load(reviewer), reviewer))
        .collect();
    pool.sort_unstable();

    for (_, reviewer) in pool {
        if ctx.open_slots(paper) == 0 {
            break;
        }
        if !ctx.has_room(reviewer) {
            continue;
        }
        let score = ctx.score_or_neutral(paper, reviewer);
        ctx.commit_or_skip(paper, reviewer, score, AssignmentOrigin::Fallback);
    }
}

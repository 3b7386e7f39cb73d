use tracing::debug;

use super::{AllocationContext, AllocationStrategy};
use crate::workflows::assignment::domain::{AssignmentOrigin, RelevanceScore, REVIEWERS_PER_PAPER};

/// One pass over every scored pair, best score first.
///
/// A pair is committed when its paper still has an open slot and the
/// reviewer is below both its own capacity and an even-split cap of
/// `ceil(required / reviewers) + cap_slack`.
pub(super) struct GlobalScore;

impl AllocationStrategy for GlobalScore {
    fn allocate(&self, ctx: &mut AllocationContext<'_>) {
        let roster = ctx.roster();
        let reviewer_count = roster.reviewers().len();
        if reviewer_count == 0 {
            return;
        }

        let required = roster.papers().len() * REVIEWERS_PER_PAPER;
        let even_split = required.div_ceil(reviewer_count);
        let uniform_cap = u32::try_from(even_split)
            .unwrap_or(u32::MAX)
            .saturating_add(ctx.settings().cap_slack);
        debug!(required, reviewer_count, uniform_cap, "global allocation cap");

        let mut pairs: Vec<(usize, usize, RelevanceScore)> = ctx
            .scores()
            .iter()
            .filter_map(|(paper_id, reviewer_id, pair)| {
                let paper = roster.paper_position(paper_id)?;
                let reviewer = roster.reviewer_position(reviewer_id)?;
                Some((paper, reviewer, pair.score))
            })
            .filter(|&(paper, reviewer, _)| roster.is_eligible(paper, reviewer))
            .collect();
        pairs.sort_by(|a, b| {
            b.2.value()
                .total_cmp(&a.2.value())
                .then(a.0.cmp(&b.0))
                .then(a.1.cmp(&b.1))
        });

        for (paper, reviewer, score) in pairs {
            if ctx.open_slots(paper) == 0 || ctx.is_assigned(paper, reviewer) {
                continue;
            }
            if ctx.load(reviewer) >= uniform_cap || !ctx.has_room(reviewer) {
                continue;
            }
            ctx.commit_or_skip(paper, reviewer, score, AssignmentOrigin::Ranked);
        }
    }
}

//! GHOSTDAG k-cluster ordering (§4.3).
//!
//! A pure function of the past cone: given a new block's parent set (all
//! already resident in the store with their own consensus fields computed),
//! produces the selected parent, mergeset, blue set and blue score. Nothing
//! here mutates the store; [`crate::store::DagStore::add`] is the only
//! writer.
//!
//! Grounded on `sc-consensus-ghostdag`'s `ghostdag.rs` for the overall shape
//! (select-by-sortable-key, then partition the mergeset by a k-cluster
//! anticone check) but computed directly over past/future/anticone sets
//! rather than an incremental reachability tree, per §5's explicit
//! allowance to recompute cones on demand.

use std::collections::HashSet;

use crate::block::BlockId;
use crate::error::{DagError, Result};
use crate::store::DagStore;

/// The consensus fields GHOSTDAG computes for one new block.
pub(crate) struct GhostdagComputed {
    pub parents: Vec<BlockId>,
    pub selected_parent: Option<BlockId>,
    pub mergeset: Vec<BlockId>,
    pub blue_set: HashSet<BlockId>,
    pub blue_score: u64,
    pub round: u64,
}

/// Blue-score accounting at genesis. The source is inconsistent between 0
/// and 1 (§9 Open Questions); this crate picks 1 so that every non-genesis
/// block's `blue_score = parent.blue_score + 1 + mergeset_blues.len()`
/// formula needs no genesis special case downstream.
pub const GENESIS_BLUE_SCORE: u64 = 1;

/// Computes GHOSTDAG consensus data. `k` bounds the anticone size a blue
/// block may accumulate (§4.3 Checks A and B); it is fixed for the lifetime
/// of the engine (§1 Non-goals: "No rebalancing of k").
pub struct GhostdagEngine {
    k: u64,
}

impl GhostdagEngine {
    /// Builds an engine for the given `k`. `k` is taken as `i64` so the
    /// negative case can be rejected explicitly, matching §7's
    /// `InvalidK` taxonomy rather than relying on an unsigned type to make
    /// the condition unrepresentable.
    pub fn new(k: i64) -> Result<Self> {
        if k < 0 {
            return Err(DagError::InvalidK(k));
        }
        Ok(Self { k: k as u64 })
    }

    /// The anticone-size bound in effect.
    pub fn k(&self) -> u64 {
        self.k
    }

    /// Computes consensus data for a new block with the given `parents`,
    /// none of which are yet in the store. `parents` must be non-empty;
    /// genesis is handled separately by the store.
    pub(crate) fn compute(&self, store: &DagStore, parents: &[BlockId]) -> Result<GhostdagComputed> {
        debug_assert!(!parents.is_empty(), "genesis is handled by the caller");

        for &p in parents {
            if store.block(p).is_none() {
                return Err(DagError::AncestorMissingConsensus(format!("<id {}>", p.index())));
            }
        }

        // 1. Select parent: highest (blue_score, -hash) lexicographically.
        let mut ordered = parents.to_vec();
        ordered.sort_by(|&a, &b| {
            let ba = store.block(a).expect("validated above");
            let bb = store.block(b).expect("validated above");
            ba.blue_score()
                .cmp(&bb.blue_score())
                .then_with(|| bb.hash().cmp(&ba.hash()))
                .reverse()
        });
        let selected_parent = ordered[0];
        let sp_block = store.block(selected_parent).expect("validated above");

        // "Total view": past(self) = union of each parent plus its own past.
        let mut past_self: HashSet<BlockId> = HashSet::new();
        for &p in &ordered {
            past_self.insert(p);
            past_self.extend(store.past_cone(p));
        }
        let past_selected_parent = store.past_cone(selected_parent);

        // 2. Mergeset = past(self) \ past(selected_parent) \ {selected_parent},
        //    sorted ascending by (blue_score, hash).
        let mut mergeset: Vec<BlockId> = past_self
            .iter()
            .copied()
            .filter(|id| *id != selected_parent && !past_selected_parent.contains(id))
            .collect();
        mergeset.sort_by(|&a, &b| {
            let ba = store.block(a).expect("member of past_self");
            let bb = store.block(b).expect("member of past_self");
            ba.blue_score().cmp(&bb.blue_score()).then_with(|| ba.hash().cmp(&bb.hash()))
        });

        // 3. Local blue set: seeded with the selected parent, grown by
        //    admitting mergeset candidates that satisfy Checks A and B.
        let mut blue: HashSet<BlockId> = HashSet::new();
        blue.insert(selected_parent);
        let mut admitted = 0u64;

        for &c in &mergeset {
            let anticone_c = self.anticone_within(store, &past_self, c);
            let blue_in_anticone_c = anticone_c.intersection(&blue).count() as u64;
            if blue_in_anticone_c > self.k {
                continue;
            }

            let mut violates = false;
            for &v in &blue {
                let anticone_v = self.anticone_within(store, &past_self, v);
                if anticone_v.contains(&c) {
                    let would_be = anticone_v.intersection(&blue).count() as u64 + 1;
                    if would_be > self.k {
                        violates = true;
                        break;
                    }
                }
            }
            if violates {
                continue;
            }

            blue.insert(c);
            admitted += 1;
        }

        // 4. Blue score / blue set, accumulated on top of the selected
        //    parent's own (already-computed) cumulative blue set.
        let mut blue_set = sp_block.blue_set().clone();
        blue_set.extend(blue.iter().copied());
        let blue_score = sp_block.blue_score() + 1 + admitted;
        let round = sp_block.round() + 1;

        Ok(GhostdagComputed {
            parents: ordered,
            selected_parent: Some(selected_parent),
            mergeset,
            blue_set,
            blue_score,
            round,
        })
    }

    /// `anticone_W(x) = W \ past(x) \ future(x) \ {x}`, per §4.3/§9 Glossary.
    /// `past_self` stands in for `W` (the mergeset computation's total view).
    fn anticone_within(&self, store: &DagStore, view: &HashSet<BlockId>, x: BlockId) -> HashSet<BlockId> {
        let past_x = store.past_cone(x);
        let future_x = store.future_cone(x);
        view.iter()
            .copied()
            .filter(|id| *id != x && !past_x.contains(id) && !future_x.contains(id))
            .collect()
    }
}

//! Property-based tests for the DAG core.
//!
//! Builds small random DAGs by repeated `add` calls with a random
//! parent-subset choice at each step, then checks invariants that must hold
//! for any append-only GHOSTDAG structure regardless of shape: selected-parent
//! maximality, the k-cluster anticone bound, parent/child symmetry,
//! past/future disjointness, and the anticone partition (§8 properties
//! 1, 4, 6, 7, 8).

use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

use ghostdag_viz_core::{BlockId, DagStore, GhostdagEngine};

/// Builds a DAG of `num_blocks` blocks (genesis plus `num_blocks - 1`
/// further blocks) using `rng_seed` to pick each block's parent subset from
/// the blocks already present.
fn build_random_dag(rng_seed: u64, num_blocks: usize, k: i64) -> (DagStore, GhostdagEngine) {
    let mut rng = SmallRng::seed_from_u64(rng_seed);
    let mut store = DagStore::with_seed(rng_seed);
    let engine = GhostdagEngine::new(k).unwrap();

    store.add(&engine, None, None, None).unwrap();

    for _ in 1..num_blocks {
        let existing: Vec<BlockId> = store.iter_all().map(|b| b.id()).collect();
        let subset_size = rng.gen_range(1..=existing.len().min(4));
        let mut chosen: Vec<BlockId> = Vec::new();
        while chosen.len() < subset_size {
            let candidate = existing[rng.gen_range(0..existing.len())];
            if !chosen.contains(&candidate) {
                chosen.push(candidate);
            }
        }
        store.add(&engine, None, Some(chosen), None).unwrap();
    }

    (store, engine)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property 1: the selected parent has the highest (blue_score, hash)
    /// key among a block's parents — nothing else could have been chosen.
    #[test]
    fn selected_parent_is_maximal_among_parents(seed in any::<u64>(), n in 2usize..20) {
        let (store, _engine) = build_random_dag(seed, n, 18);

        for block in store.iter_all() {
            if block.parents().len() < 2 {
                continue;
            }
            let sp = block.selected_parent().expect("non-genesis block has a selected parent");
            let sp_block = store.block(sp).unwrap();
            for &p in block.parents() {
                if p == sp {
                    continue;
                }
                let p_block = store.block(p).unwrap();
                let sp_key = (sp_block.blue_score(), sp_block.hash());
                let p_key = (p_block.blue_score(), p_block.hash());
                // Higher blue_score wins; on a tie, the smaller hash wins.
                prop_assert!(sp_key.0 > p_key.0 || (sp_key.0 == p_key.0 && sp_key.1 <= p_key.1));
            }
        }
    }

    /// Property 6: parent/child back-references agree in both directions.
    #[test]
    fn parents_and_children_are_mutually_consistent(seed in any::<u64>(), n in 2usize..20) {
        let (store, _engine) = build_random_dag(seed, n, 18);

        for block in store.iter_all() {
            for &p in block.parents() {
                let parent = store.block(p).unwrap();
                prop_assert!(parent.children().contains(&block.id()));
            }
        }
    }

    /// Property 7: a block never appears in both its own past and future cones.
    #[test]
    fn past_and_future_cones_are_disjoint(seed in any::<u64>(), n in 2usize..20) {
        let (store, _engine) = build_random_dag(seed, n, 18);

        for block in store.iter_all() {
            let past = store.past_cone(block.id());
            let future = store.future_cone(block.id());
            prop_assert!(past.is_disjoint(&future));
            prop_assert!(!past.contains(&block.id()));
            prop_assert!(!future.contains(&block.id()));
        }
    }

    /// Property 8: `{b} ∪ past(b) ∪ future(b) ∪ anticone(b)` exactly
    /// partitions the full block set, for every `b`.
    #[test]
    fn anticone_partitions_the_rest_of_the_dag(seed in any::<u64>(), n in 2usize..20) {
        let (store, _engine) = build_random_dag(seed, n, 18);
        let all: HashSet<BlockId> = store.iter_all().map(|b| b.id()).collect();

        for block in store.iter_all() {
            let id = block.id();
            let past = store.past_cone(id);
            let future = store.future_cone(id);
            let anticone = store.anticone(id);

            let mut union: HashSet<BlockId> = HashSet::new();
            union.insert(id);
            union.extend(&past);
            union.extend(&future);
            union.extend(&anticone);
            prop_assert_eq!(union.len(), all.len());
            prop_assert_eq!(&union, &all);

            prop_assert!(past.is_disjoint(&anticone));
            prop_assert!(future.is_disjoint(&anticone));
            prop_assert!(!anticone.contains(&id));
        }
    }

    /// Sanity bound: neither accounting value can exceed the number of
    /// blocks actually in the DAG.
    #[test]
    fn blue_score_and_blue_set_stay_within_block_count(seed in any::<u64>(), n in 2usize..20, k in 0i64..5) {
        let (store, _engine) = build_random_dag(seed, n, k);
        let total = store.len() as u64;
        for block in store.iter_all() {
            prop_assert!(block.blue_score() <= total);
            prop_assert!(block.blue_set().len() as u64 <= total);
        }
    }

    /// Property 4 (k-cluster bound): for every block `b` and every
    /// `c ∈ blue_set(b)`, `|anticone_W(c) ∩ blue_set(b)| ≤ k`, where
    /// `W = past(b) ∪ {selected_parent(b)}`.
    #[test]
    fn anticone_blue_intersection_never_exceeds_k(seed in any::<u64>(), n in 2usize..20, k in 0i64..5) {
        let (store, _engine) = build_random_dag(seed, n, k);
        let k = k as u64;

        for block in store.iter_all() {
            let sp = match block.selected_parent() {
                Some(sp) => sp,
                None => continue,
            };

            let mut w: HashSet<BlockId> = store.past_cone(block.id());
            w.insert(sp);

            for &c in block.blue_set() {
                let anticone_w_c: HashSet<BlockId> = w
                    .iter()
                    .copied()
                    .filter(|&x| x != c && !store.past_cone(c).contains(&x) && !store.future_cone(c).contains(&x))
                    .collect();
                let blue_in_anticone = anticone_w_c.intersection(block.blue_set()).count() as u64;
                prop_assert!(blue_in_anticone <= k);
            }
        }
    }

    /// `blue_score` and `blue_set` are two views of the same accounting:
    /// `blue_score(b) = |blue_set(b)| + 1`, the `+1` covering `b`'s own
    /// provisional self-blueness (tracked separately via `is_blue`, not
    /// folded into `blue_set` which holds ancestors only).
    #[test]
    fn blue_score_equals_blue_set_size_plus_one(seed in any::<u64>(), n in 2usize..20, k in 0i64..5) {
        let (store, _engine) = build_random_dag(seed, n, k);
        for block in store.iter_all() {
            prop_assert_eq!(block.blue_score(), block.blue_set().len() as u64 + 1);
        }
    }
}

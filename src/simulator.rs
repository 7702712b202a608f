//! The network simulator (§4.5): Poisson block arrivals with a propagation-
//! delay model, plus the `k_from_x`/`k_from_network` parameter helpers.
//!
//! Grounded on `blanim`'s `kaspa/dag.py` (`sample_mining_interval`,
//! `create_blocks_from_timestamps`, `get_tips_at_time`, `k_from_x`) for the
//! exact algorithm, and on `rusty-kaspa`'s `config::bps::calculate_ghostdag_k`
//! for the idiomatic Rust shape of the Horner-style tail-sum loop.
//!
//! The simulator never touches a [`crate::store::DagStore`] — it yields
//! `(name, timestamp, parent_names)` records that a caller feeds into
//! `Dag::add` itself (§4.5: "they do not touch the DAG"). Exhaustion (the
//! configured duration elapsing) is modeled as plain `Iterator` termination,
//! not an error (§7: "not an error; iterator termination").

use std::collections::HashSet;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Exp};

/// One simulated block arrival.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedBlock {
    pub name: String,
    pub timestamp: f64,
    pub parent_names: Vec<String>,
}

/// A seeded simulator (§6: `Simulator(seed: u64)`). Holds nothing but the
/// seed; each [`Simulator::generate`] call starts an independent run.
pub struct Simulator {
    seed: u64,
}

impl Simulator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Starts a `duration`-second run at `bps` blocks/second with a
    /// `delay_ms`-millisecond propagation delay. Returns a lazy
    /// [`SimulationRun`] iterator; nothing is sampled until it is driven.
    pub fn generate(&self, duration: f64, bps: f64, delay_ms: f64) -> SimulationRun {
        SimulationRun {
            rng: SmallRng::seed_from_u64(self.seed),
            dist: Exp::new(bps).expect("bps must be positive"),
            duration,
            delay_s: delay_ms / 1000.0,
            elapsed: 0.0,
            next_index: 0,
            tips: HashSet::new(),
            tip_history: vec![(0.0, HashSet::new())],
            emitted: Vec::new(),
            exhausted: false,
        }
    }
}

/// One simulation run in progress. Implements [`Iterator`] directly: each
/// `next()` draws one `Exp(bps)` inter-arrival sample and yields the
/// resulting block, or returns `None` once the cumulative time exceeds
/// `duration`. Non-restartable once exhausted, matching the DAG Store's own
/// cone-iterator discipline (§9).
pub struct SimulationRun {
    rng: SmallRng,
    dist: Exp<f64>,
    duration: f64,
    delay_s: f64,
    elapsed: f64,
    next_index: usize,
    tips: HashSet<String>,
    /// `(time, tips-snapshot)` pairs, append-only and sorted by time since
    /// arrivals are drawn in non-decreasing order.
    tip_history: Vec<(f64, HashSet<String>)>,
    /// All blocks emitted so far, kept for the "most recently visible
    /// block" fallback when no tip is visible yet at a given delay horizon.
    emitted: Vec<SimulatedBlock>,
    exhausted: bool,
}

impl Iterator for SimulationRun {
    type Item = SimulatedBlock;

    fn next(&mut self) -> Option<SimulatedBlock> {
        if self.exhausted {
            return None;
        }

        self.elapsed += self.dist.sample(&mut self.rng);
        if self.elapsed > self.duration {
            self.exhausted = true;
            return None;
        }
        let t = self.elapsed;

        let visible_at = t - self.delay_s;
        let historical_tips = tips_at_time(&self.tip_history, visible_at);

        let parent_names: Vec<String> = if !historical_tips.is_empty() {
            historical_tips.into_iter().collect()
        } else if let Some(b) = self.emitted.iter().filter(|b| b.timestamp <= visible_at).last() {
            vec![b.name.clone()]
        } else {
            Vec::new()
        };

        let name = format!("block_{}", self.next_index);
        self.next_index += 1;
        for parent in &parent_names {
            self.tips.remove(parent);
        }
        self.tips.insert(name.clone());
        self.tip_history.push((t, self.tips.clone()));

        let block = SimulatedBlock { name, timestamp: t, parent_names };
        self.emitted.push(block.clone());
        Some(block)
    }
}

/// Binary search over the tip-history log for the tip set in effect at
/// `target_time`, mirroring `bisect.bisect_right` in the original source.
fn tips_at_time(history: &[(f64, HashSet<String>)], target_time: f64) -> HashSet<String> {
    let idx = match history.binary_search_by(|(t, _)| t.partial_cmp(&target_time).unwrap()) {
        Ok(mut i) => {
            // bisect_right semantics: land after the last entry equal to target_time.
            while i + 1 < history.len() && history[i + 1].0 == target_time {
                i += 1;
            }
            i
        }
        Err(0) => return HashSet::new(),
        Err(i) => i - 1,
    };
    history[idx].1.clone()
}

/// Smallest `k` such that the Poisson(`x`) CDF reaches `1 - delta_tol`,
/// computed by incremental Horner-style summation to avoid overflowing
/// `x^k` or `k!` directly for large `k`.
pub fn k_from_x(x: f64, delta_tol: f64) -> u64 {
    assert!(x > 0.0, "x must be positive");
    assert!(delta_tol > 0.0 && delta_tol < 1.0, "delta_tol must be in (0, 1)");

    let mut k_hat = 0u64;
    let mut sigma = 0.0;
    let mut fraction = 1.0;
    let exp = (-x).exp();

    loop {
        sigma += exp * fraction;
        if 1.0 - sigma < delta_tol {
            return k_hat;
        }
        k_hat += 1;
        fraction *= x / k_hat as f64;
    }
}

/// `k_from_x(2 * delay_max * lambda, delta_tol)` — the sound-k derivation
/// for a network with block rate `lambda` and worst-case propagation delay
/// `delay_max` (seconds).
pub fn k_from_network(lambda: f64, delay_max: f64, delta_tol: f64) -> u64 {
    k_from_x(2.0 * delay_max * lambda, delta_tol)
}

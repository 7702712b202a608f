//! The Layout Engine (§4.4): deterministic 2-D placement plus column
//! recentering, emitted to an external visual collaborator as an atomic
//! "move" batch.
//!
//! Grounded on `blanim`'s `kaspa/dag.py` `BlockManager._calculate_dag_position`
//! / `_animate_dag_repositioning`: place right of the rightmost parent,
//! stack above same-column neighbors, then recenter the whole column around
//! `genesis_y` and report every member that moved.

use serde::{Deserialize, Serialize};

use crate::block::BlockId;
use crate::store::DagStore;

/// Tolerance below which two x-coordinates are considered "the same column"
/// and a shift is considered a no-op. Must stay below `horizontal_spacing`
/// (§4.4).
const EPSILON: f64 = 1e-6;

/// Layout configuration (§6 "Layout parameters"). `Serialize`/`Deserialize`
/// are an ambient convenience for consumers that persist scene configs; they
/// change no documented default or clamping rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutParams {
    pub genesis_x: f64,
    pub genesis_y: f64,
    pub horizontal_spacing: f64,
    pub vertical_spacing: f64,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self { genesis_x: -5.5, genesis_y: 0.0, horizontal_spacing: 2.0, vertical_spacing: 1.0 }
    }
}

/// A position update the visual collaborator must apply atomically,
/// alongside its own line-endpoint updates (§4.4 "Move contract").
pub type MoveBatch = Vec<(BlockId, (f64, f64))>;

/// Assigns positions to new blocks and recenters the column they land in.
pub struct LayoutEngine {
    params: LayoutParams,
}

impl LayoutEngine {
    pub fn new(params: LayoutParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> LayoutParams {
        self.params
    }

    /// Places `id` (already inserted into `store` with its parents known)
    /// and recenters its column. Returns the move batch for every block
    /// whose position changed as a result of recentering (§4.4: emitted
    /// only when `|shift_y| ≥ ε`). A column with a single member recenters
    /// to a zero shift, so the batch is empty in that case — `id` is not
    /// reported just for having been placed.
    pub fn place(&self, store: &mut DagStore, id: BlockId) -> MoveBatch {
        let parents: Vec<BlockId> = store.block(id).map(|b| b.parents().to_vec()).unwrap_or_default();

        let target = if parents.is_empty() {
            (self.params.genesis_x, self.params.genesis_y)
        } else {
            let rightmost_x = parents
                .iter()
                .filter_map(|&p| store.block(p).map(|b| b.position().0))
                .fold(f64::NEG_INFINITY, f64::max);
            let target_x = rightmost_x + self.params.horizontal_spacing;

            let column_top = store
                .iter_all()
                .filter(|b| b.id() != id && (b.position().0 - target_x).abs() < EPSILON)
                .map(|b| b.position().1)
                .fold(None, |acc: Option<f64>, y| Some(acc.map_or(y, |m| m.max(y))));

            let target_y = match column_top {
                None => self.params.genesis_y,
                Some(top) => top + self.params.vertical_spacing,
            };
            (target_x, target_y)
        };

        store.set_position(id, target);
        self.recenter_column(store, target.0)
    }

    /// Recenters the column at `x` around `genesis_y` and reports every
    /// member whose position changed. Only this column is touched — other
    /// columns are untouched by this event (§4.4).
    fn recenter_column(&self, store: &mut DagStore, x: f64) -> MoveBatch {
        let members: Vec<BlockId> = store
            .iter_all()
            .filter(|b| (b.position().0 - x).abs() < EPSILON)
            .map(|b| b.id())
            .collect();

        if members.is_empty() {
            return Vec::new();
        }

        let ys: Vec<f64> = members.iter().filter_map(|&id| store.block(id).map(|b| b.position().1)).collect();
        let max_y = ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let min_y = ys.iter().cloned().fold(f64::INFINITY, f64::min);
        let shift_y = self.params.genesis_y - (max_y + min_y) / 2.0;

        if shift_y.abs() < EPSILON {
            return Vec::new();
        }

        let mut batch = Vec::with_capacity(members.len());
        for id in members {
            if let Some(b) = store.block(id) {
                let (bx, by) = b.position();
                let new_pos = (bx, by + shift_y);
                store.set_position(id, new_pos);
                batch.push((id, new_pos));
            }
        }
        log::debug!("recentered column x={:.3} shift_y={:.3} ({} blocks)", x, shift_y, batch.len());
        batch
    }
}

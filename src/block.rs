//! The `Block` data model (§3).
//!
//! Blocks are owned exclusively by [`crate::store::DagStore`]; every other
//! component — GHOSTDAG engine, layout engine, the external visual
//! collaborator — holds only [`BlockId`] back-references and looks the data
//! up through the store, matching the cyclic-reference workaround from §9:
//! "store visuals as an auxiliary map `block_id -> visual_handle`... the core
//! holds only integer ids or stable names."

use std::collections::HashSet;

/// Opaque, `Copy` handle to a block inside one [`crate::store::DagStore`].
///
/// `BlockId`s from different stores are not interchangeable; nothing in this
/// crate enforces that at the type level, so consumers must not mix them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub(crate) u64);

impl BlockId {
    /// Raw arena index backing this handle, exposed for external
    /// `block_id -> visual_handle` maps (§9).
    pub fn index(self) -> u64 {
        self.0
    }

    /// Builds a `BlockId` from a raw index. Only meaningful for ids that
    /// genuinely came from the same store's arena; used by tests and by
    /// callers reconstructing ids from a persisted `index()`.
    pub fn from_raw(index: u64) -> Self {
        Self(index)
    }
}

/// A single block in the DAG.
///
/// Every field here is write-once: the store fills in `parents`..`round` at
/// insertion time (I4–I7) and never mutates a `Block` afterward. `position`
/// is the one field assigned by a different component (the layout engine)
/// but still only ever written once, immediately after insertion.
#[derive(Debug, Clone)]
pub struct Block {
    pub(crate) id: BlockId,
    pub(crate) name: String,
    pub(crate) hash: u32,
    pub(crate) parents: Vec<BlockId>,
    pub(crate) children: HashSet<BlockId>,
    pub(crate) timestamp: f64,
    pub(crate) selected_parent: Option<BlockId>,
    pub(crate) mergeset: Vec<BlockId>,
    pub(crate) blue_set: HashSet<BlockId>,
    pub(crate) blue_score: u64,
    /// Provisional self-blueness (§3: "for the tip: provisional self=blue").
    /// Authoritative blueness from a specific viewer's perspective is a
    /// query, not a stored fact — see `DagStore::is_blue_in`.
    pub(crate) is_blue: bool,
    pub(crate) position: (f64, f64),
    /// Selected-parent-hop distance from genesis; genesis is round 0.
    pub(crate) round: u64,
}

impl Block {
    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hash(&self) -> u32 {
        self.hash
    }

    pub fn parents(&self) -> &[BlockId] {
        &self.parents
    }

    pub fn children(&self) -> &HashSet<BlockId> {
        &self.children
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn selected_parent(&self) -> Option<BlockId> {
        self.selected_parent
    }

    pub fn mergeset(&self) -> &[BlockId] {
        &self.mergeset
    }

    pub fn blue_set(&self) -> &HashSet<BlockId> {
        &self.blue_set
    }

    pub fn blue_score(&self) -> u64 {
        self.blue_score
    }

    pub fn is_blue(&self) -> bool {
        self.is_blue
    }

    pub fn position(&self) -> (f64, f64) {
        self.position
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn is_genesis(&self) -> bool {
        self.parents.is_empty()
    }
}

//! GHOSTDAG visualization core.
//!
//! Provides the data model and algorithms behind an interactive
//! blockchain-consensus visualizer:
//! - an append-only multi-parent block DAG ([`store`])
//! - the GHOSTDAG k-cluster blue-set ordering algorithm ([`ghostdag`])
//! - past/future/anticone queries over the DAG ([`store`])
//! - a deterministic 2-D layout engine driving an external visual
//!   collaborator ([`layout`])
//! - a Poisson network-delay block-arrival simulator ([`simulator`])
//!
//! Based on Kaspa's GHOSTDAG: <https://github.com/kaspanet/rusty-kaspa>

pub mod block;
pub mod dag;
pub mod error;
pub mod ghostdag;
pub mod identity;
pub mod layout;
pub mod simulator;
pub mod store;

pub use block::{Block, BlockId};
pub use dag::{Dag, OnMove};
pub use error::{DagError, Result};
pub use ghostdag::GhostdagEngine;
pub use layout::{LayoutEngine, LayoutParams, MoveBatch};
pub use simulator::{k_from_network, k_from_x, SimulatedBlock, SimulationRun, Simulator};
pub use store::DagStore;

/// Default anticone-size bound (§4.1/§6). Kaspa uses k=18 for ~1s blocks.
pub const DEFAULT_K: i64 = 18;

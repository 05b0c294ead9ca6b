//! Game tree node.

use crate::data_model::{BoardState, Edge};

use super::stats::NodeStats;

/// Index into the node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

/// Lifecycle of a node once its statistics have been loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodePhase {
    LightReady,
    HeavyReady,
    OnTree,
}

#[derive(Debug, Clone)]
pub struct TreeNode {
    pub state: BoardState,
    /// Canonical key of `state` in the statistics store.
    pub key: String,
    /// Parent node (`None` for the root).
    pub parent: Option<NodeId>,
    /// Action that led here from the parent.
    pub edge: Option<Edge>,
    /// Loaded with a one-ply lookahead value.
    pub heavy: bool,
    pub stats: NodeStats,
    pub children: Vec<NodeId>,
}

impl TreeNode {
    pub fn new_root(state: BoardState, key: String, stats: NodeStats) -> Self {
        Self {
            state,
            key,
            parent: None,
            edge: None,
            heavy: false,
            stats,
            children: Vec::new(),
        }
    }

    pub fn new_child(
        parent: NodeId,
        edge: Edge,
        state: BoardState,
        key: String,
        stats: NodeStats,
        heavy: bool,
    ) -> Self {
        Self {
            state,
            key,
            parent: Some(parent),
            edge: Some(edge),
            heavy,
            stats,
            children: Vec::new(),
        }
    }

    pub fn phase(&self) -> NodePhase {
        if self.stats.on_tree {
            NodePhase::OnTree
        } else if self.heavy {
            NodePhase::HeavyReady
        } else {
            NodePhase::LightReady
        }
    }

    /// Walls left to the player who does not move in this position.
    pub fn opponent_wall_count(&self) -> usize {
        self.state.player(self.state.opponent()).wall_count
    }

    pub fn is_terminal(&self) -> bool {
        self.stats.is_terminal()
    }
}

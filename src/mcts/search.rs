//! Search driver.
//!
//! Every pass rebuilds the tree from the root position: it descends by UCT
//! through nodes already on the tree, puts the first node off the tree onto
//! it, simulates greedily from there by heavy `node_value` until a finished
//! game (or the depth limit), and backpropagates the outcome up the parent
//! chain. Only the statistics in the store survive between passes.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tokio::task::JoinError;
use tracing::{debug, info, warn};

use crate::{
    data_model::{BoardState, Edge},
    render_board::render_board,
};

use super::{
    config::MctsConfig,
    loader::{load_children, load_light},
    node::{NodeId, TreeNode},
    select::{Candidate, ExploreMode, Pick, pick},
    store::{StatsStore, StoreError},
    tree::GameTree,
};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("statistics store error: {0}")]
    Store(#[from] StoreError),

    #[error("statistics task failed: {0}")]
    TaskFailed(#[from] JoinError),

    #[error("root position has no legal actions")]
    NoChildren,
}

/// Outcomes backpropagated during one `search()` call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SearchSummary {
    pub passes: u64,
    pub wins: u64,
    pub losses: u64,
    pub draws: u64,
}

impl SearchSummary {
    fn record(&mut self, outcome: i64) {
        self.passes += 1;
        match outcome.signum() {
            1 => self.wins += 1,
            -1 => self.losses += 1,
            _ => self.draws += 1,
        }
    }
}

pub struct MctsSearch {
    store: Arc<dyn StatsStore>,
    config: MctsConfig,
    root: BoardState,
    stop: Arc<AtomicBool>,
}

impl MctsSearch {
    pub fn new(store: Arc<dyn StatsStore>, config: MctsConfig) -> Self {
        Self {
            store,
            config,
            root: BoardState::initial(),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn set_root(&mut self, state: BoardState) {
        debug!(root = %state.key(), "search root changed");
        self.root = state;
    }

    pub fn root(&self) -> &BoardState {
        &self.root
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn StatsStore> {
        &self.store
    }

    /// Raising the returned flag ends `search()` after the current pass.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    fn should_continue(&self, passes: u64) -> bool {
        !self.stop.load(Ordering::Relaxed)
            && (self.config.num_passes == 0 || passes < self.config.num_passes)
    }

    /// Runs passes until the configured count is reached or the stop handle
    /// is raised.
    pub async fn search(&self) -> Result<SearchSummary, SearchError> {
        let mut summary = SearchSummary::default();
        info!(num_passes = self.config.num_passes, "search started");
        while self.should_continue(summary.passes) {
            let outcome = self.run_pass().await?;
            summary.record(outcome);
            debug!(pass = summary.passes, outcome, "pass finished");
        }
        info!(
            passes = summary.passes,
            wins = summary.wins,
            losses = summary.losses,
            draws = summary.draws,
            "search finished"
        );
        Ok(summary)
    }

    fn score(&self, mode: ExploreMode, node: &TreeNode, parent_visits: u64) -> f64 {
        match mode {
            ExploreMode::Searching => node.stats.uct(parent_visits, self.config.exploration),
            ExploreMode::Lookahead => node.stats.board_value,
            ExploreMode::Simulation => node.stats.node_value.unwrap_or(node.stats.board_value),
        }
    }

    /// One selection, simulation and backpropagation cycle. Returns the
    /// backpropagated outcome.
    pub async fn run_pass(&self) -> Result<i64, SearchError> {
        let root = load_light(self.store.clone(), self.root.clone()).await?;
        let mut tree = GameTree::new(TreeNode::new_root(root.state, root.key, root.stats));
        let mut current = tree.root();
        let mut mode = ExploreMode::Searching;
        let mut simulated_plies = 0;

        loop {
            let heavy = mode == ExploreMode::Simulation;
            let children = load_children(&self.store, &tree.get(current).state, heavy).await?;
            let parent_visits = tree.get(current).stats.visits;
            let ids: Vec<NodeId> = children
                .into_iter()
                .map(|(edge, loaded)| {
                    tree.add_child(TreeNode::new_child(
                        current,
                        edge,
                        loaded.state,
                        loaded.key,
                        loaded.stats,
                        heavy,
                    ))
                })
                .collect();
            let candidates: Vec<Candidate> = ids
                .iter()
                .map(|&id| {
                    let node = tree.get(id);
                    Candidate {
                        score: self.score(mode, node, parent_visits),
                        opponent_walls: node.opponent_wall_count(),
                    }
                })
                .collect();
            debug!(?mode, depth = tree.depth(current), children = ids.len(), "expanded");

            match pick(mode, &candidates) {
                Pick::Empty if current == tree.root() => return Err(SearchError::NoChildren),
                Pick::Empty => {
                    debug!("position without legal actions, scoring as a draw");
                    return self.backpropagate(&mut tree, current, 0).await;
                }
                Pick::Terminal { index } => {
                    return self.finish_at(&mut tree, ids[index]).await;
                }
                Pick::Best { index, .. } => {
                    let chosen = ids[index];
                    if mode == ExploreMode::Searching {
                        if tree.get(chosen).is_terminal() {
                            return self.finish_at(&mut tree, chosen).await;
                        }
                        if !tree.get(chosen).stats.on_tree {
                            tree.get_mut(chosen).stats.on_tree = true;
                            mode = ExploreMode::Simulation;
                        }
                    } else {
                        simulated_plies += 1;
                        if simulated_plies >= self.config.max_simulation_depth {
                            warn!(
                                plies = simulated_plies,
                                "simulation depth limit reached, scoring as a draw"
                            );
                            return self.backpropagate(&mut tree, chosen, 0).await;
                        }
                    }
                    current = chosen;
                }
            }
        }
    }

    async fn finish_at(&self, tree: &mut GameTree, terminal: NodeId) -> Result<i64, SearchError> {
        let node = tree.get(terminal);
        let outcome = self.config.terminal_outcome(node.state.current_player);
        debug!(
            edge = ?node.edge,
            depth = tree.depth(terminal),
            outcome,
            "finished game reached\n{}",
            render_board(&node.state)
        );
        self.backpropagate(tree, terminal, outcome).await
    }

    /// Adds one visit and `outcome` to `from` and every ancestor, persisting
    /// each node on the way up.
    pub async fn backpropagate(
        &self,
        tree: &mut GameTree,
        from: NodeId,
        outcome: i64,
    ) -> Result<i64, SearchError> {
        for id in tree.path_to_root(from) {
            let node = tree.get(id);
            let updated = self.store.accumulate(&node.key, &node.stats, outcome).await?;
            tree.get_mut(id).stats = updated;
        }
        Ok(outcome)
    }

    /// The root action with the most visits. Ties go to the child with the
    /// higher board value, then to the earlier one in generation order.
    pub async fn current_best_move(&self) -> Result<Edge, SearchError> {
        let children = load_children(&self.store, &self.root, false).await?;
        let mut best: Option<(Edge, u64, f64)> = None;
        for (edge, loaded) in children {
            let (visits, value) = (loaded.stats.visits, loaded.stats.board_value);
            let better = match best {
                None => true,
                Some((_, best_visits, best_value)) => {
                    visits > best_visits || (visits == best_visits && value > best_value)
                }
            };
            if better {
                best = Some((edge, visits, value));
            }
        }
        best.map(|(edge, ..)| edge).ok_or(SearchError::NoChildren)
    }
}

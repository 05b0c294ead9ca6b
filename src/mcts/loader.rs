//! Statistics lookup for freshly generated positions.
//!
//! Child sets are loaded as independent tokio tasks and joined before any
//! comparison happens. A light load only needs the static board value; a
//! heavy load additionally needs the one-ply lookahead `node_value`, which
//! in turn light-loads every child of the position.

use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::{
    data_model::{BoardState, Edge},
    game_logic::child_states,
    heuristic,
};

use super::{
    search::SearchError,
    select::{Candidate, ExploreMode, Pick, pick},
    stats::NodeStats,
    store::{StatsStore, StoreError},
};

/// Where a loaded record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsSource {
    Cached,
    Fresh,
    /// The stored record was unreadable and has been replaced.
    Recomputed,
}

#[derive(Debug, Clone)]
pub struct LoadedNode {
    pub state: BoardState,
    pub key: String,
    pub stats: NodeStats,
    pub source: StatsSource,
}

impl LoadedNode {
    pub fn opponent_wall_count(&self) -> usize {
        self.state.player(self.state.opponent()).wall_count
    }
}

/// Looks up `key`, treating a corrupt record like a missing one.
async fn lookup(
    store: &dyn StatsStore,
    key: &str,
) -> Result<(Option<NodeStats>, StatsSource), SearchError> {
    match store.get(key).await {
        Ok(Some(stats)) => Ok((Some(stats), StatsSource::Cached)),
        Ok(None) => Ok((None, StatsSource::Fresh)),
        Err(StoreError::Corrupt { key, source }) => {
            warn!(%key, %source, "corrupt statistics record, recomputing");
            Ok((None, StatsSource::Recomputed))
        }
        Err(err) => Err(err.into()),
    }
}

/// Loads the static statistics of `state`, creating and persisting them on
/// first sight.
pub async fn load_light(
    store: Arc<dyn StatsStore>,
    state: BoardState,
) -> Result<LoadedNode, SearchError> {
    let key = state.key();
    let (stats, source) = match lookup(store.as_ref(), &key).await? {
        (Some(stats), source) => (stats, source),
        (None, source) => {
            let stats = NodeStats::fresh(heuristic::evaluate(&state));
            store.set(&key, &stats).await?;
            (stats, source)
        }
    };
    Ok(LoadedNode {
        state,
        key,
        stats,
        source,
    })
}

/// Loads `state` with its `node_value` filled in, running the lookahead
/// when the stored record lacks it.
pub async fn load_heavy(
    store: Arc<dyn StatsStore>,
    state: BoardState,
) -> Result<LoadedNode, SearchError> {
    let key = state.key();
    let (existing, source) = lookup(store.as_ref(), &key).await?;
    if let Some(stats) = existing.as_ref().filter(|stats| stats.node_value.is_some()) {
        return Ok(LoadedNode {
            state,
            key,
            stats: stats.clone(),
            source,
        });
    }

    let mut stats = match existing {
        Some(stats) => stats,
        None => NodeStats::fresh(heuristic::evaluate(&state)),
    };
    stats.node_value = Some(lookahead_value(&store, &state, stats.board_value).await?);
    store.set(&key, &stats).await?;
    debug!(%key, node_value = ?stats.node_value, "heavy node loaded");
    Ok(LoadedNode {
        state,
        key,
        stats,
        source,
    })
}

/// `board_value` minus the best static value among the children. A finished
/// position keeps its board value, as does one without children.
async fn lookahead_value(
    store: &Arc<dyn StatsStore>,
    state: &BoardState,
    board_value: f64,
) -> Result<f64, SearchError> {
    if board_value.is_infinite() {
        return Ok(board_value);
    }
    let children = child_states(state)
        .into_iter()
        .map(|(child, _)| child)
        .collect();
    let store = store.clone();
    let loaded = join_in_order(children, move |child| load_light(store.clone(), child)).await?;
    let candidates: Vec<Candidate> = loaded
        .iter()
        .map(|node| Candidate {
            score: node.stats.board_value,
            opponent_walls: node.opponent_wall_count(),
        })
        .collect();
    Ok(match pick(ExploreMode::Lookahead, &candidates) {
        Pick::Best { score, .. } => board_value - score,
        Pick::Terminal { .. } | Pick::Empty => board_value,
    })
}

/// Loads every state concurrently and returns the results in input order.
pub async fn load_all(
    store: &Arc<dyn StatsStore>,
    states: Vec<BoardState>,
    heavy: bool,
) -> Result<Vec<LoadedNode>, SearchError> {
    let store = store.clone();
    if heavy {
        join_in_order(states, move |state| load_heavy(store.clone(), state)).await
    } else {
        join_in_order(states, move |state| load_light(store.clone(), state)).await
    }
}

/// Loads the children of `state` and pairs each with the edge leading to it.
pub async fn load_children(
    store: &Arc<dyn StatsStore>,
    state: &BoardState,
    heavy: bool,
) -> Result<Vec<(Edge, LoadedNode)>, SearchError> {
    let (states, edges): (Vec<BoardState>, Vec<Edge>) = child_states(state).into_iter().unzip();
    let loaded = load_all(store, states, heavy).await?;
    Ok(edges.into_iter().zip(loaded).collect())
}

/// Spawns one task per item and waits for all of them. The first failure is
/// returned and the remaining tasks are aborted when the set is dropped.
async fn join_in_order<T, F, Fut>(items: Vec<BoardState>, task: F) -> Result<Vec<T>, SearchError>
where
    T: Send + 'static,
    F: Fn(BoardState) -> Fut,
    Fut: Future<Output = Result<T, SearchError>> + Send + 'static,
{
    let count = items.len();
    let mut set = JoinSet::new();
    for (index, item) in items.into_iter().enumerate() {
        let future = task(item);
        set.spawn(async move { (index, future.await) });
    }
    let mut slots: Vec<Option<T>> = (0..count).map(|_| None).collect();
    while let Some(joined) = set.join_next().await {
        let (index, result) = joined?;
        slots[index] = Some(result?);
    }
    Ok(slots.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_model::Player;
    use crate::mcts::store::MemoryStore;

    fn memory_store() -> (Arc<MemoryStore>, Arc<dyn StatsStore>) {
        let store = Arc::new(MemoryStore::new());
        let shared: Arc<dyn StatsStore> = store.clone();
        (store, shared)
    }

    #[tokio::test]
    async fn light_load_persists_fresh_stats() {
        let (memory, store) = memory_store();
        let state = BoardState::initial();
        let loaded = load_light(store.clone(), state.clone()).await.unwrap();
        assert_eq!(loaded.source, StatsSource::Fresh);
        assert_eq!(loaded.stats, NodeStats::fresh(0.0));
        assert_eq!(memory.len(), 1);

        let again = load_light(store, state).await.unwrap();
        assert_eq!(again.source, StatsSource::Cached);
    }

    #[tokio::test]
    async fn corrupt_record_is_recomputed() {
        let (memory, store) = memory_store();
        let state = BoardState::initial();
        memory.insert_raw(&state.key(), "garbage").unwrap();
        let loaded = load_light(store.clone(), state.clone()).await.unwrap();
        assert_eq!(loaded.source, StatsSource::Recomputed);
        assert_eq!(
            memory.get(&state.key()).await.unwrap(),
            Some(NodeStats::fresh(0.0))
        );
    }

    #[tokio::test]
    async fn heavy_load_subtracts_best_child_value() {
        let (memory, store) = memory_store();
        let state = BoardState::initial();
        let loaded = load_heavy(store, state.clone()).await.unwrap();
        // Children are scored from player2's side. The best of them is worth
        // 1: either player1 stepped forward or a wall delays player2.
        assert_eq!(loaded.stats.board_value, 0.0);
        assert_eq!(loaded.stats.node_value, Some(-1.0));
        // Root plus all 131 children.
        assert_eq!(memory.len(), 132);
    }

    #[tokio::test]
    async fn light_record_is_upgraded_in_place() {
        let (memory, store) = memory_store();
        let state = BoardState::initial();
        let visited = NodeStats {
            visits: 7,
            outcome_sum: 3,
            ..NodeStats::fresh(0.0)
        };
        memory.set(&state.key(), &visited).await.unwrap();
        let loaded = load_heavy(store, state).await.unwrap();
        assert_eq!(loaded.source, StatsSource::Cached);
        assert_eq!(loaded.stats.visits, 7);
        assert_eq!(loaded.stats.node_value, Some(-1.0));
    }

    #[tokio::test]
    async fn finished_position_skips_lookahead() {
        let (memory, store) = memory_store();
        let mut state = BoardState::initial();
        state.player1.position = 2;
        state.current_player = Player::Player2;
        let loaded = load_heavy(store, state).await.unwrap();
        assert_eq!(loaded.stats.node_value, Some(f64::INFINITY));
        assert_eq!(memory.len(), 1);
    }

    #[tokio::test]
    async fn children_keep_generation_order() {
        let (_, store) = memory_store();
        let state = BoardState::initial();
        let children = load_children(&store, &state, false).await.unwrap();
        let edges: Vec<Edge> = children.iter().map(|(edge, _)| *edge).collect();
        let expected: Vec<Edge> = child_states(&state).into_iter().map(|(_, e)| e).collect();
        assert_eq!(edges, expected);
        assert_eq!(edges.last(), Some(&Edge::Move(75)));
    }
}

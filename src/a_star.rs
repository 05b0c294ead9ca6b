use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::grid_graph::{GridGraph, GridPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceEstimate {
    #[default]
    Manhattan,
    Diagonal,
    None,
}

impl DistanceEstimate {
    // One cell step spans two grid units.
    pub fn between(&self, from: GridPoint, to: GridPoint) -> f64 {
        let dx = from.x.abs_diff(to.x) as f64;
        let dy = from.y.abs_diff(to.y) as f64;
        match self {
            DistanceEstimate::Manhattan => (dx + dy) / 2.0,
            DistanceEstimate::Diagonal => {
                (dx + dy + (std::f64::consts::SQRT_2 - 2.0) * dx.min(dy)) / 2.0
            }
            DistanceEstimate::None => 0.0,
        }
    }

    fn to_nearest(&self, from: GridPoint, goals: &[GridPoint]) -> f64 {
        goals
            .iter()
            .map(|&goal| self.between(from, goal))
            .fold(f64::INFINITY, f64::min)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Priority(f64);

impl Eq for Priority {}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// The returned path excludes `start`.
pub fn a_star(
    graph: &GridGraph,
    start: GridPoint,
    goals: &[GridPoint],
    estimate: DistanceEstimate,
) -> Option<Vec<GridPoint>> {
    let goal_set: HashSet<GridPoint> = goals.iter().copied().collect();
    let mut open_heap = BinaryHeap::new();
    let mut closed_set = HashSet::new();
    let mut came_from = HashMap::<GridPoint, GridPoint>::new();
    let mut g_score = HashMap::<GridPoint, usize>::new();
    g_score.insert(start, 0);
    let h = estimate.to_nearest(start, goals);
    open_heap.push(Reverse((Priority(h), start)));

    while let Some(Reverse((_, current))) = open_heap.pop() {
        if !closed_set.insert(current) {
            continue;
        }

        if goal_set.contains(&current) {
            return Some(reconstruct_path(&came_from, &current));
        }
        for neighbor in graph.neighbors(current) {
            let tentative_g_score = g_score[&current] + graph.cost(neighbor);
            if tentative_g_score < *g_score.get(&neighbor).unwrap_or(&usize::MAX) {
                came_from.insert(neighbor, current);
                g_score.insert(neighbor, tentative_g_score);
                let f = tentative_g_score as f64 + estimate.to_nearest(neighbor, goals);
                open_heap.push(Reverse((Priority(f), neighbor)));
            }
        }
    }

    None
}

pub fn dijkstra(graph: &GridGraph, start: GridPoint, goals: &[GridPoint]) -> Option<Vec<GridPoint>> {
    a_star(graph, start, goals, DistanceEstimate::None)
}

fn reconstruct_path(
    came_from: &HashMap<GridPoint, GridPoint>,
    current: &GridPoint,
) -> Vec<GridPoint> {
    let mut total_path = Vec::new();
    let mut current = current;
    while let Some(next) = came_from.get(current) {
        total_path.push(*current);
        current = next;
    }
    total_path.reverse();
    total_path
}

pub fn shortest_path_length(
    graph: &GridGraph,
    start_cell: usize,
    goal_cells: impl IntoIterator<Item = usize>,
    estimate: DistanceEstimate,
) -> Option<usize> {
    let goals: Vec<GridPoint> = goal_cells
        .into_iter()
        .map(|cell| graph.cell_to_point(cell))
        .collect();
    a_star(graph, graph.cell_to_point(start_cell), &goals, estimate).map(|path| path.len())
}

pub fn is_reachable(
    graph: &GridGraph,
    start_cell: usize,
    goal_cells: impl IntoIterator<Item = usize>,
) -> bool {
    shortest_path_length(graph, start_cell, goal_cells, DistanceEstimate::Manhattan).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_model::{BoardState, Player};

    fn path_for(state: &BoardState, player: Player, estimate: DistanceEstimate) -> Option<usize> {
        let graph = GridGraph::from_board(state);
        shortest_path_length(
            &graph,
            state.player_position(player),
            state.goal_cells(player),
            estimate,
        )
    }

    #[test]
    fn open_board_distance() {
        let state = BoardState::initial();
        for estimate in [
            DistanceEstimate::Manhattan,
            DistanceEstimate::Diagonal,
            DistanceEstimate::None,
        ] {
            assert_eq!(path_for(&state, Player::Player1, estimate), Some(8));
            assert_eq!(path_for(&state, Player::Player2, estimate), Some(8));
        }
    }

    #[test]
    fn single_wall_test() {
        let mut state = BoardState::initial();
        // Horizontal walls at (3, 7) and (5, 7) block columns 3..=6 in front
        // of player1; the pawn sidesteps twice to the west.
        state.placed_walls = vec![118, 122];
        let graph = GridGraph::from_board(&state);
        let goals: Vec<GridPoint> = state
            .goal_cells(Player::Player1)
            .map(|cell| graph.cell_to_point(cell))
            .collect();
        let path = a_star(
            &graph,
            graph.cell_to_point(76),
            &goals,
            DistanceEstimate::Manhattan,
        )
        .unwrap();
        assert_eq!(path.len(), 10);
        assert_eq!(path.first(), Some(&graph.cell_to_point(75)));
        assert_eq!(path.last().map(|p| p.y), Some(0));
    }

    #[test]
    fn complex_wall_test() {
        let mut state = BoardState::initial();
        state.player1.position = 40;
        state.player2.position = 39;
        state.placed_walls = vec![35, 51, 39, 68, 72, 89];
        let manhattan = path_for(&state, Player::Player1, DistanceEstimate::Manhattan);
        let dijkstra = path_for(&state, Player::Player1, DistanceEstimate::None);
        assert!(manhattan.is_some());
        assert_eq!(manhattan, dijkstra);
    }

    #[test]
    fn on_goal_test() {
        let mut state = BoardState::initial();
        state.player1.position = 4;
        state.player2.position = 40;
        assert_eq!(
            path_for(&state, Player::Player1, DistanceEstimate::Manhattan),
            Some(0)
        );
    }

    #[test]
    fn sealed_goal_row_is_unreachable() {
        let mut state = BoardState::initial();
        // Row 0 is fenced off except for column 8, which walls 15 and 30 close.
        state.placed_walls = vec![0, 4, 8, 12, 15, 30];
        state.player2.position = 40;
        let graph = GridGraph::from_board(&state);
        assert!(!is_reachable(&graph, 76, state.goal_cells(Player::Player1)));
        assert!(is_reachable(&graph, 40, state.goal_cells(Player::Player2)));
    }

    #[test]
    fn diagonal_estimate_never_exceeds_manhattan() {
        let a = GridPoint::new(0, 0);
        let b = GridPoint::new(6, 10);
        assert!(
            DistanceEstimate::Diagonal.between(a, b) <= DistanceEstimate::Manhattan.between(a, b)
        );
        assert_eq!(DistanceEstimate::Manhattan.between(a, b), 8.0);
    }
}

use crate::{
    a_star::{DistanceEstimate, shortest_path_length},
    data_model::{BoardState, Player},
    grid_graph::GridGraph,
    render_board,
};

/// Score of a position whose opponent already stands on its goal row. It is
/// the worst possible outcome for the side to move and compares above every
/// finite score.
pub const CERTAIN_LOSS: f64 = f64::INFINITY;

/// Cell steps from `player`'s pawn to its nearest goal cell.
pub fn goal_distance(graph: &GridGraph, state: &BoardState, player: Player) -> Option<usize> {
    shortest_path_length(
        graph,
        state.player_position(player),
        state.goal_cells(player),
        DistanceEstimate::Manhattan,
    )
}

/// Static value of `state` from the perspective of the side to move: its own
/// distance to goal minus the opponent's. Lower is better for the mover.
///
/// # Panics
///
/// If either player has no route to its goal row. Legal wall generation never
/// produces such a position.
pub fn evaluate(state: &BoardState) -> f64 {
    let mover = state.current_player;
    let opponent = mover.opponent();
    if state.is_in_win_range(opponent) {
        return CERTAIN_LOSS;
    }
    let graph = GridGraph::from_board(state);
    let distances = [mover, opponent].map(|player| goal_distance(&graph, state, player));
    let [Some(mover_distance), Some(opponent_distance)] = distances else {
        panic!(
            "player without a path to its goal in the following board:\n{}",
            render_board::render_board(state)
        );
    };
    mover_distance as f64 - opponent_distance as f64
}

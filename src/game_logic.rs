use std::collections::VecDeque;

use thiserror::Error;

use crate::{
    data_model::{BoardState, Direction, Edge, Player},
    wall_index::{blocking_walls, conflicts_with_placed},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("cell {cell} is not a legal destination")]
    IllegalMove { cell: usize },

    #[error("wall {wall} cannot be placed")]
    IllegalWall { wall: usize },

    #[error("{player} has no walls left")]
    NoWallsLeft { player: Player },

    #[error("the game is already over")]
    GameOver,
}

pub fn is_direction_blocked(state: &BoardState, cell: usize, direction: Direction) -> bool {
    is_blocked_with(state, None, cell, direction)
}

// `extra_wall` counts as placed without being added to the board.
fn is_blocked_with(
    state: &BoardState,
    extra_wall: Option<usize>,
    cell: usize,
    direction: Direction,
) -> bool {
    blocking_walls(state.dimension, cell, direction)
        .into_iter()
        .any(|wall| extra_wall == Some(wall) || state.is_wall_placed(wall))
}

pub fn neighbor(state: &BoardState, cell: usize, direction: Direction) -> Option<usize> {
    let (x, y) = state.cell_coordinates(cell);
    let (dx, dy) = direction.to_offset();
    state.cell_at(x as isize + dx, y as isize + dy)
}

fn open_steps(
    state: &BoardState,
    extra_wall: Option<usize>,
    cell: usize,
) -> impl Iterator<Item = usize> + '_ {
    Direction::iter()
        .filter(move |&direction| !is_blocked_with(state, extra_wall, cell, direction))
        .filter_map(move |direction| neighbor(state, cell, direction))
}

/// Orthogonal steps from `cell` that stay on the board and cross no wall.
/// Pieces are ignored.
pub fn step_moves(state: &BoardState, cell: usize) -> Vec<usize> {
    open_steps(state, None, cell).collect()
}

/// Destinations for a piece on `cell` when the other piece stands on
/// `other`.
///
/// A straight jump over an adjacent piece replaces that piece's cell in
/// place. When the straight jump is blocked by a wall or would leave the
/// board, the other piece's own steps are appended instead.
pub fn moves_from(state: &BoardState, cell: usize, other: usize) -> Vec<usize> {
    let mut moves = step_moves(state, cell);
    let Some(slot) = moves.iter().position(|&destination| destination == other) else {
        return moves;
    };
    let toward_other = Direction::between(
        state.cell_coordinates(cell),
        state.cell_coordinates(other),
    );
    let straight_jump = toward_other
        .filter(|&direction| !is_direction_blocked(state, other, direction))
        .and_then(|direction| neighbor(state, other, direction));
    match straight_jump {
        Some(landing) => moves[slot] = landing,
        None => {
            moves.remove(slot);
            for lateral in step_moves(state, other) {
                if lateral != cell && !moves.contains(&lateral) {
                    moves.push(lateral);
                }
            }
        }
    }
    moves
}

pub fn legal_moves(state: &BoardState) -> Vec<usize> {
    let mover = state.current_player;
    moves_from(
        state,
        state.player_position(mover),
        state.player_position(mover.opponent()),
    )
}

/// Breadth-first reachability from `player`'s cell to its win range, with
/// `tentative_wall` treated as placed.
pub fn path_exists(state: &BoardState, player: Player, tentative_wall: Option<usize>) -> bool {
    let [first_goal, last_goal] = state.player(player).win_range;
    let start = state.player_position(player);
    let mut examined = vec![false; state.cell_count()];
    let mut queue = VecDeque::from([start]);
    examined[start] = true;
    while let Some(cell) = queue.pop_front() {
        if (first_goal..=last_goal).contains(&cell) {
            return true;
        }
        for next in open_steps(state, tentative_wall, cell) {
            if !examined[next] {
                examined[next] = true;
                queue.push_back(next);
            }
        }
    }
    false
}

pub fn players_have_paths(state: &BoardState, tentative_wall: Option<usize>) -> bool {
    path_exists(state, Player::Player1, tentative_wall)
        && path_exists(state, Player::Player2, tentative_wall)
}

// Wall budgets are checked by the callers.
pub fn is_wall_legal(state: &BoardState, wall: usize) -> bool {
    wall < state.total_walls
        && !state.is_wall_placed(wall)
        && !conflicts_with_placed(state.dimension, &state.placed_walls, wall)
        && players_have_paths(state, Some(wall))
}

pub fn legal_wall_slots(state: &BoardState) -> Vec<usize> {
    (0..state.total_walls)
        .filter(|&wall| is_wall_legal(state, wall))
        .collect()
}

pub fn winner(state: &BoardState) -> Option<Player> {
    [Player::Player1, Player::Player2]
        .into_iter()
        .find(|&player| state.is_in_win_range(player))
}

fn with_wall_unchecked(state: &BoardState, wall: usize) -> BoardState {
    let mover = state.current_player;
    let mut child = state.clone();
    child.placed_walls.push(wall);
    child.player_mut(mover).wall_count -= 1;
    child.current_player = mover.opponent();
    child.valid_moves = legal_moves(&child);
    child
}

fn with_move_unchecked(state: &BoardState, cell: usize) -> BoardState {
    let mover = state.current_player;
    let mut child = state.clone();
    child.player_mut(mover).position = cell;
    child.current_player = mover.opponent();
    child.valid_moves = legal_moves(&child);
    child
}

/// Walls first, in index order, then moves in generation order.
pub fn child_states(state: &BoardState) -> Vec<(BoardState, Edge)> {
    let mut children = Vec::new();
    if state.player(state.current_player).wall_count > 0 {
        for wall in legal_wall_slots(state) {
            children.push((with_wall_unchecked(state, wall), Edge::Wall(wall)));
        }
    }
    for &cell in &state.valid_moves {
        children.push((with_move_unchecked(state, cell), Edge::Move(cell)));
    }
    children
}

pub fn apply_edge(state: &BoardState, edge: Edge) -> Result<BoardState, GameError> {
    if winner(state).is_some() {
        return Err(GameError::GameOver);
    }
    match edge {
        Edge::Move(cell) => {
            if !legal_moves(state).contains(&cell) {
                return Err(GameError::IllegalMove { cell });
            }
            Ok(with_move_unchecked(state, cell))
        }
        Edge::Wall(wall) => {
            let mover = state.current_player;
            if state.player(mover).wall_count == 0 {
                return Err(GameError::NoWallsLeft { player: mover });
            }
            if !is_wall_legal(state, wall) {
                return Err(GameError::IllegalWall { wall });
            }
            Ok(with_wall_unchecked(state, wall))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wall_index::walls_conflict;
    use proptest::prelude::*;

    fn state_with(p1: usize, p2: usize, walls: &[usize]) -> BoardState {
        let mut state = BoardState::initial();
        state.player1.position = p1;
        state.player2.position = p2;
        state.placed_walls = walls.to_vec();
        state.valid_moves = legal_moves(&state);
        state
    }

    #[test]
    fn opening_moves() {
        let state = BoardState::initial();
        assert_eq!(legal_moves(&state), vec![67, 77, 75]);
    }

    #[test]
    fn never_proposes_own_cell() {
        let state = state_with(40, 31, &[]);
        assert!(!legal_moves(&state).contains(&40));
    }

    #[test]
    fn straight_jump_replaces_opponent_cell() {
        // Player1 on (4, 4), player2 directly north on (4, 3).
        let state = state_with(40, 31, &[]);
        assert_eq!(legal_moves(&state), vec![22, 41, 49, 39]);
    }

    #[test]
    fn blocked_jump_falls_back_to_lateral_moves() {
        // Horizontal wall anchored at (4, 2) sits north of (4, 3).
        let state = state_with(40, 31, &[40]);
        assert_eq!(legal_moves(&state), vec![41, 49, 39, 32, 30]);
    }

    #[test]
    fn off_board_jump_falls_back_to_lateral_moves() {
        // Player1 on (4, 1), player2 on the top edge at (4, 0).
        let state = state_with(13, 4, &[]);
        assert_eq!(legal_moves(&state), vec![14, 22, 12, 5, 3]);
    }

    #[test]
    fn walls_block_steps() {
        // Vertical wall anchored at (4, 7) stands east of (4, 8).
        let state = state_with(76, 4, &[121]);
        assert_eq!(legal_moves(&state), vec![67, 75]);
    }

    #[test]
    fn opening_allows_every_wall() {
        let state = BoardState::initial();
        let walls = legal_wall_slots(&state);
        assert!(!walls.is_empty());
        assert_eq!(walls.len(), 128);
    }

    #[test]
    fn conflicting_walls_are_excluded() {
        let state = state_with(76, 4, &[20]);
        let walls = legal_wall_slots(&state);
        for wall in [18, 20, 21, 22] {
            assert!(!walls.contains(&wall), "wall {wall} should conflict");
        }
        assert!(walls.contains(&24));
    }

    #[test]
    fn sealing_goal_row_is_illegal() {
        // Horizontals under columns 0..=7 of row 0 and a vertical between
        // columns 7 and 8 leave a single corridor down column 8; wall 30
        // would close it.
        let state = state_with(76, 40, &[0, 4, 8, 12, 15]);
        assert!(players_have_paths(&state, None));
        assert!(!conflicts_with_placed(state.dimension, &state.placed_walls, 30));
        assert!(!path_exists(&state, Player::Player1, Some(30)));
        assert!(!legal_wall_slots(&state).contains(&30));
        assert_eq!(state.placed_walls, vec![0, 4, 8, 12, 15]);
    }

    #[test]
    fn tentative_wall_matches_placed_wall() {
        let state = state_with(76, 40, &[0, 4, 8, 12, 15]);
        for wall in 0..state.total_walls {
            let mut placed = state.clone();
            placed.placed_walls.push(wall);
            for player in [Player::Player1, Player::Player2] {
                assert_eq!(
                    path_exists(&state, player, Some(wall)),
                    path_exists(&placed, player, None),
                    "wall {wall}, {player}"
                );
            }
        }
        assert_eq!(state.placed_walls, vec![0, 4, 8, 12, 15]);
    }

    #[test]
    fn children_list_walls_before_moves() {
        let state = BoardState::initial();
        let children = child_states(&state);
        assert_eq!(children.len(), 128 + 3);
        assert_eq!(children[0].1, Edge::Wall(0));
        assert_eq!(children[127].1, Edge::Wall(127));
        assert_eq!(children[128].1, Edge::Move(67));
        assert_eq!(children[130].1, Edge::Move(75));

        let (wall_child, _) = &children[0];
        assert_eq!(wall_child.player1.wall_count, 9);
        assert_eq!(wall_child.current_player, Player::Player2);
        assert_eq!(wall_child.valid_moves, vec![5, 13, 3]);

        let (move_child, _) = &children[128];
        assert_eq!(move_child.player1.position, 67);
        assert_eq!(move_child.player1.wall_count, 10);
    }

    #[test]
    fn no_wall_children_without_budget() {
        let mut state = BoardState::initial();
        state.player1.wall_count = 0;
        let children = child_states(&state);
        assert!(children.iter().all(|(_, edge)| matches!(edge, Edge::Move(_))));
    }

    #[test]
    fn apply_edge_rejects_illegal_actions() {
        let state = BoardState::initial();
        assert_eq!(
            apply_edge(&state, Edge::Move(58)),
            Err(GameError::IllegalMove { cell: 58 })
        );
        let walled = apply_edge(&state, Edge::Wall(20)).unwrap();
        let walled = apply_edge(&walled, Edge::Move(13)).unwrap();
        assert_eq!(
            apply_edge(&walled, Edge::Wall(22)),
            Err(GameError::IllegalWall { wall: 22 })
        );
        let mut broke = BoardState::initial();
        broke.player1.wall_count = 0;
        assert_eq!(
            apply_edge(&broke, Edge::Wall(0)),
            Err(GameError::NoWallsLeft { player: Player::Player1 })
        );
    }

    #[test]
    fn finished_game_rejects_actions() {
        let state = state_with(3, 40, &[]);
        assert_eq!(winner(&state), Some(Player::Player1));
        assert_eq!(apply_edge(&state, Edge::Move(41)), Err(GameError::GameOver));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn random_play_keeps_paths_and_walls_consistent(choices in proptest::collection::vec(0..10_000usize, 1..24)) {
            let mut state = BoardState::initial();
            for choice in choices {
                if winner(&state).is_some() {
                    break;
                }
                let children = child_states(&state);
                prop_assert!(!children.is_empty());
                let (child, _) = children[choice % children.len()].clone();
                state = child;
                prop_assert!(players_have_paths(&state, None));
                for (i, &a) in state.placed_walls.iter().enumerate() {
                    for &b in &state.placed_walls[i + 1..] {
                        prop_assert!(!walls_conflict(state.dimension, a, b));
                    }
                }
                prop_assert_eq!(&state.valid_moves, &legal_moves(&state));
            }
        }
    }
}

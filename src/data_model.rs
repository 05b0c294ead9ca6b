use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game_logic::{legal_moves, path_exists};
use crate::wall_index::{total_wall_slots, wall_index, walls_conflict};

pub const DIMENSION: usize = 9;
pub const MAX_DIMENSION: usize = 64;
pub const TOTAL_WALL_SLOTS: usize = 2 * (DIMENSION - 1) * (DIMENSION - 1);
pub const WALLS_PER_PLAYER: usize = 10;

/// Reasons a board read from outside the engine is refused.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("malformed board key: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("dimension {0} is outside 2..={max}", max = MAX_DIMENSION)]
    Dimension(usize),

    #[error("board declares {found} wall slots, its dimension has {expected}")]
    WallSlots { expected: usize, found: usize },

    #[error("{player} stands on cell {cell}, outside the board")]
    PositionOffBoard { player: Player, cell: usize },

    #[error("both pawns stand on cell {cell}")]
    PawnsShareCell { cell: usize },

    #[error("{player} has win range {range:?}, not a span of board cells")]
    WinRange { player: Player, range: [usize; 2] },

    #[error("wall {wall} does not exist on this board")]
    WallOffBoard { wall: usize },

    #[error("walls {first} and {second} overlap")]
    WallConflict { first: usize, second: usize },

    #[error("{player} holds {count} walls, more than {}", WALLS_PER_PLAYER)]
    WallBudget { player: Player, count: usize },

    #[error("listed valid moves do not match the position")]
    StaleValidMoves,

    #[error("{player} has no path to its goal")]
    NoPath { player: Player },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WallOrientation {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumIter)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Player {
    Player1,
    Player2,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    pub position: usize,
    /// Inclusive range of goal cells.
    pub win_range: [usize; 2],
    pub wall_count: usize,
}

// The JSON encoding is the statistics store key: fields must keep this order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardState {
    pub dimension: usize,
    pub total_walls: usize,
    pub placed_walls: Vec<usize>,
    pub valid_moves: Vec<usize>,
    pub current_player: Player,
    pub player1: PlayerRecord,
    pub player2: PlayerRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Wall(usize),
    Move(usize),
}

impl BoardState {
    pub fn initial() -> Self {
        let last_row = DIMENSION * (DIMENSION - 1);
        let mut state = Self {
            dimension: DIMENSION,
            total_walls: TOTAL_WALL_SLOTS,
            placed_walls: Vec::new(),
            valid_moves: Vec::new(),
            current_player: Player::Player1,
            player1: PlayerRecord {
                position: last_row + DIMENSION / 2,
                win_range: [0, DIMENSION - 1],
                wall_count: WALLS_PER_PLAYER,
            },
            player2: PlayerRecord {
                position: DIMENSION / 2,
                win_range: [last_row, last_row + DIMENSION - 1],
                wall_count: WALLS_PER_PLAYER,
            },
        };
        state.valid_moves = legal_moves(&state);
        state
    }

    /// Canonical string form, used as the statistics store key.
    pub fn key(&self) -> String {
        serde_json::to_string(self).expect("board state always encodes to JSON")
    }

    /// Parses a key produced outside the engine and checks that it describes
    /// a playable position.
    pub fn from_key(key: &str) -> Result<Self, BoardError> {
        let state: Self = serde_json::from_str(key)?;
        state.validate()?;
        Ok(state)
    }

    pub fn validate(&self) -> Result<(), BoardError> {
        let dimension = self.dimension;
        if !(2..=MAX_DIMENSION).contains(&dimension) {
            return Err(BoardError::Dimension(dimension));
        }
        let expected = total_wall_slots(dimension);
        if self.total_walls != expected {
            return Err(BoardError::WallSlots {
                expected,
                found: self.total_walls,
            });
        }

        let cells = self.cell_count();
        for player in [Player::Player1, Player::Player2] {
            let record = self.player(player);
            if record.position >= cells {
                return Err(BoardError::PositionOffBoard {
                    player,
                    cell: record.position,
                });
            }
            let [first, last] = record.win_range;
            if first > last || last >= cells {
                return Err(BoardError::WinRange {
                    player,
                    range: record.win_range,
                });
            }
            if record.wall_count > WALLS_PER_PLAYER {
                return Err(BoardError::WallBudget {
                    player,
                    count: record.wall_count,
                });
            }
        }
        if self.player1.position == self.player2.position {
            return Err(BoardError::PawnsShareCell {
                cell: self.player1.position,
            });
        }

        for (i, &first) in self.placed_walls.iter().enumerate() {
            if first >= self.total_walls {
                return Err(BoardError::WallOffBoard { wall: first });
            }
            if let Some(&second) = self.placed_walls[..i]
                .iter()
                .find(|&&earlier| walls_conflict(dimension, earlier, first))
            {
                return Err(BoardError::WallConflict { first: second, second: first });
            }
        }

        if self.valid_moves != legal_moves(self) {
            return Err(BoardError::StaleValidMoves);
        }
        for player in [Player::Player1, Player::Player2] {
            if !path_exists(self, player, None) {
                return Err(BoardError::NoPath { player });
            }
        }
        Ok(())
    }

    pub fn player(&self, player: Player) -> &PlayerRecord {
        match player {
            Player::Player1 => &self.player1,
            Player::Player2 => &self.player2,
        }
    }

    pub fn player_mut(&mut self, player: Player) -> &mut PlayerRecord {
        match player {
            Player::Player1 => &mut self.player1,
            Player::Player2 => &mut self.player2,
        }
    }

    pub fn opponent(&self) -> Player {
        self.current_player.opponent()
    }

    pub fn player_position(&self, player: Player) -> usize {
        self.player(player).position
    }

    pub fn is_in_win_range(&self, player: Player) -> bool {
        let record = self.player(player);
        (record.win_range[0]..=record.win_range[1]).contains(&record.position)
    }

    pub fn goal_cells(&self, player: Player) -> impl Iterator<Item = usize> {
        let [first, last] = self.player(player).win_range;
        first..=last
    }

    pub fn cell_count(&self) -> usize {
        self.dimension * self.dimension
    }

    // Row 0 is the top edge.
    pub fn cell_coordinates(&self, cell: usize) -> (usize, usize) {
        (cell % self.dimension, cell / self.dimension)
    }

    pub fn cell_at(&self, x: isize, y: isize) -> Option<usize> {
        let d = self.dimension as isize;
        (x >= 0 && y >= 0 && x < d && y < d).then(|| (y * d + x) as usize)
    }

    pub fn is_wall_placed(&self, index: usize) -> bool {
        self.placed_walls.contains(&index)
    }

    pub fn wall_at(
        &self,
        wall_orientation: WallOrientation,
        wall_pos_x: isize,
        wall_pos_y: isize,
    ) -> bool {
        let anchors = (self.dimension - 1) as isize;
        wall_pos_x >= 0
            && wall_pos_y >= 0
            && wall_pos_x < anchors
            && wall_pos_y < anchors
            && self.is_wall_placed(wall_index(
                self.dimension,
                wall_pos_x as usize,
                wall_pos_y as usize,
                wall_orientation,
            ))
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::initial()
    }
}

impl Direction {
    pub fn iter() -> impl Iterator<Item = Self> {
        <Self as strum::IntoEnumIterator>::iter()
    }

    pub fn to_offset(&self) -> (isize, isize) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    pub fn between(from: (usize, usize), to: (usize, usize)) -> Option<Direction> {
        let dx = to.0 as isize - from.0 as isize;
        let dy = to.1 as isize - from.1 as isize;
        Direction::iter().find(|direction| direction.to_offset() == (dx, dy))
    }
}

impl Player {
    pub fn opponent(&self) -> Player {
        match self {
            Player::Player1 => Player::Player2,
            Player::Player2 => Player::Player1,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Player::Player1 => '1',
            Player::Player2 => '2',
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edge::Wall(index) => write!(f, "wall {index}"),
            Edge::Move(cell) => write!(f, "move {cell}"),
        }
    }
}

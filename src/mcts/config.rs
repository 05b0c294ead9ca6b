//! Search parameters.

use serde::{Deserialize, Serialize};

use crate::data_model::Player;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MctsConfig {
    /// Exploration constant of the UCT formula.
    pub exploration: f64,

    /// Side the engine plays for. A simulation that ends with this side to
    /// move is backpropagated as `+1`, any other ending as `-1`.
    pub agent: Player,

    /// Passes per `search()` call. `0` runs until the stop handle is raised.
    pub num_passes: u64,

    /// Plies a greedy simulation may descend before it is scored as a draw.
    pub max_simulation_depth: usize,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            exploration: std::f64::consts::SQRT_2,
            agent: Player::Player2,
            num_passes: 64,
            max_simulation_depth: 200,
        }
    }
}

impl MctsConfig {
    /// Score backpropagated from a finished position with `to_move` to play.
    pub fn terminal_outcome(&self, to_move: Player) -> i64 {
        if to_move == self.agent { 1 } else { -1 }
    }
}

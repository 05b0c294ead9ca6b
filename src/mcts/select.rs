//! Child comparison shared by all exploration modes.

use tracing::trace;

/// What a child set is being compared for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExploreMode {
    /// UCT descent through nodes already on the tree.
    Searching,
    /// One-ply lookahead by static board value, used to fill in a heavy
    /// node's `node_value`.
    Lookahead,
    /// Greedy descent by `node_value` towards a finished game.
    Simulation,
}

/// The inputs one child contributes to a comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub score: f64,
    pub opponent_walls: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pick {
    Best { index: usize, score: f64 },
    /// A simulation reached a position its mover has already lost.
    Terminal { index: usize },
    Empty,
}

/// Scans `candidates` in order and keeps the highest score. Outside of UCT
/// search an equal score is won by the child that leaves the opponent more
/// walls. In simulation the scan stops at the first `+inf` score.
pub fn pick(mode: ExploreMode, candidates: &[Candidate]) -> Pick {
    let mut best: Option<(usize, Candidate)> = None;
    for (index, candidate) in candidates.iter().enumerate() {
        trace!(?mode, index, score = candidate.score, "child score");
        let replace = match best {
            None => true,
            Some((_, current)) => {
                current.score == f64::NEG_INFINITY
                    || candidate.score > current.score
                    || (mode != ExploreMode::Searching
                        && candidate.score == current.score
                        && candidate.opponent_walls > current.opponent_walls)
            }
        };
        if replace {
            best = Some((index, *candidate));
        }
        if mode == ExploreMode::Simulation
            && best.is_some_and(|(_, current)| current.score == f64::INFINITY)
        {
            return Pick::Terminal { index };
        }
    }
    match best {
        Some((index, candidate)) => Pick::Best {
            index,
            score: candidate.score,
        },
        None => Pick::Empty,
    }
}

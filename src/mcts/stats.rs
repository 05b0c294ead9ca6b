//! Persisted per-position statistics and the UCT score built from them.

use serde::{Deserialize, Serialize};

/// Statistics record stored under a board's canonical key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStats {
    pub visits: u64,
    /// Sum of backpropagated outcomes (+1, -1 or 0 each).
    pub outcome_sum: i64,
    pub on_tree: bool,
    /// Static heuristic value, computed once per position.
    #[serde(with = "score_format")]
    pub board_value: f64,
    /// One-ply lookahead value; only present once the position was expanded
    /// as a heavy node.
    #[serde(with = "score_format::optional", default)]
    pub node_value: Option<f64>,
}

impl NodeStats {
    pub fn fresh(board_value: f64) -> Self {
        Self {
            visits: 0,
            outcome_sum: 0,
            on_tree: false,
            board_value,
            node_value: None,
        }
    }

    /// The side that just moved into this position has already won.
    pub fn is_terminal(&self) -> bool {
        self.board_value == f64::INFINITY
    }

    pub fn mean_outcome(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.outcome_sum as f64 / self.visits as f64
        }
    }

    /// Upper confidence bound of this node as a child of a parent visited
    /// `parent_visits` times. Unvisited nodes score `+inf`.
    pub fn uct(&self, parent_visits: u64, exploration: f64) -> f64 {
        if self.visits == 0 {
            return f64::INFINITY;
        }
        let visits = self.visits as f64;
        let parent_visits = parent_visits.max(1) as f64;
        self.mean_outcome()
            + exploration * (parent_visits.ln() / visits).sqrt()
            + self.board_value / (visits + 1.0)
    }

    /// Records one backpropagated outcome.
    pub fn record(&mut self, outcome: i64) {
        self.visits += 1;
        self.outcome_sum += outcome;
    }
}

/// JSON has no infinities, so infinite scores travel as the strings
/// `"Infinity"` and `"-Infinity"`.
mod score_format {
    use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error};

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Symbol(String),
    }

    fn to_repr(value: f64) -> Repr {
        if value == f64::INFINITY {
            Repr::Symbol("Infinity".to_string())
        } else if value == f64::NEG_INFINITY {
            Repr::Symbol("-Infinity".to_string())
        } else {
            Repr::Number(value)
        }
    }

    fn from_repr<E: Error>(repr: Repr) -> Result<f64, E> {
        match repr {
            Repr::Number(value) => Ok(value),
            Repr::Symbol(symbol) => match symbol.as_str() {
                "Infinity" => Ok(f64::INFINITY),
                "-Infinity" => Ok(f64::NEG_INFINITY),
                other => Err(E::custom(format!("invalid score `{other}`"))),
            },
        }
    }

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        to_repr(*value).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        from_repr(Repr::deserialize(deserializer)?)
    }

    pub mod optional {
        use super::*;

        pub fn serialize<S: Serializer>(
            value: &Option<f64>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            value.map(to_repr).serialize(serializer)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<f64>, D::Error> {
            Option::<Repr>::deserialize(deserializer)?
                .map(from_repr::<D::Error>)
                .transpose()
        }
    }
}

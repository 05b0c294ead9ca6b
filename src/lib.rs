//! Quoridor engine that grows a persistent game tree under Monte-Carlo Tree
//! Search. Each position is scored by a shortest-path heuristic over a
//! doubled obstacle grid, and per-position statistics live in an external
//! key-value store keyed by the canonical board encoding.

pub mod a_star;
pub mod commands;
pub mod config;
pub mod data_model;
pub mod game_logic;
pub mod grid_graph;
pub mod heuristic;
pub mod mcts;
pub mod player_type;
pub mod render_board;
pub mod wall_index;

pub use data_model::{BoardError, BoardState, Edge, Player, PlayerRecord};
pub use mcts::{MctsConfig, MctsSearch, MemoryStore, NodeStats, SearchError, StatsStore};

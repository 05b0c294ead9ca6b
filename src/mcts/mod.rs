//! Monte-Carlo Tree Search over Quoridor positions with statistics kept in an
//! external store.

pub mod config;
pub mod loader;
pub mod node;
pub mod search;
pub mod select;
pub mod stats;
pub mod store;
pub mod tree;

pub use config::MctsConfig;
pub use node::{NodeId, NodePhase, TreeNode};
pub use search::{MctsSearch, SearchError, SearchSummary};
pub use stats::NodeStats;
pub use store::{MemoryStore, StatsStore, StoreError};
pub use tree::GameTree;

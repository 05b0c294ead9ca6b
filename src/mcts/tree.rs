//! Arena holding one search pass worth of nodes.
//!
//! The arena is dropped after every pass; statistics survive in the store.

use super::node::{NodeId, TreeNode};

#[derive(Debug)]
pub struct GameTree {
    nodes: Vec<TreeNode>,
}

impl GameTree {
    pub fn new(root: TreeNode) -> Self {
        Self { nodes: vec![root] }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0 as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id.0 as usize]
    }

    /// Allocates `child` and links it under its parent.
    pub fn add_child(&mut self, child: TreeNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let parent = child.parent;
        self.nodes.push(child);
        if let Some(parent) = parent {
            self.get_mut(parent).children.push(id);
        }
        id
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// `id` followed by each of its ancestors up to the root.
    pub fn path_to_root(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = vec![id];
        let mut current = id;
        while let Some(parent) = self.get(current).parent {
            path.push(parent);
            current = parent;
        }
        path
    }

    pub fn depth(&self, id: NodeId) -> usize {
        self.path_to_root(id).len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_model::{BoardState, Edge};
    use crate::mcts::node::NodePhase;
    use crate::mcts::stats::NodeStats;

    fn node(parent: Option<NodeId>) -> TreeNode {
        let state = BoardState::initial();
        let key = state.key();
        match parent {
            None => TreeNode::new_root(state, key, NodeStats::fresh(0.0)),
            Some(parent) => {
                TreeNode::new_child(parent, Edge::Move(67), state, key, NodeStats::fresh(0.0), true)
            }
        }
    }

    #[test]
    fn children_link_to_parents() {
        let mut tree = GameTree::new(node(None));
        let a = tree.add_child(node(Some(tree.root())));
        let b = tree.add_child(node(Some(a)));
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.get(tree.root()).children, vec![a]);
        assert_eq!(tree.path_to_root(b), vec![b, a, tree.root()]);
        assert_eq!(tree.depth(b), 2);
        assert_eq!(tree.get(b).phase(), NodePhase::HeavyReady);
        assert_eq!(tree.get(tree.root()).phase(), NodePhase::LightReady);
    }
}

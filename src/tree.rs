//! Search tree with arena allocation.
//!
//! Nodes live in a contiguous `Vec` and refer to each other by [`NodeId`].
//! Ownership runs top-down through each node's child map; the parent link is
//! a plain index used only to walk back up during backup. Dropping the arena
//! drops the whole tree, and re-rooting copies the kept subtree into a fresh
//! arena so discarded siblings are simply not carried over.

use std::collections::{BTreeMap, VecDeque};

use crate::cell::Move;

/// Index into the node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node in the search tree.
#[derive(Debug, Clone, Default)]
pub struct Node {
    /// Move that produced this node; `None` for a fresh root.
    pub mv: Option<Move>,
    pub parent: Option<NodeId>,
    pub children: BTreeMap<Move, NodeId>,
    /// Visits
    pub n: u32,
    /// Cumulative reward for the player who made `mv`
    pub q: f64,
    /// All-moves-as-first visits
    pub n_rave: u32,
    /// All-moves-as-first reward
    pub q_rave: f64,
}

impl Node {
    fn new(mv: Option<Move>, parent: Option<NodeId>) -> Self {
        Self {
            mv,
            parent,
            ..Self::default()
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Mean reward, or 0 when unvisited.
    #[inline]
    pub fn mean(&self) -> f64 {
        if self.n > 0 { self.q / self.n as f64 } else { 0.0 }
    }
}

#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// A tree holding only an unexpanded root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(None, None)],
            root: NodeId(0),
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).parent
    }

    /// Children of `id` in move order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = (Move, NodeId)> + '_ {
        self.get(id).children.iter().map(|(&mv, &child)| (mv, child))
    }

    pub fn child(&self, id: NodeId, mv: Move) -> Option<NodeId> {
        self.get(id).children.get(&mv).copied()
    }

    /// Number of nodes held in the arena.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Attach one fresh child per move under `parent`.
    ///
    /// A move that already has a child keeps the existing node.
    pub fn add_children(&mut self, parent: NodeId, moves: impl IntoIterator<Item = Move>) {
        for mv in moves {
            if self.get(parent).children.contains_key(&mv) {
                continue;
            }
            let id = NodeId(self.nodes.len() as u32);
            self.nodes.push(Node::new(Some(mv), Some(parent)));
            self.get_mut(parent).children.insert(mv, id);
        }
    }

    /// Make the root's child for `mv` the new root, keeping its subtree
    /// statistics and dropping everything else.
    ///
    /// Returns `false`, leaving the tree untouched, if the root has no such child.
    pub fn reroot(&mut self, mv: Move) -> bool {
        let Some(new_root) = self.child(self.root, mv) else {
            return false;
        };

        let mut nodes: Vec<Node> = Vec::new();
        let mut queue = VecDeque::from([(new_root, None)]);
        while let Some((old, parent)) = queue.pop_front() {
            let id = NodeId(nodes.len() as u32);
            let mut node = std::mem::take(&mut self.nodes[old.index()]);
            let children = std::mem::take(&mut node.children);
            node.parent = parent;

            if let (Some(p), Some(mv)) = (parent, node.mv) {
                nodes[p.index()].children.insert(mv, id);
            }
            nodes.push(node);
            queue.extend(children.into_values().map(|child| (child, Some(id))));
        }

        nodes[0].mv = None;
        self.nodes = nodes;
        self.root = NodeId(0);
        true
    }

    /// Count of nodes reachable from the root.
    pub fn size(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            count += 1;
            stack.extend(self.get(id).children.values().copied());
        }
        count
    }

    /// Depth of the deepest node below the root.
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(self.root, 0)];
        while let Some((id, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            stack.extend(self.get(id).children.values().map(|&c| (c, depth + 1)));
        }
        max_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;

    fn mv(row: usize, col: usize) -> Move {
        Move::Cell(Cell::new(row, col))
    }

    #[test]
    fn test_new_tree() {
        let tree = Tree::new();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.size(), 1);
        assert!(tree.get(tree.root()).is_leaf());
        assert_eq!(tree.get(tree.root()).mv, None);
    }

    #[test]
    fn test_add_children_links_parent() {
        let mut tree = Tree::new();
        let root = tree.root();
        tree.add_children(root, [mv(0, 0), mv(0, 1), Move::Swap]);
        assert_eq!(tree.len(), 4);
        let child = tree.child(root, mv(0, 1)).unwrap();
        assert_eq!(tree.parent(child), Some(root));
        assert_eq!(tree.get(child).mv, Some(mv(0, 1)));

        // Duplicate keys are ignored.
        tree.add_children(root, [mv(0, 0)]);
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_reroot_keeps_subtree_statistics() {
        let mut tree = Tree::new();
        let root = tree.root();
        tree.add_children(root, [mv(0, 0), mv(1, 1)]);
        let keep = tree.child(root, mv(1, 1)).unwrap();
        let drop = tree.child(root, mv(0, 0)).unwrap();
        tree.add_children(keep, [mv(0, 0), mv(2, 2)]);
        tree.add_children(drop, [mv(1, 1)]);

        tree.get_mut(keep).n = 10;
        tree.get_mut(keep).q = 6.0;
        let grandchild = tree.child(keep, mv(2, 2)).unwrap();
        tree.get_mut(grandchild).n = 4;
        tree.get_mut(grandchild).n_rave = 9;

        assert!(tree.reroot(mv(1, 1)));
        let root = tree.root();
        assert_eq!(tree.get(root).n, 10);
        assert_eq!(tree.get(root).q, 6.0);
        assert_eq!(tree.parent(root), None);
        assert_eq!(tree.get(root).mv, None);
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.size(), 3);

        let gc = tree.child(root, mv(2, 2)).unwrap();
        assert_eq!(tree.get(gc).n, 4);
        assert_eq!(tree.get(gc).n_rave, 9);
        assert_eq!(tree.parent(gc), Some(root));
    }

    #[test]
    fn test_reroot_missing_move() {
        let mut tree = Tree::new();
        let root = tree.root();
        tree.add_children(root, [mv(0, 0)]);
        assert!(!tree.reroot(mv(3, 3)));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_depth() {
        let mut tree = Tree::new();
        let root = tree.root();
        assert_eq!(tree.depth(), 0);
        tree.add_children(root, [mv(0, 0)]);
        let c = tree.child(root, mv(0, 0)).unwrap();
        tree.add_children(c, [mv(1, 0)]);
        assert_eq!(tree.depth(), 2);
    }
}

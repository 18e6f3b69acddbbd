//! Adjacency index linking reactions, gene groups and genes
//!
//! Both directions of every link are stored here and only ever updated together, so for all
//! nodes x and y, y appears in the children of x with multiplicity m exactly when x appears in
//! the parents of y with multiplicity m. Links are multisets: the same gene may be attached to a
//! group more than once, and removal takes away a single occurrence unless asked otherwise.
//!
//! Reachability questions (cycles, descendants, ancestors) are answered on a petgraph
//! [`DiGraphMap`] whose edge weights count the occurrences of each link. The ordered lists
//! are kept next to it since rule rendering follows insertion order.
use indexmap::{IndexMap, IndexSet};
use petgraph::algo::has_path_connecting;
use petgraph::graphmap::DiGraphMap;
use petgraph::visit::{Dfs, Reversed};
use thiserror::Error;

use crate::metabolic_model::keys::{GeneGroupKey, GeneKey, ReactionKey};

/// A node of the gene tree
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum TreeNode {
    /// Root of a gene reaction rule
    Reaction(ReactionKey),
    /// Leaf of a gene reaction rule
    Gene(GeneKey),
    /// Boolean clause inside a gene reaction rule
    GeneGroup(GeneGroupKey),
}

impl From<ReactionKey> for TreeNode {
    fn from(key: ReactionKey) -> Self {
        TreeNode::Reaction(key)
    }
}

impl From<GeneKey> for TreeNode {
    fn from(key: GeneKey) -> Self {
        TreeNode::Gene(key)
    }
}

impl From<GeneGroupKey> for TreeNode {
    fn from(key: GeneGroupKey) -> Self {
        TreeNode::GeneGroup(key)
    }
}

/// Errors raised by structural changes to the gene tree
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    #[error("{child:?} is not a child of {parent:?}")]
    ChildNotFound { parent: TreeNode, child: TreeNode },
    #[error("{parent:?} is not a parent of {child:?}")]
    ParentNotFound { child: TreeNode, parent: TreeNode },
    #[error("Gene {0} is a leaf and can not have children")]
    GeneCannotHaveChildren(GeneKey),
    #[error("Reaction {0} is a root and can not have parents")]
    ReactionCannotHaveParents(ReactionKey),
    #[error("Adding {child:?} below {parent:?} would create a cycle")]
    Cycle { parent: TreeNode, child: TreeNode },
    #[error("Unknown gene group type: {0}")]
    UnknownGroupType(String),
}

/// Bidirectional multigraph of gene reaction rule links
#[derive(Clone, Debug, Default)]
pub struct GeneTree {
    children: IndexMap<TreeNode, Vec<TreeNode>>,
    parents: IndexMap<TreeNode, Vec<TreeNode>>,
    /// Parent to child edges weighted by multiplicity
    graph: DiGraphMap<TreeNode, usize>,
}

impl GeneTree {
    pub fn new() -> GeneTree {
        GeneTree::default()
    }

    /// Children of a node in insertion order, including repeats
    pub fn children(&self, node: TreeNode) -> &[TreeNode] {
        self.children.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Parents of a node in insertion order, including repeats
    pub fn parents(&self, node: TreeNode) -> &[TreeNode] {
        self.parents.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of times `child` is attached below `parent`
    pub fn multiplicity(&self, parent: TreeNode, child: TreeNode) -> usize {
        self.graph.edge_weight(parent, child).copied().unwrap_or(0)
    }

    /// Whether `to` can be reached from `from` by following children
    fn reaches(&self, from: TreeNode, to: TreeNode) -> bool {
        self.graph.contains_node(from)
            && self.graph.contains_node(to)
            && has_path_connecting(&self.graph, from, to, None)
    }

    // region Structural changes
    /// Attach `child` below `parent`, updating both directions
    ///
    /// # Errors
    /// - a gene can not have children
    /// - a reaction can not be a child
    /// - the link would make `parent` reachable from itself
    pub fn add_child(&mut self, parent: TreeNode, child: TreeNode) -> Result<(), TreeError> {
        if let TreeNode::Gene(gene) = parent {
            return Err(TreeError::GeneCannotHaveChildren(gene));
        }
        if let TreeNode::Reaction(reaction) = child {
            return Err(TreeError::ReactionCannotHaveParents(reaction));
        }
        if parent == child || self.reaches(child, parent) {
            return Err(TreeError::Cycle { parent, child });
        }
        self.children.entry(parent).or_default().push(child);
        self.parents.entry(child).or_default().push(parent);
        match self.graph.edge_weight_mut(parent, child) {
            Some(count) => *count += 1,
            None => {
                self.graph.add_edge(parent, child, 1);
            }
        }
        Ok(())
    }

    /// Detach `child` from `parent`, one occurrence or every occurrence when `all` is set
    pub fn remove_child(
        &mut self,
        parent: TreeNode,
        child: TreeNode,
        all: bool,
    ) -> Result<(), TreeError> {
        if self.multiplicity(parent, child) == 0 {
            return Err(TreeError::ChildNotFound { parent, child });
        }
        let removed = Self::remove_occurrences(&mut self.children, parent, child, all);
        for _ in 0..removed {
            Self::remove_occurrences(&mut self.parents, child, parent, false);
        }
        let remaining = self.multiplicity(parent, child).saturating_sub(removed);
        if remaining == 0 {
            self.graph.remove_edge(parent, child);
        } else if let Some(count) = self.graph.edge_weight_mut(parent, child) {
            *count = remaining;
        }
        Ok(())
    }

    /// Attach `child` below `parent`, seen from the child's side
    pub fn add_parent(&mut self, child: TreeNode, parent: TreeNode) -> Result<(), TreeError> {
        self.add_child(parent, child)
    }

    /// Detach `child` from `parent`, seen from the child's side
    pub fn remove_parent(
        &mut self,
        child: TreeNode,
        parent: TreeNode,
        all: bool,
    ) -> Result<(), TreeError> {
        if let TreeNode::Reaction(reaction) = child {
            return Err(TreeError::ReactionCannotHaveParents(reaction));
        }
        if self.multiplicity(parent, child) == 0 {
            return Err(TreeError::ParentNotFound { child, parent });
        }
        self.remove_child(parent, child, all)
    }

    /// Detach a node from all of its parents and children
    ///
    /// Returns the distinct former children, so the caller can dispose of groups left
    /// without parents. Calling this a second time is a no-op.
    pub fn prepare_deletion(&mut self, node: TreeNode) -> Vec<TreeNode> {
        let parents: IndexSet<TreeNode> = self.parents(node).iter().copied().collect();
        for parent in parents {
            // Present by construction, the occurrence count was just read
            let _ = self.remove_child(parent, node, true);
        }
        let children: IndexSet<TreeNode> = self.children(node).iter().copied().collect();
        for child in children.iter() {
            let _ = self.remove_child(node, *child, true);
        }
        self.children.shift_remove(&node);
        self.parents.shift_remove(&node);
        self.graph.remove_node(node);
        children.into_iter().collect()
    }

    fn remove_occurrences(
        map: &mut IndexMap<TreeNode, Vec<TreeNode>>,
        key: TreeNode,
        value: TreeNode,
        all: bool,
    ) -> usize {
        let Some(list) = map.get_mut(&key) else {
            return 0;
        };
        let before = list.len();
        if all {
            list.retain(|v| *v != value);
        } else if let Some(position) = list.iter().position(|v| *v == value) {
            list.remove(position);
        }
        let removed = before - list.len();
        if list.is_empty() {
            map.shift_remove(&key);
        }
        removed
    }
    // endregion Structural changes

    // region Derived properties
    /// Every node reachable by following children, excluding `node` itself
    pub fn descendants(&self, node: TreeNode) -> IndexSet<TreeNode> {
        let mut reached = IndexSet::new();
        if !self.graph.contains_node(node) {
            return reached;
        }
        let mut dfs = Dfs::new(&self.graph, node);
        while let Some(current) = dfs.next(&self.graph) {
            if current != node {
                reached.insert(current);
            }
        }
        reached
    }

    /// Every node reachable by following parents, excluding `node` itself
    pub fn ancestors(&self, node: TreeNode) -> IndexSet<TreeNode> {
        let mut reached = IndexSet::new();
        if !self.graph.contains_node(node) {
            return reached;
        }
        let reversed = Reversed(&self.graph);
        let mut dfs = Dfs::new(reversed, node);
        while let Some(current) = dfs.next(reversed) {
            if current != node {
                reached.insert(current);
            }
        }
        reached
    }

    /// All genes below a node, a gene being its own single gene
    pub fn genes(&self, node: TreeNode) -> IndexSet<GeneKey> {
        std::iter::once(node)
            .chain(self.descendants(node))
            .filter_map(|n| match n {
                TreeNode::Gene(gene) => Some(gene),
                _ => None,
            })
            .collect()
    }

    /// All reactions above a node, a reaction being its own single reaction
    pub fn reactions(&self, node: TreeNode) -> IndexSet<ReactionKey> {
        std::iter::once(node)
            .chain(self.ancestors(node))
            .filter_map(|n| match n {
                TreeNode::Reaction(reaction) => Some(reaction),
                _ => None,
            })
            .collect()
    }
    // endregion Derived properties

    /// Check that every link is recorded in both directions with the same multiplicity
    pub fn is_consistent(&self) -> bool {
        let forward = self.children.iter().all(|(parent, children)| {
            children.iter().all(|child| {
                let down = children.iter().filter(|c| *c == child).count();
                let up = self.parents(*child).iter().filter(|p| *p == parent).count();
                down == up && self.multiplicity(*parent, *child) == down
            })
        });
        let backward = self.parents.iter().all(|(child, parents)| {
            parents
                .iter()
                .all(|parent| self.multiplicity(*parent, *child) > 0)
        });
        let edges = self.graph.all_edges().all(|(parent, child, count)| {
            self.children(parent).iter().filter(|c| **c == child).count() == *count
        });
        forward && backward && edges
    }
}

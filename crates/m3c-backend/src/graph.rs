//! A directed graph whose nodes live in an arena. Node identifiers remember the
//! graph they were made by, and using one with any other graph panics.

use std::fmt;
use std::ops::{Index, IndexMut};
use std::sync::atomic::{AtomicUsize, Ordering};

static GRAPHS: AtomicUsize = AtomicUsize::new(0);

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NodeId {
    graph: usize,
    index: usize,
}

impl NodeId {
    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.index)
    }
}

#[derive(Clone, Debug)]
struct Node<N> {
    data: N,
    succs: Vec<NodeId>,
    preds: Vec<NodeId>,
}

#[derive(Clone, Debug)]
pub struct Graph<N> {
    id: usize,
    nodes: Vec<Node<N>>,
}

impl<N> Graph<N> {
    pub fn new() -> Self {
        Self {
            id: GRAPHS.fetch_add(1, Ordering::Relaxed),
            nodes: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn add_node(&mut self, data: N) -> NodeId {
        let id = NodeId {
            graph: self.id,
            index: self.nodes.len(),
        };

        self.nodes.push(Node {
            data,
            succs: Vec::new(),
            preds: Vec::new(),
        });

        id
    }

    /// The identifier of the node at the given arena index.
    pub fn node(&self, index: usize) -> NodeId {
        assert!(index < self.nodes.len(), "no node at index {index}");
        NodeId {
            graph: self.id,
            index,
        }
    }

    /// Every node, in the order they were added.
    pub fn nodes(&self) -> impl DoubleEndedIterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(|index| self.node(index))
    }

    /// Add an edge from `from` to `to`, unless there already is one.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) {
        self.check(from);
        self.check(to);

        if self.goes_to(from, to) {
            return;
        }

        self.nodes[from.index].succs.push(to);
        self.nodes[to.index].preds.push(from);
    }

    pub fn succs(&self, node: NodeId) -> &[NodeId] {
        self.check(node);
        &self.nodes[node.index].succs
    }

    pub fn preds(&self, node: NodeId) -> &[NodeId] {
        self.check(node);
        &self.nodes[node.index].preds
    }

    pub fn goes_to(&self, from: NodeId, to: NodeId) -> bool {
        self.succs(from).contains(&to)
    }

    fn check(&self, node: NodeId) {
        assert_eq!(
            node.graph, self.id,
            "node {node} belongs to another graph"
        );
    }
}

impl<N> Default for Graph<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> Index<NodeId> for Graph<N> {
    type Output = N;

    fn index(&self, node: NodeId) -> &N {
        self.check(node);
        &self.nodes[node.index].data
    }
}

impl<N> IndexMut<NodeId> for Graph<N> {
    fn index_mut(&mut self, node: NodeId) -> &mut N {
        self.check(node);
        &mut self.nodes[node.index].data
    }
}

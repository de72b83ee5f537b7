//! Graph coloring by iterated register coalescing.
//!
//! Every node that is not precolored is in exactly one state at a time, and
//! every node state that is a worklist has a set holding exactly the nodes
//! tagged with it. Moves are tracked the same way. States are only ever
//! changed through [`Color::transition`] and [`Color::move_transition`], which
//! keep tags and sets together.


use std::collections::{BTreeSet, HashMap, HashSet};

use log::{debug, trace};

use m3c_common::temp::Temp;
use m3c_common::Coalescing;

use super::interfere::{InterferenceGraph, Move};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
enum NodeState {
    Precolored,
    Initial,
    /// Low degree and not move related.
    Simplify,
    /// Low degree and move related.
    Freeze,
    /// Significant degree.
    Spill,
    /// Removed from the graph and on the select stack.
    Selected,
    Coalesced,
    Colored,
    Spilled,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
enum MoveState {
    Worklist,
    Active,
    Frozen,
    Coalesced,
    Constrained,
}

#[derive(Debug)]
pub struct Coloring {
    /// The register assigned to every temporary that got one, registers
    /// included.
    pub colors: HashMap<Temp, Temp>,
    /// The temporaries that must live in memory instead, in the order they
    /// were found.
    pub spills: Vec<Temp>,
    /// How many moves were coalesced away.
    pub coalesced: usize,
}

/// Color the graph with its precolored registers. Temporaries in
/// `unspillable` are spilled only when nothing else can be.
pub fn color(
    graph: &InterferenceGraph,
    registers: &[Temp],
    unspillable: &HashSet<Temp>,
    coalescing: Coalescing,
) -> Coloring {
    let color = Color::new(graph, registers, unspillable, coalescing);
    color.run()
}

struct Color<'a> {
    graph: &'a InterferenceGraph,
    registers: &'a [Temp],
    unspillable: &'a HashSet<Temp>,
    k: usize,

    state: Vec<NodeState>,
    adj_set: HashSet<(usize, usize)>,
    adj_list: Vec<Vec<usize>>,
    degree: Vec<usize>,
    move_list: Vec<Vec<usize>>,
    alias: Vec<usize>,
    /// Register indices.
    color: Vec<Option<usize>>,

    simplify: BTreeSet<usize>,
    freeze: BTreeSet<usize>,
    spill: BTreeSet<usize>,
    select: Vec<usize>,
    spilled: Vec<usize>,

    move_state: Vec<MoveState>,
    worklist_moves: BTreeSet<usize>,
    active_moves: BTreeSet<usize>,
}

impl<'a> Color<'a> {
    fn new(
        graph: &'a InterferenceGraph,
        registers: &'a [Temp],
        unspillable: &'a HashSet<Temp>,
        coalescing: Coalescing,
    ) -> Self {
        let k = registers.len();
        let nodes = (0..graph.len()).map(|index| graph.node(index));

        let mut state = Vec::with_capacity(graph.len());
        let mut color = Vec::with_capacity(graph.len());
        let mut adj_list = Vec::with_capacity(graph.len());
        let mut degree = Vec::with_capacity(graph.len());
        let mut move_list = Vec::with_capacity(graph.len());

        for (index, node) in nodes.enumerate() {
            if node.precolored {
                assert_eq!(
                    registers.get(index),
                    Some(&node.temp),
                    "precolored nodes must come first and in register order"
                );
                state.push(NodeState::Precolored);
                color.push(Some(index));
            } else {
                state.push(NodeState::Initial);
                color.push(None);
            }

            adj_list.push(node.adj_list.clone());
            degree.push(node.degree);
            move_list.push(node.move_list.clone());
        }

        let initial = match coalescing {
            Coalescing::Enabled => MoveState::Worklist,
            Coalescing::Disabled => MoveState::Frozen,
        };

        let move_state = vec![initial; graph.moves().len()];
        let worklist_moves = match coalescing {
            Coalescing::Enabled => (0..graph.moves().len()).collect(),
            Coalescing::Disabled => BTreeSet::new(),
        };

        Self {
            graph,
            registers,
            unspillable,
            k,
            state,
            adj_set: graph.adj_set().clone(),
            adj_list,
            degree,
            move_list,
            alias: (0..graph.len()).collect(),
            color,
            simplify: BTreeSet::new(),
            freeze: BTreeSet::new(),
            spill: BTreeSet::new(),
            select: Vec::new(),
            spilled: Vec::new(),
            move_state,
            worklist_moves,
            active_moves: BTreeSet::new(),
        }
    }

    fn run(mut self) -> Coloring {
        self.make_worklist();

        loop {
            if let Some(node) = self.simplify.first().copied() {
                self.simplify_node(node);
            } else if let Some(mv) = self.worklist_moves.first().copied() {
                self.coalesce(mv);
            } else if let Some(node) = self.freeze.first().copied() {
                self.freeze_node(node);
            } else if let Some(node) = self.select_spill() {
                self.spill_node(node);
            } else {
                break;
            }

            if cfg!(test) {
                self.check_partition();
            }
        }

        self.assign_colors();
        self.finish()
    }

    fn make_worklist(&mut self) {
        for node in 0..self.state.len() {
            if self.state[node] != NodeState::Initial {
                continue;
            }

            let to = if self.significant(node) {
                NodeState::Spill
            } else if self.move_related(node) {
                NodeState::Freeze
            } else {
                NodeState::Simplify
            };

            self.transition(node, to);
        }
    }

    fn simplify_node(&mut self, node: usize) {
        trace!("simplify {}", self.graph.temp(node));
        self.transition(node, NodeState::Selected);

        for adjacent in self.adjacent(node) {
            self.decrement_degree(adjacent);
        }
    }

    fn decrement_degree(&mut self, node: usize) {
        if self.is_precolored(node) {
            return;
        }

        let degree = self.degree[node];
        self.degree[node] = degree - 1;

        if degree == self.k && self.state[node] == NodeState::Spill {
            let mut nodes = self.adjacent(node);
            nodes.push(node);
            self.enable_moves(&nodes);

            if self.move_related(node) {
                self.transition(node, NodeState::Freeze);
            } else {
                self.transition(node, NodeState::Simplify);
            }
        }
    }

    fn enable_moves(&mut self, nodes: &[usize]) {
        for node in nodes {
            for mv in self.node_moves(*node) {
                if self.move_state[mv] == MoveState::Active {
                    self.move_transition(mv, MoveState::Worklist);
                }
            }
        }
    }

    fn coalesce(&mut self, mv: usize) {
        let Move { src, dst } = self.graph.moves()[mv];
        let x = self.get_alias(dst);
        let y = self.get_alias(src);

        let (u, v) = if self.is_precolored(y) { (y, x) } else { (x, y) };

        if u == v {
            self.move_transition(mv, MoveState::Coalesced);
            self.add_worklist(u);
        } else if self.is_precolored(v) || self.adj_set.contains(&(u, v)) {
            self.move_transition(mv, MoveState::Constrained);
            self.add_worklist(u);
            self.add_worklist(v);
        } else if (self.is_precolored(u) && self.george(u, v))
            || (!self.is_precolored(u) && self.briggs(u, v))
        {
            trace!(
                "coalesce {} into {}",
                self.graph.temp(v),
                self.graph.temp(u)
            );

            self.move_transition(mv, MoveState::Coalesced);
            self.combine(u, v);
            self.add_worklist(u);
        } else {
            self.move_transition(mv, MoveState::Active);
        }
    }

    fn add_worklist(&mut self, node: usize) {
        if !self.is_precolored(node)
            && !self.move_related(node)
            && !self.significant(node)
            && self.state[node] == NodeState::Freeze
        {
            self.transition(node, NodeState::Simplify);
        }
    }

    /// Whether every neighbour of `v` is harmless to `u`.
    fn george(&self, u: usize, v: usize) -> bool {
        self.adjacent(v).into_iter().all(|t| self.ok(t, u))
    }

    fn ok(&self, t: usize, r: usize) -> bool {
        !self.significant(t) || self.is_precolored(t) || self.adj_set.contains(&(t, r))
    }

    /// Whether the combined node would have fewer than K significant
    /// neighbours.
    fn briggs(&self, u: usize, v: usize) -> bool {
        let nodes: BTreeSet<_> = self
            .adjacent(u)
            .into_iter()
            .chain(self.adjacent(v))
            .collect();

        let significant = nodes
            .into_iter()
            .filter(|node| self.is_precolored(*node) || self.significant(*node))
            .count();

        significant < self.k
    }

    fn combine(&mut self, u: usize, v: usize) {
        self.transition(v, NodeState::Coalesced);
        self.alias[v] = u;

        let moves = self.move_list[v].clone();
        self.move_list[u].extend(moves);
        self.enable_moves(&[v]);

        for t in self.adjacent(v) {
            self.add_edge(t, u);
            self.decrement_degree(t);
        }

        if self.significant(u) && self.state[u] == NodeState::Freeze {
            self.transition(u, NodeState::Spill);
        }
    }

    fn add_edge(&mut self, u: usize, v: usize) {
        if u == v || self.adj_set.contains(&(u, v)) {
            return;
        }

        self.adj_set.insert((u, v));
        self.adj_set.insert((v, u));

        for (this, other) in [(u, v), (v, u)] {
            if !self.is_precolored(this) {
                self.adj_list[this].push(other);
                self.degree[this] += 1;
            }
        }
    }

    fn freeze_node(&mut self, node: usize) {
        trace!("freeze {}", self.graph.temp(node));
        self.transition(node, NodeState::Simplify);
        self.freeze_moves(node);
    }

    fn freeze_moves(&mut self, u: usize) {
        for mv in self.node_moves(u) {
            let Move { src, dst } = self.graph.moves()[mv];
            let x = self.get_alias(src);
            let y = self.get_alias(dst);

            let v = if y == self.get_alias(u) { x } else { y };
            self.move_transition(mv, MoveState::Frozen);

            if self.node_moves(v).is_empty()
                && !self.significant(v)
                && self.state[v] == NodeState::Freeze
            {
                self.transition(v, NodeState::Simplify);
            }
        }
    }

    /// The spill candidate with the highest priority: long live ranges with
    /// few uses go first.
    fn select_spill(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for node in self.spill.iter().copied() {
            let priority = self.spill_priority(node);
            if best.map_or(true, |(_, best)| priority > best) {
                best = Some((node, priority));
            }
        }

        best.map(|(node, _)| node)
    }

    fn spill_priority(&self, node: usize) -> f64 {
        let info = self.graph.node(node);
        if self.unspillable.contains(&info.temp) {
            return f64::NEG_INFINITY;
        }

        info.live_len as f64 / info.occurrences.max(1) as f64
    }

    fn spill_node(&mut self, node: usize) {
        debug!("potential spill {}", self.graph.temp(node));
        self.transition(node, NodeState::Simplify);
        self.freeze_moves(node);
    }

    fn assign_colors(&mut self) {
        while let Some(node) = self.select.last().copied() {
            let mut ok = vec![true; self.k];

            for neighbour in self.adj_list[node].iter() {
                let alias = self.get_alias(*neighbour);
                if let NodeState::Colored | NodeState::Precolored = self.state[alias] {
                    if let Some(color) = self.color[alias] {
                        ok[color] = false;
                    }
                }
            }

            match ok.iter().position(|ok| *ok) {
                Some(color) => {
                    self.color[node] = Some(color);
                    self.transition(node, NodeState::Colored);
                }

                None => {
                    trace!("actual spill {}", self.graph.temp(node));
                    self.transition(node, NodeState::Spilled);
                }
            }
        }

        for node in 0..self.state.len() {
            if self.state[node] == NodeState::Coalesced {
                let alias = self.get_alias(node);
                self.color[node] = self.color[alias];
            }
        }
    }

    fn finish(self) -> Coloring {
        let colors = self
            .color
            .iter()
            .enumerate()
            .filter_map(|(node, color)| {
                color.map(|color| (self.graph.temp(node), self.registers[color]))
            })
            .collect();

        let spills = self
            .spilled
            .iter()
            .map(|node| self.graph.temp(*node))
            .collect();

        let coalesced = self
            .move_state
            .iter()
            .filter(|state| **state == MoveState::Coalesced)
            .count();

        Coloring {
            colors,
            spills,
            coalesced,
        }
    }

    fn adjacent(&self, node: usize) -> Vec<usize> {
        self.adj_list[node]
            .iter()
            .copied()
            .filter(|adjacent| {
                !matches!(
                    self.state[*adjacent],
                    NodeState::Selected | NodeState::Coalesced
                )
            })
            .collect()
    }

    fn node_moves(&self, node: usize) -> Vec<usize> {
        self.move_list[node]
            .iter()
            .copied()
            .filter(|mv| {
                matches!(
                    self.move_state[*mv],
                    MoveState::Active | MoveState::Worklist
                )
            })
            .collect()
    }

    fn move_related(&self, node: usize) -> bool {
        !self.node_moves(node).is_empty()
    }

    fn significant(&self, node: usize) -> bool {
        self.degree[node] >= self.k
    }

    fn is_precolored(&self, node: usize) -> bool {
        self.state[node] == NodeState::Precolored
    }

    fn get_alias(&self, mut node: usize) -> usize {
        while self.state[node] == NodeState::Coalesced {
            node = self.alias[node];
        }

        node
    }

    /// Move a node into a new state, taking it out of the set for its old state
    /// and putting it into the set for the new one.
    fn transition(&mut self, node: usize, to: NodeState) {
        let from = self.state[node];
        assert!(
            from != NodeState::Precolored,
            "precolored {} cannot change state",
            self.graph.temp(node)
        );

        match from {
            NodeState::Simplify => assert!(self.simplify.remove(&node)),
            NodeState::Freeze => assert!(self.freeze.remove(&node)),
            NodeState::Spill => assert!(self.spill.remove(&node)),
            NodeState::Selected => {
                assert_eq!(self.select.last(), Some(&node));
                self.select.pop();
            }
            NodeState::Spilled => unreachable!(),
            NodeState::Precolored
            | NodeState::Initial
            | NodeState::Coalesced
            | NodeState::Colored => {}
        }

        match to {
            NodeState::Simplify => assert!(self.simplify.insert(node)),
            NodeState::Freeze => assert!(self.freeze.insert(node)),
            NodeState::Spill => assert!(self.spill.insert(node)),
            NodeState::Selected => self.select.push(node),
            NodeState::Spilled => self.spilled.push(node),
            NodeState::Precolored
            | NodeState::Initial
            | NodeState::Coalesced
            | NodeState::Colored => {}
        }

        self.state[node] = to;
    }

    fn move_transition(&mut self, mv: usize, to: MoveState) {
        match self.move_state[mv] {
            MoveState::Worklist => assert!(self.worklist_moves.remove(&mv)),
            MoveState::Active => assert!(self.active_moves.remove(&mv)),
            MoveState::Frozen | MoveState::Coalesced | MoveState::Constrained => {
                unreachable!("move {mv} is already settled")
            }
        }

        match to {
            MoveState::Worklist => assert!(self.worklist_moves.insert(mv)),
            MoveState::Active => assert!(self.active_moves.insert(mv)),
            MoveState::Frozen | MoveState::Coalesced | MoveState::Constrained => {}
        }

        self.move_state[mv] = to;
    }

    /// Panics unless every node and move is in exactly the set its state says.
    fn check_partition(&self) {
        for (node, state) in self.state.iter().enumerate() {
            assert_eq!(self.simplify.contains(&node), *state == NodeState::Simplify);
            assert_eq!(self.freeze.contains(&node), *state == NodeState::Freeze);
            assert_eq!(self.spill.contains(&node), *state == NodeState::Spill);
            assert_eq!(self.select.contains(&node), *state == NodeState::Selected);
            assert_eq!(self.spilled.contains(&node), *state == NodeState::Spilled);

            if *state == NodeState::Coalesced {
                assert_ne!(self.get_alias(node), node);
            }
        }

        for (mv, state) in self.move_state.iter().enumerate() {
            assert_eq!(self.worklist_moves.contains(&mv), *state == MoveState::Worklist);
            assert_eq!(self.active_moves.contains(&mv), *state == MoveState::Active);
        }
    }
}

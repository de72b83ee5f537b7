//! The interference graph says which temporaries may never share a register.
//!
//! Two temporaries interfere when one is defined while the other is live.
//! The source of a move does not interfere with its destination, so the two
//! can later be coalesced. Physical registers are precolored nodes and come
//! first, in the order the frame lists them.

#[cfg(test)]
mod tests;

use std::collections::{HashMap, HashSet};

use log::trace;

use m3c_common::assem::Instr;
use m3c_common::temp::Temp;

use super::liveness::Liveness;
use crate::flow::FlowGraph;
use crate::graph::Graph;

/// A move instruction between the temporaries at two node indices.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Move {
    pub src: usize,
    pub dst: usize,
}

#[derive(Clone, Debug)]
pub struct Node {
    pub temp: Temp,
    pub precolored: bool,
    /// Instructions the temporary is live across or defined by.
    pub live_len: usize,
    /// Times the temporary is read or written.
    pub occurrences: usize,
    /// The neighbours, kept only for nodes that are not precolored.
    pub adj_list: Vec<usize>,
    pub degree: usize,
    /// The moves this node is the source or destination of.
    pub move_list: Vec<usize>,
}

#[derive(Debug)]
pub struct InterferenceGraph {
    /// Each interference edge is stored once, from the node defined to the node
    /// live there.
    graph: Graph<Node>,
    temps: HashMap<Temp, usize>,
    adj_set: HashSet<(usize, usize)>,
    moves: Vec<Move>,
}

impl InterferenceGraph {
    pub fn build(
        registers: &[Temp],
        instrs: &[Instr],
        flow: &impl FlowGraph,
        liveness: &Liveness,
    ) -> Self {
        let mut graph = Self {
            graph: Graph::new(),
            temps: HashMap::new(),
            adj_set: HashSet::new(),
            moves: Vec::new(),
        };

        for register in registers {
            graph.insert(*register, true);
        }

        for instr in instrs {
            for temp in instr.def().iter().chain(instr.uses()) {
                graph.insert(*temp, false);
            }
        }

        for node in flow.graph().nodes() {
            let mut live = liveness.live_out(node).clone();

            for index in flow.instrs(node).iter().rev() {
                let instr = &instrs[*index];
                let def: Vec<_> = instr.def().iter().map(|temp| graph.temps[temp]).collect();
                let uses: Vec<_> = instr.uses().iter().map(|temp| graph.temps[temp]).collect();

                for node in def.iter().chain(uses.iter()) {
                    graph.node_mut(*node).occurrences += 1;
                }

                if let Instr::Move { src, .. } = instr {
                    live.remove(src);
                    graph.add_move(Move {
                        src: uses[0],
                        dst: def[0],
                    });
                }

                live.extend(instr.def().iter().copied());

                for defined in def.iter() {
                    for temp in live.iter() {
                        graph.add_edge(*defined, graph.temps[temp]);
                    }
                }

                for temp in live.iter() {
                    let node = graph.temps[temp];
                    graph.node_mut(node).live_len += 1;
                }

                for temp in instr.def() {
                    live.remove(temp);
                }

                live.extend(instr.uses().iter().copied());
            }
        }

        trace!(
            "interference graph has {} nodes, {} edges and {} moves",
            graph.len(),
            graph.adj_set.len() / 2,
            graph.moves.len()
        );

        graph
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    pub fn node(&self, index: usize) -> &Node {
        &self.graph[self.graph.node(index)]
    }

    pub fn index(&self, temp: Temp) -> Option<usize> {
        self.temps.get(&temp).copied()
    }

    pub fn temp(&self, index: usize) -> Temp {
        self.node(index).temp
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn adj_set(&self) -> &HashSet<(usize, usize)> {
        &self.adj_set
    }

    pub fn interferes(&self, a: Temp, b: Temp) -> bool {
        match (self.index(a), self.index(b)) {
            (Some(a), Some(b)) => self.adj_set.contains(&(a, b)),
            _ => false,
        }
    }

    /// Every interference edge, once.
    pub fn edges(&self) -> impl Iterator<Item = (Temp, Temp)> + '_ {
        self.graph.nodes().flat_map(move |node| {
            self.graph
                .succs(node)
                .iter()
                .map(move |succ| (self.graph[node].temp, self.graph[*succ].temp))
        })
    }

    pub fn show(&self) -> String {
        let mut res = self.graph.show(|_, node| node.temp.to_string());
        for Move { src, dst } in self.moves.iter() {
            res.push_str(&format!("move {} <- {}\n", self.temp(*dst), self.temp(*src)));
        }

        res
    }

    fn insert(&mut self, temp: Temp, precolored: bool) {
        if self.temps.contains_key(&temp) {
            return;
        }

        let id = self.graph.add_node(Node {
            temp,
            precolored,
            live_len: 0,
            occurrences: 0,
            adj_list: Vec::new(),
            degree: 0,
            move_list: Vec::new(),
        });

        self.temps.insert(temp, id.index());
    }

    fn node_mut(&mut self, index: usize) -> &mut Node {
        let id = self.graph.node(index);
        &mut self.graph[id]
    }

    fn add_edge(&mut self, u: usize, v: usize) {
        if u == v || self.adj_set.contains(&(u, v)) {
            return;
        }

        self.adj_set.insert((u, v));
        self.adj_set.insert((v, u));

        let (from, to) = (self.graph.node(u), self.graph.node(v));
        self.graph.add_edge(from, to);

        for (this, other) in [(u, v), (v, u)] {
            let node = self.node_mut(this);
            if !node.precolored {
                node.adj_list.push(other);
                node.degree += 1;
            }
        }
    }

    fn add_move(&mut self, mv: Move) {
        let index = self.moves.len();
        self.moves.push(mv);

        self.node_mut(mv.src).move_list.push(index);
        if mv.dst != mv.src {
            self.node_mut(mv.dst).move_list.push(index);
        }
    }
}

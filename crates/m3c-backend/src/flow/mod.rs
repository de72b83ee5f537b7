//! Control flow graphs over instruction lists.

#[cfg(test)]
mod tests;

use std::collections::HashMap;

use im::OrdSet;

use m3c_common::assem::Instr;
use m3c_common::temp::{Label, Temp};

use crate::graph::{Graph, NodeId};

/// A control flow graph whose nodes define and use temporaries.
pub trait FlowGraph {
    type Node;

    fn graph(&self) -> &Graph<Self::Node>;

    /// The temporaries written by the node.
    fn def(&self, node: NodeId) -> &OrdSet<Temp>;

    /// The temporaries the node reads before writing them.
    fn uses(&self, node: NodeId) -> &OrdSet<Temp>;

    /// Indices of the instructions making up the node, in execution order.
    fn instrs(&self, node: NodeId) -> &[usize];

    fn show(&self) -> String {
        let graph = self.graph();
        let mut res = String::new();

        for node in graph.nodes() {
            let succs: Vec<_> = graph.succs(node).iter().map(NodeId::to_string).collect();
            res.push_str(&format!(
                "{node}: def {{{}}} use {{{}}} -> {}\n",
                join(self.def(node)),
                join(self.uses(node)),
                succs.join(" "),
            ));
        }

        res
    }
}

fn join(temps: &OrdSet<Temp>) -> String {
    let temps: Vec<_> = temps.iter().map(Temp::to_string).collect();
    temps.join(", ")
}

/// A straight run of instructions, entered only at the top.
#[derive(Clone, Debug, Default)]
pub struct Block {
    pub labels: Vec<Label>,
    pub instrs: Vec<usize>,
    pub def: OrdSet<Temp>,
    pub uses: OrdSet<Temp>,
}

/// The flow graph of an instruction list, with one node per basic block.
#[derive(Debug)]
pub struct AssemFlowGraph {
    graph: Graph<Block>,
}

impl AssemFlowGraph {
    pub fn new(instrs: &[Instr]) -> Self {
        let mut graph: Graph<Block> = Graph::new();
        let mut labels = HashMap::new();

        // The node the next instruction falls into, if any.
        let mut current: Option<NodeId> = None;

        for (index, instr) in instrs.iter().enumerate() {
            match instr {
                Instr::Label { label, .. } => {
                    let node = match current {
                        Some(node) if graph[node].instrs.is_empty() => node,
                        _ => graph.add_node(Block::default()),
                    };

                    assert!(
                        labels.insert(label.clone(), node).is_none(),
                        "label {label} is defined twice"
                    );

                    graph[node].labels.push(label.clone());
                    current = Some(node);
                }

                instr => {
                    let node = match current {
                        Some(node) => node,
                        None => graph.add_node(Block::default()),
                    };

                    let block = &mut graph[node];
                    for temp in instr.uses() {
                        if !block.def.contains(temp) {
                            block.uses.insert(*temp);
                        }
                    }

                    block.def.extend(instr.def().iter().copied());
                    block.instrs.push(index);

                    current = if instr.jumps().is_empty() {
                        Some(node)
                    } else {
                        None
                    };
                }
            }
        }

        let nodes: Vec<_> = graph.nodes().collect();
        for (at, node) in nodes.iter().enumerate() {
            let jumps = match graph[*node].instrs.last() {
                Some(last) => instrs[*last].jumps(),
                None => &[],
            };

            if jumps.is_empty() {
                if let Some(next) = nodes.get(at + 1) {
                    graph.add_edge(*node, *next);
                }
            }

            for target in jumps {
                // Jumps out of the instruction list have no edge.
                if let Some(to) = labels.get(target) {
                    graph.add_edge(*node, *to);
                }
            }
        }

        Self { graph }
    }

    pub fn labels(&self, node: NodeId) -> &[Label] {
        &self.graph[node].labels
    }
}

impl FlowGraph for AssemFlowGraph {
    type Node = Block;

    fn graph(&self) -> &Graph<Block> {
        &self.graph
    }

    fn def(&self, node: NodeId) -> &OrdSet<Temp> {
        &self.graph[node].def
    }

    fn uses(&self, node: NodeId) -> &OrdSet<Temp> {
        &self.graph[node].uses
    }

    fn instrs(&self, node: NodeId) -> &[usize] {
        &self.graph[node].instrs
    }
}


use im::OrdSet;
use log::debug;

use m3c_common::temp::Temp;

use crate::flow::FlowGraph;
use crate::graph::NodeId;

/// The temporaries live on entry to and exit from every flow graph node.
#[derive(Debug)]
pub struct Liveness {
    live_in: Vec<OrdSet<Temp>>,
    live_out: Vec<OrdSet<Temp>>,
}

pub fn liveness(flow: &impl FlowGraph) -> Liveness {
    let mut liveness = Liveness {
        live_in: vec![OrdSet::new(); flow.graph().len()],
        live_out: vec![OrdSet::new(); flow.graph().len()],
    };

    let mut rounds = 1;
    while liveness.sweep(flow) {
        rounds += 1;
    }

    debug!("liveness converged after {rounds} sweeps");
    liveness
}

impl Liveness {
    pub fn live_in(&self, node: NodeId) -> &OrdSet<Temp> {
        &self.live_in[node.index()]
    }

    pub fn live_out(&self, node: NodeId) -> &OrdSet<Temp> {
        &self.live_out[node.index()]
    }

    /// Whether one more sweep would leave every set as it is.
    pub fn is_fixed_point(&self, flow: &impl FlowGraph) -> bool {
        flow.graph().nodes().all(|node| {
            let (live_in, live_out) = self.equations(flow, node);
            live_in == self.live_in[node.index()] && live_out == self.live_out[node.index()]
        })
    }

    /// Apply the dataflow equations to every node once, last node first.
    /// Returns whether anything changed.
    fn sweep(&mut self, flow: &impl FlowGraph) -> bool {
        let mut changed = false;

        for node in flow.graph().nodes().rev() {
            let (live_in, live_out) = self.equations(flow, node);

            if live_in != self.live_in[node.index()] || live_out != self.live_out[node.index()] {
                changed = true;
                self.live_in[node.index()] = live_in;
                self.live_out[node.index()] = live_out;
            }
        }

        changed
    }

    fn equations(&self, flow: &impl FlowGraph, node: NodeId) -> (OrdSet<Temp>, OrdSet<Temp>) {
        let live_out = OrdSet::unions(
            flow.graph()
                .succs(node)
                .iter()
                .map(|succ| self.live_in[succ.index()].clone()),
        );

        let live_in = flow
            .uses(node)
            .clone()
            .union(live_out.clone().relative_complement(flow.def(node).clone()));

        (live_in, live_out)
    }
}

//! Register allocation by graph coloring.
//!
//! Each round builds the flow graph, solves liveness, builds the interference
//! graph and colors it. If anything spilled, the spilled temporaries are moved
//! to the frame and the whole thing starts over.

pub mod check;
pub mod color;
pub mod interfere;
pub mod liveness;
pub mod rewrite;

#[cfg(test)]
mod tests;

use std::collections::{HashMap, HashSet};

use log::{debug, info, trace};

use m3c_common::assem::Instr;
use m3c_common::frame::{Codegen, Frame};
use m3c_common::temp::Temp;
use m3c_common::{Driver, IrOutput};

use crate::flow::{AssemFlowGraph, FlowGraph};
use check::check_consistency;
use color::color;
use interfere::InterferenceGraph;
use liveness::liveness;
use rewrite::rewrite;

/// Rounds after which the allocator gives up. Only reached when the
/// temporaries introduced by spilling keep spilling, which happens when a single
/// instruction needs more registers than the frame has.
const MAX_ROUNDS: usize = 16;

/// Instructions with every temporary assigned a register.
#[derive(Debug)]
pub struct Allocation {
    pub instrs: Vec<Instr>,
    pub colors: HashMap<Temp, Temp>,
    /// How many coloring rounds it took.
    pub rounds: usize,
    /// The temporaries spilled in each round but the last.
    pub spilled: Vec<Vec<Temp>>,
}

impl Allocation {
    /// The final assembly, one instruction per line. Labels are flush left.
    pub fn assembly(&self) -> String {
        let mut res = String::new();
        for instr in self.instrs.iter() {
            if !instr.is_label() {
                res.push_str("    ");
            }

            res.push_str(&instr.format(&self.colors));
            res.push('\n');
        }

        res
    }

    /// Every register written by some instruction.
    pub fn written(&self) -> HashSet<Temp> {
        self.instrs
            .iter()
            .flat_map(|instr| instr.def().iter().map(|temp| self.colors[temp]))
            .collect()
    }
}

pub fn regalloc<C: Codegen>(
    driver: &mut impl Driver,
    frame: &mut C::Frame,
    codegen: &mut C,
    instrs: Vec<Instr>,
) -> Allocation {
    info!("beginning register allocation for {}", frame.name());

    let registers = frame.registers().to_vec();
    let coalescing = driver.coalescing();

    let mut instrs = instrs;
    let mut unspillable = HashSet::new();
    let mut spilled = Vec::new();

    for round in 1..=MAX_ROUNDS {
        debug!("round {round} over {} instructions", instrs.len());

        let flow = AssemFlowGraph::new(&instrs);
        driver.output_ir(IrOutput::FlowGraph, || flow.show());

        let live = liveness(&flow);
        let graph = InterferenceGraph::build(&registers, &instrs, &flow, &live);
        driver.output_ir(IrOutput::Interference, || graph.show());

        let coloring = color(&graph, &registers, &unspillable, coalescing);
        debug!(
            "coalesced {} moves and spilled {} temporaries",
            coloring.coalesced,
            coloring.spills.len()
        );

        if coloring.spills.is_empty() {
            check_consistency(&graph, &coloring.colors);
            trace!("allocation is consistent");

            let allocation = Allocation {
                instrs,
                colors: coloring.colors,
                rounds: round,
                spilled,
            };

            driver.output_ir(IrOutput::Allocation, || allocation.assembly());
            return allocation;
        }

        driver.output_ir(IrOutput::Spills, || {
            let spills: Vec<_> = coloring.spills.iter().map(Temp::to_string).collect();
            spills.join("\n")
        });

        instrs = rewrite(frame, codegen, instrs, &coloring.spills, &mut unspillable);
        spilled.push(coloring.spills);
    }

    panic!(
        "register allocation did not converge after {MAX_ROUNDS} rounds: \
         unspillable temporaries were spilled"
    )
}

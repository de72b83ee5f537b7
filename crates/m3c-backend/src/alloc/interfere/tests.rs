use std::collections::HashSet;

use m3c_common::assem::Instr;
use m3c_common::temp::{Label, Temp};

use super::InterferenceGraph;
use crate::alloc::liveness::liveness;
use crate::flow::{AssemFlowGraph, FlowGraph};

fn build(registers: &[Temp], instrs: &[Instr]) -> InterferenceGraph {
    let flow = AssemFlowGraph::new(instrs);
    let live = liveness(&flow);
    InterferenceGraph::build(registers, instrs, &flow, &live)
}

/// Every definition must interfere with everything live right after it, other
/// than itself and the source of a move.
fn assert_sound(instrs: &[Instr], graph: &InterferenceGraph) {
    let flow = AssemFlowGraph::new(instrs);
    let live = liveness(&flow);

    for node in flow.graph().nodes() {
        let mut after: HashSet<Temp> = live.live_out(node).iter().copied().collect();

        for index in flow.instrs(node).iter().rev() {
            let instr = &instrs[*index];
            for defined in instr.def() {
                for temp in after.iter() {
                    if temp == defined || (instr.is_move() && instr.uses().contains(temp)) {
                        continue;
                    }

                    assert!(
                        graph.interferes(*defined, *temp),
                        "{defined} and {temp} should interfere at {index}"
                    );
                }
            }

            for temp in instr.def() {
                after.remove(temp);
            }
            after.extend(instr.uses().iter().copied());
        }
    }
}

#[test]
fn definitions_interfere_with_live_temporaries() {
    let (a, b, c) = (Temp::fresh(), Temp::fresh(), Temp::fresh());

    let instrs = vec![
        Instr::oper("li `d0, 1", vec![a], vec![]),
        Instr::oper("li `d0, 2", vec![b], vec![]),
        Instr::oper("add `d0, `s0, `s1", vec![c], vec![a, b]),
        Instr::oper("use `s0", vec![], vec![c]),
    ];

    let graph = build(&[], &instrs);
    assert!(graph.interferes(a, b));
    assert!(graph.interferes(b, a));
    assert!(!graph.interferes(a, c));
    assert!(!graph.interferes(b, c));
    assert_sound(&instrs, &graph);
}

#[test]
fn move_sources_do_not_interfere_with_their_destination() {
    let (a, b) = (Temp::fresh(), Temp::fresh());

    let instrs = vec![
        Instr::oper("li `d0, 1", vec![a], vec![]),
        Instr::mov("move `d0, `s0", b, a),
        Instr::oper("use `s0, `s1", vec![], vec![a, b]),
    ];

    let graph = build(&[], &instrs);
    assert!(!graph.interferes(a, b));
    assert_eq!(graph.moves().len(), 1);

    let mv = graph.moves()[0];
    assert_eq!(graph.temp(mv.src), a);
    assert_eq!(graph.temp(mv.dst), b);

    let a = graph.index(a).expect("a node for a");
    assert_eq!(graph.node(a).move_list, vec![0]);
}

#[test]
fn registers_are_precolored_nodes_first() {
    let (r0, r1) = (Temp::named("r0"), Temp::named("r1"));
    let a = Temp::fresh();

    let instrs = vec![
        Instr::oper("li `d0, 1", vec![a], vec![]),
        Instr::oper("call", vec![r0], vec![]),
        Instr::oper("use `s0, `s1", vec![], vec![a, r0]),
    ];

    let graph = build(&[r0, r1], &instrs);
    assert_eq!(graph.temp(0), r0);
    assert_eq!(graph.temp(1), r1);
    assert!(graph.node(0).precolored && graph.node(1).precolored);
    assert!(!graph.node(2).precolored);

    assert!(graph.interferes(r0, a));

    // Precolored nodes keep no adjacency of their own.
    assert!(graph.node(0).adj_list.is_empty());
    assert_eq!(graph.node(2).adj_list, vec![0]);
    assert_eq!(graph.node(2).degree, 1);
}

#[test]
fn no_node_interferes_with_itself() {
    let a = Temp::fresh();
    let top = Label::fresh();

    let instrs = vec![
        Instr::oper("li `d0, 1", vec![a], vec![]),
        Instr::label(top.clone()),
        Instr::oper("addiu `d0, `s0, 1", vec![a], vec![a]),
        Instr::jump("bnez `s0, `j0", vec![a], vec![top]),
    ];

    let graph = build(&[], &instrs);
    assert!(graph.edges().all(|(u, v)| u != v));
    assert!(!graph.interferes(a, a));
    assert_sound(&instrs, &graph);
}

#[test]
fn loops_are_sound() {
    let t: Vec<_> = (0..6).map(|_| Temp::fresh()).collect();
    let (top, out) = (Label::fresh(), Label::fresh());

    let instrs = vec![
        Instr::oper("li `d0, 0", vec![t[0]], vec![]),
        Instr::oper("li `d0, 0", vec![t[1]], vec![]),
        Instr::oper("li `d0, 10", vec![t[2]], vec![]),
        Instr::label(top.clone()),
        Instr::oper("add `d0, `s0, `s1", vec![t[3]], vec![t[0], t[1]]),
        Instr::mov("move `d0, `s0", t[0], t[3]),
        Instr::oper("addiu `d0, `s0, 1", vec![t[4]], vec![t[1]]),
        Instr::mov("move `d0, `s0", t[1], t[4]),
        Instr::jump("blt `s0, `s1, `j0", vec![t[1], t[2]], vec![top, out.clone()]),
        Instr::label(out),
        Instr::oper("mul `d0, `s0, 2", vec![t[5]], vec![t[0]]),
        Instr::oper("use `s0", vec![], vec![t[5]]),
    ];

    let graph = build(&[], &instrs);
    assert_sound(&instrs, &graph);
    assert_eq!(graph.moves().len(), 2);

    let edges: Vec<_> = graph.edges().collect();
    assert_eq!(edges.len() * 2, graph.adj_set().len());
}

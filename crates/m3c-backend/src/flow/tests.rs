use m3c_common::assem::Instr;
use m3c_common::temp::{Label, Temp};

use super::{AssemFlowGraph, FlowGraph};

#[test]
fn one_node_per_basic_block() {
    let (a, b) = (Temp::fresh(), Temp::fresh());
    let (top, out) = (Label::fresh(), Label::fresh());

    let instrs = vec![
        Instr::oper("li `d0, 0", vec![a], vec![]),
        Instr::label(top.clone()),
        Instr::oper("addiu `d0, `s0, 1", vec![b], vec![a]),
        Instr::oper("addiu `d0, `s0, 1", vec![a], vec![b]),
        Instr::jump("blt `s0, `s1, `j0", vec![a, b], vec![top.clone(), out.clone()]),
        Instr::label(out.clone()),
        Instr::oper("use `s0", vec![], vec![a]),
    ];

    let flow = AssemFlowGraph::new(&instrs);
    let graph = flow.graph();
    let nodes: Vec<_> = graph.nodes().collect();
    assert_eq!(nodes.len(), 3);

    assert_eq!(flow.instrs(nodes[0]), &[0]);
    assert_eq!(flow.instrs(nodes[1]), &[2, 3, 4]);
    assert_eq!(flow.instrs(nodes[2]), &[6]);
    assert_eq!(flow.labels(nodes[1]), &[top]);

    // Falls through into the loop, which branches to itself or out.
    assert_eq!(graph.succs(nodes[0]), &[nodes[1]]);
    assert_eq!(graph.succs(nodes[1]), &[nodes[1], nodes[2]]);
    assert!(graph.succs(nodes[2]).is_empty());
    assert_eq!(graph.preds(nodes[1]), &[nodes[0], nodes[1]]);

    assert!(flow.uses(nodes[1]).contains(&a));
    assert!(!flow.uses(nodes[1]).contains(&b));
    assert_eq!(flow.def(nodes[1]).len(), 2);
}

#[test]
fn consecutive_labels_share_a_node() {
    let a = Temp::fresh();
    let (l1, l2) = (Label::fresh(), Label::fresh());

    let instrs = vec![
        Instr::label(l1.clone()),
        Instr::label(l2.clone()),
        Instr::oper("li `d0, 1", vec![a], vec![]),
    ];

    let flow = AssemFlowGraph::new(&instrs);
    assert_eq!(flow.graph().len(), 1);

    let node = flow.graph().node(0);
    assert_eq!(flow.labels(node), &[l1, l2]);
}

#[test]
fn unconditional_jumps_do_not_fall_through() {
    let a = Temp::fresh();
    let out = Label::fresh();

    let instrs = vec![
        Instr::jump("j `j0", vec![], vec![out.clone()]),
        Instr::oper("li `d0, 1", vec![a], vec![]),
        Instr::label(out),
        Instr::oper("use `s0", vec![], vec![a]),
    ];

    let flow = AssemFlowGraph::new(&instrs);
    let graph = flow.graph();
    let nodes: Vec<_> = graph.nodes().collect();
    assert_eq!(nodes.len(), 3);

    assert_eq!(graph.succs(nodes[0]), &[nodes[2]]);
    assert!(graph.preds(nodes[1]).is_empty());
    assert_eq!(graph.succs(nodes[1]), &[nodes[2]]);
}

#[test]
fn uses_exclude_temporaries_defined_earlier_in_the_node() {
    let (a, b) = (Temp::fresh(), Temp::fresh());

    let instrs = vec![
        Instr::oper("li `d0, 1", vec![a], vec![]),
        Instr::oper("add `d0, `s0, `s1", vec![a], vec![a, b]),
    ];

    let flow = AssemFlowGraph::new(&instrs);
    let node = flow.graph().node(0);
    assert!(!flow.uses(node).contains(&a));
    assert!(flow.uses(node).contains(&b));
}

#[test]
fn jumps_out_of_the_procedure_are_ignored() {
    let instrs = vec![Instr::jump("j `j0", vec![], vec![Label::named("elsewhere")])];

    let flow = AssemFlowGraph::new(&instrs);
    let node = flow.graph().node(0);
    assert!(flow.graph().succs(node).is_empty());
    assert!(flow.show().starts_with("n0: def {} use {} ->"));
}

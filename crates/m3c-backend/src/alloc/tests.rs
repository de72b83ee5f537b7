use std::collections::{HashMap, HashSet};

use m3c_common::assem::Instr;
use m3c_common::frame::Frame;
use m3c_common::temp::Temp;
use m3c_common::{Driver, IrOutput, QuietDriver};

use super::check::check_consistency;
use super::interfere::InterferenceGraph;
use super::liveness::liveness;
use super::regalloc;
use crate::flow::AssemFlowGraph;
use crate::testing::{TestCodegen, TestFrame};

#[derive(Default)]
struct RecordingDriver {
    stages: Vec<IrOutput>,
}

impl Driver for RecordingDriver {
    fn output_ir(&mut self, at: IrOutput, data: impl FnOnce() -> String) {
        let _ = data();
        self.stages.push(at);
    }
}

#[test]
fn allocates_without_spilling_when_registers_suffice() {
    let mut frame = TestFrame::new(2);
    let (a, b, c) = (Temp::fresh(), Temp::fresh(), Temp::fresh());

    let instrs = vec![
        Instr::oper("li `d0, 1", vec![a], vec![]),
        Instr::oper("li `d0, 2", vec![b], vec![]),
        Instr::oper("add `d0, `s0, `s1", vec![c], vec![a, b]),
        Instr::oper("use `s0", vec![], vec![c]),
    ];

    let allocation = regalloc(&mut QuietDriver::default(), &mut frame, &mut TestCodegen, instrs);

    assert_eq!(allocation.rounds, 1);
    assert!(allocation.spilled.is_empty());
    assert_eq!(frame.slots(), 0);
    assert_ne!(allocation.colors[&a], allocation.colors[&b]);

    for temp in [a, b, c] {
        assert!(frame.registers().contains(&allocation.colors[&temp]));
    }
}

#[test]
fn one_register_and_two_live_temporaries_spill_once() {
    let mut frame = TestFrame::new(1);
    let (a, b) = (Temp::fresh(), Temp::fresh());

    let instrs = vec![
        Instr::oper("li `d0, 1", vec![a], vec![]),
        Instr::oper("li `d0, 2", vec![b], vec![]),
        Instr::oper("use `s0", vec![], vec![b]),
        Instr::oper("use `s0", vec![], vec![a]),
    ];

    let mut driver = RecordingDriver::default();
    let allocation = regalloc(&mut driver, &mut frame, &mut TestCodegen, instrs);

    assert_eq!(allocation.rounds, 2);
    assert_eq!(allocation.spilled, vec![vec![a]]);
    assert_eq!(frame.slots(), 1);

    assert_eq!(
        driver.stages,
        vec![
            IrOutput::FlowGraph,
            IrOutput::Interference,
            IrOutput::Spills,
            IrOutput::FlowGraph,
            IrOutput::Interference,
            IrOutput::Allocation,
        ]
    );

    assert_eq!(
        allocation.assembly(),
        "    li r0, 1\n    store r0, [0]\n    li r0, 2\n    use r0\n    load r0, [0]\n    use r0\n"
    );

    // The spilled temporary is gone entirely.
    assert!(allocation
        .instrs
        .iter()
        .all(|instr| !instr.def().contains(&a) && !instr.uses().contains(&a)));
}

#[test]
fn written_registers_are_reported() {
    let mut frame = TestFrame::new(2);
    let a = Temp::fresh();
    let r1 = frame.registers()[1];

    let instrs = vec![
        Instr::oper("li `d0, 1", vec![a], vec![]),
        Instr::oper("clobber", vec![r1], vec![]),
        Instr::oper("use `s0, `s1", vec![], vec![a, r1]),
    ];

    let allocation = regalloc(&mut QuietDriver::default(), &mut frame, &mut TestCodegen, instrs);
    let r0 = frame.registers()[0];

    assert_eq!(allocation.colors[&a], r0);
    assert_eq!(allocation.written(), HashSet::from([r0, r1]));
}

#[test]
#[should_panic(expected = "inconsistency")]
fn inconsistent_colorings_are_caught() {
    let registers = [Temp::named("r0")];
    let (a, b) = (Temp::fresh(), Temp::fresh());

    let instrs = vec![
        Instr::oper("li `d0, 1", vec![a], vec![]),
        Instr::oper("li `d0, 2", vec![b], vec![]),
        Instr::oper("use `s0, `s1", vec![], vec![a, b]),
    ];

    let flow = AssemFlowGraph::new(&instrs);
    let live = liveness(&flow);
    let graph = InterferenceGraph::build(&registers, &instrs, &flow, &live);

    let colors = HashMap::from([(registers[0], registers[0]), (a, registers[0]), (b, registers[0])]);
    check_consistency(&graph, &colors);
}

#[test]
#[should_panic(expected = "unspillable temporaries were spilled")]
fn instructions_needing_more_registers_than_exist_never_converge() {
    let mut frame = TestFrame::new(1);
    let (a, b) = (Temp::fresh(), Temp::fresh());

    let instrs = vec![
        Instr::oper("li `d0, 1", vec![a], vec![]),
        Instr::oper("li `d0, 2", vec![b], vec![]),
        Instr::oper("use `s0, `s1", vec![], vec![a, b]),
    ];

    regalloc(&mut QuietDriver::default(), &mut frame, &mut TestCodegen, instrs);
}

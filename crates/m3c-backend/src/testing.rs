//! A toy target for allocator tests. It only knows loads and stores, which is
//! all the spill rewrite asks of it.

use m3c_common::assem::Instr;
use m3c_common::frame::{Access, Codegen, Frame};
use m3c_common::temp::{Label, Temp};
use m3c_common::tree::{Exp, Stm};

const NAMES: [&str; 8] = ["r0", "r1", "r2", "r3", "r4", "r5", "r6", "r7"];

pub struct TestFrame {
    name: Label,
    registers: Vec<Temp>,
    slots: i32,
}

impl TestFrame {
    pub fn new(registers: usize) -> Self {
        Self {
            name: Label::named("test"),
            registers: NAMES[..registers]
                .iter()
                .map(|name| Temp::named(*name))
                .collect(),
            slots: 0,
        }
    }

    pub fn slots(&self) -> i32 {
        self.slots
    }
}

impl Frame for TestFrame {
    fn name(&self) -> &Label {
        &self.name
    }

    fn registers(&self) -> &[Temp] {
        &self.registers
    }

    fn word_size(&self) -> i32 {
        4
    }

    fn fp(&self) -> Exp {
        Exp::Name(Label::named("frame"))
    }

    fn alloc_local(&mut self, _: bool) -> Access {
        let offset = self.slots * self.word_size();
        self.slots += 1;
        Access::InFrame(offset)
    }
}

pub struct TestCodegen;

impl Codegen for TestCodegen {
    type Frame = TestFrame;

    fn codegen(&mut self, _: &TestFrame, stm: Stm) -> Vec<Instr> {
        match stm {
            Stm::Move(Exp::Temp(dst), Exp::Mem(address, offset))
                if matches!(*address, Exp::Name(_)) =>
            {
                vec![Instr::oper(format!("load `d0, [{offset}]"), vec![dst], vec![])]
            }

            Stm::Move(Exp::Mem(address, offset), Exp::Temp(src))
                if matches!(*address, Exp::Name(_)) =>
            {
                vec![Instr::oper(format!("store `s0, [{offset}]"), vec![], vec![src])]
            }

            stm => unreachable!("the test target cannot select {stm:?}"),
        }
    }
}

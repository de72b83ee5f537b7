use m3c_common::assem::Instr;
use m3c_common::frame::{Access, Frame};
use m3c_common::temp::{Label, Temp};
use m3c_common::tree::{Exp, Stm};

use super::REGISTERS;
use crate::alloc::Allocation;

const WORD_SIZE: i32 = 4;

/// The frame of a procedure on the mini target.
///
/// ```text
///        | arguments | <- $fp
///        | saved $fp |
///        | locals    |
///        | saved regs| <- $sp
/// ```
#[derive(Debug)]
pub struct MiniFrame {
    name: Label,
    /// Moves from the argument registers into wherever the parameters live.
    params: Vec<(Access, Temp)>,
    locals: i32,
}

impl MiniFrame {
    pub fn new(name: Label) -> Self {
        Self {
            name,
            params: Vec::new(),
            locals: 0,
        }
    }

    /// Add a parameter, passed in the next argument register.
    pub fn param(&mut self, escapes: bool) -> Access {
        let index = self.params.len();
        let Some(register) = REGISTERS.args.get(index) else {
            panic!("{} takes more than {} parameters", self.name, REGISTERS.args.len());
        };

        let access = self.alloc_local(escapes);
        self.params.push((access, *register));
        access
    }

    /// Prefix the body with the moves out of the argument registers.
    pub fn proc_entry_exit1(&self, body: Stm) -> Stm {
        let moves = self
            .params
            .iter()
            .map(|(access, register)| Stm::mov(access.exp(self.fp()), Exp::Temp(*register)));

        Stm::seq(moves.chain(std::iter::once(body)))
    }

    /// Keep the special registers live at the end of the body.
    pub fn proc_entry_exit2(&self, mut body: Vec<Instr>) -> Vec<Instr> {
        body.push(Instr::oper("# sink", vec![], REGISTERS.sink()));
        body
    }

    /// Wrap the allocated body in a prologue and an epilogue, saving every
    /// callee-saved register the body writes.
    pub fn proc_entry_exit3(&self, allocation: &Allocation) -> String {
        let written = allocation.written();
        let saved: Vec<_> = REGISTERS
            .callee_saves()
            .into_iter()
            .filter(|register| written.contains(register))
            .collect();

        let size = (1 + self.locals + saved.len() as i32) * WORD_SIZE;
        let slot = |index: usize| -(2 + self.locals + index as i32) * WORD_SIZE;

        let mut lines = vec![
            format!("{}:", self.name),
            format!("    sw $fp, -{WORD_SIZE}($sp)"),
            "    move $fp, $sp".to_string(),
            format!("    addiu $sp, $sp, -{size}"),
        ];

        for (index, register) in saved.iter().enumerate() {
            lines.push(format!("    sw {register}, {}($fp)", slot(index)));
        }

        let mut res = lines.join("\n");
        res.push('\n');
        res.push_str(&allocation.assembly());

        for (index, register) in saved.iter().enumerate() {
            res.push_str(&format!("    lw {register}, {}($fp)\n", slot(index)));
        }

        res.push_str("    move $sp, $fp\n");
        res.push_str(&format!("    lw $fp, -{WORD_SIZE}($sp)\n"));
        res.push_str("    jr $ra\n");

        res
    }

    pub fn locals(&self) -> i32 {
        self.locals
    }
}

impl Frame for MiniFrame {
    fn name(&self) -> &Label {
        &self.name
    }

    fn registers(&self) -> &[Temp] {
        REGISTERS.all()
    }

    fn word_size(&self) -> i32 {
        WORD_SIZE
    }

    fn fp(&self) -> Exp {
        Exp::Temp(REGISTERS.fp)
    }

    fn alloc_local(&mut self, escapes: bool) -> Access {
        if escapes {
            self.locals += 1;
            Access::InFrame(-(1 + self.locals) * WORD_SIZE)
        } else {
            Access::InReg(Temp::fresh())
        }
    }
}

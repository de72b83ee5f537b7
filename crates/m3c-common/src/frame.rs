use crate::assem::Instr;
use crate::temp::{Label, Temp};
use crate::tree::{Exp, Stm};

/// Where a local variable lives.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Access {
    /// At a fixed offset from the frame pointer.
    InFrame(i32),
    InReg(Temp),
}

impl Access {
    /// The expression reading this access, given the frame pointer expression.
    pub fn exp(&self, fp: Exp) -> Exp {
        match self {
            Self::InFrame(offset) => Exp::mem(fp, *offset),
            Self::InReg(temp) => Exp::Temp(*temp),
        }
    }
}

/// The activation record of one procedure on some target.
pub trait Frame {
    fn name(&self) -> &Label;

    /// Every physical register. These are the precolored temporaries, and also
    /// the colors available to the register allocator.
    fn registers(&self) -> &[Temp];

    fn word_size(&self) -> i32;

    /// The expression the frame-resident locals are addressed from.
    fn fp(&self) -> Exp;

    /// Allocate a new local. Escaping locals always live in the frame.
    fn alloc_local(&mut self, escapes: bool) -> Access;
}

/// Instruction selection for a target.
pub trait Codegen {
    type Frame: Frame;

    /// Select instructions for a single canonical statement.
    fn codegen(&mut self, frame: &Self::Frame, stm: Stm) -> Vec<Instr>;
}

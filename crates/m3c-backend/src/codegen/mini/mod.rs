//! A small MIPS-flavoured reference target.

mod frame;
mod munch;


pub use frame::MiniFrame;
pub use munch::MiniCodegen;

use m3c_common::temp::Temp;

lazy_static::lazy_static! {
    pub static ref REGISTERS: Registers = Registers::new();
}

#[derive(Debug)]
pub struct Registers {
    pub zero: Temp,
    pub v0: Temp,
    pub args: [Temp; 4],
    pub temps: [Temp; 8],
    pub saved: [Temp; 4],
    pub ra: Temp,
    pub sp: Temp,
    pub fp: Temp,

    /// Every register, in the order the allocator prefers them.
    all: Vec<Temp>,
}

impl Registers {
    fn new() -> Self {
        let zero = Temp::named("$zero");
        let v0 = Temp::named("$v0");
        let args = ["$a0", "$a1", "$a2", "$a3"].map(Temp::named);
        let temps = ["$t0", "$t1", "$t2", "$t3", "$t4", "$t5", "$t6", "$t7"].map(Temp::named);
        let saved = ["$s0", "$s1", "$s2", "$s3"].map(Temp::named);
        let ra = Temp::named("$ra");
        let sp = Temp::named("$sp");
        let fp = Temp::named("$fp");

        let mut all = vec![v0];
        all.extend(args);
        all.extend(temps);
        all.extend(saved);
        all.extend([ra, sp, fp, zero]);

        Self {
            zero,
            v0,
            args,
            temps,
            saved,
            ra,
            sp,
            fp,
            all,
        }
    }

    pub fn all(&self) -> &[Temp] {
        &self.all
    }

    /// The registers a call may overwrite.
    pub fn call_defs(&self) -> Vec<Temp> {
        let mut defs = vec![self.v0, self.ra];
        defs.extend(self.args);
        defs.extend(self.temps);
        defs
    }

    /// The registers a procedure must give back as it found them, if it writes
    /// them at all.
    pub fn callee_saves(&self) -> Vec<Temp> {
        let mut saves = vec![self.ra];
        saves.extend(self.saved);
        saves
    }

    /// The registers live at the end of every procedure.
    pub fn sink(&self) -> Vec<Temp> {
        vec![self.v0, self.zero, self.sp, self.fp]
    }
}

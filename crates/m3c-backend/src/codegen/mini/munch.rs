//! Maximal munch over canonical statements.

use log::trace;

use m3c_common::assem::Instr;
use m3c_common::frame::Codegen;
use m3c_common::temp::Temp;
use m3c_common::tree::{BinOp, Exp, RelOp, Stm};

use super::{MiniFrame, REGISTERS};

#[derive(Debug, Default)]
pub struct MiniCodegen {
    instrs: Vec<Instr>,
}

impl MiniCodegen {
    pub fn new() -> Self {
        Self::default()
    }

    fn emit(&mut self, instr: Instr) {
        trace!("emit {instr:?}");
        self.instrs.push(instr);
    }

    fn munch_stm(&mut self, stm: Stm) {
        match stm {
            Stm::Move(Exp::Temp(dst), Exp::Const(value)) => {
                self.emit(Instr::oper(format!("li `d0, {value}"), vec![dst], vec![]))
            }

            Stm::Move(Exp::Temp(dst), Exp::Name(label)) => {
                self.emit(Instr::oper(format!("la `d0, {label}"), vec![dst], vec![]))
            }

            Stm::Move(Exp::Temp(dst), Exp::Mem(address, offset)) => {
                let address = self.munch_exp(*address);
                self.emit(Instr::oper(
                    format!("lw `d0, {offset}(`s0)"),
                    vec![dst],
                    vec![address],
                ));
            }

            Stm::Move(Exp::Temp(dst), Exp::Call(func, args)) => {
                self.munch_call(*func, args);
                self.emit(Instr::mov("move `d0, `s0", dst, REGISTERS.v0));
            }

            Stm::Move(Exp::Temp(dst), src) => {
                let src = self.munch_exp(src);
                self.emit(Instr::mov("move `d0, `s0", dst, src));
            }

            Stm::Move(Exp::Mem(address, offset), src) => {
                let src = self.munch_exp(src);
                let address = self.munch_exp(*address);
                self.emit(Instr::oper(
                    format!("sw `s0, {offset}(`s1)"),
                    vec![],
                    vec![src, address],
                ));
            }

            Stm::Move(dst, _) => unreachable!("cannot move into {dst:?}"),

            Stm::Exp(Exp::Call(func, args)) => self.munch_call(*func, args),

            Stm::Exp(exp) => {
                self.munch_exp(exp);
            }

            Stm::Jump(Exp::Name(label), targets) => {
                assert_eq!(targets, vec![label.clone()], "direct jumps have one target");
                self.emit(Instr::jump("j `j0", vec![], targets));
            }

            Stm::Jump(address, targets) => {
                let address = self.munch_exp(address);
                self.emit(Instr::jump("jr `s0", vec![address], targets));
            }

            Stm::CJump {
                op,
                left,
                right,
                t,
                f,
            } => {
                let left = self.munch_exp(left);
                let right = self.munch_exp(right);
                self.emit(Instr::jump(
                    format!("{} `s0, `s1, `j0", branch(op)),
                    vec![left, right],
                    vec![t, f],
                ));
            }

            Stm::Label(label) => self.emit(Instr::label(label)),

            Stm::Seq(..) => unreachable!("sequences are gone after canonicalization"),
        }
    }

    fn munch_exp(&mut self, exp: Exp) -> Temp {
        match exp {
            Exp::Const(0) => REGISTERS.zero,

            Exp::Const(value) => self.result(|dst| {
                Instr::oper(format!("li `d0, {value}"), vec![dst], vec![])
            }),

            Exp::Name(label) => self.result(|dst| {
                Instr::oper(format!("la `d0, {label}"), vec![dst], vec![])
            }),

            Exp::Temp(temp) => temp,

            Exp::BinOp(BinOp::Add, left, right) if matches!(*right, Exp::Const(_)) => {
                let Exp::Const(value) = *right else {
                    unreachable!()
                };

                let left = self.munch_exp(*left);
                self.result(|dst| {
                    Instr::oper(format!("addiu `d0, `s0, {value}"), vec![dst], vec![left])
                })
            }

            Exp::BinOp(op, left, right) => {
                let left = self.munch_exp(*left);
                let right = self.munch_exp(*right);
                self.result(|dst| {
                    Instr::oper(
                        format!("{} `d0, `s0, `s1", arith(op)),
                        vec![dst],
                        vec![left, right],
                    )
                })
            }

            Exp::Mem(address, offset) => {
                let address = self.munch_exp(*address);
                self.result(|dst| {
                    Instr::oper(format!("lw `d0, {offset}(`s0)"), vec![dst], vec![address])
                })
            }

            Exp::Call(func, args) => {
                self.munch_call(*func, args);
                let dst = Temp::fresh();
                self.emit(Instr::mov("move `d0, `s0", dst, REGISTERS.v0));
                dst
            }

            Exp::ESeq(..) => unreachable!("expression sequences are gone after canonicalization"),
        }
    }

    /// Put the arguments in their registers and call. The result is left in
    /// `$v0`.
    fn munch_call(&mut self, func: Exp, args: Vec<Exp>) {
        assert!(
            args.len() <= REGISTERS.args.len(),
            "calls take at most {} arguments",
            REGISTERS.args.len()
        );

        let args: Vec<_> = args.into_iter().map(|arg| self.munch_exp(arg)).collect();
        let mut uses = Vec::with_capacity(args.len());

        for (arg, register) in args.into_iter().zip(REGISTERS.args) {
            self.emit(Instr::mov("move `d0, `s0", register, arg));
            uses.push(register);
        }

        match func {
            Exp::Name(label) => {
                let assem = format!("jal {label}");
                self.emit(Instr::oper(assem, REGISTERS.call_defs(), uses));
            }

            func => {
                let func = self.munch_exp(func);
                uses.push(func);
                let src = uses.len() - 1;
                self.emit(Instr::oper(
                    format!("jalr `s{src}"),
                    REGISTERS.call_defs(),
                    uses,
                ));
            }
        }
    }

    fn result(&mut self, make: impl FnOnce(Temp) -> Instr) -> Temp {
        let dst = Temp::fresh();
        self.emit(make(dst));
        dst
    }
}

impl Codegen for MiniCodegen {
    type Frame = MiniFrame;

    fn codegen(&mut self, _: &MiniFrame, stm: Stm) -> Vec<Instr> {
        self.munch_stm(stm);
        std::mem::take(&mut self.instrs)
    }
}

fn branch(op: RelOp) -> &'static str {
    match op {
        RelOp::Eq => "beq",
        RelOp::Ne => "bne",
        RelOp::Lt => "blt",
        RelOp::Gt => "bgt",
        RelOp::Le => "ble",
        RelOp::Ge => "bge",
    }
}

fn arith(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "addu",
        BinOp::And => "and",
        BinOp::Div => "div",
        BinOp::DivU => "divu",
        BinOp::Mod => "rem",
        BinOp::Mul => "mul",
        BinOp::Or => "or",
        BinOp::Sll => "sllv",
        BinOp::Sra => "srav",
        BinOp::Srl => "srlv",
        BinOp::Sub => "subu",
        BinOp::Xor => "xor",
    }
}

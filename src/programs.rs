//! The procedures the compiler knows how to build, written directly as IR
//! trees.

use m3c_backend::codegen::mini::{MiniFrame, REGISTERS};
use m3c_common::frame::Frame;
use m3c_common::temp::{Label, Temp};
use m3c_common::tree::{BinOp, Exp, RelOp, Stm};

use crate::args::Program;

pub fn build(program: Program) -> (MiniFrame, Stm) {
    match program {
        Program::Sum => sum(),
        Program::Calls => calls(),
        Program::Pressure => pressure(),
    }
}

fn ret(exp: Exp) -> Stm {
    Stm::mov(Exp::Temp(REGISTERS.v0), exp)
}

fn add(left: Exp, right: Exp) -> Exp {
    Exp::binop(BinOp::Add, left, right)
}

fn sum() -> (MiniFrame, Stm) {
    let mut frame = MiniFrame::new(Label::named("sum"));
    let n = frame.param(false).exp(frame.fp());

    let (i, total) = (Temp::fresh(), Temp::fresh());
    let (test, body, done) = (Label::fresh(), Label::fresh(), Label::fresh());

    let stm = Stm::seq([
        Stm::mov(Exp::Temp(i), Exp::Const(0)),
        Stm::mov(Exp::Temp(total), Exp::Const(0)),
        Stm::Label(test.clone()),
        Stm::cjump(RelOp::Lt, Exp::Temp(i), n, body.clone(), done.clone()),
        Stm::Label(body),
        Stm::mov(Exp::Temp(total), add(Exp::Temp(total), Exp::Temp(i))),
        Stm::mov(Exp::Temp(i), add(Exp::Temp(i), Exp::Const(1))),
        Stm::jump(test),
        Stm::Label(done),
        ret(Exp::Temp(total)),
    ]);

    (frame, stm)
}

/// `square(x) + square(square(x + 1))`, with `x` kept in an escaping local.
fn calls() -> (MiniFrame, Stm) {
    let mut frame = MiniFrame::new(Label::named("calls"));
    let x = frame.param(true).exp(frame.fp());
    let square = || Exp::Name(Label::named("square"));

    let first = Exp::call(square(), vec![x.clone()]);
    let inner = Exp::call(square(), vec![add(x, Exp::Const(1))]);
    let second = Exp::call(square(), vec![inner]);

    (frame, ret(add(first, second)))
}

/// Sum of twenty-four values that are all live at the same time.
fn pressure() -> (MiniFrame, Stm) {
    let frame = MiniFrame::new(Label::named("pressure"));
    let temps: Vec<_> = (0..24).map(|_| Temp::fresh()).collect();

    let mut stms: Vec<_> = temps
        .iter()
        .zip(1..)
        .map(|(temp, value)| Stm::mov(Exp::Temp(*temp), Exp::Const(value * value)))
        .collect();

    let total = temps[1..]
        .iter()
        .fold(Exp::Temp(temps[0]), |total, temp| add(total, Exp::Temp(*temp)));

    stms.push(ret(total));

    (frame, Stm::seq(stms))
}

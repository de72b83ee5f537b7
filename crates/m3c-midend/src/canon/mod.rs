//! Canonicalization turns one statement tree into a flat list of statements
//! in which
//!
//! - there are no `SEQ` or `ESEQ` nodes,
//! - every call is either the whole of an `EXP` or the whole source of a
//!   `MOVE` into a temporary, and
//! - no call argument contains another call.
//!
//! Side effects happen in the same order as in the tree. Whenever the
//! statements lifted out of a later subexpression might change the value of an
//! earlier one, the earlier value is saved in a fresh temporary first.

mod check;


use std::collections::VecDeque;

use log::trace;

use m3c_common::temp::Temp;
use m3c_common::tree::{Exp, Stm};

pub use check::check;

pub fn canonicalize(stm: Stm) -> Vec<Stm> {
    let mut canon = Canonicalizer::default();
    let stms = canon.stm(stm);
    trace!(
        "canonicalized into {} statements using {} fresh temporaries",
        stms.len(),
        canon.fresh
    );
    stms
}

#[derive(Debug, Default)]
struct Canonicalizer {
    fresh: usize,
}

impl Canonicalizer {
    fn stm(&mut self, stm: Stm) -> Vec<Stm> {
        match stm {
            Stm::Seq(first, second) => {
                let mut stms = self.stm(*first);
                stms.extend(self.stm(*second));
                stms
            }

            Stm::Move(Exp::ESeq(effect, dst), src) => {
                let mut stms = self.stm(*effect);
                stms.extend(self.stm(Stm::Move(*dst, src)));
                stms
            }

            Stm::Move(Exp::Temp(temp), src @ Exp::Call(..)) => {
                let (mut stms, call) = self.exp(src);
                stms.push(Stm::Move(Exp::Temp(temp), call));
                stms
            }

            Stm::Exp(call @ Exp::Call(..)) => {
                let (mut stms, call) = self.exp(call);
                stms.push(Stm::Exp(call));
                stms
            }

            stm => {
                let (shape, kids) = stm.into_parts();
                let (mut stms, kids) = self.reorder(kids);
                stms.push(shape.build(kids));
                stms
            }
        }
    }

    /// Split an expression into the statements that must run first and the
    /// side-effect free value that remains. The value may still be a call, whose
    /// arguments are canonical.
    fn exp(&mut self, exp: Exp) -> (Vec<Stm>, Exp) {
        match exp {
            Exp::ESeq(effect, exp) => {
                let mut stms = self.stm(*effect);
                let (rest, exp) = self.exp(*exp);
                stms.extend(rest);
                (stms, exp)
            }

            exp => {
                let (shape, kids) = exp.into_parts();
                let (stms, kids) = self.reorder(kids);
                (stms, shape.build(kids))
            }
        }
    }

    /// Like [`Self::exp`], but a call is evaluated into a fresh temporary.
    fn hoisted(&mut self, exp: Exp) -> (Vec<Stm>, Exp) {
        let (mut stms, exp) = self.exp(exp);
        if !exp.is_call() {
            return (stms, exp);
        }

        let temp = self.temp();
        stms.push(Stm::Move(Exp::Temp(temp), exp));
        (stms, Exp::Temp(temp))
    }

    /// Canonicalize a list of sibling expressions, evaluated left to right.
    fn reorder(&mut self, kids: Vec<Exp>) -> (Vec<Stm>, Vec<Exp>) {
        let parts: Vec<_> = kids.into_iter().map(|kid| self.hoisted(kid)).collect();

        // Statements of the kids to the right of the current one.
        let mut later = Vec::new();
        let mut values = VecDeque::with_capacity(parts.len());

        for (mut stms, value) in parts.into_iter().rev() {
            let value = if commutes(&later, &value) {
                value
            } else {
                let temp = self.temp();
                stms.push(Stm::Move(Exp::Temp(temp), value));
                Exp::Temp(temp)
            };

            stms.append(&mut later);
            later = stms;
            values.push_front(value);
        }

        (later, values.into())
    }

    fn temp(&mut self) -> Temp {
        self.fresh += 1;
        Temp::fresh()
    }
}

/// Whether running `stms` cannot change the value of `exp`. Conservative: only
/// no statements at all, or a constant value, are known to commute.
fn commutes(stms: &[Stm], exp: &Exp) -> bool {
    stms.is_empty() || matches!(exp, Exp::Const(_) | Exp::Name(_))
}

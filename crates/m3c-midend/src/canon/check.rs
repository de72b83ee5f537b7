//! Verifies that a statement list is in canonical form.

use log::error;

use m3c_common::tree::pretty::Prettier;
use m3c_common::tree::{Exp, Stm};

/// Check the statements, logging every violation. Returns `true` if any was
/// found.
pub fn check(stms: &[Stm]) -> bool {
    let mut checker = Checker::default();
    for stm in stms {
        checker.check_stm(stm);
    }

    checker.error
}

#[derive(Debug, Default)]
struct Checker {
    error: bool,
}

impl Checker {
    fn check_stm(&mut self, stm: &Stm) {
        match stm {
            Stm::Seq(..) => self.report("sequence in canonical statements", stm),

            Stm::Move(Exp::Temp(_), Exp::Call(func, args)) | Stm::Exp(Exp::Call(func, args)) => {
                self.check_exp(func);
                for arg in args {
                    self.check_exp(arg);
                }
            }

            Stm::Move(Exp::Mem(..), _)
            | Stm::Move(Exp::Temp(_), _)
            | Stm::Exp(_)
            | Stm::Jump(..)
            | Stm::CJump { .. }
            | Stm::Label(_) => {
                for kid in stm.kids() {
                    self.check_exp(kid);
                }
            }

            Stm::Move(..) => self.report("move into something other than a temporary or memory", stm),
        }
    }

    fn check_exp(&mut self, exp: &Exp) {
        match exp {
            Exp::ESeq(..) => self.report_exp("expression sequence in canonical statements", exp),
            Exp::Call(..) => self.report_exp("nested call", exp),
            exp => {
                for kid in exp.kids() {
                    self.check_exp(kid);
                }
            }
        }
    }

    fn report(&mut self, what: &str, stm: &Stm) {
        self.error = true;
        let prettier = Prettier::new();
        error!("{what}: {}", prettier.pretty_stm(stm));
    }

    fn report_exp(&mut self, what: &str, exp: &Exp) {
        self.error = true;
        let prettier = Prettier::new();
        error!("{what}: {}", prettier.pretty_exp(exp));
    }
}

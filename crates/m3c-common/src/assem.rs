//! Abstract assembly: target instructions whose register operands are still
//! temporaries.
//!
//! The assembly text of an instruction is a template. `` `s0 ``, `` `d0 `` and
//! `` `j0 `` refer to the first source, destination and jump target
//! respectively, and ` `` ` is a literal backquote.

use std::collections::HashMap;
use std::fmt::Write;

use crate::temp::{Label, Temp};

/// Maps temporaries onto whatever they have been assigned.
pub trait TempMap {
    fn temp(&self, temp: Temp) -> Temp;
}

impl TempMap for HashMap<Temp, Temp> {
    fn temp(&self, temp: Temp) -> Temp {
        self.get(&temp).copied().unwrap_or(temp)
    }
}

/// The map that leaves every temporary alone.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl TempMap for Identity {
    fn temp(&self, temp: Temp) -> Temp {
        temp
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Instr {
    Oper {
        assem: String,
        dst: Vec<Temp>,
        src: Vec<Temp>,
        /// Every label control may continue at. Empty for instructions that
        /// always fall through.
        jumps: Vec<Label>,
    },
    Label {
        assem: String,
        label: Label,
    },
    Move {
        assem: String,
        dst: Temp,
        src: Temp,
    },
}

impl Instr {
    pub fn oper(assem: impl Into<String>, dst: Vec<Temp>, src: Vec<Temp>) -> Self {
        Self::Oper {
            assem: assem.into(),
            dst,
            src,
            jumps: Vec::new(),
        }
    }

    pub fn jump(assem: impl Into<String>, src: Vec<Temp>, jumps: Vec<Label>) -> Self {
        Self::Oper {
            assem: assem.into(),
            dst: Vec::new(),
            src,
            jumps,
        }
    }

    pub fn label(label: Label) -> Self {
        Self::Label {
            assem: format!("{label}:"),
            label,
        }
    }

    pub fn mov(assem: impl Into<String>, dst: Temp, src: Temp) -> Self {
        Self::Move {
            assem: assem.into(),
            dst,
            src,
        }
    }

    pub fn def(&self) -> &[Temp] {
        match self {
            Self::Oper { dst, .. } => dst,
            Self::Label { .. } => &[],
            Self::Move { dst, .. } => std::slice::from_ref(dst),
        }
    }

    pub fn uses(&self) -> &[Temp] {
        match self {
            Self::Oper { src, .. } => src,
            Self::Label { .. } => &[],
            Self::Move { src, .. } => std::slice::from_ref(src),
        }
    }

    pub fn jumps(&self) -> &[Label] {
        match self {
            Self::Oper { jumps, .. } => jumps,
            Self::Label { .. } | Self::Move { .. } => &[],
        }
    }

    pub fn is_move(&self) -> bool {
        matches!(self, Self::Move { .. })
    }

    pub fn is_label(&self) -> bool {
        matches!(self, Self::Label { .. })
    }

    pub fn replace_use(&mut self, old: Temp, new: Temp) {
        match self {
            Self::Oper { src, .. } => src
                .iter_mut()
                .filter(|temp| **temp == old)
                .for_each(|temp| *temp = new),
            Self::Move { src, .. } if *src == old => *src = new,
            _ => {}
        }
    }

    pub fn replace_def(&mut self, old: Temp, new: Temp) {
        match self {
            Self::Oper { dst, .. } => dst
                .iter_mut()
                .filter(|temp| **temp == old)
                .for_each(|temp| *temp = new),
            Self::Move { dst, .. } if *dst == old => *dst = new,
            _ => {}
        }
    }

    /// Render the instruction with every temporary replaced through `map`. A
    /// move between temporaries mapped to the same register is rendered as a
    /// comment.
    pub fn format(&self, map: &impl TempMap) -> String {
        match self {
            Self::Oper {
                assem,
                dst,
                src,
                jumps,
            } => expand(assem, map, dst, src, jumps),
            Self::Label { assem, .. } => assem.clone(),
            Self::Move { assem, dst, src } => {
                let text = expand(
                    assem,
                    map,
                    std::slice::from_ref(dst),
                    std::slice::from_ref(src),
                    &[],
                );

                if map.temp(*dst) == map.temp(*src) {
                    format!("# {text}")
                } else {
                    text
                }
            }
        }
    }
}

fn expand(
    assem: &str,
    map: &impl TempMap,
    dst: &[Temp],
    src: &[Temp],
    jumps: &[Label],
) -> String {
    let mut res = String::with_capacity(assem.len());
    let mut chars = assem.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '`' {
            res.push(c);
            continue;
        }

        let kind = match chars.next() {
            Some('`') => {
                res.push('`');
                continue;
            }

            Some(kind @ ('s' | 'd' | 'j')) => kind,
            other => panic!("bad operand {other:?} in instruction template {assem:?}"),
        };

        let mut index = 0;
        let mut digits = 0;
        while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
            index = index * 10 + digit as usize;
            digits += 1;
            chars.next();
        }

        assert!(digits > 0, "operand without index in {assem:?}");

        let written = match kind {
            's' => src.get(index).map(|temp| write!(res, "{}", map.temp(*temp))),
            'd' => dst.get(index).map(|temp| write!(res, "{}", map.temp(*temp))),
            _ => jumps.get(index).map(|label| write!(res, "{label}")),
        };

        match written {
            Some(result) => result.unwrap(),
            None => panic!("operand `{kind}{index} out of range in {assem:?}"),
        }
    }

    res
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{Identity, Instr};
    use crate::temp::{Label, Temp};

    #[test]
    fn substitutes_operands() {
        let (a, b) = (Temp::fresh(), Temp::fresh());
        let r0 = Temp::named("r0");
        let l = Label::named("loop");

        let add = Instr::oper("add `d0, `s0, `s1", vec![a], vec![a, b]);
        let map = HashMap::from([(a, r0)]);
        assert_eq!(add.format(&map), format!("add r0, r0, {b}"));

        let jump = Instr::jump("bne `s0, `s1, `j0", vec![a, b], vec![l]);
        assert_eq!(jump.format(&Identity), format!("bne {a}, {b}, loop"));
    }

    #[test]
    fn redundant_moves_become_comments() {
        let (a, b) = (Temp::fresh(), Temp::fresh());
        let r0 = Temp::named("r0");
        let mov = Instr::mov("move `d0, `s0", a, b);

        let map = HashMap::from([(a, r0), (b, r0)]);
        assert_eq!(mov.format(&map), "# move r0, r0");
        assert_eq!(mov.format(&Identity), format!("move {a}, {b}"));
    }

    #[test]
    fn replaces_uses_and_defs_separately() {
        let (a, b, c) = (Temp::fresh(), Temp::fresh(), Temp::fresh());
        let mut inst = Instr::oper("add `d0, `s0, `s1", vec![a], vec![a, b]);

        inst.replace_use(a, c);
        assert_eq!(inst.uses(), &[c, b]);
        assert_eq!(inst.def(), &[a]);

        inst.replace_def(a, b);
        assert_eq!(inst.def(), &[b]);
    }

    #[test]
    #[should_panic]
    fn out_of_range_operands_panic() {
        Instr::oper("neg `d0, `s1", vec![Temp::fresh()], vec![Temp::fresh()]).format(&Identity);
    }
}

//! The intermediate tree language. Trees are built bottom-up and never shared,
//! so every rewrite takes its input by value.
//!
//! Every node can be taken apart into its *kids* (the direct child expressions)
//! and a shape that rebuilds the node from replacement kids. Statement
//! sequences ([`Stm::Seq`]) and expression sequences ([`Exp::ESeq`]) have no
//! kids; they are eliminated by canonicalization before anybody asks.

pub mod pretty;


use std::fmt;

use crate::temp::{Label, Temp};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BinOp {
    Add,
    And,
    Div,
    DivU,
    Mod,
    Mul,
    Or,
    Sll,
    Sra,
    Srl,
    Sub,
    Xor,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Add => "ADD",
            Self::And => "AND",
            Self::Div => "DIV",
            Self::DivU => "DIVU",
            Self::Mod => "MOD",
            Self::Mul => "MUL",
            Self::Or => "OR",
            Self::Sll => "SLL",
            Self::Sra => "SRA",
            Self::Srl => "SRL",
            Self::Sub => "SUB",
            Self::Xor => "XOR",
        };

        write!(f, "{name}")
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum RelOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl RelOp {
    /// The relation that holds exactly when this one does not.
    pub fn not(self) -> Self {
        match self {
            Self::Eq => Self::Ne,
            Self::Ne => Self::Eq,
            Self::Lt => Self::Ge,
            Self::Ge => Self::Lt,
            Self::Gt => Self::Le,
            Self::Le => Self::Gt,
        }
    }

    /// The relation that holds with the operands exchanged.
    pub fn swap(self) -> Self {
        match self {
            Self::Eq => Self::Eq,
            Self::Ne => Self::Ne,
            Self::Lt => Self::Gt,
            Self::Gt => Self::Lt,
            Self::Le => Self::Ge,
            Self::Ge => Self::Le,
        }
    }

    pub fn eval(self, left: i32, right: i32) -> bool {
        match self {
            Self::Eq => left == right,
            Self::Ne => left != right,
            Self::Lt => left < right,
            Self::Gt => left > right,
            Self::Le => left <= right,
            Self::Ge => left >= right,
        }
    }
}

impl fmt::Display for RelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Eq => "EQ",
            Self::Ne => "NE",
            Self::Lt => "LT",
            Self::Gt => "GT",
            Self::Le => "LE",
            Self::Ge => "GE",
        };

        write!(f, "{name}")
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Exp {
    Const(i32),
    Name(Label),
    Temp(Temp),
    BinOp(BinOp, Box<Exp>, Box<Exp>),
    /// The word at `address + offset`.
    Mem(Box<Exp>, i32),
    Call(Box<Exp>, Vec<Exp>),
    /// Run the statement, then produce the value of the expression.
    ESeq(Box<Stm>, Box<Exp>),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Stm {
    Move(Exp, Exp),
    Exp(Exp),
    /// Jump to the address computed by the expression, which must be one of the
    /// listed targets.
    Jump(Exp, Vec<Label>),
    CJump {
        op: RelOp,
        left: Exp,
        right: Exp,
        t: Label,
        f: Label,
    },
    Seq(Box<Stm>, Box<Stm>),
    Label(Label),
}

impl Exp {
    pub fn binop(op: BinOp, left: Exp, right: Exp) -> Self {
        Self::BinOp(op, Box::new(left), Box::new(right))
    }

    pub fn mem(address: Exp, offset: i32) -> Self {
        Self::Mem(Box::new(address), offset)
    }

    pub fn call(func: Exp, args: Vec<Exp>) -> Self {
        Self::Call(Box::new(func), args)
    }

    pub fn eseq(stm: Stm, exp: Exp) -> Self {
        Self::ESeq(Box::new(stm), Box::new(exp))
    }

    pub fn is_call(&self) -> bool {
        matches!(self, Self::Call(..))
    }

    pub fn kids(&self) -> Vec<&Exp> {
        match self {
            Self::Const(_) | Self::Name(_) | Self::Temp(_) => Vec::new(),
            Self::BinOp(_, left, right) => vec![left.as_ref(), right.as_ref()],
            Self::Mem(address, _) => vec![address.as_ref()],
            Self::Call(func, args) => std::iter::once(func.as_ref()).chain(args).collect(),
            Self::ESeq(..) => panic!("kids of an expression sequence"),
        }
    }

    pub fn into_parts(self) -> (ExpShape, Vec<Exp>) {
        match self {
            Self::Const(value) => (ExpShape::Const(value), Vec::new()),
            Self::Name(label) => (ExpShape::Name(label), Vec::new()),
            Self::Temp(temp) => (ExpShape::Temp(temp), Vec::new()),
            Self::BinOp(op, left, right) => (ExpShape::BinOp(op), vec![*left, *right]),
            Self::Mem(address, offset) => (ExpShape::Mem(offset), vec![*address]),
            Self::Call(func, args) => {
                let mut kids = Vec::with_capacity(args.len() + 1);
                kids.push(*func);
                kids.extend(args);
                (ExpShape::Call, kids)
            }
            Self::ESeq(..) => panic!("kids of an expression sequence"),
        }
    }
}

/// An expression with its kids taken out.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ExpShape {
    Const(i32),
    Name(Label),
    Temp(Temp),
    BinOp(BinOp),
    Mem(i32),
    Call,
}

impl ExpShape {
    pub fn build(self, kids: Vec<Exp>) -> Exp {
        match self {
            Self::Const(value) => {
                let [] = take::<0>(kids);
                Exp::Const(value)
            }
            Self::Name(label) => {
                let [] = take::<0>(kids);
                Exp::Name(label)
            }
            Self::Temp(temp) => {
                let [] = take::<0>(kids);
                Exp::Temp(temp)
            }
            Self::BinOp(op) => {
                let [left, right] = take::<2>(kids);
                Exp::binop(op, left, right)
            }
            Self::Mem(offset) => {
                let [address] = take::<1>(kids);
                Exp::mem(address, offset)
            }
            Self::Call => {
                let mut kids = kids.into_iter();
                let func = kids
                    .next()
                    .unwrap_or_else(|| panic!("call rebuilt without a function"));
                Exp::call(func, kids.collect())
            }
        }
    }
}

impl Stm {
    pub fn mov(dst: Exp, src: Exp) -> Self {
        Self::Move(dst, src)
    }

    /// An unconditional jump to a known label.
    pub fn jump(target: Label) -> Self {
        Self::Jump(Exp::Name(target.clone()), vec![target])
    }

    pub fn cjump(op: RelOp, left: Exp, right: Exp, t: Label, f: Label) -> Self {
        Self::CJump {
            op,
            left,
            right,
            t,
            f,
        }
    }

    /// Chain the statements into right-nested sequences. No statements at all
    /// is the no-op `EXP(CONST 0)`.
    pub fn seq(stms: impl IntoIterator<Item = Stm>) -> Self {
        let mut stms: Vec<_> = stms.into_iter().collect();
        let mut result = match stms.pop() {
            Some(last) => last,
            None => return Self::Exp(Exp::Const(0)),
        };

        while let Some(stm) = stms.pop() {
            result = Self::Seq(Box::new(stm), Box::new(result));
        }

        result
    }

    /// The negation of a conditional jump: the relation is negated and the
    /// targets are swapped, so control goes to the same place.
    pub fn not(self) -> Self {
        match self {
            Self::CJump {
                op,
                left,
                right,
                t,
                f,
            } => Self::CJump {
                op: op.not(),
                left,
                right,
                t: f,
                f: t,
            },
            other => panic!("cannot negate non-conditional jump {other:?}"),
        }
    }

    pub fn is_jump(&self) -> bool {
        matches!(self, Self::Jump(..) | Self::CJump { .. })
    }

    pub fn kids(&self) -> Vec<&Exp> {
        match self {
            Self::Move(Exp::Mem(address, _), src) => vec![address.as_ref(), src],
            Self::Move(_, src) => vec![src],
            Self::Exp(exp) => vec![exp],
            Self::Jump(exp, _) => vec![exp],
            Self::CJump { left, right, .. } => vec![left, right],
            Self::Label(_) => Vec::new(),
            Self::Seq(..) => panic!("kids of a statement sequence"),
        }
    }

    pub fn into_parts(self) -> (StmShape, Vec<Exp>) {
        match self {
            Self::Move(Exp::Mem(address, offset), src) => {
                (StmShape::MoveMem(offset), vec![*address, src])
            }
            Self::Move(dst, src) => (StmShape::Move(dst), vec![src]),
            Self::Exp(exp) => (StmShape::Exp, vec![exp]),
            Self::Jump(exp, targets) => (StmShape::Jump(targets), vec![exp]),
            Self::CJump {
                op,
                left,
                right,
                t,
                f,
            } => (StmShape::CJump { op, t, f }, vec![left, right]),
            Self::Label(label) => (StmShape::Label(label), Vec::new()),
            Self::Seq(..) => panic!("kids of a statement sequence"),
        }
    }
}

/// A statement with its kids taken out.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StmShape {
    /// A move into memory; the address and the source are kids.
    MoveMem(i32),
    /// A move into anything else; only the source is a kid.
    Move(Exp),
    Exp,
    Jump(Vec<Label>),
    CJump { op: RelOp, t: Label, f: Label },
    Label(Label),
}

impl StmShape {
    pub fn build(self, kids: Vec<Exp>) -> Stm {
        match self {
            Self::MoveMem(offset) => {
                let [address, src] = take::<2>(kids);
                Stm::Move(Exp::mem(address, offset), src)
            }
            Self::Move(dst) => {
                let [src] = take::<1>(kids);
                Stm::Move(dst, src)
            }
            Self::Exp => {
                let [exp] = take::<1>(kids);
                Stm::Exp(exp)
            }
            Self::Jump(targets) => {
                let [exp] = take::<1>(kids);
                Stm::Jump(exp, targets)
            }
            Self::CJump { op, t, f } => {
                let [left, right] = take::<2>(kids);
                Stm::cjump(op, left, right, t, f)
            }
            Self::Label(label) => {
                let [] = take::<0>(kids);
                Stm::Label(label)
            }
        }
    }
}

fn take<const N: usize>(kids: Vec<Exp>) -> [Exp; N] {
    kids.try_into().unwrap_or_else(|kids: Vec<Exp>| {
        panic!("rebuilt with {} kids, expected {N}", kids.len())
    })
}

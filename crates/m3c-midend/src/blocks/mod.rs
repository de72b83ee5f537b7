
use std::fmt;

use m3c_common::temp::Label;
use m3c_common::tree::pretty::Prettier;
use m3c_common::tree::Stm;

/// A straight-line sequence of statements: one label first, one jump last, and
/// neither anywhere in between.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Block {
    stms: Vec<Stm>,
}

impl Block {
    pub fn new(stms: Vec<Stm>) -> Self {
        let block = Self { stms };
        block.check();
        block
    }

    pub fn label(&self) -> &Label {
        match self.stms.first() {
            Some(Stm::Label(label)) => label,
            _ => unreachable!(),
        }
    }

    pub fn last(&self) -> &Stm {
        match self.stms.last() {
            Some(stm) => stm,
            None => unreachable!(),
        }
    }

    pub fn stms(&self) -> &[Stm] {
        &self.stms
    }

    /// The statements before the final jump, and the jump.
    pub fn into_parts(mut self) -> (Vec<Stm>, Stm) {
        match self.stms.pop() {
            Some(last) => (self.stms, last),
            None => unreachable!(),
        }
    }

    fn check(&self) {
        let (first, rest) = match self.stms.split_first() {
            Some(split) => split,
            None => panic!("empty basic block"),
        };

        assert!(
            matches!(first, Stm::Label(_)),
            "basic block starts with {first:?}"
        );

        let (last, middle) = match rest.split_last() {
            Some(split) => split,
            None => panic!("basic block without a jump"),
        };

        assert!(last.is_jump(), "basic block ends with {last:?}");

        for stm in middle {
            assert!(
                !stm.is_jump() && !matches!(stm, Stm::Label(_)),
                "basic block contains {stm:?}"
            );
        }
    }
}

#[derive(Clone, Debug)]
pub struct BasicBlocks {
    pub blocks: Vec<Block>,
    /// The label of the exit, where control goes once the procedure body is
    /// done.
    pub done: Label,
    /// The statements at the exit, which do not end in a jump. They always
    /// start with the `done` label.
    pub exit: Vec<Stm>,
}

impl BasicBlocks {
    /// Partition a canonical statement list into basic blocks.
    pub fn new(stms: Vec<Stm>) -> Self {
        let mut blocks = Vec::new();
        let mut open: Option<Vec<Stm>> = None;

        for stm in stms {
            match stm {
                Stm::Label(label) => {
                    if let Some(mut body) = open.take() {
                        body.push(Stm::jump(label.clone()));
                        blocks.push(Block::new(body));
                    }

                    open = Some(vec![Stm::Label(label)]);
                }

                stm => {
                    let mut body = open
                        .take()
                        .unwrap_or_else(|| vec![Stm::Label(Label::fresh())]);

                    if stm.is_jump() {
                        body.push(stm);
                        blocks.push(Block::new(body));
                    } else {
                        body.push(stm);
                        open = Some(body);
                    }
                }
            }
        }

        let (done, exit) = match open {
            Some(exit) => match exit.first() {
                Some(Stm::Label(done)) => (done.clone(), exit),
                _ => unreachable!(),
            },

            None => {
                let done = Label::fresh();
                (done.clone(), vec![Stm::Label(done)])
            }
        };

        Self { blocks, done, exit }
    }
}

impl fmt::Display for BasicBlocks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prettier = Prettier::new();
        for block in self.blocks.iter() {
            writeln!(f, "{}", prettier.pretty_stms(block.stms()))?;
            writeln!(f)?;
        }

        writeln!(f, "{}", prettier.pretty_stms(&self.exit))
    }
}

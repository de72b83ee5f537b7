use pretty::{Arena, DocAllocator, DocBuilder};

use super::{Exp, Stm};

pub struct Prettier<'a> {
    allocator: Arena<'a>,
    width: usize,
}

impl<'a> Prettier<'a> {
    pub fn new() -> Self {
        Self {
            allocator: Arena::new(),
            width: 80,
        }
    }

    pub fn pretty_stms(&'a self, stms: &[Stm]) -> String {
        let doc = self.allocator.intersperse(
            stms.iter().map(|stm| self.doc_stm(stm)),
            self.allocator.hardline(),
        );
        let mut res = Vec::new();
        doc.render(self.width, &mut res).unwrap();
        String::from_utf8(res).unwrap()
    }

    pub fn pretty_stm(&'a self, stm: &Stm) -> String {
        let doc = self.doc_stm(stm);
        let mut res = Vec::new();
        doc.render(self.width, &mut res).unwrap();
        String::from_utf8(res).unwrap()
    }

    pub fn pretty_exp(&'a self, exp: &Exp) -> String {
        let doc = self.doc_exp(exp);
        let mut res = Vec::new();
        doc.render(self.width, &mut res).unwrap();
        String::from_utf8(res).unwrap()
    }

    fn doc_stm(&'a self, stm: &Stm) -> DocBuilder<'a, Arena<'a>> {
        match stm {
            Stm::Move(dst, src) => self.doc_node("MOVE", vec![self.doc_exp(dst), self.doc_exp(src)]),
            Stm::Exp(exp) => self.doc_node("EXP", vec![self.doc_exp(exp)]),
            Stm::Jump(exp, targets) => {
                let targets = self
                    .allocator
                    .intersperse(
                        targets.iter().map(|target| self.allocator.text(target.to_string())),
                        self.allocator.text(", "),
                    )
                    .brackets();
                self.doc_node("JUMP", vec![self.doc_exp(exp), targets])
            }
            Stm::CJump {
                op,
                left,
                right,
                t,
                f,
            } => self.doc_node(
                "CJUMP",
                vec![
                    self.allocator.text(op.to_string()),
                    self.doc_exp(left),
                    self.doc_exp(right),
                    self.allocator.text(t.to_string()),
                    self.allocator.text(f.to_string()),
                ],
            ),
            Stm::Seq(first, second) => {
                self.doc_node("SEQ", vec![self.doc_stm(first), self.doc_stm(second)])
            }
            Stm::Label(label) => self.allocator.text(format!("LABEL {label}")),
        }
    }

    fn doc_exp(&'a self, exp: &Exp) -> DocBuilder<'a, Arena<'a>> {
        match exp {
            Exp::Const(value) => self.allocator.text(format!("CONST {value}")),
            Exp::Name(label) => self.allocator.text(format!("NAME {label}")),
            Exp::Temp(temp) => self.allocator.text(format!("TEMP {temp}")),
            Exp::BinOp(op, left, right) => self.doc_node(
                "BINOP",
                vec![
                    self.allocator.text(op.to_string()),
                    self.doc_exp(left),
                    self.doc_exp(right),
                ],
            ),
            Exp::Mem(address, offset) => self.doc_node(
                "MEM",
                vec![self.doc_exp(address), self.allocator.text(offset.to_string())],
            ),
            Exp::Call(func, args) => self.doc_node(
                "CALL",
                std::iter::once(self.doc_exp(func))
                    .chain(args.iter().map(|arg| self.doc_exp(arg)))
                    .collect(),
            ),
            Exp::ESeq(stm, exp) => self.doc_node("ESEQ", vec![self.doc_stm(stm), self.doc_exp(exp)]),
        }
    }

    fn doc_node(
        &'a self,
        name: &'static str,
        kids: Vec<DocBuilder<'a, Arena<'a>>>,
    ) -> DocBuilder<'a, Arena<'a>> {
        self.allocator
            .text(name)
            .append(
                self.allocator
                    .line_()
                    .append(self.allocator.intersperse(
                        kids,
                        self.allocator.text(",").append(self.allocator.line()),
                    ))
                    .nest(2)
                    .append(self.allocator.line_())
                    .parens()
                    .group(),
            )
    }
}

impl Default for Prettier<'_> {
    fn default() -> Self {
        Self::new()
    }
}

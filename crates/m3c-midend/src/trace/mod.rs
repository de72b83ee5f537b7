//! Trace scheduling orders basic blocks so that every conditional jump is
//! followed directly by its false target whenever possible, and removes
//! unconditional jumps to the block placed right after them.

#[cfg(test)]
mod tests;

use std::collections::HashMap;

use log::trace;

use m3c_common::temp::Label;
use m3c_common::tree::Stm;

use crate::blocks::{BasicBlocks, Block};

#[derive(Debug)]
pub struct Schedule {
    pub stms: Vec<Stm>,
    /// How many traces the blocks were arranged into.
    pub traces: usize,
    /// How many label and jump pairs were added behind conditional jumps with
    /// both targets already placed.
    pub bridges: usize,
}

pub fn schedule(blocks: BasicBlocks) -> Schedule {
    let BasicBlocks { blocks, done, exit } = blocks;

    let order: Vec<Label> = blocks.iter().map(|block| block.label().clone()).collect();
    let mut table = HashMap::with_capacity(blocks.len());
    for block in blocks {
        let label = block.label().clone();
        assert!(
            table.insert(label.clone(), block).is_none(),
            "label {label} starts two blocks"
        );
    }

    let mut scheduler = Scheduler {
        table,
        done,
        stms: Vec::new(),
        traces: 0,
        bridges: 0,
    };

    for label in order {
        if let Some(block) = scheduler.table.remove(&label) {
            scheduler.trace(block);
        }
    }

    scheduler.stms.extend(exit);

    Schedule {
        stms: scheduler.stms,
        traces: scheduler.traces,
        bridges: scheduler.bridges,
    }
}

struct Scheduler {
    /// The blocks not yet placed.
    table: HashMap<Label, Block>,
    done: Label,
    stms: Vec<Stm>,
    traces: usize,
    bridges: usize,
}

impl Scheduler {
    fn trace(&mut self, mut block: Block) {
        self.traces += 1;
        trace!("trace {} starts at {}", self.traces, block.label());

        loop {
            let (body, last) = block.into_parts();
            self.stms.extend(body);

            block = match last {
                Stm::Jump(exp, targets) => {
                    let target = match targets.as_slice() {
                        [target] => Some(target.clone()),
                        _ => None,
                    };

                    if let Some(next) = target.as_ref().and_then(|t| self.table.remove(t)) {
                        next
                    } else if target.as_ref() == Some(&self.done) && self.table.is_empty() {
                        return;
                    } else {
                        self.stms.push(Stm::Jump(exp, targets));
                        return;
                    }
                }

                Stm::CJump {
                    op,
                    left,
                    right,
                    t,
                    f,
                } => {
                    if let Some(next) = self.table.remove(&f) {
                        self.stms.push(Stm::cjump(op, left, right, t, f));
                        next
                    } else if let Some(next) = self.table.remove(&t) {
                        self.stms.push(Stm::cjump(op, left, right, t, f).not());
                        next
                    } else if f == self.done && self.table.is_empty() {
                        self.stms.push(Stm::cjump(op, left, right, t, f));
                        return;
                    } else {
                        let bridge = Label::fresh();
                        trace!("bridging to {f} through {bridge}");

                        self.bridges += 1;
                        self.stms
                            .push(Stm::cjump(op, left, right, t, bridge.clone()));
                        self.stms.push(Stm::Label(bridge));
                        self.stms.push(Stm::jump(f));
                        return;
                    }
                }

                _ => unreachable!(),
            };
        }
    }
}

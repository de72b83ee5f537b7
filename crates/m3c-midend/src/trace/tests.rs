use m3c_common::temp::{Label, Temp};
use m3c_common::tree::{Exp, RelOp, Stm};

use super::schedule;
use crate::blocks::{BasicBlocks, Block};

fn set(temp: Temp, value: i32) -> Stm {
    Stm::mov(Exp::Temp(temp), Exp::Const(value))
}

fn cjump(a: Temp, t: &Label, f: &Label) -> Stm {
    Stm::cjump(RelOp::Lt, Exp::Temp(a), Exp::Const(0), t.clone(), f.clone())
}

fn block(stms: Vec<Stm>) -> Block {
    Block::new(stms)
}

fn with_exit(blocks: Vec<Block>) -> BasicBlocks {
    let done = Label::fresh();
    BasicBlocks {
        blocks,
        done: done.clone(),
        exit: vec![Stm::Label(done)],
    }
}

fn labels(stms: &[Stm]) -> Vec<Label> {
    stms.iter()
        .filter_map(|stm| match stm {
            Stm::Label(label) => Some(label.clone()),
            _ => None,
        })
        .collect()
}

/// Every conditional jump must be followed by its false label.
fn assert_falls_through(stms: &[Stm]) {
    for (i, stm) in stms.iter().enumerate() {
        if let Stm::CJump { f, .. } = stm {
            assert_eq!(stms.get(i + 1), Some(&Stm::Label(f.clone())), "{stms:?}");
        }
    }
}

#[test]
fn jumps_to_the_next_block_disappear() {
    let a = Temp::fresh();
    let (l1, l2) = (Label::fresh(), Label::fresh());

    let blocks = BasicBlocks::new(vec![
        Stm::Label(l1.clone()),
        set(a, 1),
        Stm::Label(l2.clone()),
        set(a, 2),
    ]);

    let schedule = schedule(blocks);
    assert_eq!(
        schedule.stms,
        vec![Stm::Label(l1), set(a, 1), Stm::Label(l2), set(a, 2)]
    );
    assert_eq!(schedule.bridges, 0);
}

#[test]
fn false_targets_follow_their_jumps() {
    let a = Temp::fresh();
    let (l0, l1, l2, l3) = (Label::fresh(), Label::fresh(), Label::fresh(), Label::fresh());

    let blocks = with_exit(vec![
        block(vec![Stm::Label(l0.clone()), cjump(a, &l1, &l2)]),
        block(vec![Stm::Label(l1.clone()), set(a, 1), Stm::jump(l3.clone())]),
        block(vec![Stm::Label(l2.clone()), set(a, 2), Stm::jump(l3.clone())]),
        block(vec![Stm::Label(l3.clone()), cjump(a, &l0, &l2)]),
    ]);
    let done = blocks.done.clone();

    let schedule = schedule(blocks);
    assert_falls_through(&schedule.stms);
    assert_eq!(labels(&schedule.stms)[..3], [l0.clone(), l2, l3][..]);
    assert_eq!(schedule.stms.last(), Some(&Stm::Label(done)));
}

#[test]
fn cjumps_are_negated_when_only_the_true_target_is_free() {
    let a = Temp::fresh();
    let (l0, l1, l2) = (Label::fresh(), Label::fresh(), Label::fresh());

    // l2 is placed first, so l0 can only continue into its true target l1.
    let blocks = with_exit(vec![
        block(vec![Stm::Label(l2.clone()), set(a, 2), Stm::jump(l0.clone())]),
        block(vec![Stm::Label(l0.clone()), cjump(a, &l1, &l2)]),
        block(vec![Stm::Label(l1.clone()), set(a, 1), Stm::jump(l2.clone())]),
    ]);

    let schedule = schedule(blocks);
    assert_falls_through(&schedule.stms);
    assert!(schedule.stms.contains(&Stm::cjump(
        RelOp::Ge,
        Exp::Temp(a),
        Exp::Const(0),
        l2,
        l1
    )));
    assert_eq!(schedule.bridges, 0);
}

#[test]
fn bridges_are_added_when_both_targets_are_placed() {
    let a = Temp::fresh();
    let (l1, l2, l3) = (Label::fresh(), Label::fresh(), Label::fresh());

    let blocks = with_exit(vec![
        block(vec![Stm::Label(l1.clone()), set(a, 1), Stm::jump(l2.clone())]),
        block(vec![Stm::Label(l2.clone()), set(a, 2), Stm::jump(l3.clone())]),
        block(vec![Stm::Label(l3.clone()), cjump(a, &l1, &l2)]),
    ]);

    let schedule = schedule(blocks);
    assert_eq!(schedule.bridges, 1);
    assert_falls_through(&schedule.stms);

    // The bridge jumps on to the original false target.
    let at = schedule
        .stms
        .iter()
        .position(|stm| matches!(stm, Stm::CJump { .. }))
        .expect("a conditional jump");
    assert_eq!(schedule.stms[at + 2], Stm::jump(l2));
}

#[test]
fn every_block_is_placed_exactly_once() {
    let a = Temp::fresh();
    let l: Vec<_> = (0..6).map(|_| Label::fresh()).collect();

    let blocks = with_exit(vec![
        block(vec![Stm::Label(l[0].clone()), cjump(a, &l[3], &l[4])]),
        block(vec![Stm::Label(l[1].clone()), set(a, 1), Stm::jump(l[5].clone())]),
        block(vec![Stm::Label(l[2].clone()), cjump(a, &l[1], &l[0])]),
        block(vec![Stm::Label(l[3].clone()), cjump(a, &l[2], &l[4])]),
        block(vec![Stm::Label(l[4].clone()), cjump(a, &l[0], &l[3])]),
        block(vec![Stm::Label(l[5].clone()), cjump(a, &l[2], &l[0])]),
    ]);
    let done = blocks.done.clone();

    let schedule = schedule(blocks);
    assert_falls_through(&schedule.stms);

    let placed = labels(&schedule.stms);
    for label in l.iter().chain([&done]) {
        assert_eq!(placed.iter().filter(|placed| *placed == label).count(), 1);
    }

    // Only bridges add labels.
    assert_eq!(placed.len(), l.len() + 1 + schedule.bridges);
}

#[test]
fn jumps_to_the_exit_are_dropped_at_the_end() {
    let a = Temp::fresh();
    let l1 = Label::fresh();

    let mut blocks = with_exit(vec![]);
    let done = blocks.done.clone();
    blocks.blocks.push(block(vec![
        Stm::Label(l1.clone()),
        set(a, 1),
        Stm::jump(done.clone()),
    ]));

    let schedule = schedule(blocks);
    assert_eq!(
        schedule.stms,
        vec![Stm::Label(l1), set(a, 1), Stm::Label(done)]
    );
}

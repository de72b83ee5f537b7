pub mod blocks;
pub mod canon;
pub mod trace;

use log::{debug, info, trace};

use m3c_common::tree::pretty::Prettier;
use m3c_common::tree::Stm;
use m3c_common::{Driver, IrOutput};

use blocks::BasicBlocks;

/// Turn the body of a procedure into a straight list of canonical statements,
/// with the basic blocks arranged into traces.
pub fn linearize(driver: &mut impl Driver, body: Stm) -> Vec<Stm> {
    info!("beginning linearization");

    driver.output_ir(IrOutput::Tree, || {
        let prettier = Prettier::new();
        prettier.pretty_stm(&body)
    });

    let stms = canon::canonicalize(body);
    ensure_canonical(&stms);

    driver.output_ir(IrOutput::Canonical, || {
        let prettier = Prettier::new();
        prettier.pretty_stms(&stms)
    });

    let blocks = BasicBlocks::new(stms);
    debug!("formed {} basic blocks", blocks.blocks.len());

    driver.output_ir(IrOutput::Blocks, || blocks.to_string());

    let schedule = trace::schedule(blocks);
    debug!(
        "scheduled {} traces with {} bridges",
        schedule.traces, schedule.bridges
    );

    driver.output_ir(IrOutput::Trace, || {
        let prettier = Prettier::new();
        prettier.pretty_stms(&schedule.stms)
    });

    trace!("done linearizing");

    schedule.stms
}

fn ensure_canonical(stms: &[Stm]) {
    assert!(
        !canon::check(stms),
        "canonicalization left non-canonical statements"
    );
    trace!("canonicalization is sound");
}

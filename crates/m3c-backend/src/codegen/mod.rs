pub mod mini;

use log::info;

use m3c_common::assem::{Identity, Instr};
use m3c_common::frame::Codegen;
use m3c_common::tree::Stm;
use m3c_common::{Driver, IrOutput};

/// Select instructions for a list of canonical statements, in order.
pub fn select<C: Codegen>(
    driver: &mut impl Driver,
    frame: &C::Frame,
    codegen: &mut C,
    stms: Vec<Stm>,
) -> Vec<Instr> {
    info!("selecting instructions for {} statements", stms.len());

    let instrs: Vec<_> = stms
        .into_iter()
        .flat_map(|stm| codegen.codegen(frame, stm))
        .collect();

    driver.output_ir(IrOutput::Instructions, || {
        let lines: Vec<_> = instrs.iter().map(|instr| instr.format(&Identity)).collect();
        lines.join("\n")
    });

    instrs
}

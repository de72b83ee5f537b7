use log::info;

use m3c_backend::codegen::mini::{MiniCodegen, MiniFrame};
use m3c_backend::codegen::select;
use m3c_backend::regalloc;
use m3c_common::frame::Frame;
use m3c_common::tree::Stm;
use m3c_common::Driver;
use m3c_midend::linearize;

/// Compile the body of a procedure into its final assembly.
pub fn compile(driver: &mut impl Driver, mut frame: MiniFrame, body: Stm) -> String {
    info!("compiling {}", frame.name());

    let body = frame.proc_entry_exit1(body);
    let stms = linearize(driver, body);

    let mut codegen = MiniCodegen::new();
    let instrs = select(driver, &frame, &mut codegen, stms);
    let instrs = frame.proc_entry_exit2(instrs);

    let allocation = regalloc(driver, &mut frame, &mut codegen, instrs);
    info!(
        "allocated {} in {} rounds with {} locals",
        frame.name(),
        allocation.rounds,
        frame.locals()
    );

    frame.proc_entry_exit3(&allocation)
}

mod args;
mod compile;
mod console_driver;
mod programs;

use std::fs;

use anyhow::Context;
use clap::Parser;
use log::info;

use m3c_common::Coalescing;

use args::Arguments;
use compile::compile;
use console_driver::ConsoleDriver;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Arguments::parse();
    let coalescing = if args.no_coalesce {
        Coalescing::Disabled
    } else {
        Coalescing::Enabled
    };

    let mut driver = ConsoleDriver::new(args.quiet, coalescing);
    let (frame, body) = programs::build(args.program);
    let assembly = compile(&mut driver, frame, body);

    match &args.output {
        Some(path) => {
            fs::write(path, assembly)
                .with_context(|| format!("could not write to {}", path.display()))?;
            info!("wrote {}", path.display());
        }

        None => print!("{assembly}"),
    }

    Ok(())
}

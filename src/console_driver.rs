use std::io;

use console::{style, Term};

use m3c_common::{Coalescing, Driver, IrOutput};

pub struct ConsoleDriver {
    term: Term,
    quiet: bool,
    coalescing: Coalescing,
}

impl ConsoleDriver {
    pub fn new(quiet: bool, coalescing: Coalescing) -> Self {
        Self {
            term: Term::stderr(),
            quiet,
            coalescing,
        }
    }
}

impl Driver for ConsoleDriver {
    fn output_ir(&mut self, at: IrOutput, data: impl FnOnce() -> String) {
        if self.quiet {
            return;
        }

        write_ir(&self.term, at, data()).unwrap();
    }

    fn coalescing(&mut self) -> Coalescing {
        self.coalescing
    }
}

fn write_ir(term: &Term, at: IrOutput, ir: String) -> io::Result<()> {
    let header = format!("--- {at} ---");
    term.write_line(&style(header).green().bold().to_string())?;

    for line in ir.lines() {
        term.write_line(line)?;
    }

    term.write_line("")?;
    Ok(())
}

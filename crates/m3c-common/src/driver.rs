use std::fmt;

pub trait Driver {
    /// Output the IR for the given stage. The IR string is taken as a function,
    /// since generating it would usually be wasteful.
    fn output_ir(&mut self, at: IrOutput, data: impl FnOnce() -> String);

    fn coalescing(&mut self) -> Coalescing {
        Coalescing::Enabled
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Coalescing {
    #[default]
    Enabled,
    Disabled,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum IrOutput {
    Tree,
    Canonical,
    Blocks,
    Trace,
    Instructions,
    FlowGraph,
    Interference,
    Spills,
    Allocation,
}

impl fmt::Display for IrOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Tree => "IR Tree",
            Self::Canonical => "Canonical Statements",
            Self::Blocks => "Basic Blocks",
            Self::Trace => "Trace Schedule",
            Self::Instructions => "Instructions",
            Self::FlowGraph => "Control Flow Graph",
            Self::Interference => "Interference Graph",
            Self::Spills => "Spills",
            Self::Allocation => "Register Allocation",
        };

        write!(f, "{name}")
    }
}

/// A driver that discards every dump and uses the default configuration.
#[derive(Debug, Default)]
pub struct QuietDriver {
    pub coalescing: Coalescing,
}

impl Driver for QuietDriver {
    fn output_ir(&mut self, _: IrOutput, _: impl FnOnce() -> String) {}

    fn coalescing(&mut self) -> Coalescing {
        self.coalescing
    }
}

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

/// compile a built-in procedure down to register-allocated mini assembly.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Arguments {
    /// The procedure to compile.
    #[arg(value_enum)]
    pub program: Program,

    /// Never merge the temporaries on either end of a move.
    #[arg(long, action = ArgAction::SetTrue)]
    pub no_coalesce: bool,

    /// Do not print the intermediate representations.
    #[arg(short, long, action = ArgAction::SetTrue)]
    pub quiet: bool,

    /// Write the assembly to this file instead of standard output.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum Program {
    /// Add up the numbers below a parameter in a loop.
    Sum,
    /// Keep values alive across nested calls.
    Calls,
    /// Hold more values at once than there are registers.
    Pressure,
}

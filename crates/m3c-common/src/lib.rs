pub mod assem;
pub mod frame;
pub mod temp;
pub mod tree;

pub use driver::{Coalescing, Driver, IrOutput, QuietDriver};

mod driver;

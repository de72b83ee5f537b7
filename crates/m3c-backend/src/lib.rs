pub mod alloc;
pub mod codegen;
pub mod flow;
pub mod graph;

#[cfg(test)]
mod testing;

pub use alloc::{regalloc, Allocation};

//! Core interpreter for the noneleatic instruction set: a flat, growable
//! memory that a handful of sixteen-byte operation records are fetched
//! from, decoded, and executed against. The instruction pointer lives in
//! memory itself at address zero, so jumps and self-modifying code are
//! both just ordinary writes.
//!
//! This crate is the engine only. It has no notion of a terminal, a file
//! on disk, or command-line flags — those live in the front end that
//! embeds it.

pub mod debug;
pub mod definitions;
pub mod dispatch;
pub mod display;
mod error;
pub mod machine;
pub mod memory;
pub mod opcode;
mod runner;
pub mod validate;
pub mod value;

pub use error::Fault;
pub use machine::{Machine, StepOutcome};
pub use runner::{Config, Runner};

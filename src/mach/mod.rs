/*!
## Rust Machine Module

This Rust module is the loader and virtual machine for P-code.

*/

pub type Address = usize;

mod cell;
mod config;
mod file;
mod function;
mod link;
mod listing;
mod opcode;
mod operation;
mod program;
mod runtime;
mod store;

pub use cell::Cell;
pub use config::Config;
pub use file::{Files, Reader, CARRIAGE_RETURN, INPUT, OUTPUT, PRD, PRR};
pub use function::Function;
pub use link::{Label, Labels, UNRESOLVED};
pub use listing::Listing;
pub use opcode::{Instruction, Opcode, COMPARANDS, MULTIPLE, RETURNS};
pub use operation::{Operation, Relation};
pub use program::{Program, BEGIN_CODE};
pub use runtime::{Context, Event, Runtime};
pub use store::{Pool, Store};

use crate::lang::Error;
use std::io::BufRead;

/// Assemble a program with the default machine limits.
pub fn load<R: BufRead>(reader: &mut R) -> Result<Program, Error> {
    Program::load(reader)
}

/// Run a program to its `STP` instruction or its first error.
pub fn interpret<'a>(files: Files<'a>, program: &'a mut Program) -> Result<(), Error> {
    Runtime::new(program, files)?.run()
}

#[cfg(test)]
mod tests;

/*!
# Rust Language Module

This Rust module reads the symbolic P-code text.
One line at a time becomes one machine instruction.

*/

#[macro_use]
mod error;
mod asm;
mod scan;

pub use asm::assemble;
pub use asm::LARGE_INT;
pub use error::Error;
pub use error::ErrorCode;
pub use scan::Scanner;

#[cfg(test)]
mod tests;

//! # P-code machine
//!
//! A loader and interpreter for the symbolic P-code emitted by the
//! Pascal-P2 compiler.
//!
//! The loader reads the code in two passes. The first pass holds the
//! program itself and starts at address 3; a blank line ends it. The
//! second pass holds the startup code placed at address 0, which
//! usually calls the main program and stops.
//! ```text
//! L1
//!  LDC I 42
//!  STP
//!
//!  UJP L1
//! ```
//!
//! A line starts with a marker: a space for an instruction,
//! `L` for a label declaration, `I` for a comment.
//!
//! The machine binds four files by number: `input` (4) and
//! `output` (5) are the terminal, `prd` (6) reads whatever follows
//! the code and `prr` (7) writes a result file.
//!
//! ```
//! use pcode::mach::{interpret, load, Files};
//!
//! let text = "\n LDC I 42\n LDC I 4\n LDC I 5\n CSP WRI\n STP\n";
//! let mut program = load(&mut text.as_bytes()).unwrap();
//! let mut output = Vec::new();
//! let files = Files::new("".as_bytes(), &mut output, "".as_bytes(), Vec::new());
//! interpret(files, &mut program).unwrap();
//! assert_eq!(output, b"  42");
//! ```

pub mod lang;
pub mod mach;
pub mod term;

//! # P-code
//!
//! Loads a Pascal-P2 P-code file and runs it.
//!

fn main() {
    pcode::term::main()
}

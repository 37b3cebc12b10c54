use super::{Address, Instruction};
use crate::error;
use crate::lang::Error;
use std::convert::TryFrom;

type Result<T> = std::result::Result<T, Error>;

/// Operand of the last instruction in a pending chain.
pub const UNRESOLVED: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    /// Not yet declared. Holds the most recent referencing instruction.
    Entered(Option<Address>),
    Defined(Address),
}

/// ## Label resolution
///
/// Forward references are linked through the `q` operands of the
/// referencing instructions: each one holds the address of the previous
/// reference, the oldest holds `UNRESOLVED`. Declaring the label walks
/// the chain and patches every operand.

#[derive(Debug, Clone)]
pub struct Labels {
    table: Vec<Label>,
}

impl Labels {
    pub fn new(max_label: usize) -> Labels {
        Labels {
            table: vec![Label::Entered(None); max_label + 1],
        }
    }

    pub fn get(&self, label: usize) -> Option<Label> {
        self.table.get(label).copied()
    }

    fn slot(&mut self, label: usize) -> Result<&mut Label> {
        match self.table.get_mut(label) {
            Some(slot) => Ok(slot),
            None => Err(error!(ParseFault; "LABEL OUT OF RANGE")),
        }
    }

    /// Operand to store in the instruction at `at`.
    pub fn reference(&mut self, label: usize, at: Address) -> Result<i64> {
        let slot = self.slot(label)?;
        match *slot {
            Label::Defined(address) => Ok(address as i64),
            Label::Entered(pending) => {
                *slot = Label::Entered(Some(at));
                Ok(match pending {
                    Some(previous) => previous as i64,
                    None => UNRESOLVED,
                })
            }
        }
    }

    /// A duplicate declaration is reported and the first one is kept.
    pub fn declare(
        &mut self,
        label: usize,
        address: Address,
        code: &mut [Instruction],
    ) -> Result<()> {
        let slot = self.slot(label)?;
        let mut pending = match *slot {
            Label::Defined(_) => return Err(error!(DuplicateLabel)),
            Label::Entered(pending) => pending,
        };
        *slot = Label::Defined(address);
        while let Some(at) = pending {
            let instruction = match code.get_mut(at) {
                Some(instruction) => instruction,
                None => return Err(error!(InternalError; "BROKEN LABEL CHAIN")),
            };
            let next = instruction.q;
            instruction.q = address as i64;
            pending = if next == UNRESOLVED {
                None
            } else {
                match Address::try_from(next) {
                    Ok(next) => Some(next),
                    Err(_) => return Err(error!(InternalError; "BROKEN LABEL CHAIN")),
                }
            };
        }
        Ok(())
    }

    /// First label that was referenced but never declared.
    pub fn unresolved(&self) -> Option<usize> {
        self.table
            .iter()
            .position(|label| matches!(label, Label::Entered(Some(_))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::ErrorCode;
    use crate::mach::Opcode;

    fn code() -> Vec<Instruction> {
        vec![Instruction::new(Opcode::Ujp, 0, 0); 25]
    }

    #[test]
    fn test_first_reference_is_unresolved() {
        let mut labels = Labels::new(5);
        assert_eq!(labels.reference(5, 10).unwrap(), UNRESOLVED);
        assert_eq!(labels.get(5), Some(Label::Entered(Some(10))));
    }

    #[test]
    fn test_second_reference_returns_previous() {
        let mut labels = Labels::new(5);
        labels.reference(5, 10).unwrap();
        assert_eq!(labels.reference(5, 0).unwrap(), 10);
    }

    #[test]
    fn test_reference_after_declare() {
        let mut labels = Labels::new(5);
        let mut code = code();
        code[10].q = labels.reference(5, 10).unwrap();
        labels.declare(5, 200, &mut code).unwrap();
        code[20].q = labels.reference(5, 20).unwrap();
        assert_eq!(code[10].q, 200);
        assert_eq!(code[20].q, 200);
    }

    #[test]
    fn test_every_forward_reference_is_patched() {
        let mut labels = Labels::new(5);
        let mut code = code();
        for at in &[3, 10, 15, 20, 4] {
            code[*at].q = labels.reference(2, *at).unwrap();
        }
        labels.declare(2, 100, &mut code).unwrap();
        for at in &[3, 10, 15, 20, 4] {
            assert_eq!(code[*at].q, 100);
        }
        assert_eq!(labels.unresolved(), None);
    }

    #[test]
    fn test_declared_but_unreferenced() {
        let mut labels = Labels::new(5);
        let mut code = code();
        labels.declare(1, 7, &mut code).unwrap();
        assert_eq!(labels.get(1), Some(Label::Defined(7)));
    }

    #[test]
    fn test_duplicate_keeps_first() {
        let mut labels = Labels::new(5);
        let mut code = code();
        labels.declare(5, 200, &mut code).unwrap();
        let e = labels.declare(5, 300, &mut code).unwrap_err();
        assert_eq!(e.code(), ErrorCode::DuplicateLabel);
        assert_eq!(labels.reference(5, 1).unwrap(), 200);
    }

    #[test]
    fn test_unresolved_and_out_of_range() {
        let mut labels = Labels::new(5);
        labels.reference(4, 1).unwrap();
        assert_eq!(labels.unresolved(), Some(4));
        let e = labels.reference(6, 1).unwrap_err();
        assert_eq!(e.code(), ErrorCode::ParseFault);
    }
}

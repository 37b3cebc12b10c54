use super::{Address, Config, Instruction, Labels, Store};
use crate::error;
use crate::lang::{assemble, Error, ErrorCode, Scanner};
use std::convert::TryFrom;
use std::io::BufRead;
use tracing::{debug, warn};

type Result<T> = std::result::Result<T, Error>;

/// First address of the main code. The startup code, assembled
/// in the second pass, goes below it.
pub const BEGIN_CODE: Address = 3;

/// ## Loaded program
///
/// The assembled code together with the store holding its constants.
/// Loading reads two passes from the same input, each ending at a
/// blank line. Anything after that is left in the reader.

#[derive(Debug, Clone)]
pub struct Program {
    code: Vec<Instruction>,
    store: Store,
}

impl Program {
    pub fn load<R: BufRead>(reader: &mut R) -> Result<Program> {
        Program::load_with(reader, &Config::default())
    }

    pub fn load_with<R: BufRead>(reader: &mut R, config: &Config) -> Result<Program> {
        let mut loader = Loader::new(config);
        loader.pass(reader, BEGIN_CODE)?;
        loader.pass(reader, 0)?;
        loader.finish()
    }

    pub fn code(&self) -> &[Instruction] {
        &self.code
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    pub fn into_parts(self) -> (Vec<Instruction>, Store) {
        (self.code, self.store)
    }
}

impl std::str::FromStr for Program {
    type Err = Error;
    fn from_str(s: &str) -> Result<Program> {
        Program::load(&mut s.as_bytes())
    }
}

struct Loader {
    code: Vec<Instruction>,
    store: Store,
    labels: Labels,
    code_size: usize,
    line_number: usize,
}

impl Loader {
    fn new(config: &Config) -> Loader {
        Loader {
            code: vec![Instruction::default(); BEGIN_CODE],
            store: Store::new(config),
            labels: Labels::new(config.max_label),
            code_size: config.code_size,
            line_number: 0,
        }
    }

    fn pass<R: BufRead>(&mut self, reader: &mut R, start: Address) -> Result<()> {
        debug!(start, line = self.line_number + 1, "assembly pass");
        let mut pc = start;
        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            self.line_number += 1;
            let text = line.trim_end_matches(&['\n', '\r'][..]);
            if text.trim().is_empty() {
                break;
            }
            if let Err(error) = self.line(text, &mut pc) {
                return Err(error.in_line_number(self.line_number));
            }
        }
        Ok(())
    }

    fn line(&mut self, text: &str, pc: &mut Address) -> Result<()> {
        let mut chars = text.chars();
        match chars.next() {
            Some('I') => Ok(()),
            Some('L') => self.label(chars.as_str(), *pc),
            Some(' ') => {
                if *pc >= self.code_size {
                    return Err(error!(TableOverflow; "CODE"));
                }
                let ins = assemble(chars.as_str(), *pc, &mut self.store, &mut self.labels)?;
                self.place(*pc, ins);
                *pc += 1;
                Ok(())
            }
            _ => Err(error!(ParseFault; "BAD LINE MARKER")),
        }
    }

    fn label(&mut self, text: &str, pc: Address) -> Result<()> {
        let mut scan = Scanner::new(text);
        let label = scan.unsigned()?;
        let address = if scan.peek_non_blank() == Some('=') {
            scan.next_char();
            match Address::try_from(scan.integer()?) {
                Ok(address) => address,
                Err(_) => return Err(error!(ParseFault; "NEGATIVE LABEL VALUE")),
            }
        } else {
            pc
        };
        match self.labels.declare(label, address, &mut self.code) {
            Err(error) if error.code() == ErrorCode::DuplicateLabel => {
                warn!(label, line = self.line_number, "duplicate label ignored");
                Ok(())
            }
            result => result,
        }
    }

    fn place(&mut self, pc: Address, ins: Instruction) {
        if pc >= self.code.len() {
            self.code.resize(pc + 1, Instruction::default());
        }
        self.code[pc] = ins;
    }

    fn finish(self) -> Result<Program> {
        if let Some(label) = self.labels.unresolved() {
            return Err(error!(UndefinedLabel; &format!("L{}", label)));
        }
        debug!(
            instructions = self.code.len(),
            lines = self.line_number,
            "program loaded"
        );
        Ok(Program {
            code: self.code,
            store: self.store,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mach::{Cell, Opcode};

    const PROGRAM: &str = "I main program at 3
 LDC I 3
 UJP L2
L1
 LDC I 700000
L2
 STP

 MST 0
 CUP 0 L1
 STP
";

    #[test]
    fn test_two_passes() {
        let program: Program = PROGRAM.parse().unwrap();
        let code = program.code();
        assert_eq!(code[0], Instruction::new(Opcode::Mst, 0, 0));
        assert_eq!(code[1], Instruction::new(Opcode::Cup, 0, 5));
        assert_eq!(code[2], Instruction::new(Opcode::Stp, 0, 0));
        assert_eq!(code[3], Instruction::new(Opcode::Ldc, 1, 3));
        assert_eq!(code[4], Instruction::new(Opcode::Ujp, 0, 6));
        assert_eq!(code[5].op, Opcode::Lci);
        let q = code[5].q as Address;
        assert_eq!(program.store().read(q).unwrap(), &Cell::Int(700_000));
        assert_eq!(code.len(), 7);
    }

    #[test]
    fn test_rest_of_input_is_left_unread() {
        let text = format!("{}\nDATA\n", PROGRAM);
        let mut reader = text.as_bytes();
        Program::load(&mut reader).unwrap();
        let mut rest = String::new();
        reader.read_line(&mut rest).unwrap();
        assert_eq!(rest, "DATA\n");
    }

    #[test]
    fn test_label_with_value() {
        let program: Program = " UJP L9\nL9=42\n\n STP\n".parse().unwrap();
        assert_eq!(program.code()[3], Instruction::new(Opcode::Ujp, 0, 42));
    }

    #[test]
    fn test_comments_and_crlf() {
        let program: Program = "I comment\r\n ADI\r\n\r\n STP\r\n".parse().unwrap();
        assert_eq!(program.code()[3].op, Opcode::Adi);
    }

    #[test]
    fn test_duplicate_label_keeps_first() {
        let program: Program = "L1\n NOT\nL1\n UJP L1\n\n STP\n".parse().unwrap();
        assert_eq!(program.code()[4], Instruction::new(Opcode::Ujp, 0, 3));
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let e = " ADI\n FOO\n".parse::<Program>().unwrap_err();
        assert_eq!(e.code(), ErrorCode::UnknownInstruction);
        assert_eq!(e.line_number(), Some(2));
        let e = " ADI\nX\n".parse::<Program>().unwrap_err();
        assert_eq!(e.code(), ErrorCode::ParseFault);
        assert_eq!(e.line_number(), Some(2));
    }

    #[test]
    fn test_undefined_label_is_fatal() {
        let e = " UJP L4\n\n STP\n".parse::<Program>().unwrap_err();
        assert_eq!(e.code(), ErrorCode::UndefinedLabel);
        assert_eq!(e.to_string(), "UNDEFINED LABEL; L4");
    }

    #[test]
    fn test_code_capacity() {
        let config = Config {
            code_size: 5,
            ..Config::default()
        };
        let text = " ADI\n ADI\n ADI\n";
        let e = Program::load_with(&mut text.as_bytes(), &config).unwrap_err();
        assert_eq!(e.code(), ErrorCode::TableOverflow);
        assert_eq!(e.line_number(), Some(3));
    }
}

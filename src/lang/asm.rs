use super::{Error, Scanner};
use crate::mach::{
    Address, Function, Instruction, Labels, Opcode, Store, COMPARANDS, MULTIPLE, RETURNS,
};
use std::collections::BTreeSet;

type Result<T> = std::result::Result<T, Error>;

/// Integer literals beyond this magnitude go to the integer pool.
pub const LARGE_INT: u64 = 524_288;

/// Translate the text of one instruction line, without its leading
/// marker, into an instruction located at `pc`. Constants are interned
/// into `store` and label references are chained through `labels`.
pub fn assemble(
    text: &str,
    pc: Address,
    store: &mut Store,
    labels: &mut Labels,
) -> Result<Instruction> {
    let mut scan = Scanner::new(text);
    let name = scan.name()?;
    let op = match Opcode::from_mnemonic(&name) {
        Some(op) => op,
        None => return Err(error!(UnknownInstruction; &name)),
    };
    let mut ins = Instruction::new(op, 0, 0);
    use Opcode::*;
    match op {
        Equ | Neq | Geq | Grt | Leq | Les => {
            ins.p = letter(&mut scan, COMPARANDS)?;
            if ins.p == MULTIPLE {
                ins.q = scan.integer()?;
            }
        }
        Lod | Str | Lda => {
            ins.p = scan.unsigned()?;
            ins.q = scan.integer()?;
        }
        Cup => {
            ins.p = scan.unsigned()?;
            ins.q = labels.reference(scan.label()?, pc)?;
        }
        Mst => ins.p = scan.unsigned()?,
        Ret => ins.p = letter(&mut scan, RETURNS)?,
        Ldo | Sro | Lao | Ind | Inc | Ixa | Mov | Dec => ins.q = scan.integer()?,
        Ent | Ujp | Fjp | Xjp => ins.q = labels.reference(scan.label()?, pc)?,
        Csp => {
            let name = scan.name()?;
            match Function::from_name(&name) {
                Some(function) => ins.q = function as i64,
                None => return Err(error!(UnknownInstruction; &name)),
            }
        }
        Ldc => return constant(&mut scan, store),
        Chk => {
            if let Some(c) = scan.peek_non_blank() {
                if c.is_ascii_alphabetic() {
                    scan.next_char();
                }
            }
            let lower = scan.integer()?;
            let upper = scan.integer()?;
            ins.q = store.intern_boundary(lower, upper)? as i64;
        }
        Lca => {
            if scan.non_blank() != Some('\'') {
                return Err(error!(ParseFault; "QUOTE EXPECTED"));
            }
            let text = scan.until('\'')?;
            ins.q = store.append_blob(text.as_bytes())? as i64;
        }
        _ => {}
    }
    Ok(ins)
}

fn letter(scan: &mut Scanner, table: &str) -> Result<usize> {
    if let Some(c) = scan.non_blank() {
        if let Some(index) = table.find(c.to_ascii_uppercase()) {
            return Ok(index);
        }
    }
    Err(error!(ParseFault; "BAD TYPE LETTER"))
}

fn constant(scan: &mut Scanner, store: &mut Store) -> Result<Instruction> {
    match scan.non_blank() {
        Some('I') | Some('i') => {
            let n = scan.integer()?;
            if n.unsigned_abs() > LARGE_INT {
                Ok(Instruction::new(Opcode::Lci, 1, store.intern_int(n)? as i64))
            } else {
                Ok(Instruction::new(Opcode::Ldc, 1, n))
            }
        }
        Some('R') | Some('r') => {
            let address = store.intern_real(scan.real()?)?;
            Ok(Instruction::new(Opcode::Lci, 2, address as i64))
        }
        Some('N') | Some('n') => Ok(Instruction::new(Opcode::Ldc, 0, 0)),
        Some('B') | Some('b') => Ok(Instruction::new(Opcode::Ldc, 3, scan.integer()?)),
        Some('(') => {
            let mut set = BTreeSet::new();
            loop {
                match scan.peek_non_blank() {
                    Some(')') => break,
                    Some(',') => {
                        scan.next_char();
                    }
                    Some(_) => {
                        set.insert(scan.integer()?);
                    }
                    None => return Err(error!(ParseFault; "UNTERMINATED SET")),
                }
            }
            let address = store.intern_set(set)?;
            Ok(Instruction::new(Opcode::Lci, 4, address as i64))
        }
        _ => Err(error!(ParseFault; "BAD CONSTANT TYPE")),
    }
}

use super::{Address, Opcode, Program};

/// Human readable view of assembled code, one instruction per line.
/// Pool constants loaded by `LCI` are shown after the instruction.
#[derive(Debug, Clone, Copy)]
pub struct Listing<'a> {
    program: &'a Program,
}

impl<'a> Listing<'a> {
    pub fn new(program: &'a Program) -> Listing<'a> {
        Listing { program }
    }

    pub fn is_empty(&self) -> bool {
        self.program.code().is_empty()
    }

    pub fn line(&self, address: Address) -> Option<String> {
        let ins = self.program.code().get(address)?;
        let mut s = format!("{:>5}  {}", address, ins);
        if ins.op == Opcode::Lci {
            if let Ok(cell) = self.program.store().read(ins.q as Address) {
                s.push_str(&format!("  ; {}", cell));
            }
        }
        Some(s)
    }

    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.program.code().len()).filter_map(move |address| self.line(address))
    }
}

impl<'a> std::fmt::Display for Listing<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for line in self.lines() {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

use super::Function;

/// ## Virtual machine instruction set
///
/// The P-machine keeps everything on the stack of the store.
/// Registers only hold addresses: `pc`, `mp`, `sp` and `np`.
///
/// For example: `X := 3 + Y` at level 1 compiles to
/// `[LDC I 3, LOD 0 5, ADI, STR 0 4]`
///
/// The numeric value of an opcode is its index in the mnemonic table.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // *** Loads and stores
    /// Load local or enclosing-level variable: level difference, offset.
    Lod,
    /// Load global variable.
    Ldo,
    Str,
    Sro,
    /// Load address of a variable.
    Lda,
    Lao,
    /// Store indirect: value on top, address below.
    Sto,
    Ldc,
    /// Load constant from a pool. Only produced by the assembler.
    Lci,
    Ind,
    Inc,

    // *** Procedures
    Mst,
    Cup,
    Ent,
    Ret,
    /// Call standard procedure.
    Csp,

    // *** Addressing and comparison
    Ixa,
    Equ,
    Neq,
    Geq,
    Grt,
    Leq,
    Les,

    // *** Branch control
    Ujp,
    Fjp,
    Xjp,
    Chk,
    Eof,

    // *** Arithmetic
    Adi,
    Adr,
    Sbi,
    Sbr,
    Sgs,
    Flt,
    Flo,
    Trc,
    Ngi,
    Ngr,
    Sqi,
    Sqr,
    Abi,
    Abr,
    Not,
    And,
    Ior,
    Dif,
    Int,
    Uni,
    Inn,
    Mod,
    Odd,
    Mpi,
    Mpr,
    Dvi,
    Dvr,

    // *** Block operations
    Mov,
    Lca,
    Dec,
    Stp,
}

const MNEMONICS: [&str; 59] = [
    "LOD", "LDO", "STR", "SRO", "LDA", "LAO", "STO", "LDC", "LCI", "IND", //
    "INC", "MST", "CUP", "ENT", "RET", "CSP", "IXA", "EQU", "NEQ", "GEQ", //
    "GRT", "LEQ", "LES", "UJP", "FJP", "XJP", "CHK", "EOF", "ADI", "ADR", //
    "SBI", "SBR", "SGS", "FLT", "FLO", "TRC", "NGI", "NGR", "SQI", "SQR", //
    "ABI", "ABR", "NOT", "AND", "IOR", "DIF", "INT", "UNI", "INN", "MOD", //
    "ODD", "MPI", "MPR", "DVI", "DVR", "MOV", "LCA", "DEC", "STP",
];

impl Opcode {
    pub const ALL: [Opcode; 59] = {
        use Opcode::*;
        [
            Lod, Ldo, Str, Sro, Lda, Lao, Sto, Ldc, Lci, Ind, //
            Inc, Mst, Cup, Ent, Ret, Csp, Ixa, Equ, Neq, Geq, //
            Grt, Leq, Les, Ujp, Fjp, Xjp, Chk, Eof, Adi, Adr, //
            Sbi, Sbr, Sgs, Flt, Flo, Trc, Ngi, Ngr, Sqi, Sqr, //
            Abi, Abr, Not, And, Ior, Dif, Int, Uni, Inn, Mod, //
            Odd, Mpi, Mpr, Dvi, Dvr, Mov, Lca, Dec, Stp,
        ]
    };

    pub fn mnemonic(self) -> &'static str {
        MNEMONICS[self as usize]
    }

    /// `LCI` is internal and cannot be written in source.
    pub fn from_mnemonic(name: &str) -> Option<Opcode> {
        Opcode::ALL
            .iter()
            .find(|op| op.mnemonic() == name && **op != Opcode::Lci)
            .copied()
    }
}

impl Default for Opcode {
    fn default() -> Opcode {
        Opcode::Lod
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

/// Comparand kinds, selected by the letter after a comparison mnemonic.
pub const COMPARANDS: &str = "AIRBSM";
/// Return kinds, selected by the letter after `RET`.
pub const RETURNS: &str = "PIRCBA";

/// Comparand letter `M`: byte-wise block comparison.
pub const MULTIPLE: usize = 5;

/// One machine instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Instruction {
    pub op: Opcode,
    pub p: usize,
    pub q: i64,
}

impl Instruction {
    pub fn new(op: Opcode, p: usize, q: i64) -> Instruction {
        Instruction { op, p, q }
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Opcode::*;
        let Instruction { op, p, q } = *self;
        let letter = |table: &str| table.chars().nth(p).unwrap_or('?');
        match op {
            Lod | Str | Lda | Cup => write!(f, "{} {} {}", op, p, q),
            Mst => write!(f, "{} {}", op, p),
            Ret => write!(f, "{} {}", op, letter(RETURNS)),
            Equ | Neq | Geq | Grt | Leq | Les => {
                if p == MULTIPLE {
                    write!(f, "{} {} {}", op, letter(COMPARANDS), q)
                } else {
                    write!(f, "{} {}", op, letter(COMPARANDS))
                }
            }
            Csp => match Function::from_index(q) {
                Some(function) => write!(f, "{} {}", op, function),
                None => write!(f, "{} ?{}", op, q),
            },
            Ldc => match p {
                1 => write!(f, "{} I {}", op, q),
                3 => write!(f, "{} B {}", op, q),
                _ => write!(f, "{} N", op),
            },
            Lci => write!(f, "{} {} {}", op, p, q),
            Ldo | Sro | Lao | Ind | Inc | Ixa | Mov | Dec | Ent | Ujp | Fjp | Xjp | Chk
            | Lca => write!(f, "{} {}", op, q),
            _ => write!(f, "{}", op),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_order_is_opcode_number() {
        assert_eq!(Opcode::ALL.len(), 59);
        for (i, op) in Opcode::ALL.iter().enumerate() {
            assert_eq!(*op as usize, i);
        }
        assert_eq!(Opcode::Stp as usize, 58);
        assert_eq!(Opcode::Csp as usize, 15);
    }

    #[test]
    fn test_from_mnemonic() {
        assert_eq!(Opcode::from_mnemonic("ADI"), Some(Opcode::Adi));
        assert_eq!(Opcode::from_mnemonic("STP"), Some(Opcode::Stp));
        assert_eq!(Opcode::from_mnemonic("LCI"), None);
        assert_eq!(Opcode::from_mnemonic("XYZ"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Instruction::new(Opcode::Lod, 1, 5).to_string(), "LOD 1 5");
        assert_eq!(Instruction::new(Opcode::Equ, 5, 8).to_string(), "EQU M 8");
        assert_eq!(Instruction::new(Opcode::Les, 1, 0).to_string(), "LES I");
        assert_eq!(Instruction::new(Opcode::Csp, 0, 5).to_string(), "CSP WLN");
        assert_eq!(Instruction::new(Opcode::Stp, 0, 0).to_string(), "STP");
    }
}

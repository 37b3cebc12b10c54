use super::Cell;
use crate::lang::Error;

type Result<T> = std::result::Result<T, Error>;

/// Standard procedures reached through `CSP`.
/// The selector is the index in the name table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Get,
    Put,
    Rst,
    Rln,
    New,
    Wln,
    Wrs,
    Eln,
    Wri,
    Wrr,
    Wrc,
    Rdi,
    Rdr,
    Rdc,
    Sin,
    Cos,
    Exp,
    Log,
    Sqt,
    Atn,
    Sav,
}

const NAMES: [&str; 21] = [
    "GET", "PUT", "RST", "RLN", "NEW", "WLN", "WRS", "ELN", "WRI", "WRR", //
    "WRC", "RDI", "RDR", "RDC", "SIN", "COS", "EXP", "LOG", "SQT", "ATN", //
    "SAV",
];

impl Function {
    const ALL: [Function; 21] = {
        use Function::*;
        [
            Get, Put, Rst, Rln, New, Wln, Wrs, Eln, Wri, Wrr, //
            Wrc, Rdi, Rdr, Rdc, Sin, Cos, Exp, Log, Sqt, Atn, //
            Sav,
        ]
    };

    pub fn name(self) -> &'static str {
        NAMES[self as usize]
    }

    pub fn from_name(name: &str) -> Option<Function> {
        NAMES.iter().position(|n| *n == name).map(|i| Function::ALL[i])
    }

    pub fn from_index(index: i64) -> Option<Function> {
        if index < 0 {
            return None;
        }
        Function::ALL.get(index as usize).copied()
    }

    /// In-place transcendental functions applied to the top of stack.
    pub fn math(self, val: &Cell) -> Option<Result<Cell>> {
        let f: fn(f64) -> f64 = match self {
            Function::Sin => f64::sin,
            Function::Cos => f64::cos,
            Function::Exp => f64::exp,
            Function::Log => f64::ln,
            Function::Sqt => f64::sqrt,
            Function::Atn => f64::atan,
            _ => return None,
        };
        Some(val.as_real().map(|n| Cell::Real(f(n))))
    }
}

impl std::fmt::Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

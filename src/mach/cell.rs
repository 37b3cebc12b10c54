use super::Address;
use crate::error;
use crate::lang::Error;
use std::collections::BTreeSet;
use std::convert::TryFrom;

type Result<T> = std::result::Result<T, Error>;

/// ## Store cell
///
/// Every location of the store holds exactly one typed cell.
/// `Undefined` is distinct from any zero value and reading it
/// for a computation is fatal.

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Undefined,
    Int(i64),
    Real(f64),
    Bool(bool),
    Set(BTreeSet<i64>),
    Address(Address),
    /// Frame linkage: static link, dynamic link, return address.
    Mark(Address),
}

impl Default for Cell {
    fn default() -> Cell {
        Cell::Undefined
    }
}

impl Cell {
    pub fn is_undefined(&self) -> bool {
        matches!(self, Cell::Undefined)
    }

    /// Fails on `Undefined`, otherwise returns the cell unchanged.
    pub fn defined(self) -> Result<Cell> {
        match self {
            Cell::Undefined => Err(error!(ValueUndefined)),
            cell => Ok(cell),
        }
    }

    pub fn as_int(&self) -> Result<i64> {
        match self {
            Cell::Int(n) => Ok(*n),
            Cell::Undefined => Err(error!(ValueUndefined)),
            _ => Err(error!(TypeMismatch; "INTEGER EXPECTED")),
        }
    }

    /// Integers are promoted.
    pub fn as_real(&self) -> Result<f64> {
        match self {
            Cell::Real(n) => Ok(*n),
            Cell::Int(n) => Ok(*n as f64),
            Cell::Undefined => Err(error!(ValueUndefined)),
            _ => Err(error!(TypeMismatch; "REAL EXPECTED")),
        }
    }

    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Cell::Bool(b) => Ok(*b),
            Cell::Undefined => Err(error!(ValueUndefined)),
            _ => Err(error!(TypeMismatch; "BOOLEAN EXPECTED")),
        }
    }

    pub fn as_set(&self) -> Result<&BTreeSet<i64>> {
        match self {
            Cell::Set(s) => Ok(s),
            Cell::Undefined => Err(error!(ValueUndefined)),
            _ => Err(error!(TypeMismatch; "SET EXPECTED")),
        }
    }

    /// Addresses, marks and non-negative integers all name a store location.
    pub fn as_address(&self) -> Result<Address> {
        match self {
            Cell::Address(a) | Cell::Mark(a) => Ok(*a),
            Cell::Int(n) => match Address::try_from(*n) {
                Ok(a) => Ok(a),
                Err(_) => Err(error!(TypeMismatch; "NEGATIVE ADDRESS")),
            },
            Cell::Undefined => Err(error!(ValueUndefined)),
            _ => Err(error!(TypeMismatch; "ADDRESS EXPECTED")),
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Cell::Undefined => "UNDEF",
            Cell::Int(_) => "INT",
            Cell::Real(_) => "REAL",
            Cell::Bool(_) => "BOOL",
            Cell::Set(_) => "SET",
            Cell::Address(_) => "ADR",
            Cell::Mark(_) => "MARK",
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Cell::Undefined => write!(f, "UNDEF"),
            Cell::Int(n) => write!(f, "{}", n),
            Cell::Real(n) => write!(f, "{:?}", n),
            Cell::Bool(b) => write!(f, "{}", b),
            Cell::Set(s) => {
                let items: Vec<String> = s.iter().map(|i| i.to_string()).collect();
                write!(f, "({})", items.join(","))
            }
            Cell::Address(a) => write!(f, "@{}", a),
            Cell::Mark(a) => write!(f, "#{}", a),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::ErrorCode;

    #[test]
    fn test_undefined_is_not_zero() {
        assert_ne!(Cell::Undefined, Cell::Int(0));
        assert_eq!(
            Cell::Undefined.as_int().unwrap_err().code(),
            ErrorCode::ValueUndefined
        );
    }

    #[test]
    fn test_wrong_tag_is_type_mismatch() {
        let e = Cell::Bool(true).as_int().unwrap_err();
        assert_eq!(e.code(), ErrorCode::TypeMismatch);
    }

    #[test]
    fn test_addresses() {
        assert_eq!(Cell::Mark(9).as_address().unwrap(), 9);
        assert_eq!(Cell::Int(3).as_address().unwrap(), 3);
        assert!(Cell::Int(-3).as_address().is_err());
    }

    #[test]
    fn test_display_set() {
        let s: BTreeSet<i64> = [3, 1].iter().cloned().collect();
        assert_eq!(Cell::Set(s).to_string(), "(1,3)");
    }
}

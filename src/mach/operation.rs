use super::Cell;
use crate::error;
use crate::lang::Error;
use std::cmp::Ordering;

type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Equal,
    NotEqual,
    GreaterEqual,
    Greater,
    LessEqual,
    Less,
}

impl Relation {
    pub fn holds(self, ordering: Ordering) -> bool {
        match self {
            Relation::Equal => ordering == Ordering::Equal,
            Relation::NotEqual => ordering != Ordering::Equal,
            Relation::GreaterEqual => ordering != Ordering::Less,
            Relation::Greater => ordering == Ordering::Greater,
            Relation::LessEqual => ordering != Ordering::Greater,
            Relation::Less => ordering == Ordering::Less,
        }
    }
}

pub struct Operation {}

impl Operation {
    pub fn add_int(lhs: &Cell, rhs: &Cell) -> Result<Cell> {
        match lhs.as_int()?.checked_add(rhs.as_int()?) {
            Some(n) => Ok(Cell::Int(n)),
            None => Err(error!(Overflow)),
        }
    }

    pub fn subtract_int(lhs: &Cell, rhs: &Cell) -> Result<Cell> {
        match lhs.as_int()?.checked_sub(rhs.as_int()?) {
            Some(n) => Ok(Cell::Int(n)),
            None => Err(error!(Overflow)),
        }
    }

    pub fn multiply_int(lhs: &Cell, rhs: &Cell) -> Result<Cell> {
        match lhs.as_int()?.checked_mul(rhs.as_int()?) {
            Some(n) => Ok(Cell::Int(n)),
            None => Err(error!(Overflow)),
        }
    }

    /// Rounds toward negative infinity.
    pub fn divide_int(lhs: &Cell, rhs: &Cell) -> Result<Cell> {
        let (l, r) = (lhs.as_int()?, rhs.as_int()?);
        if r == 0 {
            return Err(error!(DivisionByZero));
        }
        match l.checked_div(r) {
            Some(q) if l % r != 0 && ((l < 0) != (r < 0)) => Ok(Cell::Int(q - 1)),
            Some(q) => Ok(Cell::Int(q)),
            None => Err(error!(Overflow)),
        }
    }

    /// Result takes the sign of the divisor.
    pub fn modulo(lhs: &Cell, rhs: &Cell) -> Result<Cell> {
        let (l, r) = (lhs.as_int()?, rhs.as_int()?);
        if r == 0 {
            return Err(error!(DivisionByZero));
        }
        match l.checked_rem(r) {
            Some(m) if m != 0 && ((m < 0) != (r < 0)) => Ok(Cell::Int(m + r)),
            Some(m) => Ok(Cell::Int(m)),
            None => Err(error!(Overflow)),
        }
    }

    pub fn add_real(lhs: &Cell, rhs: &Cell) -> Result<Cell> {
        Ok(Cell::Real(lhs.as_real()? + rhs.as_real()?))
    }

    pub fn subtract_real(lhs: &Cell, rhs: &Cell) -> Result<Cell> {
        Ok(Cell::Real(lhs.as_real()? - rhs.as_real()?))
    }

    pub fn multiply_real(lhs: &Cell, rhs: &Cell) -> Result<Cell> {
        Ok(Cell::Real(lhs.as_real()? * rhs.as_real()?))
    }

    pub fn divide_real(lhs: &Cell, rhs: &Cell) -> Result<Cell> {
        let r = rhs.as_real()?;
        if r == 0.0 {
            return Err(error!(DivisionByZero));
        }
        Ok(Cell::Real(lhs.as_real()? / r))
    }

    pub fn negate_int(val: &Cell) -> Result<Cell> {
        match val.as_int()?.checked_neg() {
            Some(n) => Ok(Cell::Int(n)),
            None => Err(error!(Overflow)),
        }
    }

    pub fn negate_real(val: &Cell) -> Result<Cell> {
        Ok(Cell::Real(-val.as_real()?))
    }

    pub fn square_int(val: &Cell) -> Result<Cell> {
        Operation::multiply_int(val, val)
    }

    pub fn square_real(val: &Cell) -> Result<Cell> {
        let n = val.as_real()?;
        Ok(Cell::Real(n * n))
    }

    pub fn abs_int(val: &Cell) -> Result<Cell> {
        match val.as_int()?.checked_abs() {
            Some(n) => Ok(Cell::Int(n)),
            None => Err(error!(Overflow)),
        }
    }

    pub fn abs_real(val: &Cell) -> Result<Cell> {
        Ok(Cell::Real(val.as_real()?.abs()))
    }

    /// `INC` and `DEC`. Booleans count as 0 and 1.
    pub fn increment(val: &Cell, delta: i64) -> Result<Cell> {
        use std::convert::TryFrom;
        match val {
            Cell::Int(n) => match n.checked_add(delta) {
                Some(n) => Ok(Cell::Int(n)),
                None => Err(error!(Overflow)),
            },
            Cell::Bool(b) => match i64::from(*b).checked_add(delta) {
                Some(0) => Ok(Cell::Bool(false)),
                Some(1) => Ok(Cell::Bool(true)),
                _ => Err(error!(ValueOutOfRange)),
            },
            Cell::Address(a) | Cell::Mark(a) => {
                match (*a as i64).checked_add(delta).map(usize::try_from) {
                    Some(Ok(a)) => Ok(Cell::Address(a)),
                    _ => Err(error!(ValueOutOfRange; "NEGATIVE ADDRESS")),
                }
            }
            Cell::Undefined => Err(error!(ValueUndefined)),
            _ => Err(error!(TypeMismatch)),
        }
    }

    /// Truncates toward zero.
    pub fn truncate(val: &Cell) -> Result<Cell> {
        let n = val.as_real()?.trunc();
        if n.is_nan() || n < i64::MIN as f64 || n >= i64::MAX as f64 {
            return Err(error!(Overflow));
        }
        Ok(Cell::Int(n as i64))
    }

    pub fn float(val: &Cell) -> Result<Cell> {
        Ok(Cell::Real(val.as_real()?))
    }

    pub fn odd(val: &Cell) -> Result<Cell> {
        Ok(Cell::Bool(val.as_int()?.rem_euclid(2) == 1))
    }

    pub fn not(val: &Cell) -> Result<Cell> {
        Ok(Cell::Bool(!val.as_bool()?))
    }

    pub fn and(lhs: &Cell, rhs: &Cell) -> Result<Cell> {
        Ok(Cell::Bool(lhs.as_bool()? && rhs.as_bool()?))
    }

    pub fn or(lhs: &Cell, rhs: &Cell) -> Result<Cell> {
        Ok(Cell::Bool(lhs.as_bool()? || rhs.as_bool()?))
    }

    pub fn singleton(val: &Cell) -> Result<Cell> {
        Ok(Cell::Set(std::iter::once(val.as_int()?).collect()))
    }

    pub fn difference(lhs: &Cell, rhs: &Cell) -> Result<Cell> {
        let (l, r) = (lhs.as_set()?, rhs.as_set()?);
        Ok(Cell::Set(l.difference(r).cloned().collect()))
    }

    pub fn intersection(lhs: &Cell, rhs: &Cell) -> Result<Cell> {
        let (l, r) = (lhs.as_set()?, rhs.as_set()?);
        Ok(Cell::Set(l.intersection(r).cloned().collect()))
    }

    pub fn union(lhs: &Cell, rhs: &Cell) -> Result<Cell> {
        let (l, r) = (lhs.as_set()?, rhs.as_set()?);
        Ok(Cell::Set(l.union(r).cloned().collect()))
    }

    pub fn member(val: &Cell, set: &Cell) -> Result<Cell> {
        Ok(Cell::Bool(set.as_set()?.contains(&val.as_int()?)))
    }

    /// Inclusion for sets, ordering for scalars of the same kind.
    pub fn relation(rel: Relation, lhs: &Cell, rhs: &Cell) -> Result<bool> {
        use Cell::*;
        if let (Set(l), Set(r)) = (lhs, rhs) {
            return Ok(match rel {
                Relation::Equal => l == r,
                Relation::NotEqual => l != r,
                Relation::LessEqual => l.is_subset(r),
                Relation::GreaterEqual => l.is_superset(r),
                Relation::Less => l.is_subset(r) && l != r,
                Relation::Greater => l.is_superset(r) && l != r,
            });
        }
        Ok(rel.holds(Operation::ordering(lhs, rhs)?))
    }

    pub fn ordering(lhs: &Cell, rhs: &Cell) -> Result<Ordering> {
        use Cell::*;
        match (lhs, rhs) {
            (Undefined, _) | (_, Undefined) => Err(error!(ValueUndefined)),
            (Int(l), Int(r)) => Ok(l.cmp(r)),
            (Real(l), Real(r)) => match l.partial_cmp(r) {
                Some(o) => Ok(o),
                None => Err(error!(TypeMismatch; "UNORDERED REAL")),
            },
            (Bool(l), Bool(r)) => Ok(l.cmp(r)),
            (Address(l), Address(r))
            | (Address(l), Mark(r))
            | (Mark(l), Address(r))
            | (Mark(l), Mark(r)) => Ok(l.cmp(r)),
            _ => Err(error!(TypeMismatch)),
        }
    }
}

use super::{Address, Cell, Config};
use crate::error;
use crate::lang::Error;
use std::collections::BTreeSet;
use std::ops::Range;

type Result<T> = std::result::Result<T, Error>;

/// Constant tables living above the stack, in address order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pool {
    Integer,
    Real,
    Set,
    Boundary,
    Multiple,
}

impl Pool {
    const ALL: [Pool; 5] = [
        Pool::Integer,
        Pool::Real,
        Pool::Set,
        Pool::Boundary,
        Pool::Multiple,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Pool::Integer => "INTEGER",
            Pool::Real => "REAL",
            Pool::Set => "SET",
            Pool::Boundary => "BOUNDARY",
            Pool::Multiple => "MULTIPLE",
        }
    }

    fn zero(self) -> Cell {
        match self {
            Pool::Real => Cell::Real(0.0),
            Pool::Set => Cell::Set(BTreeSet::new()),
            Pool::Integer | Pool::Boundary | Pool::Multiple => Cell::Int(0),
        }
    }
}

/// Reals match by bit pattern so `-0.0` keeps its own slot.
fn same_constant(lhs: &Cell, rhs: &Cell) -> bool {
    match (lhs, rhs) {
        (Cell::Real(l), Cell::Real(r)) => l.to_bits() == r.to_bits(),
        _ => lhs == rhs,
    }
}

#[derive(Debug, Clone)]
struct Region {
    begin: Address,
    end: Address,
    next: Address,
}

impl Region {
    fn new(begin: Address, len: usize) -> Region {
        Region {
            begin,
            end: begin + len,
            next: begin,
        }
    }

    fn used(&self) -> Range<Address> {
        self.begin..self.next
    }

    fn remaining(&self) -> usize {
        self.end - self.next
    }
}

/// ## Data memory
///
/// One flat array of typed cells. The stack occupies `0..=stack_size`
/// and the constant pools follow it. The first address past the
/// last pool is used as the `nil` pointer.

#[derive(Debug, Clone)]
pub struct Store {
    cells: Vec<Cell>,
    stack_size: usize,
    regions: Vec<Region>,
}

impl Default for Store {
    fn default() -> Store {
        Store::new(&Config::default())
    }
}

impl Store {
    pub fn new(config: &Config) -> Store {
        let sizes = [
            config.integer_pool,
            config.real_pool,
            config.set_pool,
            config.boundary_pool,
            config.multiple_pool,
        ];
        let mut regions = Vec::with_capacity(sizes.len());
        let mut begin = config.stack_size + 1;
        for len in sizes.iter() {
            regions.push(Region::new(begin, *len));
            begin += len;
        }
        let mut cells = vec![Cell::Undefined; begin];
        for (pool, region) in Pool::ALL.iter().zip(regions.iter()) {
            for cell in &mut cells[region.begin..region.end] {
                *cell = pool.zero();
            }
        }
        Store {
            cells,
            stack_size: config.stack_size,
            regions,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn stack_size(&self) -> usize {
        self.stack_size
    }

    /// Pointer value of `nil`; never a valid cell.
    pub fn nil(&self) -> Address {
        self.cells.len()
    }

    pub fn pool(&self, pool: Pool) -> Range<Address> {
        let region = &self.regions[pool as usize];
        region.begin..region.end
    }

    /// Number of slots already handed out by a pool.
    pub fn pool_used(&self, pool: Pool) -> usize {
        self.regions[pool as usize].used().len()
    }

    pub fn read(&self, addr: Address) -> Result<&Cell> {
        match self.cells.get(addr) {
            Some(cell) => Ok(cell),
            None => Err(error!(InternalError; "ADDRESS OUT OF STORE")),
        }
    }

    pub fn write(&mut self, addr: Address, cell: Cell) -> Result<()> {
        match self.cells.get_mut(addr) {
            Some(slot) => {
                *slot = cell;
                Ok(())
            }
            None => Err(error!(InternalError; "ADDRESS OUT OF STORE")),
        }
    }

    pub fn intern_int(&mut self, value: i64) -> Result<Address> {
        self.intern(Pool::Integer, Cell::Int(value))
    }

    pub fn intern_real(&mut self, value: f64) -> Result<Address> {
        self.intern(Pool::Real, Cell::Real(value))
    }

    pub fn intern_set(&mut self, value: BTreeSet<i64>) -> Result<Address> {
        self.intern(Pool::Set, Cell::Set(value))
    }

    fn intern(&mut self, pool: Pool, cell: Cell) -> Result<Address> {
        let region = &self.regions[pool as usize];
        let range = region.used();
        if let Some(offset) = self.cells[range.clone()]
            .iter()
            .position(|c| same_constant(c, &cell))
        {
            return Ok(range.start + offset);
        }
        if region.remaining() == 0 {
            return Err(error!(TableOverflow; pool.name()));
        }
        let address = region.next;
        self.cells[address] = cell;
        self.regions[pool as usize].next += 1;
        Ok(address)
    }

    /// Returns the address of the upper bound; the lower bound is one below.
    pub fn intern_boundary(&mut self, lower: i64, upper: i64) -> Result<Address> {
        let region = &self.regions[Pool::Boundary as usize];
        let (lower, upper) = (Cell::Int(lower), Cell::Int(upper));
        let mut addr = region.begin;
        while addr + 1 < region.next {
            if self.cells[addr] == lower && self.cells[addr + 1] == upper {
                return Ok(addr + 1);
            }
            addr += 2;
        }
        if region.remaining() < 2 {
            return Err(error!(TableOverflow; Pool::Boundary.name()));
        }
        let address = region.next;
        self.cells[address] = lower;
        self.cells[address + 1] = upper;
        self.regions[Pool::Boundary as usize].next += 2;
        Ok(address + 1)
    }

    /// Character data for string and array literals. Never shared.
    pub fn append_blob(&mut self, bytes: &[u8]) -> Result<Address> {
        let region = &self.regions[Pool::Multiple as usize];
        if bytes.len() > region.remaining() {
            return Err(error!(TableOverflow; Pool::Multiple.name()));
        }
        let start = region.next;
        for (i, byte) in bytes.iter().enumerate() {
            self.cells[start + i] = Cell::Int(i64::from(*byte));
        }
        self.regions[Pool::Multiple as usize].next += bytes.len();
        Ok(start)
    }
}

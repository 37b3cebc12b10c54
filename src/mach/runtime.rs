use super::file::{Files, INPUT, OUTPUT, PRD, PRR};
use super::{
    Address, Cell, Function, Instruction, Opcode, Operation, Program, Relation, Store, MULTIPLE,
};
use crate::error;
use crate::lang::Error;
use std::cmp::Ordering;
use std::convert::TryFrom;
use tracing::trace;

type Result<T> = std::result::Result<T, Error>;

/// Registers of the P-machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    pub pc: Address,
    /// Base of the current frame.
    pub mp: Address,
    /// Top of stack; -1 when the stack is empty.
    pub sp: isize,
    /// Bottom of the heap, which grows down toward the stack.
    pub np: Address,
}

#[derive(Debug, PartialEq)]
pub enum Event {
    Running,
    Stopped,
    Error(Error),
}

/// ## Runtime
///
/// Executes a loaded program against the four bound files.
/// `execute` runs a bounded number of instructions so the
/// caller can interleave interrupts; `run` goes to the end.

pub struct Runtime<'a> {
    program: &'a mut Program,
    files: Files<'a>,
    context: Context,
    stopped: bool,
    failure: Option<Error>,
    interrupted: bool,
}

fn offset(base: Address, q: i64) -> Result<Address> {
    match (base as i64).checked_add(q).map(Address::try_from) {
        Some(Ok(address)) => Ok(address),
        _ => Err(error!(InternalError; "ADDRESS OUT OF STORE")),
    }
}

fn address(q: i64) -> Result<Address> {
    offset(0, q)
}

fn width(cell: &Cell) -> Result<usize> {
    Ok(usize::try_from(cell.as_int()?).unwrap_or(0))
}

fn character(code: i64) -> Result<u8> {
    match u8::try_from(code) {
        Ok(c) => Ok(c),
        Err(_) => Err(error!(ValueOutOfRange; "CHARACTER CODE")),
    }
}

/// Reals print in shortest form, switching to an exponent with
/// an explicit sign and two or more digits outside 1e-4..1e16.
fn real_text(n: f64) -> String {
    if n.is_nan() {
        return "nan".to_string();
    }
    if n.is_infinite() || n == 0.0 {
        return format!("{:?}", n);
    }
    let scientific = format!("{:e}", n);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i32>().unwrap_or(0)),
        None => return scientific,
    };
    if (-4..16).contains(&exponent) {
        format!("{:?}", n)
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    }
}

impl<'a> Runtime<'a> {
    pub fn new(program: &'a mut Program, files: Files<'a>) -> Result<Runtime<'a>> {
        let np = program.store().stack_size() + 1;
        let store = program.store_mut();
        store.write(INPUT, Cell::Int(0))?;
        store.write(OUTPUT, Cell::Undefined)?;
        store.write(PRD, Cell::Int(0))?;
        store.write(PRR, Cell::Undefined)?;
        Ok(Runtime {
            program,
            files,
            context: Context {
                pc: 0,
                mp: 0,
                sp: -1,
                np,
            },
            stopped: false,
            failure: None,
            interrupted: false,
        })
    }

    pub fn context(&self) -> Context {
        self.context
    }

    pub fn store(&self) -> &Store {
        self.program.store()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Stops the program before its next instruction.
    pub fn interrupt(&mut self) {
        self.interrupted = true;
    }

    pub fn run(&mut self) -> Result<()> {
        loop {
            match self.execute(10_000) {
                Event::Running => {}
                Event::Stopped => return Ok(()),
                Event::Error(error) => return Err(error),
            }
        }
    }

    pub fn execute(&mut self, cycles: usize) -> Event {
        if self.stopped {
            return match &self.failure {
                Some(error) => Event::Error(error.clone()),
                None => Event::Stopped,
            };
        }
        if self.interrupted {
            self.interrupted = false;
            return self.fail(error!(Interrupted).at_address(self.context.pc));
        }
        for _ in 0..cycles {
            let pc = self.context.pc;
            match self.step() {
                Ok(true) => {}
                Ok(false) => {
                    self.stopped = true;
                    if let Err(error) = self.files.flush() {
                        self.failure = Some(error.clone());
                        return Event::Error(error);
                    }
                    return Event::Stopped;
                }
                Err(error) => return self.fail(error.at_address(pc)),
            }
        }
        Event::Running
    }

    fn fail(&mut self, error: Error) -> Event {
        self.stopped = true;
        self.failure = Some(error.clone());
        // The machine error is the one worth reporting.
        let _ = self.files.flush();
        Event::Error(error)
    }

    fn read(&self, address: Address) -> Result<&Cell> {
        self.program.store().read(address)
    }

    fn write(&mut self, address: Address, cell: Cell) -> Result<()> {
        self.program.store_mut().write(address, cell)
    }

    /// Copy of a cell that must hold a value.
    fn load(&self, address: Address) -> Result<Cell> {
        self.read(address)?.clone().defined()
    }

    fn below(&self, depth: usize) -> Result<Address> {
        match Address::try_from(self.context.sp - depth as isize) {
            Ok(address) => Ok(address),
            Err(_) => Err(error!(InternalError; "STACK UNDERFLOW")),
        }
    }

    fn peek(&self, depth: usize) -> Result<&Cell> {
        self.read(self.below(depth)?)
    }

    fn push(&mut self, cell: Cell) -> Result<()> {
        let address = (self.context.sp + 1) as Address;
        if address >= self.context.np {
            return Err(error!(StoreOverflow));
        }
        self.context.sp += 1;
        self.write(address, cell)
    }

    fn pop(&mut self) -> Result<Cell> {
        let cell = self.peek(0)?.clone();
        self.context.sp -= 1;
        Ok(cell)
    }

    fn set_top(&mut self, cell: Cell) -> Result<()> {
        let address = self.below(0)?;
        self.write(address, cell)
    }

    fn unary(&mut self, f: fn(&Cell) -> Result<Cell>) -> Result<()> {
        let cell = f(self.peek(0)?)?;
        self.set_top(cell)
    }

    fn binary(&mut self, f: fn(&Cell, &Cell) -> Result<Cell>) -> Result<()> {
        let rhs = self.pop()?;
        let cell = f(self.peek(0)?, &rhs)?;
        self.set_top(cell)
    }

    /// Follows the static link `levels` times.
    fn base(&self, levels: usize) -> Result<Address> {
        let mut address = self.context.mp;
        for _ in 0..levels {
            address = self.read(address + 1)?.as_address()?;
        }
        Ok(address)
    }

    fn step(&mut self) -> Result<bool> {
        let ins = match self.program.code().get(self.context.pc) {
            Some(ins) => *ins,
            None => return Err(error!(InternalError; "PC OUT OF CODE")),
        };
        let Context { pc, mp, sp, np } = self.context;
        trace!(pc, sp, mp, np, "{}", ins);
        self.context.pc += 1;
        let Instruction { op, p, q } = ins;
        use Opcode::*;
        match op {
            Lod => {
                let cell = self.load(offset(self.base(p)?, q)?)?;
                self.push(cell)?;
            }
            Ldo => {
                let cell = self.load(address(q)?)?;
                self.push(cell)?;
            }
            Str => {
                let target = offset(self.base(p)?, q)?;
                let cell = self.pop()?;
                self.write(target, cell)?;
            }
            Sro => {
                let cell = self.pop()?;
                self.write(address(q)?, cell)?;
            }
            Lda => {
                let target = offset(self.base(p)?, q)?;
                self.push(Cell::Address(target))?;
            }
            Lao => self.push(Cell::Address(address(q)?))?,
            Sto => {
                let cell = self.pop()?;
                let target = self.pop()?.as_address()?;
                self.write(target, cell)?;
            }
            Ldc => {
                let cell = match p {
                    1 => Cell::Int(q),
                    3 => Cell::Bool(q == 1),
                    _ => Cell::Address(self.program.store().nil()),
                };
                self.push(cell)?;
            }
            Lci => {
                let cell = self.read(address(q)?)?.clone();
                self.push(cell)?;
            }
            Ind => {
                let source = offset(self.peek(0)?.as_address()?, q)?;
                let cell = self.load(source)?;
                self.set_top(cell)?;
            }
            Inc => {
                let cell = Operation::increment(self.peek(0)?, q)?;
                self.set_top(cell)?;
            }
            Dec => {
                let delta = match q.checked_neg() {
                    Some(delta) => delta,
                    None => return Err(error!(Overflow)),
                };
                let cell = Operation::increment(self.peek(0)?, delta)?;
                self.set_top(cell)?;
            }
            Mst => {
                let static_link = self.base(p)?;
                self.push(Cell::Undefined)?;
                self.push(Cell::Mark(static_link))?;
                self.push(Cell::Mark(mp))?;
                self.push(Cell::Undefined)?;
            }
            Cup => {
                let frame = match Address::try_from(self.context.sp - (p as isize + 3)) {
                    Ok(frame) => frame,
                    Err(_) => return Err(error!(InternalError; "STACK UNDERFLOW")),
                };
                let link = self.context.pc;
                self.context.mp = frame;
                self.write(frame + 3, Cell::Mark(link))?;
                self.context.pc = address(q)?;
            }
            Ent => {
                let top = offset(mp, q)?;
                if top >= np {
                    return Err(error!(StoreOverflow));
                }
                if self.context.sp < INPUT as isize {
                    self.context.sp = PRR as isize;
                }
                let first = (self.context.sp + 1) as Address;
                for address in first..=top {
                    self.write(address, Cell::Undefined)?;
                }
                self.context.sp = top as isize;
            }
            Ret => {
                self.context.sp = if p == 0 { mp as isize - 1 } else { mp as isize };
                self.context.pc = self.read(mp + 3)?.as_address()?;
                self.context.mp = self.read(mp + 2)?.as_address()?;
            }
            Csp => self.call(q)?,
            Ixa => {
                let index = self.pop()?.as_int()?;
                let base = self.peek(0)?.as_address()?;
                let target = match index.checked_mul(q) {
                    Some(n) => offset(base, n)?,
                    None => return Err(error!(Overflow)),
                };
                self.set_top(Cell::Address(target))?;
            }
            Equ => self.compare(Relation::Equal, p, q)?,
            Neq => self.compare(Relation::NotEqual, p, q)?,
            Geq => self.compare(Relation::GreaterEqual, p, q)?,
            Grt => self.compare(Relation::Greater, p, q)?,
            Leq => self.compare(Relation::LessEqual, p, q)?,
            Les => self.compare(Relation::Less, p, q)?,
            Ujp => self.context.pc = address(q)?,
            Fjp => {
                if !self.pop()?.as_bool()? {
                    self.context.pc = address(q)?;
                }
            }
            Xjp => {
                let value = self.pop()?.as_int()?;
                self.context.pc = match value.checked_add(q) {
                    Some(target) => address(target)?,
                    None => return Err(error!(Overflow)),
                };
            }
            Chk => {
                let value = self.peek(0)?.as_int()?;
                let upper = address(q)?;
                let lower = self.read(offset(upper, -1)?)?.as_int()?;
                let upper = self.read(upper)?.as_int()?;
                if value < lower || value > upper {
                    let range = format!("{} NOT IN {}..{}", value, lower, upper);
                    return Err(error!(ValueOutOfRange; &range));
                }
            }
            Eof => {
                let file = self.peek(0)?.as_address()?;
                let eof = self.files.eof(file)?;
                self.set_top(Cell::Bool(eof))?;
            }
            Adi => self.binary(Operation::add_int)?,
            Adr => self.binary(Operation::add_real)?,
            Sbi => self.binary(Operation::subtract_int)?,
            Sbr => self.binary(Operation::subtract_real)?,
            Sgs => self.unary(Operation::singleton)?,
            Flt => self.unary(Operation::float)?,
            Flo => {
                let second = self.below(1)?;
                let cell = Operation::float(self.read(second)?)?;
                self.write(second, cell)?;
            }
            Trc => self.unary(Operation::truncate)?,
            Ngi => self.unary(Operation::negate_int)?,
            Ngr => self.unary(Operation::negate_real)?,
            Sqi => self.unary(Operation::square_int)?,
            Sqr => self.unary(Operation::square_real)?,
            Abi => self.unary(Operation::abs_int)?,
            Abr => self.unary(Operation::abs_real)?,
            Not => self.unary(Operation::not)?,
            And => self.binary(Operation::and)?,
            Ior => self.binary(Operation::or)?,
            Dif => self.binary(Operation::difference)?,
            Int => self.binary(Operation::intersection)?,
            Uni => self.binary(Operation::union)?,
            Inn => self.binary(Operation::member)?,
            Mod => self.binary(Operation::modulo)?,
            Odd => self.unary(Operation::odd)?,
            Mpi => self.binary(Operation::multiply_int)?,
            Mpr => self.binary(Operation::multiply_real)?,
            Dvi => self.binary(Operation::divide_int)?,
            Dvr => self.binary(Operation::divide_real)?,
            Mov => {
                let source = self.pop()?.as_address()?;
                let target = self.pop()?.as_address()?;
                for i in 0..usize::try_from(q).unwrap_or(0) {
                    let cell = self.read(source + i)?.clone();
                    self.write(target + i, cell)?;
                }
            }
            Lca => self.push(Cell::Address(address(q)?))?,
            Stp => return Ok(false),
        }
        Ok(true)
    }

    fn compare(&mut self, relation: Relation, p: usize, q: i64) -> Result<()> {
        let rhs = self.pop()?;
        let lhs = self.peek(0)?;
        let holds = if p == MULTIPLE {
            let len = usize::try_from(q).unwrap_or(0);
            let ordering = self.compare_blocks(lhs.as_address()?, rhs.as_address()?, len)?;
            relation.holds(ordering)
        } else {
            Operation::relation(relation, lhs, &rhs)?
        };
        self.set_top(Cell::Bool(holds))
    }

    /// Orders two blocks of `len` cells by their first differing pair.
    fn compare_blocks(&self, lhs: Address, rhs: Address, len: usize) -> Result<Ordering> {
        for i in 0..len {
            let (l, r) = (self.read(lhs + i)?, self.read(rhs + i)?);
            if l != r {
                return Operation::ordering(l, r);
            }
        }
        Ok(Ordering::Equal)
    }

    fn pop_file(&mut self) -> Result<Address> {
        self.pop()?.as_address()
    }

    fn call(&mut self, q: i64) -> Result<()> {
        let function = match Function::from_index(q) {
            Some(function) => function,
            None => return Err(error!(UnknownInstruction; &format!("CSP {}", q))),
        };
        use Function::*;
        match function {
            Get => {
                let file = self.pop_file()?;
                let c = self.files.reader(file)?.read()?;
                self.write(file, Cell::Int(c))?;
            }
            Put => {
                let file = self.pop_file()?;
                self.files.writer(file)?;
                let c = character(self.read(file)?.as_int()?)?;
                self.files.write_bytes(file, &[c])?;
                self.write(file, Cell::Undefined)?;
            }
            Rst => self.context.np = self.pop()?.as_address()?,
            Rln => {
                let file = self.pop_file()?;
                let reader = self.files.reader(file)?;
                reader.read_line()?;
                let c = reader.read()?;
                self.write(file, Cell::Int(c))?;
            }
            New => {
                let size = usize::try_from(self.peek(0)?.as_int()?).unwrap_or(0);
                let heap = match self.context.np.checked_sub(size) {
                    Some(heap) if heap as isize > self.context.sp => heap,
                    _ => return Err(error!(StoreOverflow)),
                };
                let pointer = self.peek(1)?.as_address()?;
                for address in heap..self.context.np {
                    self.write(address, Cell::Undefined)?;
                }
                self.context.np = heap;
                self.write(pointer, Cell::Address(heap))?;
                self.context.sp -= 2;
            }
            Wln => {
                let file = self.pop_file()?;
                self.files.write_str(file, "\n")?;
            }
            Wrs => {
                let file = self.peek(0)?.as_address()?;
                let len = width(self.peek(1)?)?;
                let width = width(self.peek(2)?)?;
                let start = self.peek(3)?.as_address()?;
                let mut s = vec![b' '; width.saturating_sub(len)];
                for i in 0..len.min(width) {
                    s.push(character(self.read(start + i)?.as_int()?)?);
                }
                self.files.write_bytes(file, &s)?;
                self.context.sp -= 4;
            }
            Eln => {
                let file = self.peek(0)?.as_address()?;
                let eol = self.files.eol(file)?;
                self.set_top(Cell::Bool(eol))?;
            }
            Wri | Wrr | Wrc => {
                let file = self.peek(0)?.as_address()?;
                let w = width(self.peek(1)?)?;
                let value = self.peek(2)?;
                let s = match function {
                    Wri => format!("{:>w$}", value.as_int()?, w = w).into_bytes(),
                    Wrr => format!("{:>w$}", real_text(value.as_real()?), w = w).into_bytes(),
                    _ => {
                        let mut s = vec![b' '; w.saturating_sub(1)];
                        s.push(character(value.as_int()?)?);
                        s
                    }
                };
                self.files.write_bytes(file, &s)?;
                self.context.sp -= 3;
            }
            Rdi | Rdr | Rdc => {
                let file = self.peek(0)?.as_address()?;
                let target = self.peek(1)?.as_address()?;
                let reader = self.files.reader(file)?;
                let cell = match function {
                    Rdi => Cell::Int(reader.read_integer()?),
                    Rdr => Cell::Real(reader.read_real()?),
                    _ => Cell::Int(reader.read()?),
                };
                self.write(target, cell)?;
                self.context.sp -= 2;
            }
            Sin | Cos | Exp | Log | Sqt | Atn => {
                let cell = match function.math(self.peek(0)?) {
                    Some(result) => result?,
                    None => return Err(error!(InternalError)),
                };
                self.set_top(cell)?;
            }
            Sav => {
                let target = self.pop()?.as_address()?;
                let heap = self.context.np;
                self.write(target, Cell::Address(heap))?;
            }
        }
        Ok(())
    }
}

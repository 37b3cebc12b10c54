use super::*;
use crate::mach::{Config, Instruction, Labels, Opcode, Store};


fn store() -> Store {
    Store::new(&Config {
        stack_size: 100,
        integer_pool: 3,
        real_pool: 3,
        set_pool: 10,
        boundary_pool: 4,
        multiple_pool: 8,
        ..Config::default()
    })
}

fn asm(text: &str) -> Result<Instruction, Error> {
    assemble(text, 3, &mut store(), &mut Labels::new(20))
}

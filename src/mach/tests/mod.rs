use crate::lang::{Error, ErrorCode};
use crate::mach::{Cell, Config, Context, Event, Files, Program, Runtime};

mod expr_test;

struct Outcome {
    result: Result<(), Error>,
    output: String,
    context: Context,
    program: Program,
}

impl Outcome {
    fn top(&self) -> &Cell {
        self.cell(self.context.sp as usize)
    }

    fn cell(&self, address: usize) -> &Cell {
        self.program.store().read(address).unwrap()
    }

    fn error(&self) -> ErrorCode {
        self.result.as_ref().unwrap_err().code()
    }
}

fn run(text: &str) -> Outcome {
    run_with(text.parse().unwrap(), "")
}

fn run_with(mut program: Program, input: &str) -> Outcome {
    let mut output = Vec::new();
    let (result, context) = {
        let files = Files::new(input.as_bytes(), &mut output, "".as_bytes(), Vec::new());
        let mut runtime = Runtime::new(&mut program, files).unwrap();
        let result = runtime.run();
        (result, runtime.context())
    };
    Outcome {
        result,
        output: String::from_utf8(output).unwrap(),
        context,
        program,
    }
}

fn small_stack(text: &str, stack_size: usize) -> Program {
    let config = Config {
        stack_size,
        ..Config::default()
    };
    Program::load_with(&mut text.as_bytes(), &config).unwrap()
}

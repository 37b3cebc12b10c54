use pcode::lang::Error;
use pcode::mach::{interpret, load, Files};

#[allow(dead_code)]
pub fn run(text: &str, input: &str) -> (Result<(), Error>, String) {
    let (result, output, _) = run_files(text, input);
    (result, output)
}

/// Loads `text`, binds what follows the code as `prd`,
/// and returns the `output` and `prr` text.
pub fn run_files(text: &str, input: &str) -> (Result<(), Error>, String, String) {
    let mut reader = text.as_bytes();
    let mut program = match load(&mut reader) {
        Ok(program) => program,
        Err(error) => return (Err(error), String::new(), String::new()),
    };
    let mut output = Vec::new();
    let mut prr = Vec::new();
    let files = Files::new(input.as_bytes(), &mut output, reader, &mut prr);
    let result = interpret(files, &mut program);
    (
        result,
        String::from_utf8(output).unwrap(),
        String::from_utf8(prr).unwrap(),
    )
}

extern crate ansi_term;
extern crate ctrlc;
use crate::error;
use crate::lang::Error;
use crate::mach::{Config, Event, Files, Listing, Program, Runtime};
use ansi_term::Style;
use clap::Parser;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn, Level};

/// Load and run a Pascal-P2 P-code program
#[derive(Parser, Debug)]
#[command(name = "pcode", version)]
pub struct Args {
    /// P-code file; whatever follows the code is read as `prd`
    #[arg(value_name = "FILE")]
    program: PathBuf,

    /// File written as `prr` (defaults to the program file with extension `out`)
    #[arg(long, short, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print the assembled code instead of running it
    #[arg(long)]
    list: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Log every executed instruction
    #[arg(long)]
    trace: bool,

    /// Highest stack address
    #[arg(long, value_name = "CELLS")]
    stack_size: Option<usize>,

    /// Maximum number of instructions
    #[arg(long, value_name = "COUNT")]
    code_size: Option<usize>,
}

impl Args {
    fn config(&self) -> Config {
        let mut config = Config::default();
        if let Some(stack_size) = self.stack_size {
            config.stack_size = stack_size;
        }
        if let Some(code_size) = self.code_size {
            config.code_size = code_size;
        }
        config
    }

    fn level(&self) -> Level {
        if self.trace {
            Level::TRACE
        } else if self.debug {
            Level::DEBUG
        } else {
            Level::INFO
        }
    }

    fn prr_path(&self) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => self.program.with_extension("out"),
        }
    }
}

pub fn main() {
    let args = Args::parse();
    init_tracing(args.level());
    let interrupted = Arc::new(AtomicBool::new(false));
    let int_moved = interrupted.clone();
    if let Err(error) = ctrlc::set_handler(move || {
        int_moved.store(true, Ordering::SeqCst);
    }) {
        warn!(%error, "Ctrl-C handler not installed");
    }
    if let Err(error) = run(&args, &interrupted) {
        eprintln!("{}", Style::new().bold().paint(error.to_string()));
        std::process::exit(1);
    }
}

fn init_tracing(level: Level) {
    let _ = tracing_subscriber::fmt()
        .without_time()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}

fn disk_error(path: &Path, error: std::io::Error) -> Error {
    error!(DiskIoError; &format!("{}: {}", path.display(), error))
}

fn run(args: &Args, interrupted: &AtomicBool) -> Result<(), Error> {
    let file = File::open(&args.program).map_err(|e| disk_error(&args.program, e))?;
    let mut prd = BufReader::new(file);
    let mut program = Program::load_with(&mut prd, &args.config())?;
    info!(
        instructions = program.code().len(),
        "loaded {}",
        args.program.display()
    );
    if args.list {
        print!("{}", Listing::new(&program));
        return Ok(());
    }
    let prr_path = args.prr_path();
    let prr = File::create(&prr_path).map_err(|e| disk_error(&prr_path, e))?;
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let files = Files::new(stdin.lock(), stdout.lock(), prd, BufWriter::new(prr));
    let mut runtime = Runtime::new(&mut program, files)?;
    loop {
        if interrupted.swap(false, Ordering::SeqCst) {
            runtime.interrupt();
        }
        match runtime.execute(5000) {
            Event::Running => {}
            Event::Stopped => return Ok(()),
            Event::Error(error) => return Err(error),
        }
    }
}

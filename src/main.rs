use std::fs;
use std::path::{Path, PathBuf};
use std::process::{self, Command};

use anyhow::{anyhow, bail, Context};
use structopt::StructOpt;
use tracing::{debug, Level};

use bfcc_core::{tokenize, Config, Registry};

#[derive(Debug, StructOpt)]
#[structopt(name = "bfcc", about = "Compiles Brainfuck to C, to x86-64 assembly, or just runs it")]
struct Opt {
    /// Backend to use (see --list)
    #[structopt(short, long, default_value = "asm")]
    backend: String,

    /// List the available backends and exit
    #[structopt(long)]
    list: bool,

    /// Print the tokenized program instead of compiling it
    #[structopt(long)]
    tokens: bool,

    /// Run the executable after building it
    #[structopt(long)]
    run: bool,

    /// Only write the generated .c/.s file; don't run the compiler, assembler or linker
    #[structopt(long)]
    no_compile: bool,

    /// Insert a breakpoint at the start of the generated assembly (also: DEBUG=1)
    #[structopt(long)]
    debug: bool,

    /// Delete generated intermediate files (also: CLEANUP=1)
    #[structopt(long)]
    cleanup: bool,

    /// Number of cells on the tape
    #[structopt(long)]
    tape_size: Option<usize>,

    /// More logging; repeat for even more
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u8,

    /// Brainfuck source file
    #[structopt(parse(from_os_str), required_unless = "list")]
    input: Option<PathBuf>,

    /// Where to put the executable
    #[structopt(parse(from_os_str), default_value = "a.out")]
    output: PathBuf,
}

fn main() {
    let opt = Opt::from_args();
    init_logging(opt.verbose);

    if let Err(e) = run(opt) {
        eprintln!("error: {:#}", e);
        process::exit(1);
    }
}

fn run(opt: Opt) -> anyhow::Result<()> {
    let mut config = Config::from_env();
    config.debug |= opt.debug;
    config.cleanup |= opt.cleanup;
    config.compile = !opt.no_compile;
    if let Some(tape_size) = opt.tape_size {
        config.tape_size = tape_size;
    }

    let registry = Registry::with_builtins(&config);

    if opt.list {
        for name in registry.available() {
            println!("{}", name);
        }
        return Ok(());
    }

    let input = opt.input.ok_or_else(|| anyhow!("no input file given"))?;
    let source = fs::read_to_string(&input)
        .with_context(|| format!("failed to read input file {}", input.display()))?;

    if opt.tokens {
        print!("{}", tokenize(source.as_bytes()).disassemble());
        return Ok(());
    }

    let backend = match registry.get(&opt.backend) {
        Some(backend) => backend,
        None => bail!(
            "unknown backend '{}'; available: {}",
            opt.backend,
            registry.available().join(", ")
        ),
    };

    debug!(backend = %opt.backend, input = %input.display(), "generating");
    backend.generate(&source, &opt.output)?;

    if opt.run && config.compile && opt.backend != "interpreter" {
        run_executable(&opt.output)?;
    }

    Ok(())
}

fn run_executable(path: &Path) -> anyhow::Result<()> {
    // a bare file name would be looked up in $PATH
    let path = if path.components().count() == 1 {
        Path::new(".").join(path)
    } else {
        path.to_path_buf()
    };

    let status = Command::new(&path)
        .status()
        .with_context(|| format!("failed to launch {}", path.display()))?;
    if !status.success() {
        bail!("{} exited with {}", path.display(), status);
    }

    Ok(())
}

/// Plain `LEVEL message` lines on stderr; stdout belongs to the program.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .without_time()
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

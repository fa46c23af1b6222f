//! Defines [Backend], which turns source text into something runnable, regardless of how it's
//! implemented.

use std::fs;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::codegen::c::CEmitter;
use crate::codegen::generate_source;
use crate::codegen::x86_64::NasmEmitter;
use crate::config::Config;
use crate::errors::Result;
use crate::interpreter::Interpreter;
use crate::parsing::tokenize;
use crate::toolchain;

/// Something that can take a Brainfuck program and do something useful with it.
pub trait Backend {
    /// Builds an executable from `source` at `output`, or, for the interpreter, runs it.
    fn generate(&self, source: &str, output: &Path) -> Result<()>;
}

/// Runs the program right away, using stdin and stdout. Ignores the output path.
pub struct InterpreterBackend {
    config: Config,
}

/// Compiles through C, using `gcc` (or `$CC`).
pub struct CBackend {
    config: Config,
}

/// Compiles through x86-64 assembly, using `nasm` and `ld`.
pub struct AsmBackend {
    config: Config,
}

impl InterpreterBackend {
    pub fn new(config: Config) -> Self {
        InterpreterBackend { config }
    }
}

impl CBackend {
    pub fn new(config: Config) -> Self {
        CBackend { config }
    }
}

impl AsmBackend {
    pub fn new(config: Config) -> Self {
        AsmBackend { config }
    }
}

impl Backend for InterpreterBackend {
    fn generate(&self, source: &str, _output: &Path) -> Result<()> {
        self.config.validate()?;
        let program = tokenize(source.as_bytes());
        let stdin = io::stdin();
        let stdout = io::stdout();

        let mut interpreter = Interpreter::new(
            self.config.tape_size,
            stdin.lock(),
            BufWriter::new(stdout.lock()),
        );
        interpreter.execute(&program)
    }
}

impl Backend for CBackend {
    fn generate(&self, source: &str, output: &Path) -> Result<()> {
        self.config.validate()?;
        let program = tokenize(source.as_bytes());
        let c_source = generate_source(&program, CEmitter::new(self.config.tape_size))?;

        let c_path = with_suffix(output, "c");
        fs::write(&c_path, c_source)?;
        debug!(path = %c_path.display(), "wrote C source");
        if !self.config.compile {
            info!("generated C source at {}", c_path.display());
            return Ok(());
        }

        toolchain::compile_c(&self.config.cc, &c_path, output)?;
        clean_up(&self.config, &[c_path])
    }
}

impl Backend for AsmBackend {
    fn generate(&self, source: &str, output: &Path) -> Result<()> {
        self.config.validate()?;
        let program = tokenize(source.as_bytes());
        let emitter = NasmEmitter::new(self.config.tape_size).with_breakpoint(self.config.debug);
        let asm_source = generate_source(&program, emitter)?;

        let asm_path = with_suffix(output, "s");
        fs::write(&asm_path, asm_source)?;
        debug!(path = %asm_path.display(), "wrote assembly source");
        if !self.config.compile {
            info!("generated assembly source at {}", asm_path.display());
            return Ok(());
        }

        let object_path = with_suffix(output, "o");

        toolchain::assemble(&self.config.nasm, &asm_path, &object_path)?;
        toolchain::link(&self.config.ld, &object_path, output)?;
        clean_up(&self.config, &[asm_path, object_path])
    }
}

/// `a.out` becomes `a.out.c`: the suffix is appended, never substituted.
pub fn with_suffix(output: &Path, suffix: &str) -> PathBuf {
    let mut path = output.as_os_str().to_owned();
    path.push(".");
    path.push(suffix);
    PathBuf::from(path)
}

fn clean_up(config: &Config, intermediates: &[PathBuf]) -> Result<()> {
    for path in intermediates {
        if config.cleanup {
            fs::remove_file(path)?;
        } else {
            info!("generated intermediate file at {}", path.display());
        }
    }
    Ok(())
}

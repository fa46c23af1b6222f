//! Knobs shared by every backend.

use std::env;

use crate::errors::{Error, Result};

/// Number of cells on the tape unless told otherwise.
pub const DEFAULT_TAPE_SIZE: usize = 30_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Cells available to the program.
    pub tape_size: usize,
    /// Run the external toolchain. When off, only the generated source is written.
    pub compile: bool,
    /// Delete the generated `.c`/`.s`/`.o` files once the executable is built.
    pub cleanup: bool,
    /// Put a breakpoint right after the assembly prologue.
    pub debug: bool,
    /// C compiler used by the `c` backend.
    pub cc: String,
    /// Assembler used by the `asm` backend.
    pub nasm: String,
    /// Linker used by the `asm` backend.
    pub ld: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tape_size: DEFAULT_TAPE_SIZE,
            compile: true,
            cleanup: false,
            debug: false,
            cc: String::from("gcc"),
            nasm: String::from("nasm"),
            ld: String::from("ld"),
        }
    }
}

impl Config {
    /// Defaults, overridden by `CLEANUP=1`, `DEBUG=1` and `CC`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Rejects settings no backend can work with: a program always has at least one cell.
    pub fn validate(&self) -> Result<()> {
        if self.tape_size == 0 {
            return Err(Error::TapeOutOfRange { cursor: 0, len: 0 });
        }
        Ok(())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Config::default();
        let enabled = |key: &str| lookup(key).map(|v| v == "1").unwrap_or(false);

        config.cleanup = enabled("CLEANUP");
        config.debug = enabled("DEBUG");
        if let Some(cc) = lookup("CC").filter(|cc| !cc.is_empty()) {
            config.cc = cc;
        }

        config
    }
}

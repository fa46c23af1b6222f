//! bfcc internals.
//!
//! A Brainfuck program goes through the following steps:
//!
//!  - source text is tokenized into a [Program], merging runs of `<>+-` into a single [Token]
//!    with a repeat count;
//!  - the [Program] is handed to a [Backend], picked by name from the [Registry]:
//!     - `interpreter` runs it directly;
//!     - `c` generates C and hands it to `gcc`;
//!     - `asm` generates x86-64 assembly and hands it to `nasm` and `ld`.
//!
//! There is no syntax tree. Loops are matched on the fly, either with a stack of labels while
//! generating code, or by scanning for the partner bracket while interpreting (see [brackets]).

pub mod backend;
pub mod brackets;
pub mod codegen;
pub mod config;
pub mod errors;
pub mod interpreter;
pub mod parsing;
pub mod program;
pub mod registry;
pub mod toolchain;

mod asm;

pub use crate::backend::Backend;
pub use crate::config::Config;
pub use crate::errors::{CompilationError, Error, Result};
pub use crate::interpreter::Interpreter;
pub use crate::parsing::{tokenize, Lexer};
pub use crate::program::{Opcode, Program, Token};
pub use crate::registry::Registry;

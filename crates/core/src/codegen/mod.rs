//! Generates source code for a given program.
//!
//! Both targets share the same single pass over the tokens: loops are paired with a
//! [LabelStack] as they're emitted, and `[-]` is rewritten into a plain "set the cell to zero".
//! An [Emitter] decides what text each of those steps turns into.

pub mod c;
pub mod x86_64;

use tracing::debug;

use crate::brackets::{LabelStack, LoopLabel};
use crate::errors::{CompilationError, Location, Reason};
use crate::program::{Opcode, Program, Token};

/// The target-specific half of code generation.
pub trait Emitter {
    /// Sets up the tape and the cursor.
    fn prologue(&mut self);
    /// `>` (positive) and `<` (negative), already scaled by the repeat count.
    fn move_pointer(&mut self, amount: isize);
    /// `+` (positive) and `-` (negative), already scaled by the repeat count.
    fn change_value(&mut self, amount: isize);
    fn put_char(&mut self);
    fn get_char(&mut self);
    /// Replaces a whole `[-]` loop.
    fn zero_cell(&mut self);
    /// `depth` is the number of enclosing loops, not counting this one.
    fn loop_open(&mut self, label: LoopLabel, depth: usize);
    fn loop_close(&mut self, label: LoopLabel, depth: usize);
    /// Ends the program.
    fn epilogue(&mut self);
    /// Returns the generated source.
    fn finish(self) -> String;
}

/// Runs `emitter` over the whole program and returns the source it produced.
///
/// Nothing is returned for a program with unbalanced brackets.
pub fn generate_source<E: Emitter>(
    program: &Program,
    mut emitter: E,
) -> Result<String, CompilationError> {
    let tokens = program.tokens();
    let mut labels = LabelStack::new();
    let mut offset = 0;

    emitter.prologue();

    while offset < tokens.len() {
        let token = tokens[offset];
        match token.op {
            Opcode::IncrementAddr => emitter.move_pointer(token.repeat as isize),
            Opcode::DecrementAddr => emitter.move_pointer(-(token.repeat as isize)),
            Opcode::IncrementVal => emitter.change_value(token.repeat as isize),
            Opcode::DecrementVal => emitter.change_value(-(token.repeat as isize)),
            Opcode::PutChar => emitter.put_char(),
            Opcode::GetChar => emitter.get_char(),
            Opcode::StartLoop => {
                if is_zeroing_loop(&tokens[offset..]) {
                    emitter.zero_cell();
                    offset += 3;
                    continue;
                }

                let depth = labels.depth();
                let label = labels.open();
                emitter.loop_open(label, depth);
            }
            Opcode::EndLoop => {
                let label = labels.close(Location::new(offset))?;
                emitter.loop_close(label, labels.depth());
            }
            Opcode::Eof => {
                return Err(CompilationError::new(
                    Reason::UnknownToken,
                    Location::new(offset),
                ))
            }
        }

        offset += 1;
    }

    labels.finish()?;
    emitter.epilogue();

    debug!(instructions = tokens.len(), "generated source");
    Ok(emitter.finish())
}

/// Is this `[-]`?
fn is_zeroing_loop(tokens: &[Token]) -> bool {
    matches!(
        tokens,
        [
            Token {
                op: Opcode::StartLoop,
                ..
            },
            Token {
                op: Opcode::DecrementVal,
                repeat: 1
            },
            Token {
                op: Opcode::EndLoop,
                ..
            },
            ..
        ]
    )
}

/// Which way a cell adjustment goes, and by how much, modulo 256.
///
/// Returns `None` if the adjustment is a no-op.
pub(crate) fn cell_adjustment(amount: isize) -> Option<(Direction, u8)> {
    let magnitude = (amount.unsigned_abs() % 256) as u8;
    match (magnitude, amount > 0) {
        (0, _) => None,
        (m, true) => Some((Direction::Up, m)),
        (m, false) => Some((Direction::Down, m)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Up,
    Down,
}

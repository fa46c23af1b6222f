//! Matches `[` with `]`.
//!
//! There are two ways to do this, and both are used:
//!
//!  - the code generators walk the program once, pushing a fresh [LoopLabel] on every `[` and
//!    popping it on every `]` ([LabelStack]);
//!  - the interpreter only needs a partner when it actually jumps, so it scans for it with a depth
//!    counter ([matching_close], [matching_open]) and remembers the answer ([JumpTable]).

use crate::errors::{CompilationError, Location, Reason};
use crate::program::{Opcode, Token};

/// An ID shared by a `[` and its `]`. Allocated in increasing order.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoopLabel(pub usize);

/// Labels of the loops that are currently open, innermost last.
#[derive(Debug, Default)]
pub struct LabelStack {
    stack: Vec<LoopLabel>,
    next_id: usize,
}

/// Lazily filled map from a bracket's position to its partner's position.
#[derive(Debug)]
pub struct JumpTable {
    targets: Vec<Option<usize>>,
}

// public functions

/// Scans forward from the `[` at `open` and returns the position of its `]`.
pub fn matching_close(tokens: &[Token], open: usize) -> Result<usize, CompilationError> {
    let mut depth = 1usize;
    let mut position = open;

    while depth != 0 {
        position += 1;
        match tokens.get(position).map(|t| t.op) {
            Some(Opcode::StartLoop) => depth += 1,
            Some(Opcode::EndLoop) => depth -= 1,
            Some(_) => (),
            None => {
                return Err(CompilationError::new(
                    Reason::NotEnoughCloseBrackets,
                    Location::new(open),
                ))
            }
        }
    }

    Ok(position)
}

/// Scans backward from the `]` at `close` and returns the position of its `[`.
pub fn matching_open(tokens: &[Token], close: usize) -> Result<usize, CompilationError> {
    let mut depth = 1usize;
    let mut position = close;

    while depth != 0 {
        if position == 0 {
            return Err(CompilationError::new(
                Reason::TooManyCloseBrackets,
                Location::new(close),
            ));
        }
        position -= 1;
        match tokens[position].op {
            Opcode::EndLoop => depth += 1,
            Opcode::StartLoop => depth -= 1,
            _ => (),
        }
    }

    Ok(position)
}

/// Pairs every `[` with its `]` using a [LabelStack]. Returned in order of the `]`.
pub fn pairs(tokens: &[Token]) -> Result<Vec<(usize, usize)>, CompilationError> {
    let mut labels = LabelStack::new();
    // indexed by label; labels are handed out 0, 1, 2...
    let mut open_positions = Vec::new();
    let mut result = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        match token.op {
            Opcode::StartLoop => {
                let LoopLabel(id) = labels.open();
                debug_assert_eq!(id, open_positions.len());
                open_positions.push(i);
            }
            Opcode::EndLoop => {
                let LoopLabel(id) = labels.close(Location::new(i))?;
                result.push((open_positions[id], i));
            }
            _ => (),
        }
    }

    labels.finish()?;
    Ok(result)
}

/// Checks that the brackets are balanced.
pub fn validate(tokens: &[Token]) -> Result<(), CompilationError> {
    pairs(tokens).map(|_| ())
}

// Implementations

impl LabelStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a new label for a `[` and makes it the innermost open loop.
    pub fn open(&mut self) -> LoopLabel {
        let label = LoopLabel(self.next_id);
        self.next_id += 1;
        self.stack.push(label);

        label
    }

    /// Closes the innermost open loop, returning its label.
    pub fn close(&mut self, location: Location) -> Result<LoopLabel, CompilationError> {
        self.stack
            .pop()
            .ok_or_else(|| CompilationError::new(Reason::TooManyCloseBrackets, location))
    }

    /// How many loops are currently open.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Call once the whole program has been seen. Fails if a loop was never closed.
    pub fn finish(&self) -> Result<(), CompilationError> {
        if self.stack.is_empty() {
            Ok(())
        } else {
            Err(CompilationError::without_location(
                Reason::NotEnoughCloseBrackets,
            ))
        }
    }
}

impl JumpTable {
    pub fn new(len: usize) -> Self {
        JumpTable {
            targets: vec![None; len],
        }
    }

    /// Returns the partner of the bracket at `position`, scanning only the first time.
    pub fn resolve(&mut self, tokens: &[Token], position: usize) -> Result<usize, CompilationError> {
        if let Some(target) = self.targets[position] {
            return Ok(target);
        }

        let target = match tokens[position].op {
            Opcode::StartLoop => matching_close(tokens, position)?,
            Opcode::EndLoop => matching_open(tokens, position)?,
            _ => {
                return Err(CompilationError::new(
                    Reason::UnknownToken,
                    Location::new(position),
                ))
            }
        };

        self.targets[position] = Some(target);
        self.targets[target] = Some(position);

        Ok(target)
    }
}

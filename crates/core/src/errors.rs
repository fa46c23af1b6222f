//! All errors that can be _generated_ by the compiler, the interpreter, or the toolchain.
use std::fmt;
use std::io;

/// Anything that can go wrong while generating or running a program.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Compilation(#[from] CompilationError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("runtime error: cursor moved to cell {cursor}, outside the tape (0..{len})")]
    TapeOutOfRange { cursor: isize, len: usize },

    #[error("`{command}` failed: {message}")]
    Toolchain { command: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Any error that occurs as a result of compiling the source code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationError {
    reason: Reason,
    location: Option<Location>,
}

/// Where in the token stream the error was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    instruction: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    TooManyCloseBrackets,
    NotEnoughCloseBrackets,
    UnknownToken,
}

impl CompilationError {
    pub fn new(reason: Reason, location: Location) -> Self {
        CompilationError {
            reason,
            location: Some(location),
        }
    }

    pub fn without_location(reason: Reason) -> Self {
        CompilationError {
            reason,
            location: None,
        }
    }

    pub fn reason(&self) -> Reason {
        self.reason
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn message(&self) -> &'static str {
        self.reason.message()
    }

    pub fn message_identifier(&self) -> u32 {
        self.reason.message_identifier()
    }

    /// Unbalanced brackets, as opposed to an internal error.
    pub fn is_malformed_program(&self) -> bool {
        matches!(
            self.reason,
            Reason::TooManyCloseBrackets | Reason::NotEnoughCloseBrackets
        )
    }
}

impl Reason {
    pub fn message_identifier(&self) -> u32 {
        use Reason::*;
        match self {
            TooManyCloseBrackets => 0x001,
            NotEnoughCloseBrackets => 0x002,
            UnknownToken => 0x003,
        }
    }

    pub fn message(&self) -> &'static str {
        use Reason::*;
        match self {
            TooManyCloseBrackets => "too many ']' brackets. Check that each '[' has a matching ']'",
            NotEnoughCloseBrackets => {
                "too many '[' brackets. Check that each '[' has a matching ']'"
            }
            UnknownToken => "internal error: unexpected token in the instruction stream",
        }
    }
}

impl Location {
    pub fn new(instruction: usize) -> Self {
        Location { instruction }
    }

    pub fn instruction(&self) -> usize {
        self.instruction
    }
}

impl Error {
    /// Returns the [CompilationError], if that's what this is.
    pub fn as_compilation_error(&self) -> Option<&CompilationError> {
        match self {
            Error::Compilation(e) => Some(e),
            _ => None,
        }
    }
}

impl std::error::Error for CompilationError {}

impl fmt::Display for CompilationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let location = self
            .location
            .as_ref()
            .map(|l| format!(" {}:", l))
            .unwrap_or_else(|| String::from(""));

        write!(
            f,
            "error[{:04x}]:{} {}",
            self.message_identifier(),
            location,
            self.message()
        )
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "instruction {}", self.instruction)
    }
}

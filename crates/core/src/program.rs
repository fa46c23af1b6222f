//! Defines the [Program]: a flat list of [Token]s that every backend consumes.

use std::fmt;

/// The closed set of Brainfuck instructions, plus the end-of-input marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// `>`
    IncrementAddr,
    /// `<`
    DecrementAddr,
    /// `+`
    IncrementVal,
    /// `-`
    DecrementVal,
    /// `.`
    PutChar,
    /// `,`
    GetChar,
    /// `[`
    StartLoop,
    /// `]`
    EndLoop,
    /// Returned by the lexer once the input is exhausted. Never part of a valid [Program].
    Eof,
}

/// One instruction and how many times in a row it appeared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub op: Opcode,
    pub repeat: usize,
}

/// A tokenized program. Loop structure is implicit: find it by matching brackets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    tokens: Vec<Token>,
}

impl Opcode {
    /// Maps a source byte to its opcode. Anything else is a comment.
    pub fn from_byte(byte: u8) -> Option<Opcode> {
        use Opcode::*;
        match byte {
            b'>' => Some(IncrementAddr),
            b'<' => Some(DecrementAddr),
            b'+' => Some(IncrementVal),
            b'-' => Some(DecrementVal),
            b'.' => Some(PutChar),
            b',' => Some(GetChar),
            b'[' => Some(StartLoop),
            b']' => Some(EndLoop),
            _ => None,
        }
    }

    /// The source character for this opcode. `Eof` has none.
    pub fn symbol(self) -> Option<char> {
        use Opcode::*;
        match self {
            IncrementAddr => Some('>'),
            DecrementAddr => Some('<'),
            IncrementVal => Some('+'),
            DecrementVal => Some('-'),
            PutChar => Some('.'),
            GetChar => Some(','),
            StartLoop => Some('['),
            EndLoop => Some(']'),
            Eof => None,
        }
    }

    /// Whether consecutive occurrences compose additively and can be merged into one token.
    pub fn is_mergeable(self) -> bool {
        use Opcode::*;
        matches!(
            self,
            IncrementAddr | DecrementAddr | IncrementVal | DecrementVal
        )
    }
}

impl Token {
    pub fn new(op: Opcode, repeat: usize) -> Self {
        Token { op, repeat }
    }

    /// A token for a single occurrence of `op`.
    pub fn single(op: Opcode) -> Self {
        Token { op, repeat: 1 }
    }

    pub fn eof() -> Self {
        Token::single(Opcode::Eof)
    }

    pub fn is_eof(&self) -> bool {
        self.op == Opcode::Eof
    }
}

impl Program {
    /// Wraps an already tokenized sequence. Prefer [crate::parsing::tokenize].
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        Program { tokens }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens[..]
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Prints one token per line, prefixed with its position.
    pub fn disassemble(&self) -> String {
        let mut listing = String::new();
        for (i, token) in self.tokens.iter().enumerate() {
            listing.push_str(&format!("{:4}: {:?} x{}\n", i, token.op, token.repeat));
        }
        listing
    }
}

/// Writes the token back out as source text, e.g. `<<<<<` for `DecrementAddr x5`.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.op.symbol() {
            Some(c) => {
                for _ in 0..self.repeat {
                    write!(f, "{}", c)?;
                }
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for token in self.tokens.iter() {
            write!(f, "{}", token)?;
        }
        Ok(())
    }
}

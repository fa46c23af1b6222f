//! Turns source text into [Token]s.
//!
//! Anything that isn't one of the eight instructions is a comment and is thrown away before we
//! look for runs, so `+ + +` and `+\n++` both become a single `+` token with a count of 3.

use tracing::debug;

use crate::program::{Opcode, Program, Token};

/// A pull-based lexer. Call [Lexer::next_token] until it returns [Opcode::Eof].
pub struct Lexer {
    // only the instruction characters; comments are gone already
    input: Vec<Opcode>,
    position: usize,
}

// public functions

/// Tokenizes the entire source text at once.
pub fn tokenize(source_text: &[u8]) -> Program {
    let tokens: Vec<Token> = Lexer::new(source_text).collect();
    debug!(
        bytes = source_text.len(),
        tokens = tokens.len(),
        "tokenized program"
    );

    Program::from_tokens(tokens)
}

// Implementations

impl Lexer {
    pub fn new(source_text: &[u8]) -> Self {
        Lexer {
            input: source_text
                .iter()
                .filter_map(|&byte| Opcode::from_byte(byte))
                .collect(),
            position: 0,
        }
    }

    /// Returns the next token, merging runs of `<`, `>`, `+` and `-`.
    ///
    /// Once the input is exhausted, this returns [Opcode::Eof] on every call.
    pub fn next_token(&mut self) -> Token {
        let op = match self.input.get(self.position) {
            Some(&op) => op,
            None => return Token::eof(),
        };

        if !op.is_mergeable() {
            self.position += 1;
            return Token::single(op);
        }

        let begin = self.position;
        while self.input.get(self.position) == Some(&op) {
            self.position += 1;
        }

        Token::new(op, self.position - begin)
    }
}

impl Iterator for Lexer {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let token = self.next_token();
        if token.is_eof() {
            None
        } else {
            Some(token)
        }
    }
}

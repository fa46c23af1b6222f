//! Runs a [Program] directly, with no code generation at all.
//!
//! Since this is platform-independent code, it will run anywhere, unlike the generated
//! assembly! It's a lot slower though.

use std::io::{Read, Write};

use tracing::debug;

use crate::brackets::{validate, JumpTable};
use crate::errors::{CompilationError, Error, Location, Reason, Result};
use crate::program::{Opcode, Program};

/// Executes a [Program] against its own tape, reading from `R` and writing to `W`.
pub struct Interpreter<R, W> {
    tape: Vec<u8>,
    cursor: usize,
    input: R,
    output: W,
}

impl<R: Read, W: Write> Interpreter<R, W> {
    pub fn new(tape_size: usize, input: R, output: W) -> Self {
        Interpreter {
            tape: vec![0; tape_size],
            cursor: 0,
            input,
            output,
        }
    }

    /// Runs the program to completion. The tape is zeroed first.
    ///
    /// Unbalanced brackets are reported before anything is executed. The cursor may never leave
    /// the tape; doing so stops the program with [Error::TapeOutOfRange]. A tape with no cells
    /// at all is rejected the same way, before running.
    pub fn execute(&mut self, program: &Program) -> Result<()> {
        let tokens = program.tokens();
        validate(tokens)?;
        if self.tape.is_empty() {
            return Err(Error::TapeOutOfRange { cursor: 0, len: 0 });
        }

        self.tape.iter_mut().for_each(|cell| *cell = 0);
        self.cursor = 0;

        debug!(instructions = tokens.len(), "interpreting");
        let outcome = self.run(program);

        // a failed run takes precedence over a failed flush
        let flushed = self.output.flush().map_err(Error::from);
        outcome.and(flushed)
    }

    /// The tape as the program left it.
    pub fn tape(&self) -> &[u8] {
        &self.tape[..]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Gives back the output sink, e.g. to inspect what was written.
    pub fn into_output(self) -> W {
        self.output
    }

    fn run(&mut self, program: &Program) -> Result<()> {
        let tokens = program.tokens();
        let mut jumps = JumpTable::new(tokens.len());
        let mut program_counter = 0;

        while program_counter < tokens.len() {
            let token = tokens[program_counter];
            program_counter = match token.op {
                Opcode::IncrementAddr => {
                    self.move_cursor(token.repeat as isize)?;
                    program_counter + 1
                }
                Opcode::DecrementAddr => {
                    self.move_cursor(-(token.repeat as isize))?;
                    program_counter + 1
                }
                Opcode::IncrementVal => {
                    let cell = &mut self.tape[self.cursor];
                    *cell = cell.wrapping_add(token.repeat as u8);
                    program_counter + 1
                }
                Opcode::DecrementVal => {
                    let cell = &mut self.tape[self.cursor];
                    *cell = cell.wrapping_sub(token.repeat as u8);
                    program_counter + 1
                }
                Opcode::PutChar => {
                    self.output.write_all(&[self.tape[self.cursor]])?;
                    program_counter + 1
                }
                Opcode::GetChar => {
                    // anything printed so far has to be visible while we block
                    self.output.flush()?;
                    let mut one_byte = [0u8];
                    self.input.read_exact(&mut one_byte)?;
                    self.tape[self.cursor] = one_byte[0];
                    program_counter + 1
                }
                // land just past the partner bracket either way
                Opcode::StartLoop => {
                    if self.tape[self.cursor] == 0 {
                        jumps.resolve(tokens, program_counter)? + 1
                    } else {
                        program_counter + 1
                    }
                }
                Opcode::EndLoop => {
                    if self.tape[self.cursor] != 0 {
                        jumps.resolve(tokens, program_counter)? + 1
                    } else {
                        program_counter + 1
                    }
                }
                Opcode::Eof => {
                    return Err(CompilationError::new(
                        Reason::UnknownToken,
                        Location::new(program_counter),
                    )
                    .into())
                }
            };
        }

        Ok(())
    }

    fn move_cursor(&mut self, amount: isize) -> Result<()> {
        let address = self.cursor as isize + amount;

        if address < 0 || address as usize >= self.tape.len() {
            return Err(Error::TapeOutOfRange {
                cursor: address,
                len: self.tape.len(),
            });
        }

        self.cursor = address as usize;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::tokenize;
    use crate::program::Token;
    use std::cell::RefCell;
    use std::io::{self, BufWriter, Cursor};
    use std::rc::Rc;

    /// Output sink whose contents can be looked at while the interpreter still owns it.
    #[derive(Clone, Default)]
    struct Terminal(Rc<RefCell<Vec<u8>>>);

    impl Write for Terminal {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Input that records what the terminal showed when the program asked for a byte.
    struct Keyboard {
        terminal: Terminal,
        seen: Rc<RefCell<Vec<Vec<u8>>>>,
        key: u8,
    }

    impl Read for Keyboard {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.seen
                .borrow_mut()
                .push(self.terminal.0.borrow().clone());
            buf[0] = self.key;
            Ok(1)
        }
    }

    /// Accepts writes but can never flush them.
    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    fn run(source: &str, input: &[u8]) -> Result<(Vec<u8>, Vec<u8>)> {
        let program = tokenize(source.as_bytes());
        let mut interpreter = Interpreter::new(64, Cursor::new(input.to_vec()), Vec::new());
        interpreter.execute(&program)?;
        let tape = interpreter.tape().to_vec();

        Ok((interpreter.into_output(), tape))
    }

    #[test]
    fn prints_eight() {
        let (output, _) = run("++++++++.", b"").unwrap();
        assert_eq!(vec![8u8], output);
    }

    #[test]
    fn echoes_input() {
        let (output, _) = run(",++.", b"a").unwrap();
        assert_eq!(b"c".to_vec(), output);
    }

    #[test]
    fn skips_loop_when_cell_is_zero() {
        let (output, tape) = run("[+++.]>+", b"").unwrap();
        assert!(output.is_empty());
        assert_eq!(&[0, 1], &tape[..2]);
    }

    #[test]
    fn moves_value_with_a_loop() {
        let (output, tape) = run("+++[>+<-]>.", b"").unwrap();
        assert_eq!(vec![3u8], output);
        assert_eq!(&[0, 3], &tape[..2]);
    }

    #[test]
    fn nested_loops_with_sibling_inner_loops() {
        // cell0 counts the outer loop; each pass adds 2 to cell1 and 3 to cell2 by draining the
        // temporaries in cells 3 and 4.
        let source = "+++[>>>++[<<+>>-]>+++[<<+>>-]<<<<-]";
        let (_, tape) = run(source, b"").unwrap();

        assert_eq!(&[0, 6, 9, 0, 0], &tape[..5]);
    }

    #[test]
    fn cells_wrap() {
        let (_, tape) = run("-", b"").unwrap();
        assert_eq!(255, tape[0]);

        let source = "+".repeat(257);
        let (_, tape) = run(&source, b"").unwrap();
        assert_eq!(1, tape[0]);
    }

    #[test]
    fn hello_world() {
        let source = "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.";
        let (output, _) = run(source, b"").unwrap();
        assert_eq!(b"Hello World!\n".to_vec(), output);
    }

    #[test]
    fn unmatched_close_is_rejected_before_running() {
        let program = tokenize(b"+.]");
        let mut interpreter = Interpreter::new(8, Cursor::new(Vec::new()), Vec::new());
        let err = interpreter.execute(&program).unwrap_err();
        let compilation = err.as_compilation_error().expect("compilation error");

        assert_eq!(Reason::TooManyCloseBrackets, compilation.reason());
        assert!(interpreter.into_output().is_empty());
    }

    #[test]
    fn prompt_is_visible_before_reading() {
        let terminal = Terminal::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let keyboard = Keyboard {
            terminal: terminal.clone(),
            seen: Rc::clone(&seen),
            key: b'x',
        };

        let source = format!("{}.,.", "+".repeat(62));
        let mut interpreter = Interpreter::new(8, keyboard, BufWriter::new(terminal.clone()));
        interpreter.execute(&tokenize(source.as_bytes())).unwrap();

        assert_eq!(vec![b">".to_vec()], *seen.borrow());
        assert_eq!(b">x".to_vec(), *terminal.0.borrow());
    }

    #[test]
    fn empty_tape_is_out_of_range() {
        let mut interpreter = Interpreter::new(0, Cursor::new(Vec::new()), Vec::new());

        assert!(matches!(
            interpreter.execute(&tokenize(b"+")),
            Err(Error::TapeOutOfRange { cursor: 0, len: 0 })
        ));
    }

    #[test]
    fn run_error_wins_over_flush_error() {
        let mut interpreter = Interpreter::new(8, Cursor::new(Vec::new()), BrokenPipe);
        assert!(matches!(
            interpreter.execute(&tokenize(b"<")),
            Err(Error::TapeOutOfRange { cursor: -1, len: 8 })
        ));

        assert!(matches!(
            interpreter.execute(&tokenize(b"+.")),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn missing_input_is_an_io_error() {
        assert!(matches!(run(",", b""), Err(Error::Io(_))));
    }

    #[test]
    fn cursor_cannot_leave_the_tape() {
        assert!(matches!(
            run("<", b""),
            Err(Error::TapeOutOfRange { cursor: -1, len: 64 })
        ));
        assert!(matches!(
            run(&">".repeat(64), b""),
            Err(Error::TapeOutOfRange { cursor: 64, .. })
        ));
    }

    #[test]
    fn eof_inside_program_is_an_internal_error() {
        let program = Program::from_tokens(vec![Token::single(Opcode::IncrementVal), Token::eof()]);
        let mut interpreter = Interpreter::new(8, Cursor::new(Vec::new()), Vec::new());
        let err = interpreter.execute(&program).unwrap_err();

        assert_eq!(
            Some(Reason::UnknownToken),
            err.as_compilation_error().map(|e| e.reason())
        );
    }

    #[test]
    fn runs_twice_from_a_fresh_tape() {
        let program = tokenize(b"+++.");
        let mut interpreter = Interpreter::new(8, Cursor::new(Vec::new()), Vec::new());
        interpreter.execute(&program).unwrap();
        interpreter.execute(&program).unwrap();

        assert_eq!(vec![3u8, 3], interpreter.into_output());
    }
}

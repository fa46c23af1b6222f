//! Emits the program as a C translation unit.
//!
//! The generated code does no bounds checking: moving the cursor off either end of `array` is
//! undefined behaviour, just like in any other Brainfuck compiler.

use std::fmt::Write;

use crate::brackets::LoopLabel;
use crate::codegen::{cell_adjustment, Direction, Emitter};

/// Writes C source that `gcc` can turn into a static executable.
pub struct CEmitter {
    source: String,
    tape_size: usize,
    depth: usize,
}

impl CEmitter {
    pub fn new(tape_size: usize) -> Self {
        CEmitter {
            source: String::new(),
            tape_size,
            depth: 0,
        }
    }

    fn statement(&mut self, args: std::fmt::Arguments) {
        let indent = 2 * (self.depth + 1);
        let _ = writeln!(self.source, "{:indent$}{}", "", args, indent = indent);
    }
}

impl Emitter for CEmitter {
    fn prologue(&mut self) {
        let _ = write!(
            self.source,
            "extern int putchar(int);\n\
             extern int getchar(void);\n\
             \n\
             unsigned char array[{}];\n\
             int idx = 0;\n\
             \n\
             int main(int argc, char *argv[]) {{\n",
            self.tape_size
        );
    }

    fn move_pointer(&mut self, amount: isize) {
        match amount {
            0 => (),
            n if n > 0 => self.statement(format_args!("idx += {};", n)),
            n => self.statement(format_args!("idx -= {};", n.unsigned_abs())),
        }
    }

    fn change_value(&mut self, amount: isize) {
        match cell_adjustment(amount) {
            Some((Direction::Up, n)) => self.statement(format_args!("array[idx] += {};", n)),
            Some((Direction::Down, n)) => self.statement(format_args!("array[idx] -= {};", n)),
            None => (),
        }
    }

    fn put_char(&mut self) {
        self.statement(format_args!("putchar(array[idx]);"));
    }

    fn get_char(&mut self) {
        self.statement(format_args!("array[idx] = getchar();"));
    }

    fn zero_cell(&mut self) {
        self.statement(format_args!("array[idx] = 0;"));
    }

    fn loop_open(&mut self, _label: LoopLabel, depth: usize) {
        self.depth = depth;
        self.statement(format_args!("while (array[idx]) {{"));
        self.depth = depth + 1;
    }

    fn loop_close(&mut self, _label: LoopLabel, depth: usize) {
        self.depth = depth;
        self.statement(format_args!("}}"));
    }

    fn epilogue(&mut self) {
        self.depth = 0;
        self.statement(format_args!("return 0;"));
        self.source.push_str("}\n");
    }

    fn finish(self) -> String {
        self.source
    }
}

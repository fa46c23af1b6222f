//! Emits the program as x86-64 NASM assembly for Linux.
//!
//! No libc: I/O and exit go straight through system calls. Like the C output, the cursor is not
//! bounds-checked.

use crate::asm::x86_64::{Label, Reg, Syscall, X86Assembly};
use crate::brackets::LoopLabel;
use crate::codegen::{cell_adjustment, Direction, Emitter};

// REGISTERS:
//
// r8  - current pointer on the "tape" (survives syscalls)
const ADDR: Reg = Reg::R8;
// rdi - file descriptor argument
// rsi - buffer argument (always the current cell)
// rdx - length argument (always 1)
// rax - system call number

const MAX_IMM32: usize = i32::MAX as usize;

/// Writes a NASM source file with a `_start` entry point.
pub struct NasmEmitter {
    asm: X86Assembly,
    tape_size: usize,
    breakpoint: bool,
}

impl NasmEmitter {
    pub fn new(tape_size: usize) -> Self {
        NasmEmitter {
            asm: X86Assembly::new(),
            tape_size,
            breakpoint: false,
        }
    }

    /// Stop in the debugger (`int3`) right after the tape is set up.
    pub fn with_breakpoint(mut self, breakpoint: bool) -> Self {
        self.breakpoint = breakpoint;
        self
    }

    /// read(2)/write(2) exactly one byte at the cursor.
    fn transfer_one_byte(&mut self, call: Syscall, fd: u64) {
        self.asm.mov_imm(Reg::Rdi, fd);
        self.asm.mov(Reg::Rsi, ADDR);
        self.asm.mov_imm(Reg::Rdx, 1);
        self.asm.syscall(call);
    }
}

impl Emitter for NasmEmitter {
    fn prologue(&mut self) {
        self.asm.directive("bits 64");
        self.asm.directive("global _start");
        self.asm.directive("section .bss");
        self.asm.directive(&format!("tape: resb {}", self.tape_size));
        self.asm.directive("section .text");
        self.asm.symbol("_start");
        self.asm.mov_addr(ADDR, "tape");

        if self.breakpoint {
            self.asm.int3();
        }
    }

    fn move_pointer(&mut self, amount: isize) {
        // 64-bit add/sub take a sign-extended imm32, so big moves need several steps
        let mut remaining = amount.unsigned_abs();
        while remaining > 0 {
            let step = remaining.min(MAX_IMM32);
            if amount > 0 {
                self.asm.add64(ADDR, step as u32);
            } else {
                self.asm.sub64(ADDR, step as u32);
            }
            remaining -= step;
        }
    }

    fn change_value(&mut self, amount: isize) {
        match cell_adjustment(amount) {
            Some((Direction::Up, n)) => self.asm.addb(ADDR, n),
            Some((Direction::Down, n)) => self.asm.subb(ADDR, n),
            None => (),
        }
    }

    fn put_char(&mut self) {
        self.transfer_one_byte(Syscall::Write, 1);
    }

    fn get_char(&mut self) {
        self.transfer_one_byte(Syscall::Read, 0);
    }

    fn zero_cell(&mut self) {
        self.asm.movb(ADDR, 0);
    }

    fn loop_open(&mut self, LoopLabel(n): LoopLabel, _depth: usize) {
        self.asm.cmpb(ADDR, 0);
        self.asm.je(Label::Close(n));
        self.asm.set_label_target(Label::Open(n));
    }

    fn loop_close(&mut self, LoopLabel(n): LoopLabel, _depth: usize) {
        self.asm.cmpb(ADDR, 0);
        self.asm.jne(Label::Open(n));
        self.asm.set_label_target(Label::Close(n));
    }

    fn epilogue(&mut self) {
        self.asm.mov_imm(Reg::Rdi, 0);
        self.asm.syscall(Syscall::Exit);
    }

    fn finish(self) -> String {
        self.asm.into_source()
    }
}

//! Writes x86-64 assembly source in NASM syntax.

use std::fmt::Write;

/// A 64-bit general purpose register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg {
    Rax,
    Rdi,
    Rsi,
    Rdx,
    R8,
}

/// A branch label in the assembly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    /// First instruction of a loop body.
    Open(usize),
    /// First instruction after a loop.
    Close(usize),
}

/// Linux x86-64 system call numbers that we need.
#[derive(Debug, Clone, Copy)]
pub enum Syscall {
    Read = 0,
    Write = 1,
    Exit = 60,
}

/// Builds NASM source text, one instruction per line.
#[derive(Debug, Default)]
pub struct X86Assembly {
    text: String,
}

impl X86Assembly {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_source(self) -> String {
        self.text
    }

    // Directives

    /// Anything that isn't an instruction: `global`, `section`, `resb`...
    pub fn directive(&mut self, text: &str) {
        self.line(0, format_args!("{}", text));
    }

    /// Call this before the first instruction of the desired label
    pub fn set_label_target(&mut self, label: Label) {
        self.line(0, format_args!("{}:", label));
    }

    pub fn symbol(&mut self, name: &str) {
        self.line(0, format_args!("{}:", name));
    }

    // Instructions

    /// `mov reg, imm`
    pub fn mov_imm(&mut self, rd: Reg, imm: u64) {
        self.instr(format_args!("mov {}, {}", rd, imm));
    }

    /// `mov reg, symbol`: loads the address of a symbol.
    pub fn mov_addr(&mut self, rd: Reg, symbol: &str) {
        self.instr(format_args!("mov {}, {}", rd, symbol));
    }

    /// `mov reg, reg`
    pub fn mov(&mut self, rd: Reg, rs: Reg) {
        self.instr(format_args!("mov {}, {}", rd, rs));
    }

    /// `add reg, imm`
    pub fn add64(&mut self, rd: Reg, imm: u32) {
        self.instr(format_args!("add {}, {}", rd, imm));
    }

    /// `sub reg, imm`
    pub fn sub64(&mut self, rd: Reg, imm: u32) {
        self.instr(format_args!("sub {}, {}", rd, imm));
    }

    /// `add byte [reg], imm`
    pub fn addb(&mut self, base: Reg, imm: u8) {
        self.instr(format_args!("add byte [{}], {}", base, imm));
    }

    /// `sub byte [reg], imm`
    pub fn subb(&mut self, base: Reg, imm: u8) {
        self.instr(format_args!("sub byte [{}], {}", base, imm));
    }

    /// `mov byte [reg], imm`
    pub fn movb(&mut self, base: Reg, imm: u8) {
        self.instr(format_args!("mov byte [{}], {}", base, imm));
    }

    /// `cmp byte [reg], imm`
    pub fn cmpb(&mut self, base: Reg, imm: u8) {
        self.instr(format_args!("cmp byte [{}], {}", base, imm));
    }

    /// Jump if equal (zero flag set).
    pub fn je(&mut self, label: Label) {
        self.instr(format_args!("je {}", label));
    }

    /// Jump if not equal (zero flag clear).
    pub fn jne(&mut self, label: Label) {
        self.instr(format_args!("jne {}", label));
    }

    /// Sets `rax` to the call number and traps into the kernel.
    ///
    /// Clobbers `rcx` and `r11`.
    pub fn syscall(&mut self, call: Syscall) {
        self.mov_imm(Reg::Rax, call as u64);
        self.instr(format_args!("syscall"));
    }

    /// Breakpoint trap.
    pub fn int3(&mut self) {
        self.instr(format_args!("int3"));
    }

    fn instr(&mut self, args: std::fmt::Arguments) {
        self.line(4, args);
    }

    fn line(&mut self, indent: usize, args: std::fmt::Arguments) {
        // writing to a String can't fail
        let _ = writeln!(self.text, "{:indent$}{}", "", args, indent = indent);
    }
}

impl std::fmt::Display for Reg {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Reg::*;
        let name = match self {
            Rax => "rax",
            Rdi => "rdi",
            Rsi => "rsi",
            Rdx => "rdx",
            R8 => "r8",
        };
        f.write_str(name)
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Label::Open(n) => write!(f, "open_{}", n),
            Label::Close(n) => write!(f, "close_{}", n),
        }
    }
}

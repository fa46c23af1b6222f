//! Runs the external compiler, assembler and linker.

use std::ffi::OsStr;
use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::errors::{Error, Result};

/// Runs `program` with `args` and waits for it. Anything but a zero exit status is an error
/// carrying the tool's own stderr.
pub fn run<S: AsRef<OsStr>>(program: &str, args: &[S]) -> Result<()> {
    let command_line = describe(program, args);
    debug!(command = %command_line, "running");

    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| Error::Toolchain {
            command: command_line.clone(),
            message: format!("could not launch: {}", e),
        })?;

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let message = if stderr.trim().is_empty() {
        format!("exited with {}", output.status)
    } else {
        stderr.trim_end().to_string()
    };

    Err(Error::Toolchain {
        command: command_line,
        message,
    })
}

/// `<cc> -static -O3 -s -o <output> <source>`
pub fn compile_c(cc: &str, source: &Path, output: &Path) -> Result<()> {
    run(
        cc,
        &[
            OsStr::new("-static"),
            OsStr::new("-O3"),
            OsStr::new("-s"),
            OsStr::new("-o"),
            output.as_os_str(),
            source.as_os_str(),
        ],
    )
}

/// `<nasm> -f elf64 -o <object> <source>`
pub fn assemble(nasm: &str, source: &Path, object: &Path) -> Result<()> {
    run(
        nasm,
        &[
            OsStr::new("-f"),
            OsStr::new("elf64"),
            OsStr::new("-o"),
            object.as_os_str(),
            source.as_os_str(),
        ],
    )
}

/// `<ld> -m elf_x86_64 -o <output> <object>`
pub fn link(ld: &str, object: &Path, output: &Path) -> Result<()> {
    run(
        ld,
        &[
            OsStr::new("-m"),
            OsStr::new("elf_x86_64"),
            OsStr::new("-o"),
            output.as_os_str(),
            object.as_os_str(),
        ],
    )
}

fn describe<S: AsRef<OsStr>>(program: &str, args: &[S]) -> String {
    let mut line = String::from(program);
    for arg in args {
        line.push(' ');
        line.push_str(&arg.as_ref().to_string_lossy());
    }
    line
}

//! Assemblers for the native targets.

pub mod x86_64;

//! Platform abstraction layer for report output.
//!
//! Writing reports touches the console and the filesystem. The abstraction lets tests observe
//! and fail those writes without touching either: abstraction (trait) → facade (enum) → real
//! implementation.

mod abstractions;
mod facade;
mod real;

pub(crate) use abstractions::*;
pub(crate) use facade::*;
pub(crate) use real::*;

//! Contains datastructures shared by the `compiler`
//! and whatever runtime consumes its output.
//!
//! - Instructions, opcodes and compiled banks.
//! - Macro name hashing.
//! - Source code representation and span annotations.

pub mod bank;
pub mod hash;
pub mod opcode;
pub mod source;
pub mod span;

pub use bank::{Bank, Macro, StringTable};
pub use hash::{Fnv1a, MacroHash, MacroHasher};
pub use opcode::{Instruction, Opcode};
pub use source::Source;
pub use span::{Span, Spanned};

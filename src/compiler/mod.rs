//! This module contains the compiler implementation.
//!
//! Each step in the compiler pipeline turns one datatype into another.
//! loosely, starting with an `Entry` (name + template):
//!
//! 1. Expanded text: `rule.rs`
//! 2. Tokens:        `lex.rs`
//! 3. Instructions:  `gen.rs`, checking references with `link.rs`
//! 4. Bank:          `driver.rs`
//!
//! There is no tree between the tokens and the instructions,
//! conditionals are resolved by backpatching jumps as the tokens are walked.

pub mod config;
pub mod driver;
pub mod error;
pub mod gen;
pub mod lex;
pub mod link;
pub mod rule;

pub mod syntax;

pub use config::Config;
pub use driver::{Compilation, Compiler, Entry, Stats, Steps};
pub use error::CompileError;
pub use rule::expand;
pub use syntax::Syntax;

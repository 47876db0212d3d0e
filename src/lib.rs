//! # Warbler
//! This repository contains the compiler for Warbler templates,
//! a small macro language for text that is assembled at runtime,
//! such as dialogue lines that depend on the state of a game.
//! If you're looking for the documentation for Warbler's CLI, Aspen,
//! you're not in the right place.
//!
//! ## Compiling templates
//! Add warbler to your `Cargo.toml`:
//! ```toml
//! # make sure it's the latest version
//! warbler = "0.3"
//! ```
//! Then compile some entries into a bank:
//! ```
//! use warbler::{
//!     compiler::rule::{toggle_rule, Delimiters},
//!     Compiler, Config,
//! };
//!
//! let rule = toggle_rule(&Delimiters::new('[', ']'), "friend").unwrap();
//! let mut compiler = Compiler::new(Config::new().recognize("friend").regex(rule));
//!
//! let compilation = compiler
//!     .compile([("greet", "Hello [friend|stranger]")], &[])
//!     .unwrap();
//!
//! assert!(compilation.is_resolved());
//! assert_eq!(compilation.stats.macros, 1);
//! ```
//!
//! ## Overview of the compilation process
//! Templates use three kinds of directives:
//! `$(name)` expands another macro, `#(id)` expands a macro by its hash,
//! and `?(if name)`, `?(elif not name)`, `?(else)`, `?(endif)` build
//! conditional chains. Everything else is literal text.
//!
//! Each entry is first rewritten by the rules of the `Config`,
//! so authors can use shorthand like `[a|b]`.
//! It's then lexed, and compiled in a single pass to a list of
//! `Instruction`s. Macros are referred to by the hash of their name,
//! which allows banks compiled separately to be linked at runtime.

pub mod common;
pub mod compiler;
pub mod construct;

pub use common::{Bank, Instruction, Macro, MacroHash, MacroHasher, Source};
pub use compiler::{Compilation, CompileError, Compiler, Config, Entry, Syntax};

use thiserror::Error;

use crate::{common::hash::MacroHash, compiler::syntax::Syntax};

/// Aborts a whole compilation run.
/// No bank is produced for a run that fails with one of these.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("in entry `{entry}`:\n{error}")]
    Syntax { entry: String, error: Syntax },
    #[error("macro `{name}` hashes to {hash:#010x}, which is already defined in this session")]
    DuplicateMacro { name: String, hash: MacroHash },
}

impl CompileError {
    /// The located error, if this failure came from a template.
    pub fn syntax(&self) -> Option<&Syntax> {
        match self {
            CompileError::Syntax { error, .. } => Some(error),
            CompileError::DuplicateMacro { .. } => None,
        }
    }
}

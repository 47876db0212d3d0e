use crate::common::span::Span;

/// Backpatching state for one open `if` chain.
/// Frames are stacked, so chains may nest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The `if` that opened the chain.
    pub opened: Span,
    /// The conditional jump of the current branch.
    /// Resolved when the next branch or the `endif` is reached.
    pub pending: Option<usize>,
    /// Unconditional jumps out of finished branches,
    /// all resolved to the `endif`.
    pub exits: Vec<usize>,
    /// Set once the chain has an `else`, after which only `endif` may follow.
    pub otherwise: Option<Span>,
}

impl Frame {
    pub fn new(opened: Span) -> Frame {
        Frame {
            opened,
            pending: None,
            exits: vec![],
            otherwise: None,
        }
    }
}

use std::fmt::Display;

use crate::common::span::Spanned;

pub type Tokens = Vec<Spanned<Token>>;

/// These are the different tokens the lexer will output.
/// Names, ids and literals carry their text;
/// everything else is structure.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub enum Token {
    // Openers
    BeginTag,
    BeginMacro,
    BeginMacroById,

    // Conditional keywords
    If,
    Not,
    Elif,
    Else,
    EndIf,

    // Closer shared by every directive
    EndMacroOrTag,

    // Leafs
    Literal(String),
    MacroName(String),
    MacroId(String),
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // pretty formatting for tokens
        // just use debug if you're not printing a message or something.
        use Token::*;
        let message = match self {
            BeginTag => "conditional tag `?(`".to_string(),
            BeginMacro => "macro `$(`".to_string(),
            BeginMacroById => "macro id `#(`".to_string(),
            If => "keyword `if`".to_string(),
            Not => "keyword `not`".to_string(),
            Elif => "keyword `elif`".to_string(),
            Else => "keyword `else`".to_string(),
            EndIf => "keyword `endif`".to_string(),
            EndMacroOrTag => "closing `)`".to_string(),
            Literal(l) => format!("literal {:?}", l),
            MacroName(n) => format!("macro name `{}`", n),
            MacroId(i) => format!("macro id `{}`", i),
        };

        write!(f, "{}", message)
    }
}

use std::fmt;

use crate::common::span::Span;

/// Represents a note attached to a Syntax error,
/// i.e. a location in a template with an optional
/// specific hint or tip corresponding to this specific location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub span: Span,
    pub hint: Option<String>,
}

impl Note {
    pub fn new(span: Span) -> Note {
        Note { span, hint: None }
    }

    pub fn new_with_hint(hint: &str, span: &Span) -> Note {
        Note {
            span: span.clone(),
            hint: Some(hint.to_string()),
        }
    }
}

/// Represents a malformed template found at compile time,
/// such as an unclosed directive or a stray `endif`.
/// Usually, one `Note` per error is enough.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Syntax {
    pub reason: String,
    pub notes: Vec<Note>,
}

impl Syntax {
    /// Creates a new syntax error with a single note that does not have a hint.
    pub fn error(reason: &str, span: &Span) -> Syntax {
        Syntax::error_with_note(reason, Note::new(span.clone()))
    }

    /// Creates a new syntax error with a single note that may or may not have a
    /// hint.
    pub fn error_with_note(reason: &str, note: Note) -> Syntax {
        Syntax {
            reason: reason.to_string(),
            notes: vec![note],
        }
    }

    /// Extend a syntax error by adding another note to the error.
    pub fn add_note(mut self, note: Note) -> Self {
        self.notes.push(note);
        self
    }
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for note in self.notes.iter() {
            let formatted = note.span.format();
            write!(f, "{}", formatted)?;

            if let Some(ref hint) = note.hint {
                writeln!(f, "{} = note: {}", " ".repeat(formatted.gutter_padding()), hint)?;
            }
        }
        write!(f, "Syntax Error: {}", self.reason)
    }
}

impl std::error::Error for Syntax {}

#[cfg(test)]
mod test {
    use super::*;
    use crate::common::source::Source;

    #[test]
    fn error() {
        let source = Source::new("Hello $(name", "greet");
        let error = Syntax::error("Unclosed tag or macro", &Span::new(&source, 6, 2));

        let target = "In greet:1:7
  |
1 | Hello $(name
  |       ^^
Syntax Error: Unclosed tag or macro";

        assert_eq!(format!("{}", error), target);
    }

    #[test]
    fn hinted() {
        let source = Source::new("?(endif)", "stray");
        let error = Syntax::error_with_note(
            "`endif` without a matching `if`",
            Note::new_with_hint("remove this tag", &Span::new(&source, 0, 8)),
        );

        let rendered = format!("{}", error);
        assert!(rendered.contains("  = note: remove this tag\n"));
        assert!(rendered.ends_with("Syntax Error: `endif` without a matching `if`"));
    }
}

use std::{
    fmt::{self, Debug, Display, Formatter},
    rc::Rc,
};

use crate::common::source::Source;

/// A `Span` refers to a section of a template source,
/// much like a `&str`, but with a reference to a `Source` rather than a `String`.
/// Tokens carry a `Span` so that errors can point at the offending directive.
#[derive(Clone, Eq, PartialEq)]
pub struct Span {
    source: Rc<Source>,
    offset: usize,
    length: usize,
}

impl Span {
    /// Create a new `Span` from a byte offset with a byte length.
    pub fn new(source: &Rc<Source>, offset: usize, length: usize) -> Span {
        Span {
            source: Rc::clone(source),
            offset,
            length,
        }
    }

    /// A `Span` that points at a specific point in the source.
    /// Has a length of `0`.
    pub fn point(source: &Rc<Source>, offset: usize) -> Span {
        Span::new(source, offset, 0)
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Return the index of the end of the `Span`.
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    /// Returns the text a `Span` covers.
    pub fn contents(&self) -> String {
        self.source.contents[self.offset..self.end()].to_string()
    }

    /// The name of the entry this span was lexed from.
    pub fn name(&self) -> &str {
        &self.source.name
    }

    /// Zero-indexed line of a byte index.
    pub fn line(&self, index: usize) -> usize {
        self.source.contents[..index].matches('\n').count()
    }

    /// Zero-indexed column, in chars, of a byte index.
    pub fn col(&self, index: usize) -> usize {
        let before = &self.source.contents[..index];
        let line_start = before.rfind('\n').map_or(0, |n| n + 1);
        before[line_start..].chars().count()
    }

    /// Every source line touched by this span, carriage returns removed.
    pub fn lines(&self) -> Vec<String> {
        let start_line = self.line(self.offset);
        let end_line = self.line(self.end());
        self.source
            .contents
            .split('\n')
            .skip(start_line)
            .take(end_line - start_line + 1)
            .map(|line| line.replace('\r', ""))
            .collect()
    }

    pub fn format(&self) -> FormattedSpan {
        FormattedSpan {
            name: self.name().to_string(),
            start: self.line(self.offset),
            lines: self.lines(),
            start_col: self.col(self.offset),
            end_col: self.col(self.end()),
        }
    }
}

impl Debug for Span {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Span")
            .field("contents", &self.contents())
            .field("start", &self.offset)
            .field("end", &self.end())
            .finish()
    }
}

impl Display for Span {
    /// Prints where the `Span` occurs in its entry:
    /// ```plain
    /// In greet:1:7
    ///   |
    /// 1 | Hello $(name
    ///   |       ^^
    /// ```
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}

/// A span resolved to lines and columns, ready to be displayed.
pub struct FormattedSpan {
    pub name: String,
    pub start: usize,
    pub lines: Vec<String>,
    pub start_col: usize,
    pub end_col: usize,
}

impl FormattedSpan {
    pub fn is_multiline(&self) -> bool {
        self.lines.len() != 1
    }

    pub fn gutter_padding(&self) -> usize {
        (self.start + self.lines.len()).to_string().len()
    }

    /// If a single line span, returns the number of carets between cols.
    pub fn carets(&self) -> Option<usize> {
        if self.is_multiline() {
            None
        } else {
            Some(self.end_col.saturating_sub(self.start_col))
        }
    }
}

impl Display for FormattedSpan {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let gutter = " ".repeat(self.gutter_padding());
        writeln!(f, "In {}:{}:{}", self.name, self.start + 1, self.start_col + 1)?;
        writeln!(f, "{} |", gutter)?;

        match self.carets() {
            Some(carets) => {
                let line_no = (self.start + 1).to_string();
                let padding = " ".repeat(self.gutter_padding() - line_no.len());
                writeln!(f, "{}{} | {}", line_no, padding, self.lines[0])?;
                writeln!(
                    f,
                    "{} | {}{}",
                    gutter,
                    " ".repeat(self.start_col),
                    "^".repeat(carets.max(1)),
                )?;
            },
            None => {
                for (index, line) in self.lines.iter().enumerate() {
                    let line_no = (self.start + index + 1).to_string();
                    let padding = " ".repeat(self.gutter_padding() - line_no.len());
                    writeln!(f, "{}{} > {}", line_no, padding, line)?;
                }
            },
        }

        Ok(())
    }
}

/// A wrapper for spanning types.
/// A lexed `Token` is carried around as a `Spanned<Token>`,
/// to remember the directive it came from.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Spanned<T> {
    pub item: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    /// Takes a generic item, and wraps in in a `Span` to make it `Spanned`.
    pub fn new(item: T, span: Span) -> Spanned<T> {
        Spanned { item, span }
    }
}

use std::{mem, rc::Rc};

use crate::{
    common::{
        source::Source,
        span::{Span, Spanned},
    },
    compiler::syntax::{Note, Syntax},
    construct::token::{Token, Tokens},
};

/// Openers are only recognized outside of a directive.
const OPENERS: [(&str, Directive); 3] = [
    ("$(", Directive::Macro),
    ("#(", Directive::MacroById),
    ("?(", Directive::Tag),
];

const CLOSER: char = ')';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Directive {
    Macro,
    MacroById,
    Tag,
}

/// Which keywords may appear next inside a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    /// Only names from here on.
    Closed,
    /// Right after `?(`: `if`, `elif`, `else` or `endif`.
    Keyword,
    /// Right after `if` or `elif`: `not`.
    Negation,
}

#[derive(Debug)]
pub struct Lexer {
    source: Rc<Source>,
    index: usize,
    tokens: Tokens,
    /// The open directive, and the offset of its opener.
    directive: Option<(Directive, usize)>,
    slot: Slot,
    /// Literal text or name collected since the last token.
    pending: String,
    pending_start: usize,
}

impl Lexer {
    /// Lexes an expanded template into a flat stream of tokens,
    /// in a single pass.
    pub fn lex(source: Rc<Source>) -> Result<Tokens, Syntax> {
        // carriage returns never make it into a token,
        // nor split an opener in two
        let source = match source.contents.contains('\r') {
            true => Source::new(&source.contents.replace('\r', ""), &source.name),
            false => source,
        };

        let mut lexer = Lexer {
            source,
            index: 0,
            tokens: vec![],
            directive: None,
            slot: Slot::Closed,
            pending: String::new(),
            pending_start: 0,
        };

        while let Some(c) = lexer.peek() {
            match lexer.directive {
                None => lexer.outside(c),
                Some(_) => lexer.inside(c),
            }
        }

        if let Some((_, opener)) = lexer.directive {
            return Err(Syntax::error_with_note(
                "Unclosed tag or macro",
                Note::new_with_hint(
                    "this directive is never closed with `)`",
                    &Span::new(&lexer.source, opener, 2),
                ),
            ));
        }

        lexer.flush_literal();
        Ok(lexer.tokens)
    }

    /// Returns all text after the current index position.
    fn remaining(&self) -> &str {
        &self.source.contents[self.index..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn push(&mut self, token: Token, offset: usize, len: usize) {
        let span = Span::new(&self.source, offset, len);
        self.tokens.push(Spanned::new(token, span));
    }

    /// Consumes a character into the pending text.
    fn accumulate(&mut self, c: char) {
        if self.pending.is_empty() {
            self.pending_start = self.index;
        }
        self.pending.push(c);
        self.index += c.len_utf8();
    }

    /// The span from the first pending character up to the current index.
    fn pending_len(&self) -> usize {
        self.index - self.pending_start
    }

    fn flush_literal(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let literal = mem::take(&mut self.pending);
        self.push(Token::Literal(literal), self.pending_start, self.pending_len());
    }

    fn outside(&mut self, c: char) {
        let opened = OPENERS
            .iter()
            .copied()
            .find(|(opener, _)| self.remaining().starts_with(opener));

        let Some((opener, directive)) = opened else {
            self.accumulate(c);
            return;
        };

        self.flush_literal();
        let token = match directive {
            Directive::Macro => Token::BeginMacro,
            Directive::MacroById => Token::BeginMacroById,
            Directive::Tag => Token::BeginTag,
        };

        let offset = self.index;
        self.push(token, offset, opener.len());
        self.directive = Some((directive, offset));
        self.slot = match directive {
            Directive::Tag => Slot::Keyword,
            _ => Slot::Closed,
        };
        self.index += opener.len();
    }

    fn inside(&mut self, c: char) {
        if c == CLOSER {
            self.close();
            return;
        }

        if self.slot != Slot::Closed && c.is_whitespace() {
            self.index += c.len_utf8();
            return;
        }

        let keyword = match self.slot {
            Slot::Closed => None,
            _ => self.keyword(),
        };

        match (self.slot, keyword) {
            (Slot::Keyword, Some((keyword, len))) if keyword != Token::Not => {
                self.slot = match keyword {
                    Token::If | Token::Elif => Slot::Negation,
                    _ => Slot::Closed,
                };
                let offset = self.index;
                self.push(keyword, offset, len);
                self.index += len;
            },
            (Slot::Negation, Some((Token::Not, len))) => {
                // stays in the negation slot, `not not` toggles back
                let offset = self.index;
                self.push(Token::Not, offset, len);
                self.index += len;
            },
            _ => {
                self.slot = Slot::Closed;
                self.accumulate(c);
            },
        }
    }

    /// Matches a whole keyword at the current index.
    /// A keyword must be followed by whitespace, the closer,
    /// or the end of the template.
    fn keyword(&self) -> Option<(Token, usize)> {
        let remaining = self.remaining();
        let len = remaining
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(remaining.len());

        let keyword = match &remaining[..len] {
            "if" => Token::If,
            "not" => Token::Not,
            "elif" => Token::Elif,
            "else" => Token::Else,
            "endif" => Token::EndIf,
            _ => return None,
        };

        match remaining[len..].chars().next() {
            None | Some(CLOSER) => Some((keyword, len)),
            Some(c) if c.is_whitespace() => Some((keyword, len)),
            Some(_) => None,
        }
    }

    fn close(&mut self) {
        let Some((directive, _)) = self.directive.take() else {
            return;
        };

        let name = self.pending.trim();
        if !name.is_empty() {
            let token = match directive {
                Directive::MacroById => Token::MacroId(name.to_string()),
                Directive::Macro | Directive::Tag => Token::MacroName(name.to_string()),
            };
            self.push(token, self.pending_start, self.pending_len());
        }
        self.pending.clear();

        let offset = self.index;
        self.push(Token::EndMacroOrTag, offset, 1);
        self.index += 1;
        self.slot = Slot::Closed;
    }
}

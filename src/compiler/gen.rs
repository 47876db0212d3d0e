use crate::{
    common::{
        bank::{Bank, StringTable},
        hash::{MacroHash, MacroHasher},
        opcode::{Instruction, UNPATCHED},
        span::{Span, Spanned},
    },
    compiler::{
        link::{Linker, Reference},
        syntax::{Note, Syntax},
    },
    construct::{frame::Frame, token::Token},
};

/// The session state an entry is compiled against.
pub struct Context<'a> {
    pub hasher: &'a dyn MacroHasher,
    pub strings: &'a mut StringTable,
    pub linker: &'a mut Linker,
    /// Previously compiled banks, only consulted to resolve references.
    pub linked: &'a [Bank],
}

/// Where the generator is, relative to the directives of the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Text,
    Macro,
    MacroById,
    /// Right after `?(`, before any keyword.
    Tag,
    /// After `if` or `elif`, until the tested name.
    Condition { negated: bool, tested: bool },
    /// After `else` or `endif`.
    Closed,
}

/// Generator walks the tokens of one entry and emits its instructions
/// in a single pass.
///
/// Conditional chains are compiled without building a tree:
/// every jump is emitted with a placeholder target, and is patched once
/// the next branch or the closing `endif` is reached.
/// Open chains are tracked on a stack of `Frame`s.
pub struct Generator<'a> {
    context: Context<'a>,
    instructions: Vec<Instruction>,
    frames: Vec<Frame>,
    position: Position,
    /// The opener of the directive being walked.
    opener: Option<Span>,
}

impl<'a> Generator<'a> {
    /// Compiles the tokens of an entry,
    /// interning literals and checking references against the context.
    pub fn gen(tokens: &[Spanned<Token>], context: Context<'a>) -> Result<Vec<Instruction>, Syntax> {
        let mut generator = Generator {
            context,
            instructions: vec![],
            frames: vec![],
            position: Position::Text,
            opener: None,
        };

        for token in tokens {
            generator.walk(token)?;
        }

        generator.finish()
    }

    fn walk(&mut self, token: &Spanned<Token>) -> Result<(), Syntax> {
        let span = &token.span;

        match (&token.item, self.position) {
            (Token::Literal(text), Position::Text) => self.literal(text),
            (Token::BeginMacro, Position::Text) => self.begin(Position::Macro, span),
            (Token::BeginMacroById, Position::Text) => self.begin(Position::MacroById, span),
            (Token::BeginTag, Position::Text) => self.begin(Position::Tag, span),

            (Token::MacroName(name), Position::Macro) => self.append_name(name),
            (Token::MacroId(id), Position::MacroById) => self.append_id(id, span)?,

            (Token::If, Position::Tag) => self.open(span),
            (Token::Elif, Position::Tag) => self.branch(span, false)?,
            (Token::Else, Position::Tag) => self.branch(span, true)?,
            (Token::EndIf, Position::Tag) => self.close(span)?,

            (Token::Not, Position::Condition { negated, tested: false }) => {
                self.position = Position::Condition {
                    negated: !negated,
                    tested: false,
                };
            },
            (Token::MacroName(name), Position::Condition { negated, tested: false }) => {
                self.test(name, negated);
            },

            (Token::MacroName(_), Position::Tag) => {
                return Err(Syntax::error(
                    "Expected `if`, `elif`, `else` or `endif` at the start of a conditional tag",
                    span,
                ))
            },
            (Token::MacroName(_), Position::Closed) => {
                return Err(Syntax::error("`else` and `endif` do not take a macro name", span))
            },

            (Token::EndMacroOrTag, position) => self.end_directive(position, span)?,

            (unexpected, _) => {
                return Err(Syntax::error(&format!("Unexpected {}", unexpected), span))
            },
        }

        Ok(())
    }

    /// Checks that every directive and conditional chain was closed.
    fn finish(self) -> Result<Vec<Instruction>, Syntax> {
        match (&self.opener, self.position) {
            (Some(opener), position) if position != Position::Text => {
                return Err(Syntax::error_with_note(
                    "Unclosed tag or macro",
                    Note::new_with_hint("this directive is never closed with `)`", opener),
                ));
            },
            _ => (),
        }

        if let Some(frame) = self.frames.last() {
            return Err(Syntax::error_with_note(
                "Unclosed conditional",
                Note::new_with_hint("this `if` never reaches an `endif`", &frame.opened),
            ));
        }

        debug_assert!(self
            .instructions
            .iter()
            .all(|instruction| instruction.target() != Some(UNPATCHED)));

        Ok(self.instructions)
    }

    fn emit(&mut self, instruction: Instruction) -> usize {
        self.instructions.push(instruction);
        self.instructions.len() - 1
    }

    fn patch(&mut self, index: usize, destination: usize) {
        self.instructions[index].patch(destination);
    }

    fn begin(&mut self, position: Position, span: &Span) {
        self.position = position;
        self.opener = Some(span.clone());
    }

    /// Interns a literal in the session's string table and appends it.
    fn literal(&mut self, text: &str) {
        let index = self.context.strings.index(text);
        self.emit(Instruction::AppendLiteral(index));
    }

    fn reference(&mut self, reference: Reference, hash: MacroHash) {
        self.context
            .linker
            .reference(reference, hash, self.context.linked);
    }

    fn append_name(&mut self, name: &str) {
        let hash = self.context.hasher.hash(name);
        self.reference(Reference::Name(name), hash);
        self.emit(Instruction::AppendMacro(hash));
    }

    fn append_id(&mut self, id: &str, span: &Span) -> Result<(), Syntax> {
        let hash = id.parse::<MacroHash>().map_err(|_| {
            Syntax::error(
                &format!("Macro id `{}` is not an unsigned 32-bit integer", id),
                span,
            )
        })?;
        self.reference(Reference::Id(hash), hash);
        self.emit(Instruction::AppendMacro(hash));
        Ok(())
    }

    /// `if`: opens a new chain.
    fn open(&mut self, span: &Span) {
        self.frames.push(Frame::new(span.clone()));
        self.position = Position::Condition {
            negated: false,
            tested: false,
        };
    }

    /// Tests the condition of the current branch.
    /// The jump skipping the branch body is left pending.
    fn test(&mut self, name: &str, negated: bool) {
        let hash = self.context.hasher.hash(name);
        self.reference(Reference::Name(name), hash);
        self.emit(Instruction::TestMacro(hash));

        let jump = self.emit(match negated {
            false => Instruction::JumpIfFalse(UNPATCHED),
            true => Instruction::JumpIfTrue(UNPATCHED),
        });

        if let Some(frame) = self.frames.last_mut() {
            frame.pending = Some(jump);
        }
        self.position = Position::Condition {
            negated,
            tested: true,
        };
    }

    /// `elif` and `else`: the finished branch jumps out of the chain,
    /// and the failed test of that branch now lands on this one.
    fn branch(&mut self, span: &Span, otherwise: bool) -> Result<(), Syntax> {
        let keyword = if otherwise { "else" } else { "elif" };

        let Some(frame) = self.frames.last() else {
            return Err(Syntax::error(
                &format!("`{}` without a matching `if`", keyword),
                span,
            ));
        };

        if let Some(previous) = &frame.otherwise {
            return Err(Syntax::error(
                &format!("`{}` after the `else` of this conditional", keyword),
                span,
            )
            .add_note(Note::new_with_hint("the `else` is here", previous)));
        }

        let exit = self.emit(Instruction::Jump(UNPATCHED));
        let next = self.instructions.len();

        if let Some(frame) = self.frames.last_mut() {
            frame.exits.push(exit);
            if otherwise {
                frame.otherwise = Some(span.clone());
            }
            if let Some(pending) = frame.pending.take() {
                self.instructions[pending].patch(next);
            }
        }

        self.position = match otherwise {
            true => Position::Closed,
            false => Position::Condition {
                negated: false,
                tested: false,
            },
        };
        Ok(())
    }

    /// `endif`: every branch of the chain converges here.
    fn close(&mut self, span: &Span) -> Result<(), Syntax> {
        let frame = self
            .frames
            .pop()
            .ok_or_else(|| Syntax::error("`endif` without a matching `if`", span))?;

        let end = self.instructions.len();
        for index in frame.pending.into_iter().chain(frame.exits) {
            self.patch(index, end);
        }

        self.position = Position::Closed;
        Ok(())
    }

    fn end_directive(&mut self, position: Position, span: &Span) -> Result<(), Syntax> {
        match position {
            Position::Text => return Err(Syntax::error("Unexpected closing `)`", span)),
            Position::Tag => {
                return Err(Syntax::error(
                    "Conditional tag is missing `if`, `elif`, `else` or `endif`",
                    span,
                ))
            },
            Position::Condition { tested: false, .. } => {
                return Err(Syntax::error("Conditional is missing a macro name to test", span))
            },
            Position::Macro
            | Position::MacroById
            | Position::Condition { tested: true, .. }
            | Position::Closed => (),
        }

        self.position = Position::Text;
        Ok(())
    }
}

use std::{
    collections::{BTreeMap, BTreeSet},
    iter::FusedIterator,
    mem,
};

use tracing::{debug, info};

use crate::{
    common::{
        bank::{Bank, Macro, StringTable},
        hash::{Fnv1a, MacroHash, MacroHasher},
        source::Source,
    },
    compiler::{
        config::Config,
        error::CompileError,
        gen::{Context, Generator},
        lex::Lexer,
        link::Linker,
        rule,
    },
};

/// A named template, as written by an author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub text: String,
}

impl Entry {
    pub fn new(name: &str, text: &str) -> Entry {
        Entry {
            name: name.to_string(),
            text: text.to_string(),
        }
    }
}

impl<N: Into<String>, T: Into<String>> From<(N, T)> for Entry {
    fn from((name, text): (N, T)) -> Entry {
        Entry {
            name: name.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub macros: usize,
    pub strings: usize,
    /// Literals that were found in the string table instead of added to it.
    pub reused: usize,
}

/// The outcome of a successful session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compilation {
    pub bank: Bank,
    /// Entry names, in the order they were compiled.
    pub compiled: Vec<String>,
    pub unresolved_names: BTreeSet<String>,
    pub unresolved_ids: BTreeSet<MacroHash>,
    pub stats: Stats,
}

impl Compilation {
    /// Whether every macro reference resolved.
    pub fn is_resolved(&self) -> bool {
        self.unresolved_names.is_empty() && self.unresolved_ids.is_empty()
    }
}

/// Compiles entries into banks.
/// The string table, the macro map and the linker state live here
/// for the duration of one session, and are cleared between sessions.
pub struct Compiler {
    config: Config,
    hasher: Box<dyn MacroHasher>,
    strings: StringTable,
    macros: BTreeMap<MacroHash, Macro>,
    linker: Linker,
}

impl Compiler {
    pub fn new(config: Config) -> Compiler {
        Compiler {
            config,
            hasher: Box::new(Fnv1a),
            strings: StringTable::new(),
            macros: BTreeMap::new(),
            linker: Linker::new(),
        }
    }

    /// Replaces the default FNV-1a hasher.
    /// The runtime must hash names the same way.
    pub fn with_hasher(mut self, hasher: impl MacroHasher + 'static) -> Self {
        self.hasher = Box::new(hasher);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn hash(&self, name: &str) -> MacroHash {
        self.hasher.hash(name)
    }

    /// Clears all session state.
    fn reset(&mut self) {
        self.strings = StringTable::new();
        self.macros.clear();
        self.linker.clear();
    }

    /// Starts a clean session, with the recognized macros already known.
    fn begin(&mut self) {
        self.reset();
        for name in self.config.recognized.iter() {
            self.linker.declare(self.hasher.hash(name));
        }
    }

    /// Runs one entry through the whole pipeline,
    /// adding its macro to the session.
    fn compile_entry(&mut self, entry: &Entry, linked: &[Bank]) -> Result<(), CompileError> {
        let hash = self.hasher.hash(&entry.name);
        let located = |error| CompileError::Syntax {
            entry: entry.name.clone(),
            error,
        };

        let expanded = rule::expand(&self.config, &entry.text);
        let tokens = Lexer::lex(Source::new(&expanded, &entry.name)).map_err(located)?;
        let instructions = Generator::gen(
            &tokens,
            Context {
                hasher: self.hasher.as_ref(),
                strings: &mut self.strings,
                linker: &mut self.linker,
                linked,
            },
        )
        .map_err(located)?;

        if self.macros.contains_key(&hash) {
            return Err(CompileError::DuplicateMacro {
                name: entry.name.clone(),
                hash,
            });
        }

        debug!(name = %entry.name, hash, instructions = instructions.len(), "compiled entry");
        self.macros.insert(hash, Macro::new(hash, instructions));
        // only known once compiled, so an entry can't resolve itself
        self.linker.declare(hash);
        Ok(())
    }

    /// Compiles every entry in order, against some previously compiled banks.
    /// Fails on the first malformed entry or duplicate hash,
    /// in which case no bank is produced.
    pub fn compile<E: Into<Entry>>(
        &mut self,
        entries: impl IntoIterator<Item = E>,
        linked: &[Bank],
    ) -> Result<Compilation, CompileError> {
        let mut compilation = Compilation::default();
        for step in self.steps(entries, linked, &mut compilation) {
            step?;
        }
        Ok(compilation)
    }

    /// Like `compile`, but one entry at a time:
    /// each call to `next` compiles a single entry and yields its name.
    /// Names and unresolved references are written to `compilation` as they
    /// are found; the bank and stats are only filled in once every entry
    /// has been compiled.
    ///
    /// Dropping the iterator early leaves the session dirty until the next
    /// call to `compile` or `steps`.
    pub fn steps<'a, E: Into<Entry>, I: IntoIterator<Item = E>>(
        &'a mut self,
        entries: I,
        linked: &'a [Bank],
        compilation: &'a mut Compilation,
    ) -> Steps<'a, I::IntoIter> {
        self.begin();
        *compilation = Compilation::default();

        Steps {
            compiler: self,
            entries: entries.into_iter(),
            linked,
            compilation,
            done: false,
        }
    }
}

/// A session in progress, see `Compiler::steps`.
pub struct Steps<'a, I> {
    compiler: &'a mut Compiler,
    entries: I,
    linked: &'a [Bank],
    compilation: &'a mut Compilation,
    done: bool,
}

impl<'a, I> Steps<'a, I> {
    fn record_unresolved(&mut self) {
        let (names, ids) = self.compiler.linker.drain_unresolved();
        self.compilation.unresolved_names.extend(names);
        self.compilation.unresolved_ids.extend(ids);
    }

    /// Moves the session's output into the compilation.
    fn finish(&mut self) {
        let compiler = &mut *self.compiler;
        let strings = mem::take(&mut compiler.strings);
        let macros = mem::take(&mut compiler.macros);

        self.compilation.stats = Stats {
            macros: macros.len(),
            strings: strings.len(),
            reused: strings.reused(),
        };
        self.compilation.bank = Bank::new(macros, strings.into_strings());

        let stats = &self.compilation.stats;
        info!(
            macros = stats.macros,
            strings = stats.strings,
            reused = stats.reused,
            unresolved = self.compilation.unresolved_names.len() + self.compilation.unresolved_ids.len(),
            "compiled bank"
        );
    }
}

impl<'a, E: Into<Entry>, I: Iterator<Item = E>> Iterator for Steps<'a, I> {
    type Item = Result<String, CompileError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let Some(entry) = self.entries.next() else {
            self.finish();
            self.compiler.reset();
            self.done = true;
            return None;
        };

        let entry = entry.into();
        match self.compiler.compile_entry(&entry, self.linked) {
            Ok(()) => {
                self.record_unresolved();
                self.compilation.compiled.push(entry.name.clone());
                Some(Ok(entry.name))
            },
            Err(error) => {
                self.compiler.reset();
                self.done = true;
                Some(Err(error))
            },
        }
    }
}

impl<'a, E: Into<Entry>, I: Iterator<Item = E>> FusedIterator for Steps<'a, I> {}

use std::{
    collections::{BTreeSet, HashSet},
    mem,
};

use tracing::debug;

use crate::common::{bank::Bank, hash::MacroHash};

/// A macro reference, as written in a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference<'a> {
    Name(&'a str),
    Id(MacroHash),
}

/// Tracks which macro hashes will resolve at runtime.
///
/// A hash is known once its entry has been compiled in this session,
/// or when it was pre-declared. References are checked the moment they
/// are emitted, so a reference to an entry that is compiled later
/// in the same session is reported as unresolved.
#[derive(Debug, Default)]
pub struct Linker {
    known: HashSet<MacroHash>,
    unresolved_names: BTreeSet<String>,
    unresolved_ids: BTreeSet<MacroHash>,
}

impl Linker {
    pub fn new() -> Linker {
        Default::default()
    }

    /// Marks a hash as defined in this session.
    pub fn declare(&mut self, hash: MacroHash) {
        self.known.insert(hash);
    }

    pub fn is_known(&self, hash: MacroHash, linked: &[Bank]) -> bool {
        self.known.contains(&hash) || linked.iter().any(|bank| bank.contains(hash))
    }

    /// Checks a reference against the session and the linked banks,
    /// recording it if it does not resolve.
    /// Returns whether the reference resolved.
    pub fn reference(&mut self, reference: Reference, hash: MacroHash, linked: &[Bank]) -> bool {
        if self.is_known(hash, linked) {
            return true;
        }

        match reference {
            Reference::Name(name) => {
                debug!(name, hash, "unresolved macro reference");
                self.unresolved_names.insert(name.to_string());
            },
            Reference::Id(id) => {
                debug!(id, "unresolved macro id");
                self.unresolved_ids.insert(id);
            },
        }
        false
    }

    /// Takes every unresolved reference recorded so far.
    pub fn drain_unresolved(&mut self) -> (BTreeSet<String>, BTreeSet<MacroHash>) {
        (
            mem::take(&mut self.unresolved_names),
            mem::take(&mut self.unresolved_ids),
        )
    }

    pub fn clear(&mut self) {
        self.known.clear();
        self.unresolved_names.clear();
        self.unresolved_ids.clear();
    }
}

#[cfg(test)]
mod test {
    use std::collections::BTreeMap;

    use super::*;
    use crate::common::bank::Macro;

    #[test]
    fn declared_hashes_resolve() {
        let mut linker = Linker::new();
        assert!(!linker.reference(Reference::Name("a"), 1, &[]));
        linker.declare(1);
        assert!(linker.reference(Reference::Name("a"), 1, &[]));

        let (names, ids) = linker.drain_unresolved();
        assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["a".to_string()]);
        assert!(ids.is_empty());
    }

    #[test]
    fn linked_banks_resolve() {
        let mut macros = BTreeMap::new();
        macros.insert(7, Macro::new(7, vec![]));
        let bank = Bank::new(macros, vec![]);

        let mut linker = Linker::new();
        assert!(linker.reference(Reference::Id(7), 7, &[bank]));
        assert!(!linker.reference(Reference::Id(8), 8, &[]));

        let (_, ids) = linker.drain_unresolved();
        assert!(ids.contains(&8));
    }
}

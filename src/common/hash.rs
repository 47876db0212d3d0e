//! Macro names are linked by hash, never by name,
//! so banks compiled in separate sessions can reference each other.

/// The key a macro is stored and referenced under.
pub type MacroHash = u32;

/// Turns a macro name into its [`MacroHash`].
/// Every bank that is linked together must be built with the same hasher,
/// and the runtime must agree with it as well.
pub trait MacroHasher {
    fn hash(&self, name: &str) -> MacroHash;
}

/// 32-bit FNV-1a over the UTF-8 bytes of the name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fnv1a;

const FNV_OFFSET: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

impl MacroHasher for Fnv1a {
    fn hash(&self, name: &str) -> MacroHash {
        name.bytes().fold(FNV_OFFSET, |hash, byte| {
            (hash ^ byte as u32).wrapping_mul(FNV_PRIME)
        })
    }
}

impl<F: Fn(&str) -> MacroHash> MacroHasher for F {
    fn hash(&self, name: &str) -> MacroHash {
        self(name)
    }
}

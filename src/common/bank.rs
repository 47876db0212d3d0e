use std::{
    collections::{BTreeMap, HashMap},
    fmt::{self, Display, Formatter},
};

use serde::{Deserialize, Serialize};

use crate::common::{hash::MacroHash, opcode::Instruction};

/// Represents a single compiled template entry:
/// the instructions the runtime executes to expand it.
/// Serialized instructions are packed `(opcode, argument)` pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Macro {
    pub hash: MacroHash,
    #[serde(with = "packed")]
    pub instructions: Vec<Instruction>,
}

mod packed {
    use serde::{
        de::Error as _,
        ser::{Error as _, SerializeSeq},
        Deserialize, Deserializer, Serializer,
    };

    use crate::common::opcode::Instruction;

    pub fn serialize<S: Serializer>(
        instructions: &[Instruction],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(instructions.len()))?;
        for instruction in instructions {
            let pair = instruction
                .encode()
                .ok_or_else(|| S::Error::custom(format!("`{}` does not fit in 32 bits", instruction)))?;
            seq.serialize_element(&pair)?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Instruction>, D::Error> {
        Vec::<(u8, u32)>::deserialize(deserializer)?
            .into_iter()
            .map(|(opcode, argument)| {
                Instruction::decode(opcode, argument)
                    .ok_or_else(|| D::Error::custom(format!("invalid opcode {}", opcode)))
            })
            .collect()
    }
}

impl Macro {
    pub fn new(hash: MacroHash, instructions: Vec<Instruction>) -> Macro {
        Macro { hash, instructions }
    }
}

/// The push-only literal table shared by every macro of a session.
/// Literals are identified by their index;
/// the first occurrence of a string decides its index.
#[derive(Debug, Clone, Default)]
pub struct StringTable {
    strings: Vec<String>,
    lookup: HashMap<String, usize>,
    reused: usize,
}

impl StringTable {
    pub fn new() -> StringTable {
        Default::default()
    }

    /// Given a literal, this function adds it to the table if it's new,
    /// and returns the literal's index.
    /// Hits on an existing literal are counted as reuses.
    pub fn index(&mut self, literal: &str) -> usize {
        if let Some(index) = self.lookup.get(literal) {
            self.reused += 1;
            return *index;
        }

        let index = self.strings.len();
        self.strings.push(literal.to_string());
        self.lookup.insert(literal.to_string(), index);
        index
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.strings.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// How many literals were resolved to an already present string.
    pub fn reused(&self) -> usize {
        self.reused
    }

    pub fn into_strings(self) -> Vec<String> {
        self.strings
    }
}

/// The compiled output of one session.
/// Maps macro hashes to macros, and owns the literals they reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bank {
    pub macros: BTreeMap<MacroHash, Macro>,
    pub strings: Vec<String>,
}

impl Bank {
    pub fn new(macros: BTreeMap<MacroHash, Macro>, strings: Vec<String>) -> Bank {
        Bank { macros, strings }
    }

    pub fn get(&self, hash: MacroHash) -> Option<&Macro> {
        self.macros.get(&hash)
    }

    pub fn contains(&self, hash: MacroHash) -> bool {
        self.macros.contains_key(&hash)
    }

    pub fn literal(&self, index: usize) -> Option<&str> {
        self.strings.get(index).map(String::as_str)
    }
}

impl Display for Bank {
    /// Disassembles every macro, resolving literal indices inline.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dumping Bank:")?;
        writeln!(f, "{} macros, {} strings", self.macros.len(), self.strings.len())?;
        for (hash, compiled) in self.macros.iter() {
            writeln!(f, "---")?;
            writeln!(f, "Macro {:#010x}", hash)?;
            for (index, instruction) in compiled.instructions.iter().enumerate() {
                write!(f, "{:>4}  {}", index, instruction)?;
                if let Instruction::AppendLiteral(i) = instruction {
                    write!(f, "\t{:?}", self.literal(*i).unwrap_or("<missing>"))?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn first_occurrence_wins() {
        let mut table = StringTable::new();
        assert_eq!(table.index("hello"), 0);
        assert_eq!(table.index("world"), 1);
        assert_eq!(table.index("hello"), 0);
        assert_eq!(table.index("hello"), 0);

        assert_eq!(table.len(), 2);
        assert_eq!(table.reused(), 2);
        assert_eq!(table.get(1), Some("world"));
    }

    #[test]
    fn dump() {
        let mut macros = BTreeMap::new();
        macros.insert(1, Macro::new(1, vec![Instruction::AppendLiteral(0)]));
        let bank = Bank::new(macros, vec!["hi".to_string()]);

        let dumped = format!("{}", bank);
        assert!(dumped.contains("Macro 0x00000001"));
        assert!(dumped.contains("\"hi\""));
    }

    #[test]
    fn instructions_are_packed() {
        let compiled = Macro::new(7, vec![
            Instruction::TestMacro(0xbeef),
            Instruction::JumpIfTrue(3),
            Instruction::AppendLiteral(1),
        ]);

        let json = serde_json::to_string(&compiled).unwrap();
        assert_eq!(json, r#"{"hash":7,"instructions":[[2,48879],[5,3],[0,1]]}"#);
        assert_eq!(serde_json::from_str::<Macro>(&json).unwrap(), compiled);
    }

    #[test]
    fn invalid_packed_instructions() {
        let unknown = r#"{"hash":7,"instructions":[[9,0]]}"#;
        assert!(serde_json::from_str::<Macro>(unknown).is_err());

        let unpatched = Macro::new(7, vec![Instruction::Jump(crate::common::opcode::UNPATCHED)]);
        assert!(serde_json::to_string(&unpatched).is_err());
    }
}

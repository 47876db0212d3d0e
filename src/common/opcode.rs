use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::common::hash::MacroHash;

/// Target written into a jump before its destination is known.
/// Every placeholder is overwritten before a macro leaves the generator.
pub const UNPATCHED: usize = usize::MAX;

/// This enum represents the kind of a single instruction.
/// Under the hood, it's just a byte,
/// used when instructions are packed as `(opcode, argument)` pairs.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// Append a literal from the string table.
    AppendLiteral = 0,
    /// Expand another macro inline.
    AppendMacro = 1,
    /// Evaluate the truthiness of a macro for the next conditional jump.
    TestMacro = 2,
    /// Jump unconditionally.
    Jump = 3,
    /// Jump if the last tested macro was false.
    JumpIfFalse = 4,
    /// Jump if the last tested macro was true. Must always be last.
    JumpIfTrue = 5,
}

impl Opcode {
    /// Convert a raw byte to an opcode,
    /// returning `None` for bytes outside of the opcode range.
    pub fn from_byte(byte: u8) -> Option<Opcode> {
        match byte {
            0 => Some(Opcode::AppendLiteral),
            1 => Some(Opcode::AppendMacro),
            2 => Some(Opcode::TestMacro),
            3 => Some(Opcode::Jump),
            4 => Some(Opcode::JumpIfFalse),
            5 => Some(Opcode::JumpIfTrue),
            _ => None,
        }
    }
}

/// A single instruction: an opcode and its one integer argument.
/// Jump targets are instruction indices within the same macro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Instruction {
    AppendLiteral(usize),
    AppendMacro(MacroHash),
    TestMacro(MacroHash),
    Jump(usize),
    JumpIfFalse(usize),
    JumpIfTrue(usize),
}

impl Instruction {
    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::AppendLiteral(_) => Opcode::AppendLiteral,
            Instruction::AppendMacro(_) => Opcode::AppendMacro,
            Instruction::TestMacro(_) => Opcode::TestMacro,
            Instruction::Jump(_) => Opcode::Jump,
            Instruction::JumpIfFalse(_) => Opcode::JumpIfFalse,
            Instruction::JumpIfTrue(_) => Opcode::JumpIfTrue,
        }
    }

    /// The jump target, if this instruction is a jump.
    pub fn target(&self) -> Option<usize> {
        match self {
            Instruction::Jump(t)
            | Instruction::JumpIfFalse(t)
            | Instruction::JumpIfTrue(t) => Some(*t),
            _ => None,
        }
    }

    /// Overwrites the target of a jump.
    /// Returns `false` and leaves the instruction untouched
    /// if it is not a jump.
    pub fn patch(&mut self, destination: usize) -> bool {
        match self {
            Instruction::Jump(t)
            | Instruction::JumpIfFalse(t)
            | Instruction::JumpIfTrue(t) => {
                *t = destination;
                true
            },
            _ => false,
        }
    }

    /// Packs the instruction into an opcode byte and a 32-bit argument.
    /// Returns `None` if a string index or jump target does not fit.
    pub fn encode(&self) -> Option<(u8, u32)> {
        let argument = match *self {
            Instruction::AppendMacro(hash) | Instruction::TestMacro(hash) => hash,
            Instruction::AppendLiteral(n)
            | Instruction::Jump(n)
            | Instruction::JumpIfFalse(n)
            | Instruction::JumpIfTrue(n) => u32::try_from(n).ok()?,
        };
        Some((self.opcode() as u8, argument))
    }

    /// Unpacks an instruction produced by [`Instruction::encode`].
    pub fn decode(opcode: u8, argument: u32) -> Option<Instruction> {
        let n = argument as usize;
        let instruction = match Opcode::from_byte(opcode)? {
            Opcode::AppendLiteral => Instruction::AppendLiteral(n),
            Opcode::AppendMacro => Instruction::AppendMacro(argument),
            Opcode::TestMacro => Instruction::TestMacro(argument),
            Opcode::Jump => Instruction::Jump(n),
            Opcode::JumpIfFalse => Instruction::JumpIfFalse(n),
            Opcode::JumpIfTrue => Instruction::JumpIfTrue(n),
        };
        Some(instruction)
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::AppendLiteral(i) => write!(f, "Literal \t{}", i),
            Instruction::AppendMacro(h) => write!(f, "Macro   \t{:#010x}", h),
            Instruction::TestMacro(h) => write!(f, "Test    \t{:#010x}", h),
            Instruction::Jump(t) => write!(f, "Jump    \t-> {}", t),
            Instruction::JumpIfFalse(t) => write!(f, "JumpF   \t-> {}", t),
            Instruction::JumpIfTrue(t) => write!(f, "JumpT   \t-> {}", t),
        }
    }
}

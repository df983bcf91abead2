//! Runtime storage descriptors
//!
//! Each constant or variable declaration is realized as one of these.
//! The descriptor decides which instruction reads, writes or takes the
//! address of the entity; the generator only asks.

use serde::Serialize;

use super::tam::{Instruction, OpCode, Register};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuntimeEntity {
    /// Folded constant, occupies no stack space
    KnownConstant { value: i16 },
    /// Constant computed once on entry to its scope
    UnknownConstant { offset: i16, size: u8 },
    Variable { offset: i16, size: u8 },
}

impl RuntimeEntity {
    /// Instruction that pushes the entity's value
    pub fn load(&self) -> Instruction {
        match *self {
            Self::KnownConstant { value } => Instruction::load_literal(value),
            Self::UnknownConstant { offset, size } | Self::Variable { offset, size } => {
                Instruction::new(OpCode::Load, Register::SB, size, offset)
            }
        }
    }

    /// Instruction that pops a value into the entity. Constants have none.
    pub fn store(&self) -> Option<Instruction> {
        match *self {
            Self::Variable { offset, size } => {
                Some(Instruction::new(OpCode::Store, Register::SB, size, offset))
            }
            _ => None,
        }
    }

    /// Instruction that pushes the entity's address, for by-reference
    /// arguments
    pub fn load_address(&self) -> Option<Instruction> {
        match *self {
            Self::Variable { offset, .. } => {
                Some(Instruction::new(OpCode::LoadA, Register::SB, 0, offset))
            }
            _ => None,
        }
    }

    /// Stack space the entity occupies
    pub fn size(&self) -> u8 {
        match *self {
            Self::KnownConstant { .. } => 0,
            Self::UnknownConstant { size, .. } | Self::Variable { size, .. } => size,
        }
    }
}

//! Target code buffer
//!
//! Append-only instruction store with back-patchable jump targets. A jump
//! whose destination is not known yet is emitted through `emit_jump` or
//! `emit_jump_if`, which hand back a `PatchToken`. The token has to be
//! spent on exactly one `patch` call; it cannot be cloned.

use log::trace;

use super::tam::{Address, Instruction, OpCode, Register, MAX_CODE_ADDRESS};
use crate::utils::{Error, Result};

/// Placeholder target written into jumps awaiting a patch
const PLACEHOLDER: i16 = -1;

/// Proof that a jump at `address` still needs its target
#[derive(Debug, PartialEq, Eq)]
#[must_use = "every placeholder jump must be patched"]
pub struct PatchToken {
    address: Address,
}

impl PatchToken {
    pub fn address(&self) -> Address {
        self.address
    }
}

#[derive(Debug, Default)]
pub struct TargetCode {
    instructions: Vec<Instruction>,
    outstanding: usize,
}

impl TargetCode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an instruction and return its address
    pub fn emit(&mut self, instruction: Instruction) -> Address {
        let address = self.instructions.len();
        trace!("{:5}: {:?}", address, instruction);
        self.instructions.push(instruction);
        address
    }

    /// Address the next emitted instruction will get
    pub fn next_address(&self) -> Address {
        self.instructions.len()
    }

    /// JUMP to a target patched in later
    pub fn emit_jump(&mut self) -> PatchToken {
        self.emit_placeholder(OpCode::Jump, 0)
    }

    /// JUMPIF(value) to a target patched in later
    pub fn emit_jump_if(&mut self, value: u8) -> PatchToken {
        self.emit_placeholder(OpCode::JumpIf, value)
    }

    /// JUMPIF(value) to an address that is already known
    pub fn emit_jump_if_to(&mut self, value: u8, target: Address) -> Address {
        self.emit(Instruction::new(
            OpCode::JumpIf,
            Register::CB,
            value,
            code_address(target),
        ))
    }

    fn emit_placeholder(&mut self, op: OpCode, n: u8) -> PatchToken {
        let address = self.emit(Instruction::new(op, Register::CB, n, PLACEHOLDER));
        self.outstanding += 1;
        PatchToken { address }
    }

    /// Point the jump behind `token` at `target`
    pub fn patch(&mut self, token: PatchToken, target: Address) {
        let instruction = &mut self.instructions[token.address];
        debug_assert!(instruction.op.is_jump());
        debug_assert_eq!(instruction.d, PLACEHOLDER);
        instruction.d = code_address(target);
        self.outstanding -= 1;
        trace!("patched {} -> {}", token.address, target);
    }

    /// Point the jump behind `token` at the next instruction
    pub fn patch_here(&mut self, token: PatchToken) {
        let here = self.next_address();
        self.patch(token, here);
    }

    /// Jumps emitted but not yet patched
    pub fn outstanding_patches(&self) -> usize {
        self.outstanding
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Fails when the program cannot be addressed by a 16-bit operand
    pub fn check_size(&self) -> Result<()> {
        if self.instructions.len() > MAX_CODE_ADDRESS {
            return Err(Error::ProgramTooLarge {
                size: self.instructions.len(),
            });
        }
        Ok(())
    }
}

/// Oversized programs are rejected by `check_size`, so saturating here only
/// affects code that is thrown away.
fn code_address(address: Address) -> i16 {
    i16::try_from(address).unwrap_or(i16::MAX)
}

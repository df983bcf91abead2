//! TAM disassembler
//!
//! Human-readable listing of a code buffer, one instruction per line.

use std::fmt::Write;

use super::tam::{Instruction, OpCode, Primitive, Register};

pub struct Disassembler {
    output: String,
}

impl Disassembler {
    pub fn new() -> Self {
        Self {
            output: String::new(),
        }
    }

    pub fn print(&mut self, instructions: &[Instruction]) -> String {
        self.output.clear();
        let _ = writeln!(self.output, "; {} instructions", instructions.len());
        for (address, instruction) in instructions.iter().enumerate() {
            let _ = writeln!(self.output, "{:5}: {}", address, format_instruction(instruction));
        }
        std::mem::take(&mut self.output)
    }
}

impl Default for Disassembler {
    fn default() -> Self {
        Self::new()
    }
}

/// Render one instruction in TAM assembler notation
pub fn format_instruction(instruction: &Instruction) -> String {
    let Instruction { op, r, n, d } = *instruction;
    let mnemonic = op.mnemonic();
    match op {
        OpCode::LoadL | OpCode::Push => format!("{} {}", mnemonic, d),
        OpCode::Load | OpCode::Store => format!("{}({}) {}[{}]", mnemonic, n, d, r),
        OpCode::LoadI | OpCode::StoreI | OpCode::Pop => format!("{}({}) {}", mnemonic, n, d),
        OpCode::LoadA | OpCode::Jump => format!("{} {}[{}]", mnemonic, d, r),
        OpCode::JumpIf => format!("{}({}) {}[{}]", mnemonic, n, d, r),
        OpCode::Call if r == Register::PB => match Primitive::from_address(d) {
            Some(primitive) => format!("{} {}", mnemonic, primitive.name()),
            None => format!("{}({}) {}[{}]", mnemonic, Register::from_nibble(n), d, r),
        },
        OpCode::Call => format!("{}({}) {}[{}]", mnemonic, Register::from_nibble(n), d, r),
        OpCode::Return => format!("{}({}) {}", mnemonic, n, d),
        OpCode::CallI | OpCode::JumpI | OpCode::Halt => mnemonic.to_string(),
    }
}

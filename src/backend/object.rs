//! Object file encoding
//!
//! Four bytes per instruction, big-endian: `(op << 4 | r), n, d_hi, d_lo`.

use std::fs;
use std::path::Path;

use super::tam::{Instruction, OpCode, Register};
use crate::utils::{Error, Result};

const INSTRUCTION_BYTES: usize = 4;

pub fn encode(instructions: &[Instruction]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(instructions.len() * INSTRUCTION_BYTES);
    for instruction in instructions {
        bytes.push(((instruction.op as u8) << 4) | (instruction.r as u8));
        bytes.push(instruction.n);
        bytes.extend_from_slice(&instruction.d.to_be_bytes());
    }
    bytes
}

pub fn decode(bytes: &[u8]) -> Result<Vec<Instruction>> {
    if bytes.len() % INSTRUCTION_BYTES != 0 {
        return Err(Error::MalformedObject(format!(
            "{} bytes is not a whole number of instructions",
            bytes.len()
        )));
    }
    bytes
        .chunks_exact(INSTRUCTION_BYTES)
        .enumerate()
        .map(|(address, chunk)| {
            let op = OpCode::from_u8(chunk[0] >> 4).ok_or_else(|| {
                Error::MalformedObject(format!(
                    "unknown op code {} at address {}",
                    chunk[0] >> 4,
                    address
                ))
            })?;
            let r = Register::from_nibble(chunk[0]);
            let d = i16::from_be_bytes([chunk[2], chunk[3]]);
            Ok(Instruction::new(op, r, chunk[1], d))
        })
        .collect()
}

pub fn write_file(path: &Path, instructions: &[Instruction]) -> Result<()> {
    fs::write(path, encode(instructions))?;
    Ok(())
}

pub fn read_file(path: &Path) -> Result<Vec<Instruction>> {
    let bytes = fs::read(path)?;
    decode(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::tam::Primitive;

    #[test]
    fn test_encoding_layout() {
        let bytes = encode(&[
            Instruction::new(OpCode::Load, Register::SB, 1, 258),
            Instruction::call_primitive(Primitive::Putint),
            Instruction::pop(-1),
        ]);
        assert_eq!(
            bytes,
            vec![0x04, 1, 0x01, 0x02, 0x62, 4, 0x00, 26, 0xB0, 0, 0xFF, 0xFF]
        );
    }

    #[test]
    fn test_decode_restores_instructions() {
        let program = vec![
            Instruction::push(1),
            Instruction::new(OpCode::JumpIf, Register::CB, 1, 0),
            Instruction::halt(),
        ];
        assert_eq!(decode(&encode(&program)).unwrap(), program);
    }

    #[test]
    fn test_decode_rejects_truncated_input() {
        assert!(matches!(
            decode(&[0x30, 0, 0]),
            Err(Error::MalformedObject(_))
        ));
    }

    #[test]
    fn test_decode_rejects_unknown_op() {
        assert!(matches!(
            decode(&[0x90, 0, 0, 0]),
            Err(Error::MalformedObject(_))
        ));
    }
}

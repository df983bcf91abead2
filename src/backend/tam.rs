//! Triangle Abstract Machine instruction set
//!
//! Every instruction has the same shape: an op code, a register, a small
//! size operand `n` and a displacement/literal operand `d`.

use serde::Serialize;
use std::fmt;

/// Value the machine uses for `true` in conditional jumps
pub const TRUE_VALUE: u8 = 1;
/// Value the machine uses for `false` in conditional jumps
pub const FALSE_VALUE: u8 = 0;

/// Highest code address an instruction operand can hold
pub const MAX_CODE_ADDRESS: usize = i16::MAX as usize;

/// Index of an instruction in the code store
pub type Address = usize;

/// Machine op codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum OpCode {
    Load = 0,
    LoadA = 1,
    LoadI = 2,
    LoadL = 3,
    Store = 4,
    StoreI = 5,
    Call = 6,
    CallI = 7,
    Return = 8,
    Push = 10,
    Pop = 11,
    Jump = 12,
    JumpI = 13,
    JumpIf = 14,
    Halt = 15,
}

impl OpCode {
    pub fn from_u8(value: u8) -> Option<Self> {
        let op = match value {
            0 => Self::Load,
            1 => Self::LoadA,
            2 => Self::LoadI,
            3 => Self::LoadL,
            4 => Self::Store,
            5 => Self::StoreI,
            6 => Self::Call,
            7 => Self::CallI,
            8 => Self::Return,
            10 => Self::Push,
            11 => Self::Pop,
            12 => Self::Jump,
            13 => Self::JumpI,
            14 => Self::JumpIf,
            15 => Self::Halt,
            _ => return None,
        };
        Some(op)
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            Self::Load => "LOAD",
            Self::LoadA => "LOADA",
            Self::LoadI => "LOADI",
            Self::LoadL => "LOADL",
            Self::Store => "STORE",
            Self::StoreI => "STOREI",
            Self::Call => "CALL",
            Self::CallI => "CALLI",
            Self::Return => "RETURN",
            Self::Push => "PUSH",
            Self::Pop => "POP",
            Self::Jump => "JUMP",
            Self::JumpI => "JUMPI",
            Self::JumpIf => "JUMPIF",
            Self::Halt => "HALT",
        }
    }

    /// Jumps are the only instructions whose `d` is a code address
    pub fn is_jump(&self) -> bool {
        matches!(self, Self::Jump | Self::JumpIf)
    }
}

/// Machine registers
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum Register {
    CB = 0,
    CT = 1,
    PB = 2,
    PT = 3,
    SB = 4,
    ST = 5,
    HB = 6,
    HT = 7,
    LB = 8,
    L1 = 9,
    L2 = 10,
    L3 = 11,
    L4 = 12,
    L5 = 13,
    L6 = 14,
    CP = 15,
}

impl Register {
    /// Registers occupy four bits, so every nibble names one
    pub fn from_nibble(value: u8) -> Self {
        match value & 0x0F {
            0 => Self::CB,
            1 => Self::CT,
            2 => Self::PB,
            3 => Self::PT,
            4 => Self::SB,
            5 => Self::ST,
            6 => Self::HB,
            7 => Self::HT,
            8 => Self::LB,
            9 => Self::L1,
            10 => Self::L2,
            11 => Self::L3,
            12 => Self::L4,
            13 => Self::L5,
            14 => Self::L6,
            _ => Self::CP,
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Primitive routines, addressed as displacements from PB
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum Primitive {
    Id = 1,
    Not = 2,
    And = 3,
    Or = 4,
    Succ = 5,
    Pred = 6,
    Neg = 7,
    Add = 8,
    Sub = 9,
    Mult = 10,
    Div = 11,
    Mod = 12,
    Lt = 13,
    Le = 14,
    Ge = 15,
    Gt = 16,
    Eq = 17,
    Ne = 18,
    Eol = 19,
    Eof = 20,
    Get = 21,
    Put = 22,
    Geteol = 23,
    Puteol = 24,
    Getint = 25,
    Putint = 26,
    New = 27,
    Dispose = 28,
}

impl Primitive {
    const ALL: [Primitive; 28] = [
        Self::Id,
        Self::Not,
        Self::And,
        Self::Or,
        Self::Succ,
        Self::Pred,
        Self::Neg,
        Self::Add,
        Self::Sub,
        Self::Mult,
        Self::Div,
        Self::Mod,
        Self::Lt,
        Self::Le,
        Self::Ge,
        Self::Gt,
        Self::Eq,
        Self::Ne,
        Self::Eol,
        Self::Eof,
        Self::Get,
        Self::Put,
        Self::Geteol,
        Self::Puteol,
        Self::Getint,
        Self::Putint,
        Self::New,
        Self::Dispose,
    ];

    pub fn address(&self) -> i16 {
        *self as i16
    }

    pub fn from_address(address: i16) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.address() == address)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Not => "not",
            Self::And => "and",
            Self::Or => "or",
            Self::Succ => "succ",
            Self::Pred => "pred",
            Self::Neg => "neg",
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mult => "mult",
            Self::Div => "div",
            Self::Mod => "mod",
            Self::Lt => "lt",
            Self::Le => "le",
            Self::Ge => "ge",
            Self::Gt => "gt",
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Eol => "eol",
            Self::Eof => "eof",
            Self::Get => "get",
            Self::Put => "put",
            Self::Geteol => "geteol",
            Self::Puteol => "puteol",
            Self::Getint => "getint",
            Self::Putint => "putint",
            Self::New => "new",
            Self::Dispose => "dispose",
        }
    }
}

/// A single machine instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Instruction {
    pub op: OpCode,
    pub r: Register,
    pub n: u8,
    pub d: i16,
}

impl Instruction {
    pub fn new(op: OpCode, r: Register, n: u8, d: i16) -> Self {
        Self { op, r, n, d }
    }

    /// LOADL value
    pub fn load_literal(value: i16) -> Self {
        Self::new(OpCode::LoadL, Register::CB, 0, value)
    }

    /// PUSH size
    pub fn push(size: u8) -> Self {
        Self::new(OpCode::Push, Register::CB, 0, i16::from(size))
    }

    /// POP(0) size
    pub fn pop(size: i16) -> Self {
        Self::new(OpCode::Pop, Register::CB, 0, size)
    }

    /// CALL(SB) primitive[PB]
    pub fn call_primitive(primitive: Primitive) -> Self {
        Self::new(OpCode::Call, Register::PB, Register::SB as u8, primitive.address())
    }

    pub fn halt() -> Self {
        Self::new(OpCode::Halt, Register::CB, 0, 0)
    }
}

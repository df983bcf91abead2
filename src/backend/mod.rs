//! Backend module - Triangle Abstract Machine code generation

pub mod codegen;
pub mod frame;
pub mod object;
pub mod printer;
pub mod runtime;
pub mod tam;
pub mod target_code;

pub use codegen::{generate, CodeGenerator, GeneratedCode};
pub use printer::Disassembler;
pub use runtime::RuntimeEntity;
pub use tam::{Instruction, OpCode, Primitive, Register};
pub use target_code::{PatchToken, TargetCode};

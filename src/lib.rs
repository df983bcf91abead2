//! tamc
//!
//! Compiler for a small Triangle-style teaching language. Source text is
//! scanned, parsed, resolved and type checked, then translated into code
//! for the Triangle Abstract Machine.

pub mod backend;
pub mod driver;
pub mod feedback;
pub mod frontend;
pub mod stdlib;
pub mod types;
pub mod utils;

pub use driver::{compile_source, compile_tokens, Compilation, CompileOptions};

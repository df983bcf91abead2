//! Standard library module

pub mod builtins;

pub use builtins::{Builtin, BuiltinKind, StandardEnvironment, StdId};

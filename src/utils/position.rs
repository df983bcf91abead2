//! Source location tracking

use serde::Serialize;
use std::fmt;

/// A location in the source text, or one of the sentinels used for
/// entities the compiler makes up itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Position {
    /// 1-based line and column of the first character
    Source { line: u32, column: u32 },
    /// Declarations of the standard environment
    Builtin,
    /// Whole-program diagnostics with nothing to point at
    Nowhere,
}

impl Position {
    /// Create a source position
    pub fn new(line: u32, column: u32) -> Self {
        Self::Source { line, column }
    }

    /// Line number, if this is a real source position
    pub fn line(&self) -> Option<u32> {
        match self {
            Self::Source { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// Column number, if this is a real source position
    pub fn column(&self) -> Option<u32> {
        match self {
            Self::Source { column, .. } => Some(*column),
            _ => None,
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, Self::Builtin)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::Nowhere
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source { line, column } => write!(f, "{}:{}", line, column),
            Self::Builtin => write!(f, "<built-in>"),
            Self::Nowhere => write!(f, "<no position>"),
        }
    }
}

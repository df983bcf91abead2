//! Type System for tamc

use serde::Serialize;
use std::fmt;

/// The closed set of types a program can mention or compute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Type {
    Boolean,
    Char,
    Integer,
    /// Argument type of operators that accept any pair of equal types
    Any,
    /// Result type of procedures
    Void,
}

impl Type {
    /// Storage size in machine words
    pub fn size(&self) -> u8 {
        match self {
            Self::Boolean | Self::Char | Self::Integer => 1,
            Self::Any | Self::Void => 0,
        }
    }

    /// Whether this is one of the sentinel types user code cannot name
    pub fn is_sentinel(&self) -> bool {
        matches!(self, Self::Any | Self::Void)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Boolean => "Boolean",
            Self::Char => "Char",
            Self::Integer => "Integer",
            Self::Any => "any",
            Self::Void => "void",
        };
        f.write_str(name)
    }
}

/// How an argument travels to a procedure or function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassingMode {
    ByValue,
    ByReference,
}

/// The single formal parameter of a built-in procedure or function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormalParameter {
    pub ty: Type,
    pub mode: PassingMode,
}

impl FormalParameter {
    pub fn by_value(ty: Type) -> Self {
        Self { ty, mode: PassingMode::ByValue }
    }

    pub fn by_reference(ty: Type) -> Self {
        Self { ty, mode: PassingMode::ByReference }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes() {
        assert_eq!(Type::Integer.size(), 1);
        assert_eq!(Type::Char.size(), 1);
        assert_eq!(Type::Boolean.size(), 1);
        assert_eq!(Type::Void.size(), 0);
    }

    #[test]
    fn test_sentinels() {
        assert!(Type::Any.is_sentinel());
        assert!(Type::Void.is_sentinel());
        assert!(!Type::Integer.is_sentinel());
    }
}

//! Error handling for tamc

use crate::types::Type;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Compiler error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // ==================== Scanner Errors ====================

    #[error("Unknown character '{found}'")]
    UnknownCharacter { found: char },

    #[error("Malformed character literal: {reason}")]
    MalformedCharLiteral { reason: String },

    // ==================== Parser Errors ====================

    #[error("Expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: String },

    #[error("A {construct} cannot start with {found}")]
    UnrecognizedStart { construct: &'static str, found: String },

    #[error("Expected end of program, found {found}")]
    TrailingInput { found: String },

    // ==================== Resolution Errors ====================

    #[error("Identifier not declared: {name}")]
    UndeclaredIdentifier { name: String },

    #[error("Duplicate declaration: {name}")]
    DuplicateDeclaration { name: String },

    // ==================== Type Errors ====================

    #[error("Cannot assign a value of type {found} to {name} of type {expected}")]
    AssignmentMismatch { name: String, expected: Type, found: Type },

    #[error("{name} expects an argument of type {expected}, got {found}")]
    ArgumentMismatch { name: String, expected: Type, found: Type },

    #[error("Operator {op} expects an operand of type {expected}, got {found}")]
    OperandMismatch { op: String, expected: Type, found: Type },

    #[error("Operands of {op} differ in type: {left} and {right}")]
    OperandsDiffer { op: String, left: Type, right: Type },

    #[error("Condition must be of type Boolean, got {found}")]
    GuardNotBoolean { found: Type },

    #[error("{name} takes {expected} argument(s), called with {found}")]
    WrongArgumentCount { name: String, expected: usize, found: usize },

    #[error("{name} takes its argument by reference, pass a var parameter")]
    ExpectedVarParameter { name: String },

    #[error("{name} takes its argument by value, pass an expression")]
    ExpectedValueParameter { name: String },

    #[error("{name} is not a variable")]
    NotAVariable { name: String },

    #[error("{name} is not a procedure or function")]
    NotAFunction { name: String },

    #[error("{name} is not a constant or variable")]
    NotAnEntity { name: String },

    #[error("{name} is not a type")]
    NotAType { name: String },

    #[error("{op} is not a binary operator")]
    NotABinaryOperator { op: String },

    #[error("{op} is not a unary operator")]
    NotAUnaryOperator { op: String },

    #[error("{name} has no result and cannot be used in an expression")]
    VoidFunctionInExpression { name: String },

    #[error("Literal {spelling} is outside the range -32768..=32767")]
    LiteralOutOfRange { spelling: String },

    // ==================== Code Generation Errors ====================

    #[error("Program needs {size} instructions, the machine addresses at most 32767")]
    ProgramTooLarge { size: usize },

    #[error("Declarations need {words} words of stack, offsets reach at most 32767")]
    StorageTooLarge { words: usize },

    // ==================== Object Code Errors ====================

    #[error("Malformed object code: {0}")]
    MalformedObject(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl Error {
    /// Whether this error came out of the type checker
    pub fn is_type_error(&self) -> bool {
        matches!(
            self,
            Self::AssignmentMismatch { .. }
                | Self::ArgumentMismatch { .. }
                | Self::OperandMismatch { .. }
                | Self::OperandsDiffer { .. }
                | Self::GuardNotBoolean { .. }
                | Self::WrongArgumentCount { .. }
                | Self::ExpectedVarParameter { .. }
                | Self::ExpectedValueParameter { .. }
                | Self::NotAVariable { .. }
                | Self::NotAFunction { .. }
                | Self::NotAnEntity { .. }
                | Self::NotAType { .. }
                | Self::NotABinaryOperator { .. }
                | Self::NotAUnaryOperator { .. }
                | Self::VoidFunctionInExpression { .. }
                | Self::LiteralOutOfRange { .. }
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

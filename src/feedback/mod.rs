//! Structured Feedback Module
//!
//! Machine-readable compilation reports:
//! - JSON diagnostics with stable error codes and fix hints
//! - Compilation statistics

use serde::{Deserialize, Serialize};

use crate::driver::Compilation;
use crate::utils::{Diagnostic, Error, Position};

// ==================== Structured Error Report ====================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorReport {
    /// Stable code, e.g. "E0301"
    pub code: String,
    /// Phase that reported it
    pub phase: String,
    pub message: String,
    pub location: Option<Location>,
    /// Suggested fix, when there is an obvious one
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

// ==================== Compilation Report ====================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompilationReport {
    pub success: bool,
    pub source_file: String,
    pub diagnostics: Vec<ErrorReport>,
    pub stats: CompilationStats,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompilationStats {
    pub tokens: usize,
    pub resolved_names: usize,
    pub typed_nodes: usize,
    pub instructions: usize,
    /// Lines of source
    pub loc: usize,
}

impl ErrorReport {
    pub fn from_diagnostic(diagnostic: &Diagnostic) -> Self {
        let location = match diagnostic.position {
            Position::Source { line, column } => Some(Location { line, column }),
            Position::Builtin | Position::Nowhere => None,
        };
        Self {
            code: error_code(&diagnostic.error).to_string(),
            phase: diagnostic.phase.to_string(),
            message: diagnostic.error.to_string(),
            location,
            hint: hint(&diagnostic.error),
        }
    }
}

impl CompilationReport {
    pub fn new(compilation: &Compilation, source_file: &str, source: &str) -> Self {
        Self {
            success: compilation.succeeded(),
            source_file: source_file.to_string(),
            diagnostics: compilation
                .reporter
                .diagnostics()
                .iter()
                .map(ErrorReport::from_diagnostic)
                .collect(),
            stats: CompilationStats {
                tokens: compilation.token_count,
                resolved_names: compilation.annotations.binding_count(),
                typed_nodes: compilation.annotations.type_count(),
                instructions: compilation.code.as_ref().map_or(0, |c| c.len()),
                loc: source.lines().count(),
            },
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

// ==================== Error Codes ====================

/// E01xx scanning, E02xx parsing, E03xx resolution, E04xx typing,
/// E05xx code generation, E06xx object files
fn error_code(error: &Error) -> &'static str {
    match error {
        Error::UnknownCharacter { .. } => "E0101",
        Error::MalformedCharLiteral { .. } => "E0102",
        Error::UnexpectedToken { .. } => "E0201",
        Error::UnrecognizedStart { .. } => "E0202",
        Error::TrailingInput { .. } => "E0203",
        Error::UndeclaredIdentifier { .. } => "E0301",
        Error::DuplicateDeclaration { .. } => "E0302",
        Error::AssignmentMismatch { .. } => "E0401",
        Error::ArgumentMismatch { .. } => "E0402",
        Error::OperandMismatch { .. } => "E0403",
        Error::OperandsDiffer { .. } => "E0404",
        Error::GuardNotBoolean { .. } => "E0405",
        Error::WrongArgumentCount { .. } => "E0406",
        Error::ExpectedVarParameter { .. } => "E0407",
        Error::ExpectedValueParameter { .. } => "E0408",
        Error::NotAVariable { .. } => "E0409",
        Error::NotAFunction { .. } => "E0410",
        Error::NotAnEntity { .. } => "E0411",
        Error::NotAType { .. } => "E0412",
        Error::NotABinaryOperator { .. } => "E0413",
        Error::NotAUnaryOperator { .. } => "E0414",
        Error::VoidFunctionInExpression { .. } => "E0415",
        Error::LiteralOutOfRange { .. } => "E0416",
        Error::ProgramTooLarge { .. } => "E0501",
        Error::StorageTooLarge { .. } => "E0502",
        Error::MalformedObject(_) => "E0601",
        Error::Io(_) => "E0602",
    }
}

fn hint(error: &Error) -> Option<String> {
    let hint = match error {
        Error::UndeclaredIdentifier { name } => {
            format!("declare '{}' in an enclosing let before this use", name)
        }
        Error::DuplicateDeclaration { name } => {
            format!("rename one of the '{}' declarations or move it to an inner let", name)
        }
        Error::ExpectedVarParameter { .. } => "pass a variable as `var name`".to_string(),
        Error::ExpectedValueParameter { .. } => "drop the `var` keyword".to_string(),
        Error::NotAVariable { name } => {
            format!("declare '{}' with var instead of const", name)
        }
        Error::LiteralOutOfRange { .. } => format!("use a value no larger than {}", i16::MAX),
        _ => return None,
    };
    Some(hint)
}

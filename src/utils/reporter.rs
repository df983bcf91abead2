//! Diagnostic sink shared by every compiler phase

use std::fmt;

use log::error;
use serde::Serialize;

use crate::utils::{Error, Position};

/// The compiler phase that produced a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Scanning,
    Parsing,
    Resolution,
    TypeChecking,
    CodeGeneration,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Scanning => "scanning",
            Self::Parsing => "parsing",
            Self::Resolution => "resolution",
            Self::TypeChecking => "type checking",
            Self::CodeGeneration => "code generation",
        };
        f.write_str(name)
    }
}

/// A user-facing error tied to a source position
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub phase: Phase,
    pub position: Position,
    pub error: Error,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error[{}] at {}: {}", self.phase, self.position, self.error)
    }
}

/// Collects diagnostics for a whole compilation.
///
/// Internal errors (a phase finding an annotation an earlier phase should
/// have filled) are kept apart from diagnostics: they are logged and never
/// shown to the user as source errors.
#[derive(Debug)]
pub struct ErrorReporter {
    phase: Phase,
    diagnostics: Vec<Diagnostic>,
    internal: Vec<String>,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self {
            phase: Phase::Scanning,
            diagnostics: Vec::new(),
            internal: Vec::new(),
        }
    }

    /// Attribute subsequent reports to `phase`
    pub fn enter_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Record a user-facing error
    pub fn report(&mut self, position: Position, error: Error) {
        self.diagnostics.push(Diagnostic {
            phase: self.phase,
            position,
            error,
        });
    }

    /// Record a violated pipeline invariant
    pub fn internal(&mut self, message: impl Into<String>) {
        let message = message.into();
        error!("internal error during {}: {}", self.phase, message);
        self.internal.push(message);
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Diagnostics produced by one phase
    pub fn diagnostics_in(&self, phase: Phase) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.phase == phase)
    }

    pub fn internal_errors(&self) -> &[String] {
        &self.internal
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ErrorReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in &self.diagnostics {
            writeln!(f, "{}", diagnostic)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_is_tagged_with_phase() {
        let mut reporter = ErrorReporter::new();
        reporter.enter_phase(Phase::Resolution);
        reporter.report(
            Position::new(1, 5),
            Error::UndeclaredIdentifier { name: "x".to_string() },
        );

        assert!(reporter.has_errors());
        assert_eq!(reporter.diagnostics()[0].phase, Phase::Resolution);
        assert_eq!(reporter.diagnostics_in(Phase::Parsing).count(), 0);
        assert_eq!(
            reporter.to_string(),
            "error[resolution] at 1:5: Identifier not declared: x\n"
        );
    }

    #[test]
    fn test_internal_errors_are_not_diagnostics() {
        let mut reporter = ErrorReporter::new();
        reporter.internal("missing type annotation");

        assert!(!reporter.has_errors());
        assert_eq!(reporter.internal_errors().len(), 1);
    }
}

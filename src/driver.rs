//! Compilation pipeline
//!
//! Runs scanning, parsing, resolution, type checking and code generation
//! in order. Each phase traverses the whole program and reports everything
//! it finds; the pipeline stops before the next phase once any phase has
//! added a diagnostic.

use log::info;

use crate::backend::{self, GeneratedCode};
use crate::frontend::annotations::Annotations;
use crate::frontend::ast::Program;
use crate::frontend::lexer::Lexer;
use crate::frontend::token::Token;
use crate::frontend::{parser, resolve, semantic};
use crate::stdlib::StandardEnvironment;
use crate::utils::{ErrorReporter, Phase};

/// Settings for one compilation
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Stop after type checking
    pub check_only: bool,
}

/// Everything a compilation produced, successful or not
#[derive(Debug)]
pub struct Compilation {
    pub program: Option<Program>,
    pub annotations: Annotations,
    pub code: Option<GeneratedCode>,
    pub reporter: ErrorReporter,
    pub token_count: usize,
    /// Last phase that ran
    pub last_phase: Phase,
}

impl Compilation {
    fn new(reporter: ErrorReporter) -> Self {
        Self {
            program: None,
            annotations: Annotations::new(),
            code: None,
            last_phase: reporter.phase(),
            reporter,
            token_count: 0,
        }
    }

    /// No diagnostics, no internal errors, and every requested phase ran
    pub fn succeeded(&self) -> bool {
        !self.reporter.has_errors()
            && self.reporter.internal_errors().is_empty()
            && self.program.is_some()
    }
}

/// Compile program text
pub fn compile_source(source: &str, options: &CompileOptions) -> Compilation {
    let mut reporter = ErrorReporter::new();
    reporter.enter_phase(Phase::Scanning);
    let tokens = Lexer::new(source).tokenize(&mut reporter);
    info!("scanned {} tokens", tokens.len());
    if reporter.has_errors() {
        let mut compilation = Compilation::new(reporter);
        compilation.token_count = tokens.len();
        return compilation;
    }
    run(tokens, reporter, options)
}

/// Compile an already scanned token sequence
pub fn compile_tokens(tokens: Vec<Token>, options: &CompileOptions) -> Compilation {
    run(tokens, ErrorReporter::new(), options)
}

fn run(tokens: Vec<Token>, mut reporter: ErrorReporter, options: &CompileOptions) -> Compilation {
    let token_count = tokens.len();
    let env = StandardEnvironment::new();

    reporter.enter_phase(Phase::Parsing);
    let program = parser::parse(tokens, &mut reporter);
    info!("parsing finished with {} errors", reporter.error_count());

    let mut compilation = Compilation::new(reporter);
    compilation.token_count = token_count;
    if compilation.reporter.has_errors() {
        compilation.program = Some(program);
        return compilation;
    }

    compilation.last_phase = Phase::Resolution;
    compilation.reporter.enter_phase(Phase::Resolution);
    let failed = resolve::resolve(
        &program,
        &env,
        &mut compilation.annotations,
        &mut compilation.reporter,
    );
    info!("resolved {} names", compilation.annotations.binding_count());
    if failed {
        compilation.program = Some(program);
        return compilation;
    }

    compilation.last_phase = Phase::TypeChecking;
    compilation.reporter.enter_phase(Phase::TypeChecking);
    let failed = semantic::check(
        &program,
        &env,
        &mut compilation.annotations,
        &mut compilation.reporter,
    );
    info!("typed {} nodes", compilation.annotations.type_count());
    if failed || options.check_only {
        compilation.program = Some(program);
        return compilation;
    }

    compilation.last_phase = Phase::CodeGeneration;
    compilation.reporter.enter_phase(Phase::CodeGeneration);
    let code = backend::generate(
        &program,
        &env,
        &compilation.annotations,
        &mut compilation.reporter,
    );
    compilation.code = Some(code);
    compilation.program = Some(program);
    compilation
}

//! Identifier resolution
//!
//! Links every identifier and operator occurrence to its declaration.
//! Scopes are opened by `let` commands on top of a bottom scope holding the
//! standard environment. Declarations enter their scope in source order as
//! they are met, so a declaration can see earlier siblings but not later
//! ones. Redeclaring a name in the same scope is an error; shadowing a name
//! from an enclosing scope is not.

use std::collections::HashMap;

use log::{debug, trace};

use crate::frontend::annotations::{Annotations, Binding};
use crate::frontend::ast::*;
use crate::stdlib::StandardEnvironment;
use crate::utils::{Error, ErrorReporter, Position};

// ==================== Symbol Table ====================

/// One lexical scope
#[derive(Debug, Default)]
struct Scope {
    symbols: HashMap<String, Binding>,
}

/// Stack of nested scopes, innermost last
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl SymbolTable {
    /// Create a table whose bottom scope holds the standard environment
    pub fn new(env: &StandardEnvironment) -> Self {
        let mut global = Scope::default();
        for (id, builtin) in env.iter() {
            global
                .symbols
                .insert(builtin.name.to_string(), Binding::Standard(id));
        }
        Self {
            scopes: vec![global],
        }
    }

    /// Enter a new scope
    pub fn enter_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Exit the current scope
    pub fn exit_scope(&mut self) {
        // The standard environment is never popped
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Define a name in the current scope
    pub fn define(&mut self, name: &str, binding: Binding) -> Result<(), Error> {
        let scope = self
            .scopes
            .last_mut()
            .expect("the standard environment scope is never popped");
        if scope.symbols.contains_key(name) {
            return Err(Error::DuplicateDeclaration {
                name: name.to_string(),
            });
        }
        scope.symbols.insert(name.to_string(), binding);
        Ok(())
    }

    /// Look up a name, searching from the current scope outward
    pub fn lookup(&self, name: &str) -> Option<Binding> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.symbols.get(name).copied())
    }
}

// ==================== Resolver ====================

/// Walks a program and fills in `Annotations::declarations`
pub struct Resolver<'a> {
    symbols: SymbolTable,
    annotations: &'a mut Annotations,
    reporter: &'a mut ErrorReporter,
}

impl<'a> Resolver<'a> {
    pub fn new(
        env: &StandardEnvironment,
        annotations: &'a mut Annotations,
        reporter: &'a mut ErrorReporter,
    ) -> Self {
        Self {
            symbols: SymbolTable::new(env),
            annotations,
            reporter,
        }
    }

    /// Resolve a whole program. Returns `true` if this pass reported errors.
    pub fn resolve(&mut self, program: &Program) -> bool {
        let before = self.reporter.error_count();
        self.resolve_command(&program.command);
        self.reporter.error_count() > before
    }

    fn resolve_command(&mut self, command: &Command) {
        match command {
            Command::Assign { target, value, .. } => {
                self.resolve_identifier(target);
                self.resolve_expression(value);
            }
            Command::Call { callee, param, .. } => {
                self.resolve_identifier(callee);
                self.resolve_parameter(param);
            }
            Command::If {
                guard,
                then_branch,
                else_branch,
                ..
            } => {
                self.resolve_expression(guard);
                self.resolve_command(then_branch);
                self.resolve_command(else_branch);
            }
            Command::QuickIf {
                guard, then_branch, ..
            } => {
                self.resolve_expression(guard);
                self.resolve_command(then_branch);
            }
            Command::While { guard, body, .. } => {
                self.resolve_expression(guard);
                self.resolve_command(body);
            }
            Command::Loop {
                before, guard, body, ..
            } => {
                self.resolve_command(before);
                self.resolve_expression(guard);
                self.resolve_command(body);
            }
            Command::Let {
                declaration, body, ..
            } => {
                self.symbols.enter_scope();
                debug!("entered scope at depth {}", self.symbols.depth());
                self.resolve_declaration(declaration);
                self.resolve_command(body);
                self.symbols.exit_scope();
            }
            Command::Sequential { commands, .. } => {
                for command in commands {
                    self.resolve_command(command);
                }
            }
            Command::Blank { .. } => {}
            Command::Error { position } => {
                debug!("skipping error command at {}", position);
            }
        }
    }

    fn resolve_declaration(&mut self, declaration: &Declaration) {
        match declaration {
            Declaration::Const {
                id, name, value, ..
            } => {
                // The initializer cannot see the name being declared
                self.resolve_expression(value);
                self.declare(name, Binding::Const(*id));
            }
            Declaration::Var { id, name, ty, .. } => {
                self.resolve_identifier(&ty.name);
                self.declare(name, Binding::Var(*id));
            }
            Declaration::Sequential { declarations, .. } => {
                for declaration in declarations {
                    self.resolve_declaration(declaration);
                }
            }
            Declaration::Error { position } => {
                debug!("skipping error declaration at {}", position);
            }
        }
    }

    fn resolve_parameter(&mut self, param: &Parameter) {
        match &param.kind {
            ParamKind::Blank | ParamKind::Error => {}
            ParamKind::Value(expr) => self.resolve_expression(expr),
            ParamKind::Var(name) => self.resolve_identifier(name),
        }
    }

    fn resolve_expression(&mut self, expr: &Expression) {
        match &expr.kind {
            ExprKind::IntLiteral(_) | ExprKind::CharLiteral(_) => {}
            ExprKind::Identifier(name) => self.resolve_identifier(name),
            ExprKind::Unary { op, operand } => {
                self.resolve_operator(op);
                self.resolve_expression(operand);
            }
            ExprKind::Binary { left, op, right } => {
                self.resolve_expression(left);
                self.resolve_operator(op);
                self.resolve_expression(right);
            }
            ExprKind::Call { callee, param } => {
                self.resolve_identifier(callee);
                self.resolve_parameter(param);
            }
            ExprKind::Error => {
                debug!("skipping error expression at {}", expr.position);
            }
        }
    }

    fn declare(&mut self, name: &Identifier, binding: Binding) {
        trace!("declaring {} at {}", name.spelling, name.position);
        if let Err(err) = self.symbols.define(&name.spelling, binding) {
            self.reporter.report(name.position, err);
        }
    }

    fn resolve_identifier(&mut self, name: &Identifier) {
        self.link(name.id, &name.spelling, name.position);
    }

    fn resolve_operator(&mut self, op: &Operator) {
        self.link(op.id, &op.spelling, op.position);
    }

    fn link(&mut self, node: NodeId, spelling: &str, position: Position) {
        match self.symbols.lookup(spelling) {
            Some(binding) => {
                trace!("{} at {} resolves to {:?}", spelling, position, binding);
                if !self.annotations.bind(node, binding) {
                    self.reporter
                        .internal(format!("{} at {} resolved twice", spelling, position));
                }
            }
            None => self.reporter.report(
                position,
                Error::UndeclaredIdentifier {
                    name: spelling.to_string(),
                },
            ),
        }
    }
}

/// Resolve `program` against the standard environment. Returns `true` if
/// any resolution error was reported.
pub fn resolve(
    program: &Program,
    env: &StandardEnvironment,
    annotations: &mut Annotations,
    reporter: &mut ErrorReporter,
) -> bool {
    Resolver::new(env, annotations, reporter).resolve(program)
}

//! Semantic Analysis for tamc
//!
//! Type checking over a resolved program. Assigns a static type to every
//! expression, parameter, type denoter and entity declaration, and checks
//! assignments, calls, operator applications and guards.
//!
//! The checker keeps walking after a violation so one run reports as many
//! problems as possible. A node whose type could not be worked out is left
//! untyped, and comparisons against an untyped node are skipped rather
//! than reported a second time.

use log::debug;

use crate::frontend::annotations::{Annotations, Binding};
use crate::frontend::ast::*;
use crate::stdlib::{BuiltinKind, StandardEnvironment};
use crate::types::{PassingMode, Type};
use crate::utils::{Error, ErrorReporter, Position};

/// Walks a resolved program and fills in `Annotations::types`
pub struct TypeChecker<'a> {
    env: &'a StandardEnvironment,
    annotations: &'a mut Annotations,
    reporter: &'a mut ErrorReporter,
}

impl<'a> TypeChecker<'a> {
    pub fn new(
        env: &'a StandardEnvironment,
        annotations: &'a mut Annotations,
        reporter: &'a mut ErrorReporter,
    ) -> Self {
        Self {
            env,
            annotations,
            reporter,
        }
    }

    /// Check a whole program. Returns `true` if this pass reported errors.
    pub fn check(&mut self, program: &Program) -> bool {
        let before = self.reporter.error_count();
        self.check_command(&program.command);
        self.reporter.error_count() > before
    }

    // ==================== Commands ====================

    fn check_command(&mut self, command: &Command) {
        match command {
            Command::Assign { target, value, .. } => {
                let value_type = self.check_expression(value);
                match self.binding_of(target.id, &target.spelling, target.position) {
                    Some(Binding::Var(decl)) => {
                        let var_type = self.annotations.type_of(decl);
                        if let (Some(expected), Some(found)) = (var_type, value_type) {
                            if expected != found {
                                self.reporter.report(
                                    value.position,
                                    Error::AssignmentMismatch {
                                        name: target.spelling.clone(),
                                        expected,
                                        found,
                                    },
                                );
                            }
                        }
                    }
                    Some(_) => self.reporter.report(
                        target.position,
                        Error::NotAVariable {
                            name: target.spelling.clone(),
                        },
                    ),
                    None => {}
                }
            }
            Command::Call { callee, param, .. } => {
                self.check_call(callee, param, false);
            }
            Command::If {
                guard,
                then_branch,
                else_branch,
                ..
            } => {
                self.check_guard(guard);
                self.check_command(then_branch);
                self.check_command(else_branch);
            }
            Command::QuickIf {
                guard, then_branch, ..
            } => {
                self.check_guard(guard);
                self.check_command(then_branch);
            }
            Command::While { guard, body, .. } => {
                self.check_guard(guard);
                self.check_command(body);
            }
            Command::Loop {
                before, guard, body, ..
            } => {
                self.check_command(before);
                self.check_guard(guard);
                self.check_command(body);
            }
            Command::Let {
                declaration, body, ..
            } => {
                self.check_declaration(declaration);
                self.check_command(body);
            }
            Command::Sequential { commands, .. } => {
                for command in commands {
                    self.check_command(command);
                }
            }
            Command::Blank { .. } => {}
            Command::Error { position } => {
                debug!("skipping error command at {}", position);
            }
        }
    }

    fn check_guard(&mut self, guard: &Expression) {
        if let Some(found) = self.check_expression(guard) {
            if found != Type::Boolean {
                self.reporter
                    .report(guard.position, Error::GuardNotBoolean { found });
            }
        }
    }

    // ==================== Declarations ====================

    fn check_declaration(&mut self, declaration: &Declaration) {
        match declaration {
            Declaration::Const { id, value, .. } => {
                if let Some(ty) = self.check_expression(value) {
                    self.record(*id, ty);
                }
            }
            Declaration::Var { id, ty, .. } => {
                if let Some(ty) = self.check_type_denoter(ty) {
                    self.record(*id, ty);
                }
            }
            Declaration::Sequential { declarations, .. } => {
                for declaration in declarations {
                    self.check_declaration(declaration);
                }
            }
            Declaration::Error { position } => {
                debug!("skipping error declaration at {}", position);
            }
        }
    }

    fn check_type_denoter(&mut self, denoter: &TypeDenoter) -> Option<Type> {
        let name = &denoter.name;
        let ty = match self.binding_of(name.id, &name.spelling, name.position)? {
            Binding::Standard(id) => match self.env.get(id).kind {
                BuiltinKind::Type(ty) => Some(ty),
                _ => None,
            },
            _ => None,
        };
        match ty {
            Some(ty) => {
                self.record(denoter.id, ty);
                Some(ty)
            }
            None => {
                self.reporter.report(
                    name.position,
                    Error::NotAType {
                        name: name.spelling.clone(),
                    },
                );
                None
            }
        }
    }

    // ==================== Calls ====================

    /// Check a call and return the callee's result type
    fn check_call(
        &mut self,
        callee: &Identifier,
        param: &Parameter,
        as_expression: bool,
    ) -> Option<Type> {
        let arg_type = self.check_parameter(param);
        let binding = self.binding_of(callee.id, &callee.spelling, callee.position)?;

        let (formal, result) = match binding {
            Binding::Standard(id) => match self.env.get(id).kind {
                BuiltinKind::Function { param, result, .. } => (param, result),
                _ => return self.not_a_function(callee),
            },
            Binding::Const(_) | Binding::Var(_) => return self.not_a_function(callee),
        };

        let given = usize::from(!matches!(param.kind, ParamKind::Blank));
        let expected = usize::from(formal.is_some());
        if given != expected {
            self.reporter.report(
                param.position,
                Error::WrongArgumentCount {
                    name: callee.spelling.clone(),
                    expected,
                    found: given,
                },
            );
        } else if let Some(formal) = formal {
            if let Some(found) = arg_type {
                if found != formal.ty {
                    self.reporter.report(
                        param.position,
                        Error::ArgumentMismatch {
                            name: callee.spelling.clone(),
                            expected: formal.ty,
                            found,
                        },
                    );
                }
            }
            let by_reference = matches!(param.kind, ParamKind::Var(_));
            match formal.mode {
                PassingMode::ByReference if !by_reference => self.reporter.report(
                    param.position,
                    Error::ExpectedVarParameter {
                        name: callee.spelling.clone(),
                    },
                ),
                PassingMode::ByValue if by_reference => self.reporter.report(
                    param.position,
                    Error::ExpectedValueParameter {
                        name: callee.spelling.clone(),
                    },
                ),
                _ => {}
            }
        }

        if as_expression && result == Type::Void {
            self.reporter.report(
                callee.position,
                Error::VoidFunctionInExpression {
                    name: callee.spelling.clone(),
                },
            );
            return None;
        }
        Some(result)
    }

    fn not_a_function(&mut self, callee: &Identifier) -> Option<Type> {
        self.reporter.report(
            callee.position,
            Error::NotAFunction {
                name: callee.spelling.clone(),
            },
        );
        None
    }

    fn check_parameter(&mut self, param: &Parameter) -> Option<Type> {
        let ty = match &param.kind {
            ParamKind::Blank => Some(Type::Void),
            ParamKind::Value(expr) => self.check_expression(expr),
            ParamKind::Var(name) => {
                match self.binding_of(name.id, &name.spelling, name.position)? {
                    Binding::Var(decl) => self.annotations.type_of(decl),
                    _ => {
                        self.reporter.report(
                            name.position,
                            Error::NotAVariable {
                                name: name.spelling.clone(),
                            },
                        );
                        None
                    }
                }
            }
            ParamKind::Error => {
                debug!("skipping error parameter at {}", param.position);
                None
            }
        };
        if let Some(ty) = ty {
            self.record(param.id, ty);
        }
        ty
    }

    // ==================== Expressions ====================

    fn check_expression(&mut self, expr: &Expression) -> Option<Type> {
        let ty = match &expr.kind {
            ExprKind::IntLiteral(lit) => {
                if lit.value().is_none() {
                    self.reporter.report(
                        lit.position,
                        Error::LiteralOutOfRange {
                            spelling: lit.spelling.clone(),
                        },
                    );
                }
                Some(Type::Integer)
            }
            ExprKind::CharLiteral(lit) => {
                if lit.value().is_none() {
                    self.reporter.report(
                        lit.position,
                        Error::LiteralOutOfRange {
                            spelling: lit.spelling.clone(),
                        },
                    );
                }
                Some(Type::Char)
            }
            ExprKind::Identifier(name) => self.check_entity(name),
            ExprKind::Unary { op, operand } => {
                let operand_type = self.check_expression(operand);
                self.check_unary(op, operand, operand_type)
            }
            ExprKind::Binary { left, op, right } => {
                let left_type = self.check_expression(left);
                let right_type = self.check_expression(right);
                self.check_binary(expr, op, (left, left_type), (right, right_type))
            }
            ExprKind::Call { callee, param } => self.check_call(callee, param, true),
            ExprKind::Error => {
                debug!("skipping error expression at {}", expr.position);
                None
            }
        };
        if let Some(ty) = ty {
            self.record(expr.id, ty);
        }
        ty
    }

    /// Type of a constant or variable reference
    fn check_entity(&mut self, name: &Identifier) -> Option<Type> {
        match self.binding_of(name.id, &name.spelling, name.position)? {
            // Untyped when the declaration itself failed to check
            Binding::Const(decl) | Binding::Var(decl) => self.annotations.type_of(decl),
            Binding::Standard(id) => match self.env.get(id).kind {
                BuiltinKind::Constant { ty, .. } => Some(ty),
                _ => {
                    self.reporter.report(
                        name.position,
                        Error::NotAnEntity {
                            name: name.spelling.clone(),
                        },
                    );
                    None
                }
            },
        }
    }

    fn check_unary(
        &mut self,
        op: &Operator,
        operand: &Expression,
        operand_type: Option<Type>,
    ) -> Option<Type> {
        let (expected, result) = match self.operator_kind(op)? {
            BuiltinKind::UnaryOperator {
                operand, result, ..
            } => (operand, result),
            _ => {
                self.reporter.report(
                    op.position,
                    Error::NotAUnaryOperator {
                        op: op.spelling.clone(),
                    },
                );
                return None;
            }
        };
        if let Some(found) = operand_type {
            if found != expected {
                self.reporter.report(
                    operand.position,
                    Error::OperandMismatch {
                        op: op.spelling.clone(),
                        expected,
                        found,
                    },
                );
            }
        }
        Some(result)
    }

    fn check_binary(
        &mut self,
        expr: &Expression,
        op: &Operator,
        (left, left_type): (&Expression, Option<Type>),
        (right, right_type): (&Expression, Option<Type>),
    ) -> Option<Type> {
        let (expected_left, expected_right, result) = match self.operator_kind(op)? {
            BuiltinKind::BinaryOperator {
                left, right, result, ..
            } => (left, right, result),
            _ => {
                self.reporter.report(
                    op.position,
                    Error::NotABinaryOperator {
                        op: op.spelling.clone(),
                    },
                );
                return None;
            }
        };

        if expected_left == Type::Any {
            if let (Some(l), Some(r)) = (left_type, right_type) {
                if l != r {
                    self.reporter.report(
                        expr.position,
                        Error::OperandsDiffer {
                            op: op.spelling.clone(),
                            left: l,
                            right: r,
                        },
                    );
                }
            }
        } else {
            for (operand, found, expected) in [
                (left, left_type, expected_left),
                (right, right_type, expected_right),
            ] {
                if let Some(found) = found {
                    if found != expected {
                        self.reporter.report(
                            operand.position,
                            Error::OperandMismatch {
                                op: op.spelling.clone(),
                                expected,
                                found,
                            },
                        );
                    }
                }
            }
        }
        Some(result)
    }

    // ==================== Helpers ====================

    /// The built-in an operator resolved to. Operators can only be declared
    /// by the standard environment.
    fn operator_kind(&mut self, op: &Operator) -> Option<BuiltinKind> {
        match self.binding_of(op.id, &op.spelling, op.position)? {
            Binding::Standard(id) => Some(self.env.get(id).kind.clone()),
            binding => {
                self.reporter.internal(format!(
                    "operator {} at {} bound to {:?}",
                    op.spelling, op.position, binding
                ));
                None
            }
        }
    }

    /// The declaration a use site resolved to. A missing link means the
    /// checker is running over a program that failed resolution.
    fn binding_of(&mut self, node: NodeId, spelling: &str, position: Position) -> Option<Binding> {
        let binding = self.annotations.binding(node);
        if binding.is_none() {
            self.reporter.internal(format!(
                "{} at {} reached type checking unresolved",
                spelling, position
            ));
        }
        binding
    }

    fn record(&mut self, node: NodeId, ty: Type) {
        if !self.annotations.set_type(node, ty) {
            self.reporter
                .internal(format!("node {:?} typed twice", node));
        }
    }
}

/// Type check a resolved program. Returns `true` if any type error was
/// reported.
pub fn check(
    program: &Program,
    env: &StandardEnvironment,
    annotations: &mut Annotations,
    reporter: &mut ErrorReporter,
) -> bool {
    TypeChecker::new(env, annotations, reporter).check(program)
}

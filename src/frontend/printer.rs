//! AST Printer - print a tree back as canonical source text
//!
//! The output re-parses to a tree of the same shape, so it doubles as a
//! serialization of the AST.

use std::fmt::Write;

use crate::frontend::ast::*;

/// Pretty printer for programs
pub struct AstPrinter {
    output: String,
}

impl AstPrinter {
    pub fn new() -> Self {
        Self {
            output: String::new(),
        }
    }

    /// Print a program to string
    pub fn print_program(&mut self, program: &Program) -> String {
        self.output.clear();
        self.print_command(&program.command);
        self.output.clone()
    }

    fn print_command(&mut self, command: &Command) {
        match command {
            Command::Assign { target, value, .. } => {
                write!(self.output, "{} := ", target.spelling).unwrap();
                self.print_expression(value);
            }
            Command::Call { callee, param, .. } => {
                write!(self.output, "{}(", callee.spelling).unwrap();
                self.print_parameter(param);
                self.output.push(')');
            }
            Command::If {
                guard,
                then_branch,
                else_branch,
                ..
            } => {
                self.output.push_str("if ");
                self.print_expression(guard);
                self.output.push_str(" then ");
                self.print_single_command(then_branch);
                self.output.push_str(" else ");
                self.print_single_command(else_branch);
            }
            Command::QuickIf {
                guard, then_branch, ..
            } => {
                self.output.push_str("? ");
                self.print_expression(guard);
                self.output.push_str(" => ");
                self.print_single_command(then_branch);
            }
            Command::While { guard, body, .. } => {
                self.output.push_str("while (");
                self.print_expression(guard);
                self.output.push_str(") ");
                self.print_single_command(body);
                self.output.push_str(" wend");
            }
            Command::Loop {
                before, guard, body, ..
            } => {
                self.output.push_str("loop ");
                self.print_single_command(before);
                self.output.push_str(" while (");
                self.print_expression(guard);
                self.output.push_str(") ");
                self.print_single_command(body);
                self.output.push_str(" repeat");
            }
            Command::Let {
                declaration, body, ..
            } => {
                self.output.push_str("let ");
                self.print_declaration(declaration);
                self.output.push_str(" in ");
                self.print_single_command(body);
            }
            Command::Sequential { commands, .. } => {
                for (i, command) in commands.iter().enumerate() {
                    if i > 0 {
                        self.output.push_str("; ");
                    }
                    self.print_single_command(command);
                }
            }
            Command::Blank { .. } => {}
            Command::Error { .. } => self.output.push_str("<error>"),
        }
    }

    /// Print a command where the grammar wants a single command
    fn print_single_command(&mut self, command: &Command) {
        if let Command::Sequential { .. } = command {
            self.output.push_str("begin ");
            self.print_command(command);
            self.output.push_str(" end");
        } else {
            self.print_command(command);
        }
    }

    fn print_declaration(&mut self, declaration: &Declaration) {
        match declaration {
            Declaration::Const { name, value, .. } => {
                write!(self.output, "const {} ~ ", name.spelling).unwrap();
                self.print_expression(value);
            }
            Declaration::Var { name, ty, .. } => {
                write!(self.output, "var {} ~ {}", name.spelling, ty.name.spelling).unwrap();
            }
            Declaration::Sequential { declarations, .. } => {
                for (i, declaration) in declarations.iter().enumerate() {
                    if i > 0 {
                        self.output.push_str("; ");
                    }
                    self.print_declaration(declaration);
                }
            }
            Declaration::Error { .. } => self.output.push_str("<error>"),
        }
    }

    fn print_parameter(&mut self, param: &Parameter) {
        match &param.kind {
            ParamKind::Blank => {}
            ParamKind::Value(expr) => self.print_expression(expr),
            ParamKind::Var(name) => write!(self.output, "var {}", name.spelling).unwrap(),
            ParamKind::Error => self.output.push_str("<error>"),
        }
    }

    fn print_expression(&mut self, expr: &Expression) {
        match &expr.kind {
            ExprKind::IntLiteral(lit) => self.output.push_str(&lit.spelling),
            ExprKind::CharLiteral(lit) => self.output.push_str(&lit.spelling),
            ExprKind::Identifier(name) => self.output.push_str(&name.spelling),
            ExprKind::Unary { op, operand } => {
                write!(self.output, "{} ", op.spelling).unwrap();
                self.print_primary(operand);
            }
            ExprKind::Binary { left, op, right } => {
                // Left operands chain without brackets, right ones need them
                self.print_expression(left);
                write!(self.output, " {} ", op.spelling).unwrap();
                self.print_primary(right);
            }
            ExprKind::Call { callee, param } => {
                write!(self.output, "{}(", callee.spelling).unwrap();
                self.print_parameter(param);
                self.output.push(')');
            }
            ExprKind::Error => self.output.push_str("<error>"),
        }
    }

    fn print_primary(&mut self, expr: &Expression) {
        if let ExprKind::Binary { .. } = expr.kind {
            self.output.push('(');
            self.print_expression(expr);
            self.output.push(')');
        } else {
            self.print_expression(expr);
        }
    }
}

impl Default for AstPrinter {
    fn default() -> Self {
        Self::new()
    }
}

/// Print a program as source text
pub fn print_program(program: &Program) -> String {
    let mut printer = AstPrinter::new();
    printer.print_program(program)
}

//! Code generation for the Triangle Abstract Machine
//!
//! One depth-first pass over a resolved, type-checked program. Program
//! order becomes address order; the only deferred state is the set of
//! jumps waiting for a target, and every construct patches its own jumps
//! before returning.

use std::collections::HashMap;

use log::{debug, info};

use super::frame::{AllocationError, Frame};
use super::runtime::RuntimeEntity;
use super::tam::{Instruction, FALSE_VALUE, TRUE_VALUE};
use super::target_code::TargetCode;
use crate::frontend::annotations::{Annotations, Binding};
use crate::frontend::ast::*;
use crate::stdlib::{BuiltinKind, StandardEnvironment};
use crate::utils::{Error, ErrorReporter, Position};

/// Generated program and the storage chosen for each declaration
#[derive(Debug)]
pub struct GeneratedCode {
    code: TargetCode,
    storage: HashMap<NodeId, RuntimeEntity>,
}

impl GeneratedCode {
    pub fn instructions(&self) -> &[Instruction] {
        self.code.instructions()
    }

    /// How the declaration `decl` is realized at run time
    pub fn storage_of(&self, decl: NodeId) -> Option<RuntimeEntity> {
        self.storage.get(&decl).copied()
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }
}

pub struct CodeGenerator<'a> {
    env: &'a StandardEnvironment,
    annotations: &'a Annotations,
    reporter: &'a mut ErrorReporter,
    code: TargetCode,
    frame: Frame,
    storage: HashMap<NodeId, RuntimeEntity>,
}

impl<'a> CodeGenerator<'a> {
    pub fn new(
        env: &'a StandardEnvironment,
        annotations: &'a Annotations,
        reporter: &'a mut ErrorReporter,
    ) -> Self {
        Self {
            env,
            annotations,
            reporter,
            code: TargetCode::new(),
            frame: Frame::new(),
            storage: HashMap::new(),
        }
    }

    /// Generate the whole program, ending with HALT
    pub fn generate(mut self, program: &Program) -> GeneratedCode {
        self.generate_command(&program.command);
        self.code.emit(Instruction::halt());
        debug_assert_eq!(self.code.outstanding_patches(), 0);
        debug_assert_eq!(self.frame.depth(), 0);

        if let Err(e) = self.code.check_size() {
            self.reporter.report(Position::Nowhere, e);
        }
        info!("generated {} instructions", self.code.len());
        GeneratedCode {
            code: self.code,
            storage: self.storage,
        }
    }

    // ==================== Commands ====================

    fn generate_command(&mut self, command: &Command) {
        match command {
            Command::Assign { target, value, .. } => {
                debug!("assign to {}", target.spelling);
                self.generate_expression(value);
                match self.entity_of(target).and_then(|e| e.store()) {
                    Some(store) => {
                        self.code.emit(store);
                    }
                    None => self.reporter.internal(format!(
                        "{} at {} is not a stored variable",
                        target.spelling, target.position
                    )),
                }
            }
            Command::Call { callee, param, .. } => {
                self.generate_call(callee, param);
            }
            Command::If {
                guard,
                then_branch,
                else_branch,
                ..
            } => {
                self.generate_expression(guard);
                let to_else = self.code.emit_jump_if(FALSE_VALUE);
                self.generate_command(then_branch);
                let to_end = self.code.emit_jump();
                self.code.patch_here(to_else);
                self.generate_command(else_branch);
                self.code.patch_here(to_end);
            }
            Command::QuickIf {
                guard, then_branch, ..
            } => {
                self.generate_expression(guard);
                let to_end = self.code.emit_jump_if(FALSE_VALUE);
                self.generate_command(then_branch);
                self.code.patch_here(to_end);
            }
            Command::While { guard, body, .. } => {
                let to_guard = self.code.emit_jump();
                let body_start = self.code.next_address();
                self.generate_command(body);
                self.code.patch_here(to_guard);
                self.generate_expression(guard);
                self.code.emit_jump_if_to(TRUE_VALUE, body_start);
            }
            Command::Loop {
                before, guard, body, ..
            } => {
                self.generate_command(before);
                let to_guard = self.code.emit_jump();
                let body_start = self.code.next_address();
                self.generate_command(body);
                self.code.patch_here(to_guard);
                self.generate_expression(guard);
                self.code.emit_jump_if_to(TRUE_VALUE, body_start);
            }
            Command::Let {
                declaration, body, ..
            } => {
                self.frame.push_scope();
                self.generate_declaration(declaration);
                self.generate_command(body);
                let size = self.frame.pop_scope();
                self.code.emit(Instruction::pop(size));
            }
            Command::Sequential { commands, .. } => {
                for command in commands {
                    self.generate_command(command);
                }
            }
            Command::Blank { .. } => {}
            Command::Error { position } => {
                self.reporter
                    .internal(format!("error command at {} reached code generation", position));
            }
        }
    }

    // ==================== Declarations ====================

    fn generate_declaration(&mut self, declaration: &Declaration) {
        match declaration {
            Declaration::Const {
                id,
                name,
                value,
                position,
            } => {
                let entity = match &value.kind {
                    ExprKind::IntLiteral(lit) => lit.value().map(|value| RuntimeEntity::KnownConstant { value }),
                    ExprKind::CharLiteral(lit) => lit.value().map(|value| RuntimeEntity::KnownConstant { value }),
                    _ => None,
                };
                let entity = match entity {
                    Some(entity) => entity,
                    None => {
                        self.generate_expression(value);
                        let size = self.size_of(*id, &name.spelling);
                        let offset = self.allocate(size, *position);
                        RuntimeEntity::UnknownConstant { offset, size }
                    }
                };
                debug!("const {} -> {:?}", name.spelling, entity);
                self.storage.insert(*id, entity);
            }
            Declaration::Var {
                id, name, position, ..
            } => {
                let size = self.size_of(*id, &name.spelling);
                self.code.emit(Instruction::push(size));
                let offset = self.allocate(size, *position);
                let entity = RuntimeEntity::Variable { offset, size };
                debug!("var {} -> {:?}", name.spelling, entity);
                self.storage.insert(*id, entity);
            }
            Declaration::Sequential { declarations, .. } => {
                for declaration in declarations {
                    self.generate_declaration(declaration);
                }
            }
            Declaration::Error { position } => {
                self.reporter.internal(format!(
                    "error declaration at {} reached code generation",
                    position
                ));
            }
        }
    }

    // ==================== Calls and parameters ====================

    fn generate_call(&mut self, callee: &Identifier, param: &Parameter) {
        self.generate_parameter(param);
        let primitive = match self.builtin_of(callee.id) {
            Some(BuiltinKind::Function { primitive, .. }) => primitive,
            _ => {
                self.reporter.internal(format!(
                    "{} at {} is not a primitive routine",
                    callee.spelling, callee.position
                ));
                return;
            }
        };
        self.code.emit(Instruction::call_primitive(primitive));
    }

    fn generate_parameter(&mut self, param: &Parameter) {
        match &param.kind {
            ParamKind::Blank => {}
            ParamKind::Value(expr) => self.generate_expression(expr),
            ParamKind::Var(name) => match self.entity_of(name).and_then(|e| e.load_address()) {
                Some(load_address) => {
                    self.code.emit(load_address);
                }
                None => self.reporter.internal(format!(
                    "{} at {} has no address",
                    name.spelling, name.position
                )),
            },
            ParamKind::Error => {
                self.reporter.internal(format!(
                    "error parameter at {} reached code generation",
                    param.position
                ));
            }
        }
    }

    // ==================== Expressions ====================

    fn generate_expression(&mut self, expr: &Expression) {
        match &expr.kind {
            ExprKind::IntLiteral(lit) => {
                self.code
                    .emit(Instruction::load_literal(lit.value().unwrap_or_default()));
            }
            ExprKind::CharLiteral(lit) => {
                self.code
                    .emit(Instruction::load_literal(lit.value().unwrap_or_default()));
            }
            ExprKind::Identifier(name) => self.generate_reference(name),
            ExprKind::Unary { op, operand } => {
                self.generate_expression(operand);
                self.generate_operator(op, None);
            }
            ExprKind::Binary { left, op, right } => {
                self.generate_expression(left);
                self.generate_expression(right);
                self.generate_operator(op, Some(left));
            }
            ExprKind::Call { callee, param } => self.generate_call(callee, param),
            ExprKind::Error => {
                self.reporter.internal(format!(
                    "error expression at {} reached code generation",
                    expr.position
                ));
            }
        }
    }

    fn generate_reference(&mut self, name: &Identifier) {
        if let Some(Binding::Standard(id)) = self.annotations.binding(name.id) {
            if let BuiltinKind::Constant { value, .. } = self.env.get(id).kind {
                self.code.emit(Instruction::load_literal(value));
                return;
            }
        }
        match self.entity_of(name) {
            Some(entity) => {
                self.code.emit(entity.load());
            }
            None => self.reporter.internal(format!(
                "{} at {} has no storage",
                name.spelling, name.position
            )),
        }
    }

    /// CALL the operator's primitive. Generic operators also need the
    /// operand size on the stack, taken from the left operand's type.
    fn generate_operator(&mut self, op: &Operator, left: Option<&Expression>) {
        let primitive = match self.builtin_of(op.id) {
            Some(BuiltinKind::UnaryOperator { primitive, .. }) => primitive,
            Some(BuiltinKind::BinaryOperator {
                left: declared,
                primitive,
                ..
            }) => {
                if declared.is_sentinel() {
                    let size = left
                        .and_then(|e| self.annotations.type_of(e.id))
                        .map(|ty| ty.size())
                        .unwrap_or(1);
                    self.code.emit(Instruction::load_literal(i16::from(size)));
                }
                primitive
            }
            _ => {
                self.reporter.internal(format!(
                    "operator {} at {} has no primitive",
                    op.spelling, op.position
                ));
                return;
            }
        };
        self.code.emit(Instruction::call_primitive(primitive));
    }

    // ==================== Helpers ====================

    fn builtin_of(&self, node: NodeId) -> Option<BuiltinKind> {
        match self.annotations.binding(node)? {
            Binding::Standard(id) => Some(self.env.get(id).kind.clone()),
            _ => None,
        }
    }

    fn entity_of(&self, name: &Identifier) -> Option<RuntimeEntity> {
        match self.annotations.binding(name.id)? {
            Binding::Const(decl) | Binding::Var(decl) => self.storage.get(&decl).copied(),
            Binding::Standard(_) => None,
        }
    }

    /// Reserve frame space for a declaration at `position`
    fn allocate(&mut self, size: u8, position: Position) -> i16 {
        match self.frame.allocate(size) {
            Ok(offset) => offset,
            Err(AllocationError::NoScope) => {
                self.reporter
                    .internal(format!("declaration at {} outside any let scope", position));
                0
            }
            Err(AllocationError::Overflow { words }) => {
                self.reporter
                    .report(position, Error::StorageTooLarge { words });
                0
            }
        }
    }

    fn size_of(&mut self, decl: NodeId, spelling: &str) -> u8 {
        match self.annotations.type_of(decl) {
            Some(ty) => ty.size(),
            None => {
                self.reporter
                    .internal(format!("declaration of {} reached code generation untyped", spelling));
                1
            }
        }
    }
}

/// Generate code for a checked program
pub fn generate(
    program: &Program,
    env: &StandardEnvironment,
    annotations: &Annotations,
    reporter: &mut ErrorReporter,
) -> GeneratedCode {
    CodeGenerator::new(env, annotations, reporter).generate(program)
}

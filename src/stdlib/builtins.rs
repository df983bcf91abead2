//! Standard Environment
//!
//! The built-in types, constants, operators and primitive routines every
//! program starts with. They form the outermost scope during resolution.

use crate::backend::tam::Primitive;
use crate::types::{FormalParameter, Type};
use crate::utils::Position;

/// Index of an entry in the standard environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StdId(usize);

/// What a built-in name denotes
#[derive(Debug, Clone, PartialEq)]
pub enum BuiltinKind {
    /// A type name
    Type(Type),
    /// A constant whose value is known to the compiler
    Constant { ty: Type, value: i16 },
    UnaryOperator {
        operand: Type,
        result: Type,
        primitive: Primitive,
    },
    /// Binary operator; an `Any` left operand type makes it generic
    BinaryOperator {
        left: Type,
        right: Type,
        result: Type,
        primitive: Primitive,
    },
    /// Procedure (`Void` result) or function taking at most one argument
    Function {
        param: Option<FormalParameter>,
        result: Type,
        primitive: Primitive,
    },
}

/// A compiler-synthesized declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Builtin {
    pub name: &'static str,
    pub kind: BuiltinKind,
    pub position: Position,
}

/// Registry of all built-in declarations
#[derive(Debug)]
pub struct StandardEnvironment {
    entries: Vec<Builtin>,
}

impl StandardEnvironment {
    pub fn new() -> Self {
        let mut env = Self { entries: Vec::new() };
        env.register_all();
        env
    }

    fn register_all(&mut self) {
        // Types
        self.register("Boolean", BuiltinKind::Type(Type::Boolean));
        self.register("Char", BuiltinKind::Type(Type::Char));
        self.register("Integer", BuiltinKind::Type(Type::Integer));

        // Constants
        self.register("true", BuiltinKind::Constant { ty: Type::Boolean, value: 1 });
        self.register("false", BuiltinKind::Constant { ty: Type::Boolean, value: 0 });
        self.register("maxint", BuiltinKind::Constant { ty: Type::Integer, value: i16::MAX });

        // Operators
        self.register(
            "!",
            BuiltinKind::UnaryOperator {
                operand: Type::Boolean,
                result: Type::Boolean,
                primitive: Primitive::Not,
            },
        );
        self.integer_operator("+", Type::Integer, Primitive::Add);
        self.integer_operator("-", Type::Integer, Primitive::Sub);
        self.integer_operator("*", Type::Integer, Primitive::Mult);
        self.integer_operator("/", Type::Integer, Primitive::Div);
        self.integer_operator("<", Type::Boolean, Primitive::Lt);
        self.integer_operator(">", Type::Boolean, Primitive::Gt);
        self.register(
            "=",
            BuiltinKind::BinaryOperator {
                left: Type::Any,
                right: Type::Any,
                result: Type::Boolean,
                primitive: Primitive::Eq,
            },
        );

        // I/O procedures
        self.procedure("get", Some(FormalParameter::by_reference(Type::Char)), Primitive::Get);
        self.procedure("put", Some(FormalParameter::by_value(Type::Char)), Primitive::Put);
        self.procedure("getint", Some(FormalParameter::by_reference(Type::Integer)), Primitive::Getint);
        self.procedure("putint", Some(FormalParameter::by_value(Type::Integer)), Primitive::Putint);
        self.procedure("geteol", None, Primitive::Geteol);
        self.procedure("puteol", None, Primitive::Puteol);

        // Functions
        self.function("eol", None, Type::Boolean, Primitive::Eol);
        self.function("eof", None, Type::Boolean, Primitive::Eof);
        self.function(
            "chr",
            Some(FormalParameter::by_value(Type::Integer)),
            Type::Char,
            Primitive::Id,
        );
        self.function(
            "ord",
            Some(FormalParameter::by_value(Type::Char)),
            Type::Integer,
            Primitive::Id,
        );
    }

    fn register(&mut self, name: &'static str, kind: BuiltinKind) {
        self.entries.push(Builtin {
            name,
            kind,
            position: Position::Builtin,
        });
    }

    fn integer_operator(&mut self, name: &'static str, result: Type, primitive: Primitive) {
        self.register(
            name,
            BuiltinKind::BinaryOperator {
                left: Type::Integer,
                right: Type::Integer,
                result,
                primitive,
            },
        );
    }

    fn procedure(&mut self, name: &'static str, param: Option<FormalParameter>, primitive: Primitive) {
        self.function(name, param, Type::Void, primitive);
    }

    fn function(
        &mut self,
        name: &'static str,
        param: Option<FormalParameter>,
        result: Type,
        primitive: Primitive,
    ) {
        self.register(name, BuiltinKind::Function { param, result, primitive });
    }

    /// Get a built-in by id
    pub fn get(&self, id: StdId) -> &Builtin {
        &self.entries[id.0]
    }

    /// Find a built-in by name
    pub fn lookup(&self, name: &str) -> Option<StdId> {
        self.entries.iter().position(|b| b.name == name).map(StdId)
    }

    /// All built-ins in registration order
    pub fn iter(&self) -> impl Iterator<Item = (StdId, &Builtin)> {
        self.entries.iter().enumerate().map(|(i, b)| (StdId(i), b))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for StandardEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PassingMode;

    #[test]
    fn test_builtin_names_are_unique() {
        let env = StandardEnvironment::new();
        for (id, builtin) in env.iter() {
            assert_eq!(env.lookup(builtin.name), Some(id), "{} registered twice", builtin.name);
        }
    }

    #[test]
    fn test_builtins_have_builtin_position() {
        let env = StandardEnvironment::new();
        assert!(env.iter().all(|(_, b)| b.position.is_builtin()));
    }

    #[test]
    fn test_equality_is_generic() {
        let env = StandardEnvironment::new();
        let eq = env.get(env.lookup("=").unwrap());
        assert!(matches!(eq.kind, BuiltinKind::BinaryOperator { left: Type::Any, .. }));
    }

    #[test]
    fn test_get_takes_var_parameter() {
        let env = StandardEnvironment::new();
        let get = env.get(env.lookup("get").unwrap());
        match &get.kind {
            BuiltinKind::Function { param: Some(param), result, .. } => {
                assert_eq!(param.mode, PassingMode::ByReference);
                assert_eq!(*result, Type::Void);
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }
}

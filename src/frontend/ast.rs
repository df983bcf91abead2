//! Abstract Syntax Tree definitions for tamc
//!
//! The tree holds only syntax. Nodes that later phases annotate carry a
//! parser-assigned `NodeId`; resolution and type results live in
//! `Annotations`, keyed by those ids.

use crate::utils::Position;

/// Identity of an annotatable node, unique within one parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// A complete program
#[derive(Debug, Clone)]
pub struct Program {
    pub command: Command,
}

/// Command
#[derive(Debug, Clone)]
pub enum Command {
    /// name := expr
    Assign {
        target: Identifier,
        value: Expression,
        position: Position,
    },
    /// name(param)
    Call {
        callee: Identifier,
        param: Parameter,
        position: Position,
    },
    /// if guard then C else C
    If {
        guard: Expression,
        then_branch: Box<Command>,
        else_branch: Box<Command>,
        position: Position,
    },
    /// ? guard => C
    QuickIf {
        guard: Expression,
        then_branch: Box<Command>,
        position: Position,
    },
    /// while (guard) C wend
    While {
        guard: Expression,
        body: Box<Command>,
        position: Position,
    },
    /// loop C while (guard) C repeat
    Loop {
        before: Box<Command>,
        guard: Expression,
        body: Box<Command>,
        position: Position,
    },
    /// let D in C
    Let {
        declaration: Declaration,
        body: Box<Command>,
        position: Position,
    },
    /// C; C; ...
    Sequential {
        commands: Vec<Command>,
        position: Position,
    },
    Blank {
        position: Position,
    },
    Error {
        position: Position,
    },
}

impl Command {
    pub fn position(&self) -> Position {
        match self {
            Self::Assign { position, .. }
            | Self::Call { position, .. }
            | Self::If { position, .. }
            | Self::QuickIf { position, .. }
            | Self::While { position, .. }
            | Self::Loop { position, .. }
            | Self::Let { position, .. }
            | Self::Sequential { position, .. }
            | Self::Blank { position }
            | Self::Error { position } => *position,
        }
    }
}

/// Expression
#[derive(Debug, Clone)]
pub struct Expression {
    pub id: NodeId,
    pub kind: ExprKind,
    pub position: Position,
}

/// Expression kinds
#[derive(Debug, Clone)]
pub enum ExprKind {
    IntLiteral(IntegerLiteral),
    CharLiteral(CharacterLiteral),
    Identifier(Identifier),
    Unary {
        op: Operator,
        operand: Box<Expression>,
    },
    Binary {
        left: Box<Expression>,
        op: Operator,
        right: Box<Expression>,
    },
    Call {
        callee: Identifier,
        param: Box<Parameter>,
    },
    Error,
}

/// Declaration
#[derive(Debug, Clone)]
pub enum Declaration {
    /// const name ~ expr
    Const {
        id: NodeId,
        name: Identifier,
        value: Expression,
        position: Position,
    },
    /// var name ~ Type
    Var {
        id: NodeId,
        name: Identifier,
        ty: TypeDenoter,
        position: Position,
    },
    /// D; D; ...
    Sequential {
        declarations: Vec<Declaration>,
        position: Position,
    },
    Error {
        position: Position,
    },
}

impl Declaration {
    pub fn position(&self) -> Position {
        match self {
            Self::Const { position, .. }
            | Self::Var { position, .. }
            | Self::Sequential { position, .. }
            | Self::Error { position } => *position,
        }
    }
}

/// Actual parameter of a call
#[derive(Debug, Clone)]
pub struct Parameter {
    pub id: NodeId,
    pub kind: ParamKind,
    pub position: Position,
}

/// Parameter kinds
#[derive(Debug, Clone)]
pub enum ParamKind {
    /// No argument
    Blank,
    /// By-value argument
    Value(Expression),
    /// By-reference argument: var name
    Var(Identifier),
    Error,
}

/// A type name in a var declaration
#[derive(Debug, Clone)]
pub struct TypeDenoter {
    pub id: NodeId,
    pub name: Identifier,
    pub position: Position,
}

/// Identifier occurrence
#[derive(Debug, Clone)]
pub struct Identifier {
    pub id: NodeId,
    pub spelling: String,
    pub position: Position,
}

/// Operator occurrence
#[derive(Debug, Clone)]
pub struct Operator {
    pub id: NodeId,
    pub spelling: String,
    pub position: Position,
}

/// Integer literal, kept as written; range is checked during type checking
#[derive(Debug, Clone)]
pub struct IntegerLiteral {
    pub spelling: String,
    pub position: Position,
}

impl IntegerLiteral {
    /// Numeric value, or `None` if it does not fit a machine word
    pub fn value(&self) -> Option<i16> {
        self.spelling.parse::<i16>().ok()
    }
}

/// Character literal, spelled `{c}`
#[derive(Debug, Clone)]
pub struct CharacterLiteral {
    pub spelling: String,
    pub position: Position,
}

impl CharacterLiteral {
    /// The character between the braces
    pub fn character(&self) -> Option<char> {
        self.spelling
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
            .and_then(|s| s.chars().next())
    }

    /// Character code, or `None` if it does not fit a machine word
    pub fn value(&self) -> Option<i16> {
        self.character().and_then(|c| i16::try_from(u32::from(c)).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_literal_range() {
        let lit = |s: &str| IntegerLiteral {
            spelling: s.to_string(),
            position: Position::new(1, 1),
        };
        assert_eq!(lit("32767").value(), Some(32767));
        assert_eq!(lit("32768").value(), None);
        assert_eq!(lit("99999999999999999999999").value(), None);
    }

    #[test]
    fn test_character_literal_value() {
        let lit = CharacterLiteral {
            spelling: "{A}".to_string(),
            position: Position::new(1, 1),
        };
        assert_eq!(lit.character(), Some('A'));
        assert_eq!(lit.value(), Some(65));
    }
}

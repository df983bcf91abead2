//! Token definitions for tamc

use crate::utils::Position;
use std::fmt;

/// A token produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub spelling: String,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, spelling: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            spelling: spelling.into(),
            position,
        }
    }

    pub fn end_of_text(position: Position) -> Self {
        Self::new(TokenKind::EndOfText, "", position)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::EndOfText => write!(f, "end of input"),
            _ => write!(f, "'{}'", self.spelling),
        }
    }
}

/// Token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // ============ Identifiers and Literals ============
    Identifier,
    IntLiteral,
    CharLiteral,
    Operator,

    // ============ Keywords ============
    /// begin
    Begin,
    /// end
    End,
    /// let
    Let,
    /// in
    In,
    /// if
    If,
    /// then
    Then,
    /// else
    Else,
    /// while
    While,
    /// wend
    Wend,
    /// loop
    Loop,
    /// repeat
    Repeat,
    /// const
    Const,
    /// var
    Var,

    // ============ Punctuation ============
    /// (
    LeftBracket,
    /// )
    RightBracket,
    /// ~
    Is,
    /// :=
    Becomes,
    /// ;
    Semicolon,
    /// ?
    QuestionMark,
    /// =>
    ThenDo,

    // ============ Special ============
    EndOfText,
    Error,
}

impl TokenKind {
    /// Look up a reserved word
    pub fn keyword(spelling: &str) -> Option<Self> {
        let kind = match spelling {
            "begin" => Self::Begin,
            "end" => Self::End,
            "let" => Self::Let,
            "in" => Self::In,
            "if" => Self::If,
            "then" => Self::Then,
            "else" => Self::Else,
            "while" => Self::While,
            "wend" => Self::Wend,
            "loop" => Self::Loop,
            "repeat" => Self::Repeat,
            "const" => Self::Const,
            "var" => Self::Var,
            _ => return None,
        };
        Some(kind)
    }

    /// How the kind reads in an error message
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Identifier => "an identifier",
            Self::IntLiteral => "an integer literal",
            Self::CharLiteral => "a character literal",
            Self::Operator => "an operator",
            Self::Begin => "'begin'",
            Self::End => "'end'",
            Self::Let => "'let'",
            Self::In => "'in'",
            Self::If => "'if'",
            Self::Then => "'then'",
            Self::Else => "'else'",
            Self::While => "'while'",
            Self::Wend => "'wend'",
            Self::Loop => "'loop'",
            Self::Repeat => "'repeat'",
            Self::Const => "'const'",
            Self::Var => "'var'",
            Self::LeftBracket => "'('",
            Self::RightBracket => "')'",
            Self::Is => "'~'",
            Self::Becomes => "':='",
            Self::Semicolon => "';'",
            Self::QuestionMark => "'?'",
            Self::ThenDo => "'=>'",
            Self::EndOfText => "end of input",
            Self::Error => "an invalid token",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

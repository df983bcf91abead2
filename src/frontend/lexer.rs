//! Lexer for tamc
//!
//! Converts source code into a stream of tokens. Scanning never stops at a
//! bad character: it reports the problem, emits an `Error` token and keeps
//! going, so the parser sees the whole program.

use log::trace;

use crate::frontend::token::{Token, TokenKind};
use crate::utils::{Error, ErrorReporter, Position};

/// The lexer state
pub struct Lexer {
    /// Source code as characters
    source: Vec<char>,
    /// Current position in source
    pos: usize,
    /// Line of the current character
    line: u32,
    /// Column of the current character
    column: u32,
    /// Position of the first character of the current token
    start: Position,
    /// Start index of the current token
    start_pos: usize,
}

impl Lexer {
    /// Create a new lexer for the given source code
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            start: Position::new(1, 1),
            start_pos: 0,
        }
    }

    /// Get the current character without advancing
    fn peek(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    /// Advance to the next character
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn current_position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// Spelling of the current token so far
    fn spelling(&self) -> String {
        self.source[self.start_pos..self.pos].iter().collect()
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.spelling(), self.start)
    }

    /// Skip blanks and `&` comments
    fn skip_separators(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\r' | '\n' => {
                    self.advance();
                }
                '&' => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    /// Scan the next token
    pub fn next_token(&mut self, reporter: &mut ErrorReporter) -> Token {
        self.skip_separators();
        self.start = self.current_position();
        self.start_pos = self.pos;

        let c = match self.advance() {
            Some(c) => c,
            None => return Token::end_of_text(self.start),
        };

        let token = match c {
            c if c.is_ascii_alphabetic() => self.read_identifier(),
            c if c.is_ascii_digit() => self.read_number(),
            '{' => self.read_char_literal(reporter),
            '(' => self.make_token(TokenKind::LeftBracket),
            ')' => self.make_token(TokenKind::RightBracket),
            '~' => self.make_token(TokenKind::Is),
            ';' => self.make_token(TokenKind::Semicolon),
            '?' => self.make_token(TokenKind::QuestionMark),
            ':' if self.peek() == Some('=') => {
                self.advance();
                self.make_token(TokenKind::Becomes)
            }
            '=' => {
                if self.peek() == Some('>') {
                    self.advance();
                    self.make_token(TokenKind::ThenDo)
                } else {
                    self.make_token(TokenKind::Operator)
                }
            }
            '+' | '-' | '*' | '/' | '<' | '>' | '!' => self.make_token(TokenKind::Operator),
            other => {
                reporter.report(self.start, Error::UnknownCharacter { found: other });
                self.make_token(TokenKind::Error)
            }
        };

        trace!("scanned {:?} {:?} at {}", token.kind, token.spelling, token.position);
        token
    }

    /// Read an identifier or keyword
    fn read_identifier(&mut self) -> Token {
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() {
                self.advance();
            } else {
                break;
            }
        }

        let text = self.spelling();
        let kind = TokenKind::keyword(&text).unwrap_or(TokenKind::Identifier);
        self.make_token(kind)
    }

    /// Read an integer literal
    fn read_number(&mut self) -> Token {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }
        self.make_token(TokenKind::IntLiteral)
    }

    /// Read a character literal of the form `{c}`
    fn read_char_literal(&mut self, reporter: &mut ErrorReporter) -> Token {
        match self.peek() {
            Some(c) if is_graphic(c) => {
                self.advance();
            }
            found => {
                let reason = match found {
                    Some(c) => format!("'{}' cannot appear in a character literal", c.escape_default()),
                    None => "source ends inside a character literal".to_string(),
                };
                reporter.report(self.start, Error::MalformedCharLiteral { reason });
                return self.make_token(TokenKind::Error);
            }
        }

        if self.peek() == Some('}') {
            self.advance();
            self.make_token(TokenKind::CharLiteral)
        } else {
            reporter.report(
                self.start,
                Error::MalformedCharLiteral {
                    reason: "expected '}' after a single character".to_string(),
                },
            );
            self.make_token(TokenKind::Error)
        }
    }

    /// Tokenize the entire source and return all tokens
    pub fn tokenize(&mut self, reporter: &mut ErrorReporter) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token(reporter);
            let is_eof = token.kind == TokenKind::EndOfText;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}

/// Characters allowed between the braces of a character literal
fn is_graphic(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == ' ' || c == '?'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut reporter = ErrorReporter::new();
        let tokens = Lexer::new(source).tokenize(&mut reporter);
        tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_simple_tokens() {
        assert_eq!(
            kinds("let var x ~ Integer in x := 1"),
            vec![
                TokenKind::Let,
                TokenKind::Var,
                TokenKind::Identifier,
                TokenKind::Is,
                TokenKind::Identifier,
                TokenKind::In,
                TokenKind::Identifier,
                TokenKind::Becomes,
                TokenKind::IntLiteral,
                TokenKind::EndOfText,
            ]
        );
    }

    #[test]
    fn test_quick_if_tokens() {
        assert_eq!(
            kinds("? a = b => c"),
            vec![
                TokenKind::QuestionMark,
                TokenKind::Identifier,
                TokenKind::Operator,
                TokenKind::Identifier,
                TokenKind::ThenDo,
                TokenKind::Identifier,
                TokenKind::EndOfText,
            ]
        );
    }

    #[test]
    fn test_positions() {
        let mut reporter = ErrorReporter::new();
        let tokens = Lexer::new("begin\n  x := {a}\nend").tokenize(&mut reporter);

        assert_eq!(tokens[0].position, Position::new(1, 1));
        assert_eq!(tokens[1].position, Position::new(2, 3));
        assert_eq!(tokens[3].kind, TokenKind::CharLiteral);
        assert_eq!(tokens[3].spelling, "{a}");
        assert_eq!(tokens[3].position, Position::new(2, 8));
        assert_eq!(tokens[4].position, Position::new(3, 1));
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            kinds("x & a comment ~ ;\n:= 2"),
            vec![
                TokenKind::Identifier,
                TokenKind::Becomes,
                TokenKind::IntLiteral,
                TokenKind::EndOfText,
            ]
        );
    }

    #[test]
    fn test_unknown_character_is_reported() {
        let mut reporter = ErrorReporter::new();
        let tokens = Lexer::new("x # y").tokenize(&mut reporter);

        assert_eq!(tokens[1].kind, TokenKind::Error);
        assert_eq!(tokens[2].kind, TokenKind::Identifier);
        assert_eq!(reporter.error_count(), 1);
    }

    #[test]
    fn test_malformed_char_literal() {
        let mut reporter = ErrorReporter::new();
        let tokens = Lexer::new("{ab}").tokenize(&mut reporter);

        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert!(reporter.has_errors());
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::EndOfText));
    }

    #[test]
    fn test_tab_is_not_a_graphic_character() {
        let mut reporter = ErrorReporter::new();
        let tokens = Lexer::new("{\t}").tokenize(&mut reporter);

        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert!(matches!(
            reporter.diagnostics()[0].error,
            Error::MalformedCharLiteral { .. }
        ));
        assert_eq!(kinds("{ }")[0], TokenKind::CharLiteral);
        assert_eq!(kinds("{?}")[0], TokenKind::CharLiteral);
    }

    #[test]
    fn test_lone_colon_is_unknown() {
        let mut reporter = ErrorReporter::new();
        let tokens = Lexer::new("x : 1").tokenize(&mut reporter);

        assert_eq!(tokens[1].kind, TokenKind::Error);
        assert_eq!(
            reporter.diagnostics()[0].error,
            Error::UnknownCharacter { found: ':' }
        );
    }
}

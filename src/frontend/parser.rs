//! Parser for tamc
//!
//! Recursive descent with one token of lookahead. Expressions are a flat,
//! left-associative chain of primaries and operators: `a + b * c` is
//! `(a + b) * c`.
//!
//! Syntax errors never abort the parse. A rule that finds the wrong token
//! reports it, substitutes an error node and returns without consuming
//! anything. Reports are then muted until a token is consumed again, and
//! command and declaration sequences skip ahead to the next separator so
//! the following siblings still get parsed.

use log::{debug, trace};

use crate::frontend::ast::*;
use crate::frontend::token::{Token, TokenKind};
use crate::utils::{Error, ErrorReporter, Position};

/// The parser
pub struct Parser<'r> {
    tokens: Vec<Token>,
    pos: usize,
    next_id: u32,
    /// Set after a report, cleared once a token is consumed
    recovering: bool,
    reporter: &'r mut ErrorReporter,
}

impl<'r> Parser<'r> {
    /// Create a parser from pre-tokenized input
    pub fn from_tokens(mut tokens: Vec<Token>, reporter: &'r mut ErrorReporter) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::EndOfText) {
            let position = tokens.last().map(|t| t.position).unwrap_or_default();
            tokens.push(Token::end_of_text(position));
        }
        Self {
            tokens,
            pos: 0,
            next_id: 0,
            recovering: false,
            reporter,
        }
    }

    // ==================== Helper Methods ====================

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    fn current_position(&self) -> Position {
        self.current().position
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        self.skip();
        self.recovering = false;
        token
    }

    /// Step past the current token without leaving recovery
    fn skip(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    /// Skip tokens until one in `stop` (or end of input) comes up
    fn skip_until(&mut self, stop: fn(TokenKind) -> bool) {
        while !stop(self.current_kind()) && !self.check(TokenKind::EndOfText) {
            trace!("skipping {}", self.current());
            self.skip();
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    fn fresh_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Consume a token of the expected kind, or report and stay put
    fn accept(&mut self, expected: TokenKind) -> bool {
        if self.check(expected) {
            trace!("accepted {:?}", self.current());
            self.advance();
            true
        } else {
            self.report_unexpected(expected.describe());
            false
        }
    }

    /// Report at the current token, unless an earlier report has not been
    /// followed by any progress yet
    fn report(&mut self, error: Error) {
        if self.recovering {
            trace!("muted while recovering: {}", error);
            return;
        }
        self.recovering = true;
        self.reporter.report(self.current_position(), error);
    }

    fn report_unexpected(&mut self, expected: &str) {
        let found = self.current().to_string();
        trace!("expected {}, found {}", expected, found);
        self.report(Error::UnexpectedToken {
            expected: expected.to_string(),
            found,
        });
    }

    /// Report a token that cannot start `construct`. The token stays put.
    fn unrecognized_start(&mut self, construct: &'static str) {
        let found = self.current().to_string();
        self.report(Error::UnrecognizedStart { construct, found });
    }

    // ==================== Parsing Methods ====================

    /// Parse a complete program
    pub fn parse_program(&mut self) -> Program {
        debug!("parsing program");
        let command = self.parse_command();
        if !self.check(TokenKind::EndOfText) {
            let found = self.current().to_string();
            self.report(Error::TrailingInput { found });
        }
        Program { command }
    }

    /// Command ::= SingleCommand (';' SingleCommand)*
    fn parse_command(&mut self) -> Command {
        debug!("parsing command");
        let position = self.current_position();
        let first = self.parse_sequenced_command();
        if !self.check(TokenKind::Semicolon) {
            return first;
        }

        let mut commands = vec![first];
        while self.check(TokenKind::Semicolon) {
            self.advance();
            commands.push(self.parse_sequenced_command());
        }
        Command::Sequential { commands, position }
    }

    /// A single command inside a sequence. After a syntax error the rest of
    /// the command is skipped up to whatever may follow it.
    fn parse_sequenced_command(&mut self) -> Command {
        let command = self.parse_single_command();
        if self.recovering {
            self.skip_until(follows_command);
        }
        command
    }

    fn parse_single_command(&mut self) -> Command {
        let position = self.current_position();
        match self.current_kind() {
            TokenKind::Identifier => self.parse_assign_or_call(),
            TokenKind::Begin => {
                debug!("parsing begin command");
                self.advance();
                let command = self.parse_command();
                self.accept(TokenKind::End);
                command
            }
            TokenKind::Let => self.parse_let(),
            TokenKind::If => self.parse_if(),
            TokenKind::QuestionMark => self.parse_quick_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Loop => self.parse_loop(),
            kind if follows_command(kind) => {
                debug!("parsing blank command");
                Command::Blank { position }
            }
            _ => {
                self.unrecognized_start("command");
                Command::Error { position }
            }
        }
    }

    fn parse_assign_or_call(&mut self) -> Command {
        let position = self.current_position();
        let name = self.parse_identifier();
        match self.current_kind() {
            TokenKind::Becomes => {
                debug!("parsing assign command");
                self.advance();
                let value = self.parse_expression();
                Command::Assign {
                    target: name,
                    value,
                    position,
                }
            }
            TokenKind::LeftBracket => {
                debug!("parsing call command");
                self.advance();
                let param = self.parse_parameter();
                self.accept(TokenKind::RightBracket);
                Command::Call {
                    callee: name,
                    param,
                    position,
                }
            }
            _ => {
                self.report_unexpected("':=' or '('");
                Command::Error { position }
            }
        }
    }

    fn parse_let(&mut self) -> Command {
        debug!("parsing let command");
        let position = self.current_position();
        self.accept(TokenKind::Let);
        let declaration = self.parse_declaration();
        self.accept(TokenKind::In);
        let body = self.parse_single_command();
        Command::Let {
            declaration,
            body: Box::new(body),
            position,
        }
    }

    fn parse_if(&mut self) -> Command {
        debug!("parsing if command");
        let position = self.current_position();
        self.accept(TokenKind::If);
        let guard = self.parse_expression();
        self.accept(TokenKind::Then);
        let then_branch = self.parse_single_command();
        self.accept(TokenKind::Else);
        let else_branch = self.parse_single_command();
        Command::If {
            guard,
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
            position,
        }
    }

    fn parse_quick_if(&mut self) -> Command {
        debug!("parsing quick if command");
        let position = self.current_position();
        self.accept(TokenKind::QuestionMark);
        let guard = self.parse_expression();
        self.accept(TokenKind::ThenDo);
        let then_branch = self.parse_single_command();
        Command::QuickIf {
            guard,
            then_branch: Box::new(then_branch),
            position,
        }
    }

    fn parse_while(&mut self) -> Command {
        debug!("parsing while command");
        let position = self.current_position();
        self.accept(TokenKind::While);
        let guard = self.parse_bracket_expression();
        let body = self.parse_single_command();
        self.accept(TokenKind::Wend);
        Command::While {
            guard,
            body: Box::new(body),
            position,
        }
    }

    fn parse_loop(&mut self) -> Command {
        debug!("parsing loop command");
        let position = self.current_position();
        self.accept(TokenKind::Loop);
        let before = self.parse_single_command();
        self.accept(TokenKind::While);
        let guard = self.parse_bracket_expression();
        let body = self.parse_single_command();
        self.accept(TokenKind::Repeat);
        Command::Loop {
            before: Box::new(before),
            guard,
            body: Box::new(body),
            position,
        }
    }

    /// Declaration ::= SingleDeclaration (';' SingleDeclaration)*
    fn parse_declaration(&mut self) -> Declaration {
        debug!("parsing declaration");
        let position = self.current_position();
        let first = self.parse_sequenced_declaration();
        if !self.check(TokenKind::Semicolon) {
            return first;
        }

        let mut declarations = vec![first];
        while self.check(TokenKind::Semicolon) {
            self.advance();
            declarations.push(self.parse_sequenced_declaration());
        }
        Declaration::Sequential {
            declarations,
            position,
        }
    }

    fn parse_sequenced_declaration(&mut self) -> Declaration {
        let declaration = self.parse_single_declaration();
        if self.recovering {
            self.skip_until(follows_declaration);
        }
        declaration
    }

    fn parse_single_declaration(&mut self) -> Declaration {
        let position = self.current_position();
        match self.current_kind() {
            TokenKind::Const => {
                debug!("parsing const declaration");
                self.advance();
                let name = self.parse_identifier();
                self.accept(TokenKind::Is);
                let value = self.parse_expression();
                Declaration::Const {
                    id: self.fresh_id(),
                    name,
                    value,
                    position,
                }
            }
            TokenKind::Var => {
                debug!("parsing var declaration");
                self.advance();
                let name = self.parse_identifier();
                self.accept(TokenKind::Is);
                let ty = self.parse_type_denoter();
                Declaration::Var {
                    id: self.fresh_id(),
                    name,
                    ty,
                    position,
                }
            }
            _ => {
                self.unrecognized_start("declaration");
                Declaration::Error { position }
            }
        }
    }

    /// Parameter ::= (empty) | 'var' Identifier | Expression
    fn parse_parameter(&mut self) -> Parameter {
        debug!("parsing parameter");
        let position = self.current_position();
        let kind = match self.current_kind() {
            TokenKind::RightBracket => ParamKind::Blank,
            TokenKind::Var => {
                self.advance();
                ParamKind::Var(self.parse_identifier())
            }
            _ => ParamKind::Value(self.parse_expression()),
        };
        Parameter {
            id: self.fresh_id(),
            kind,
            position,
        }
    }

    fn parse_type_denoter(&mut self) -> TypeDenoter {
        let position = self.current_position();
        let name = self.parse_identifier();
        TypeDenoter {
            id: self.fresh_id(),
            name,
            position,
        }
    }

    // ==================== Expression Parsing ====================

    /// Expression ::= Primary (Operator Primary)*
    pub fn parse_expression(&mut self) -> Expression {
        debug!("parsing expression");
        let position = self.current_position();
        let mut expr = self.parse_primary();
        while self.check(TokenKind::Operator) {
            let op = self.parse_operator();
            let right = self.parse_primary();
            expr = Expression {
                id: self.fresh_id(),
                kind: ExprKind::Binary {
                    left: Box::new(expr),
                    op,
                    right: Box::new(right),
                },
                position,
            };
        }
        expr
    }

    fn parse_primary(&mut self) -> Expression {
        let position = self.current_position();
        let kind = match self.current_kind() {
            TokenKind::IntLiteral => {
                let token = self.advance();
                ExprKind::IntLiteral(IntegerLiteral {
                    spelling: token.spelling,
                    position,
                })
            }
            TokenKind::CharLiteral => {
                let token = self.advance();
                ExprKind::CharLiteral(CharacterLiteral {
                    spelling: token.spelling,
                    position,
                })
            }
            TokenKind::Identifier => {
                let name = self.parse_identifier();
                if self.check(TokenKind::LeftBracket) {
                    debug!("parsing call expression");
                    self.advance();
                    let param = self.parse_parameter();
                    self.accept(TokenKind::RightBracket);
                    ExprKind::Call {
                        callee: name,
                        param: Box::new(param),
                    }
                } else {
                    ExprKind::Identifier(name)
                }
            }
            TokenKind::Operator => {
                debug!("parsing unary expression");
                let op = self.parse_operator();
                let operand = self.parse_primary();
                ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                }
            }
            TokenKind::LeftBracket => return self.parse_bracket_expression(),
            _ => {
                self.unrecognized_start("expression");
                ExprKind::Error
            }
        };
        Expression {
            id: self.fresh_id(),
            kind,
            position,
        }
    }

    fn parse_bracket_expression(&mut self) -> Expression {
        self.accept(TokenKind::LeftBracket);
        let expr = self.parse_expression();
        self.accept(TokenKind::RightBracket);
        expr
    }

    fn parse_identifier(&mut self) -> Identifier {
        let token = self.current().clone();
        self.accept(TokenKind::Identifier);
        Identifier {
            id: self.fresh_id(),
            spelling: token.spelling,
            position: token.position,
        }
    }

    fn parse_operator(&mut self) -> Operator {
        let token = self.current().clone();
        self.accept(TokenKind::Operator);
        Operator {
            id: self.fresh_id(),
            spelling: token.spelling,
            position: token.position,
        }
    }
}

/// Tokens that may legally follow a command
fn follows_command(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Semicolon
            | TokenKind::End
            | TokenKind::Else
            | TokenKind::Wend
            | TokenKind::Repeat
            | TokenKind::EndOfText
    )
}

/// Tokens that may legally follow a declaration
fn follows_declaration(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Semicolon | TokenKind::In | TokenKind::EndOfText
    )
}

/// Parse a token sequence into a program. Errors go to `reporter`.
pub fn parse(tokens: Vec<Token>, reporter: &mut ErrorReporter) -> Program {
    Parser::from_tokens(tokens, reporter).parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::Lexer;

    fn parse_source(source: &str) -> (Program, ErrorReporter) {
        let mut reporter = ErrorReporter::new();
        let tokens = Lexer::new(source).tokenize(&mut reporter);
        let program = parse(tokens, &mut reporter);
        (program, reporter)
    }

    fn parse_ok(source: &str) -> Program {
        let (program, reporter) = parse_source(source);
        assert!(!reporter.has_errors(), "unexpected errors:\n{}", reporter);
        program
    }

    fn literal(expr: &Expression) -> &str {
        match &expr.kind {
            ExprKind::IntLiteral(lit) => &lit.spelling,
            other => panic!("expected literal, got {:?}", other),
        }
    }

    #[test]
    fn test_left_associative_expressions() {
        let program = parse_ok("x := 1 + 2 * 3");
        let value = match program.command {
            Command::Assign { value, .. } => value,
            other => panic!("expected assignment, got {:?}", other),
        };
        let (left, op, right) = match &value.kind {
            ExprKind::Binary { left, op, right } => (left, op, right),
            other => panic!("expected binary, got {:?}", other),
        };
        assert_eq!(op.spelling, "*");
        assert_eq!(literal(right), "3");
        match &left.kind {
            ExprKind::Binary { left, op, right } => {
                assert_eq!(op.spelling, "+");
                assert_eq!(literal(left), "1");
                assert_eq!(literal(right), "2");
            }
            other => panic!("expected nested binary, got {:?}", other),
        }
    }

    #[test]
    fn test_brackets_group() {
        let program = parse_ok("x := 1 + (2 * 3)");
        let Command::Assign { value, .. } = program.command else {
            panic!("expected assignment");
        };
        let ExprKind::Binary { right, .. } = &value.kind else {
            panic!("expected binary");
        };
        assert!(matches!(&right.kind, ExprKind::Binary { op, .. } if op.spelling == "*"));
    }

    #[test]
    fn test_single_command_is_not_wrapped() {
        let program = parse_ok("putint(1)");
        assert!(matches!(program.command, Command::Call { .. }));
    }

    #[test]
    fn test_sequence_preserves_order() {
        let program = parse_ok("a := 1; b := 2; c := 3");
        let Command::Sequential { commands, .. } = program.command else {
            panic!("expected sequence");
        };
        let names: Vec<&str> = commands
            .iter()
            .map(|c| match c {
                Command::Assign { target, .. } => target.spelling.as_str(),
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_call_versus_reference() {
        let program = parse_ok("x := f(y) + z");
        let Command::Assign { value, .. } = program.command else {
            panic!("expected assignment");
        };
        let ExprKind::Binary { left, right, .. } = &value.kind else {
            panic!("expected binary");
        };
        assert!(matches!(&left.kind, ExprKind::Call { callee, .. } if callee.spelling == "f"));
        assert!(matches!(&right.kind, ExprKind::Identifier(id) if id.spelling == "z"));
    }

    #[test]
    fn test_let_with_declarations() {
        let program = parse_ok("let const c ~ 5; var v ~ Integer in v := c");
        let Command::Let { declaration, body, .. } = program.command else {
            panic!("expected let");
        };
        let Declaration::Sequential { declarations, .. } = declaration else {
            panic!("expected declaration sequence");
        };
        assert!(matches!(declarations[0], Declaration::Const { .. }));
        assert!(matches!(declarations[1], Declaration::Var { .. }));
        assert!(matches!(*body, Command::Assign { .. }));
    }

    #[test]
    fn test_control_commands() {
        let program = parse_ok(
            "begin \
               if a then b := 1 else b := 2; \
               ? a => b := 3; \
               while (a) b := 4 wend; \
               loop b := 5 while (a) b := 6 repeat \
             end",
        );
        let Command::Sequential { commands, .. } = program.command else {
            panic!("expected sequence");
        };
        assert!(matches!(commands[0], Command::If { .. }));
        assert!(matches!(commands[1], Command::QuickIf { .. }));
        assert!(matches!(commands[2], Command::While { .. }));
        assert!(matches!(commands[3], Command::Loop { .. }));
    }

    #[test]
    fn test_var_and_blank_parameters() {
        let program = parse_ok("begin get(var c); puteol() end");
        let Command::Sequential { commands, .. } = program.command else {
            panic!("expected sequence");
        };
        assert!(matches!(&commands[0], Command::Call { param, .. } if matches!(param.kind, ParamKind::Var(_))));
        assert!(matches!(&commands[1], Command::Call { param, .. } if matches!(param.kind, ParamKind::Blank)));
    }

    #[test]
    fn test_blank_program() {
        let program = parse_ok("");
        assert!(matches!(program.command, Command::Blank { .. }));
    }

    #[test]
    fn test_node_ids_are_unique() {
        let program = parse_ok("let var x ~ Integer in x := x + 1");
        let Command::Let { declaration, body, .. } = program.command else {
            panic!("expected let");
        };
        let Declaration::Var { id: decl_id, name, ty, .. } = declaration else {
            panic!("expected var");
        };
        let Command::Assign { target, value, .. } = *body else {
            panic!("expected assignment");
        };
        let mut ids = vec![decl_id, name.id, ty.id, ty.name.id, target.id, value.id];
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 6);
    }

    #[test]
    fn test_missing_token_is_reported_once() {
        let (program, reporter) = parse_source("if a then b := 1 c := 2");
        assert_eq!(reporter.error_count(), 1);
        assert!(matches!(program.command, Command::If { .. }));
        assert!(matches!(
            reporter.diagnostics()[0].error,
            Error::UnexpectedToken { .. }
        ));
    }

    #[test]
    fn test_unrecognized_command_start() {
        let (program, reporter) = parse_source("x := 1; ) ; y := 2");
        assert_eq!(reporter.error_count(), 1);
        assert_eq!(reporter.diagnostics()[0].position, Position::new(1, 9));
        let Command::Sequential { commands, .. } = program.command else {
            panic!("expected sequence");
        };
        assert_eq!(commands.len(), 3);
        assert!(matches!(commands[1], Command::Error { .. }));
        assert!(matches!(commands[2], Command::Assign { .. }));
    }

    #[test]
    fn test_stray_token_skips_to_next_command() {
        let (program, reporter) = parse_source("begin putint(1); := 2; puteol() end");
        assert_eq!(reporter.error_count(), 1);
        assert!(matches!(
            reporter.diagnostics()[0].error,
            Error::UnrecognizedStart { construct: "command", .. }
        ));
        let Command::Sequential { commands, .. } = program.command else {
            panic!("expected sequence");
        };
        assert_eq!(commands.len(), 3);
        assert!(matches!(commands[1], Command::Error { .. }));
        assert!(matches!(&commands[2], Command::Call { callee, .. } if callee.spelling == "puteol"));
    }

    #[test]
    fn test_error_inside_a_command_is_reported_once() {
        let (_, reporter) = parse_source("puteol(:= 1)");
        assert_eq!(reporter.error_count(), 1);
        assert!(matches!(
            reporter.diagnostics()[0].error,
            Error::UnrecognizedStart { construct: "expression", .. }
        ));
    }

    #[test]
    fn test_bad_declaration_skips_to_next_declaration() {
        let (program, reporter) = parse_source("let foo ~ 1; var y ~ Char in y := {a}");
        assert_eq!(reporter.error_count(), 1);
        let Command::Let { declaration, body, .. } = program.command else {
            panic!("expected let");
        };
        let Declaration::Sequential { declarations, .. } = declaration else {
            panic!("expected declaration sequence");
        };
        assert!(matches!(declarations[0], Declaration::Error { .. }));
        assert!(matches!(declarations[1], Declaration::Var { .. }));
        assert!(matches!(*body, Command::Assign { .. }));
    }

    #[test]
    fn test_error_tokens_are_reported() {
        let mut reporter = ErrorReporter::new();
        let tokens = vec![
            Token::new(TokenKind::Identifier, "puteol", Position::new(1, 1)),
            Token::new(TokenKind::LeftBracket, "(", Position::new(1, 7)),
            Token::new(TokenKind::RightBracket, ")", Position::new(1, 8)),
            Token::new(TokenKind::Semicolon, ";", Position::new(1, 9)),
            Token::new(TokenKind::Error, "#", Position::new(1, 11)),
        ];
        let program = parse(tokens, &mut reporter);

        assert_eq!(reporter.error_count(), 1);
        assert_eq!(reporter.diagnostics()[0].position, Position::new(1, 11));
        let Command::Sequential { commands, .. } = program.command else {
            panic!("expected sequence");
        };
        assert!(matches!(commands[1], Command::Error { .. }));
    }

    #[test]
    fn test_bad_expression_yields_error_node() {
        let (program, reporter) = parse_source("x := ; y := 2");
        assert_eq!(reporter.error_count(), 1);
        let Command::Sequential { commands, .. } = program.command else {
            panic!("expected sequence");
        };
        assert!(matches!(&commands[0], Command::Assign { value, .. } if matches!(value.kind, ExprKind::Error)));
        assert!(matches!(commands[1], Command::Assign { .. }));
    }

    #[test]
    fn test_trailing_input() {
        let (_, reporter) = parse_source("x := 1 end");
        assert_eq!(reporter.error_count(), 1);
        assert_eq!(reporter.diagnostics()[0].position, Position::new(1, 8));
        assert!(matches!(
            reporter.diagnostics()[0].error,
            Error::TrailingInput { .. }
        ));
    }
}

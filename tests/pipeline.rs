use std::collections::HashSet;

use pretty_assertions::assert_eq;

use tamc::backend::{object, Disassembler, OpCode, RuntimeEntity};
use tamc::frontend::annotations::Binding;
use tamc::frontend::ast::{
    Command, Declaration, ExprKind, Expression, NodeId, ParamKind, Parameter, Program,
};
use tamc::stdlib::StandardEnvironment;
use tamc::types::Type;
use tamc::frontend::lexer::Lexer;
use tamc::frontend::parser::parse;
use tamc::frontend::printer::print_program;
use tamc::utils::{Error, ErrorReporter, Phase};
use tamc::{compile_source, CompileOptions};

const COUNTDOWN: &str = "
& count down from a number read on input
let
    var n ~ Integer;
    const step ~ 1
in
begin
    getint(var n);
    while (n > 0)
    begin
        putint(n);
        puteol();
        n := n - step
    end
    wend
end
";

fn compile(source: &str) -> tamc::Compilation {
    compile_source(source, &CompileOptions::default())
}

#[test]
fn test_countdown_compiles() {
    let compilation = compile(COUNTDOWN);
    assert!(compilation.succeeded(), "{}", compilation.reporter);

    let code = compilation.code.expect("code generated");
    let last = code.instructions().last().expect("non-empty program");
    assert_eq!(last.op, OpCode::Halt);
    for instruction in code.instructions() {
        if instruction.op.is_jump() {
            assert!((instruction.d as usize) < code.len());
        }
    }
}

#[test]
fn test_shadowing_scenario() {
    let compilation = compile("let const x ~ 1 in let var x ~ Integer in x := 2");
    assert!(compilation.succeeded(), "{}", compilation.reporter);

    let program = compilation.program.expect("parsed");
    let Command::Let { body, .. } = &program.command else {
        panic!("expected let");
    };
    let Command::Let { declaration, .. } = body.as_ref() else {
        panic!("expected inner let");
    };
    let Declaration::Var { id, .. } = declaration else {
        panic!("expected var");
    };
    let code = compilation.code.expect("code generated");
    assert_eq!(
        code.storage_of(*id),
        Some(RuntimeEntity::Variable { offset: 0, size: 1 })
    );
}

#[test]
fn test_two_type_errors_in_one_run() {
    let compilation = compile(
        "let var b ~ Boolean; var i ~ Integer in begin b := 1; putint(i); i := true end",
    );
    assert!(!compilation.succeeded());
    let type_errors: Vec<&Error> = compilation
        .reporter
        .diagnostics_in(Phase::TypeChecking)
        .map(|d| &d.error)
        .collect();
    assert_eq!(type_errors.len(), 2);
    assert!(type_errors.iter().all(|e| e.is_type_error()));
}

#[test]
fn test_syntax_errors_are_contained() {
    let compilation = compile("begin putint(1); := 2; puteol() end");
    assert!(!compilation.succeeded());
    assert!(compilation.reporter.has_errors());
    assert!(compilation
        .reporter
        .diagnostics()
        .iter()
        .all(|d| d.phase == Phase::Parsing));
    assert!(compilation.program.is_some());
    assert!(compilation.code.is_none());
}

#[test]
fn test_printed_program_parses_back_identically() {
    let source = "let var a ~ Integer; const b ~ {z} in \
                  if a < 3 then loop a := a + (1 * 2) while (!(a = 7)) put(b) repeat \
                  else ? eof() => begin end";

    let mut reporter = ErrorReporter::new();
    let first = parse(Lexer::new(source).tokenize(&mut reporter), &mut reporter);
    assert!(!reporter.has_errors(), "{}", reporter);
    let printed = print_program(&first);

    let second = parse(Lexer::new(&printed).tokenize(&mut reporter), &mut reporter);
    assert!(!reporter.has_errors(), "{}", reporter);
    assert_eq!(print_program(&second), printed);
}

#[test]
fn test_object_file_round_trip() {
    let compilation = compile(COUNTDOWN);
    let code = compilation.code.expect("code generated");

    let path = std::env::temp_dir().join(format!("tamc-pipeline-{}.tam", std::process::id()));
    object::write_file(&path, code.instructions()).expect("write object");
    let loaded = object::read_file(&path).expect("read object");
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded, code.instructions());
    let listing = Disassembler::new().print(&loaded);
    assert!(listing.contains("CALL getint"));
    assert!(listing.contains("HALT"));
}

/// Uses every command, declaration, expression and parameter form
const EVERY_FORM: &str = "
let
    const base ~ 10;
    const next ~ base + 1;
    var n ~ Integer;
    var c ~ Char;
    var done ~ Boolean
in
begin
    getint(var n);
    get(var c);
    done := ! eof();
    if n > next then putint(n) else put(chr(ord(c) + 1));
    ? c = {x} => puteol();
    while (n < base) n := n + 1 wend;
    loop geteol() while (! done) done := eol() repeat;
    let const copy ~ n in putint(copy * 2 / 1 - maxint)
end
";

/// Node ids gathered from one tree
#[derive(Default)]
struct NodeIds {
    /// Identifier and operator use sites
    uses: Vec<(NodeId, String)>,
    /// Entity declarations
    declarations: HashSet<NodeId>,
    expressions: Vec<NodeId>,
    parameters: Vec<NodeId>,
}

impl NodeIds {
    fn of(program: &Program) -> Self {
        let mut ids = Self::default();
        ids.command(&program.command);
        ids
    }

    fn command(&mut self, command: &Command) {
        match command {
            Command::Assign { target, value, .. } => {
                self.uses.push((target.id, target.spelling.clone()));
                self.expression(value);
            }
            Command::Call { callee, param, .. } => {
                self.uses.push((callee.id, callee.spelling.clone()));
                self.parameter(param);
            }
            Command::If {
                guard,
                then_branch,
                else_branch,
                ..
            } => {
                self.expression(guard);
                self.command(then_branch);
                self.command(else_branch);
            }
            Command::QuickIf {
                guard, then_branch, ..
            } => {
                self.expression(guard);
                self.command(then_branch);
            }
            Command::While { guard, body, .. } => {
                self.expression(guard);
                self.command(body);
            }
            Command::Loop {
                before, guard, body, ..
            } => {
                self.command(before);
                self.expression(guard);
                self.command(body);
            }
            Command::Let {
                declaration, body, ..
            } => {
                self.declaration(declaration);
                self.command(body);
            }
            Command::Sequential { commands, .. } => {
                for command in commands {
                    self.command(command);
                }
            }
            Command::Blank { .. } | Command::Error { .. } => {}
        }
    }

    fn declaration(&mut self, declaration: &Declaration) {
        match declaration {
            Declaration::Const { id, value, .. } => {
                self.declarations.insert(*id);
                self.expression(value);
            }
            Declaration::Var { id, ty, .. } => {
                self.declarations.insert(*id);
                self.uses.push((ty.name.id, ty.name.spelling.clone()));
            }
            Declaration::Sequential { declarations, .. } => {
                for declaration in declarations {
                    self.declaration(declaration);
                }
            }
            Declaration::Error { .. } => {}
        }
    }

    fn parameter(&mut self, param: &Parameter) {
        self.parameters.push(param.id);
        match &param.kind {
            ParamKind::Value(expr) => self.expression(expr),
            ParamKind::Var(name) => self.uses.push((name.id, name.spelling.clone())),
            ParamKind::Blank | ParamKind::Error => {}
        }
    }

    fn expression(&mut self, expr: &Expression) {
        self.expressions.push(expr.id);
        match &expr.kind {
            ExprKind::IntLiteral(_) | ExprKind::CharLiteral(_) | ExprKind::Error => {}
            ExprKind::Identifier(name) => self.uses.push((name.id, name.spelling.clone())),
            ExprKind::Unary { op, operand } => {
                self.uses.push((op.id, op.spelling.clone()));
                self.expression(operand);
            }
            ExprKind::Binary { left, op, right } => {
                self.expression(left);
                self.uses.push((op.id, op.spelling.clone()));
                self.expression(right);
            }
            ExprKind::Call { callee, param } => {
                self.uses.push((callee.id, callee.spelling.clone()));
                self.parameter(param);
            }
        }
    }
}

#[test]
fn test_every_use_site_is_resolved() {
    let compilation = compile(EVERY_FORM);
    assert!(compilation.succeeded(), "{}", compilation.reporter);
    let program = compilation.program.as_ref().expect("parsed");
    let ids = NodeIds::of(program);
    let env = StandardEnvironment::new();

    assert!(ids.uses.len() > 40);
    for (id, spelling) in &ids.uses {
        match compilation.annotations.binding(*id) {
            Some(Binding::Const(decl)) | Some(Binding::Var(decl)) => {
                assert!(ids.declarations.contains(&decl), "{} bound outside the tree", spelling);
            }
            Some(Binding::Standard(builtin)) => {
                assert_eq!(env.get(builtin).name, spelling.as_str());
            }
            None => panic!("{} was left unresolved", spelling),
        }
    }
}

#[test]
fn test_every_expression_and_parameter_is_typed() {
    let compilation = compile(EVERY_FORM);
    assert!(compilation.succeeded(), "{}", compilation.reporter);
    let program = compilation.program.as_ref().expect("parsed");
    let ids = NodeIds::of(program);

    for id in &ids.expressions {
        let ty = compilation.annotations.type_of(*id);
        assert!(
            matches!(ty, Some(Type::Boolean | Type::Char | Type::Integer)),
            "expression {:?} typed {:?}",
            id,
            ty
        );
    }
    for id in &ids.parameters {
        assert!(compilation.annotations.type_of(*id).is_some(), "parameter {:?} untyped", id);
    }
    for id in &ids.declarations {
        assert!(compilation.annotations.type_of(*id).is_some(), "declaration {:?} untyped", id);
    }
}

//! Diagnostic scenarios driven through the full compiler pipeline.

use fekal::compiler::Compiler;
use fekal::diagnostics::Severity;
use fekal::parser::ast::{BoolExpr, LogicOp, PolicyStatement, ProgramStatement};

fn compile(source: &str) -> (Vec<ProgramStatement>, Vec<(Severity, String, u32, u32)>) {
    let mut compiler = Compiler::new();
    let ast = compiler.compile(source.as_bytes()).expect("should parse");
    let logs = compiler
        .diagnostics()
        .logs
        .iter()
        .map(|l| {
            (
                l.severity,
                l.message.clone(),
                l.range.start.line,
                l.range.start.column,
            )
        })
        .collect();
    (ast, logs)
}

#[test]
fn clean_policy_compiles_without_diagnostics() {
    let (ast, logs) = compile("POLICY Aio 0 { ALLOW { io_cancel, io_setup } }");
    assert!(logs.is_empty());
    assert_eq!(ast.len(), 1);
}

#[test]
fn missing_use_target_reports_at_the_identifier() {
    let (_, logs) = compile("POLICY P 0 { USE Q 0 }");
    assert_eq!(
        logs,
        vec![(
            Severity::Error,
            "Policy Q0 doesn't exist".to_string(),
            1,
            17
        )]
    );
}

#[test]
fn trailing_unused_parameter_warns() {
    let (_, logs) = compile("POLICY P 0 { ALLOW { f(a,b){ a == 1 } } }");
    assert_eq!(
        logs,
        vec![(
            Severity::Warning,
            "Parameter b unused".to_string(),
            1,
            25
        )]
    );
}

#[test]
fn used_last_parameter_shields_earlier_unused_ones() {
    let (_, logs) = compile("POLICY P 0 { ALLOW { f(a,b){ b == 1 } } }");
    assert!(logs.is_empty());
}

#[test]
fn or_chain_nests_left_associatively() {
    let (ast, logs) = compile(
        "POLICY P 0 { ALLOW { personality(persona) { persona == 0 || persona == 8 || persona == 16 } } }",
    );
    assert!(logs.is_empty());

    let ProgramStatement::Policy(policy) = &ast[0] else {
        panic!("expected a policy");
    };
    let PolicyStatement::Block(block) = &policy.body[0] else {
        panic!("expected an action block");
    };
    let BoolExpr::Logical { op, left, right, .. } = &*block.filters[0].body[0] else {
        panic!("expected the or-chain");
    };
    assert_eq!(*op, LogicOp::Or);
    // Right arm is the last comparison, left arm is another `||`.
    assert!(matches!(&**right, BoolExpr::Compare { .. }));
    assert!(matches!(
        &**left,
        BoolExpr::Logical {
            op: LogicOp::Or,
            ..
        }
    ));
}

#[test]
fn known_oflags_are_accepted() {
    let (_, logs) =
        compile("POLICY P 0 { ALLOW { open(fd, flags) { flags == O_RDONLY | O_CLOEXEC } } }");
    assert!(logs.is_empty());
}

#[test]
fn unknown_oflag_reports_at_the_identifier() {
    let (_, logs) = compile("POLICY P 0 { ALLOW { open(fd, flags) { flags == O_BOGUS } } }");
    assert_eq!(
        logs,
        vec![(
            Severity::Error,
            "Invalid oflag O_BOGUS".to_string(),
            1,
            48
        )]
    );
}

#[test]
fn diagnostics_render_warnings_before_errors() {
    let mut compiler = Compiler::new();
    compiler
        .compile(b"POLICY P 0 { USE Q 0 ALLOW { f(a,b){ a == 1 } } }")
        .unwrap();
    let mut rendered = Vec::new();
    compiler.diagnostics().render(&mut rendered).unwrap();
    assert_eq!(
        String::from_utf8(rendered).unwrap(),
        "Warning: Parameter b unused\nError: Policy Q0 doesn't exist\n"
    );
}

#[test]
fn diagnostics_are_deterministic_across_runs() {
    let source = b"POLICY P 0 { USE Q 0 ALLOW { f(a,b){ a == 1 }, f } }\nPOLICY P 0 {}";
    let run = |source: &[u8]| {
        let mut compiler = Compiler::new();
        compiler.compile(source).unwrap();
        compiler
            .diagnostics()
            .logs
            .iter()
            .map(|l| l.message.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(run(source), run(source));
}

#[test]
fn reparsing_the_printed_source_preserves_structure() {
    let source = "DEFAULT KILL_THREAD\n\
        POLICY Aio 0 { ALLOW { io_cancel, io_setup } }\n\
        POLICY Io 1 { USE Aio 0 ERRNO(13) { open(fd, flags) { flags == O_RDONLY } } }\n";
    let first = fekal::parser::parse(source.as_bytes()).unwrap();
    let printed = fekal::printer::source(&first);
    let second = fekal::parser::parse(printed.as_bytes()).unwrap();
    assert_eq!(first, second);
}

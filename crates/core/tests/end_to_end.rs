use std::fs;
use std::io::Cursor;

use bfcc_core::brackets::{matching_close, matching_open, pairs};
use bfcc_core::codegen::c::CEmitter;
use bfcc_core::codegen::generate_source;
use bfcc_core::codegen::x86_64::NasmEmitter;
use bfcc_core::errors::Reason;
use bfcc_core::{tokenize, Config, Error, Interpreter, Lexer, Opcode, Registry, Token};

const NESTED: &str = "
    Two counters drained by sibling loops inside an outer loop
    ++++                 outer counter in cell 0
    [
        >+++             cell 1 gets 3 more each pass
        [>++<-]          drain cell 1 into cell 2 (doubled)
        >>+              cell 3 counts passes
        <[>>+<<-]        drain cell 2 into cell 4
        <<-
    ]
";

fn interpret(source: &str, input: &[u8]) -> Result<(Vec<u8>, Vec<u8>), Error> {
    let program = tokenize(source.as_bytes());
    let mut interpreter = Interpreter::new(32, Cursor::new(input.to_vec()), Vec::new());
    interpreter.execute(&program)?;
    let tape = interpreter.tape().to_vec();

    Ok((interpreter.into_output(), tape))
}

#[test]
fn spec_example_tokenizes() {
    let mut lexer = Lexer::new(b"+-<<<<<>>>>>[].,");
    let expected = [
        (Opcode::IncrementVal, 1),
        (Opcode::DecrementVal, 1),
        (Opcode::DecrementAddr, 5),
        (Opcode::IncrementAddr, 5),
        (Opcode::StartLoop, 1),
        (Opcode::EndLoop, 1),
        (Opcode::PutChar, 1),
        (Opcode::GetChar, 1),
        (Opcode::Eof, 1),
    ];

    for (op, repeat) in expected {
        assert_eq!(Token::new(op, repeat), lexer.next_token());
    }
}

#[test]
fn nested_loops_drain_both_counters() {
    let (_, tape) = interpret(NESTED, b"").unwrap();

    // 4 passes: cell 2 is emptied every pass, cell 4 collects 6 per pass
    assert_eq!(&[0, 0, 0, 4, 24], &tape[..5]);
}

#[test]
fn nested_loops_pair_the_same_way_statically_and_dynamically() {
    let program = tokenize(NESTED.as_bytes());
    let tokens = program.tokens();
    let pairs = pairs(tokens).unwrap();

    assert_eq!(3, pairs.len());
    for (open, close) in pairs {
        assert_eq!(close, matching_close(tokens, open).unwrap());
        assert_eq!(open, matching_open(tokens, close).unwrap());
    }
}

#[test]
fn nested_loops_compile_to_c() {
    let program = tokenize(NESTED.as_bytes());
    let c = generate_source(&program, CEmitter::new(30_000)).unwrap();

    assert_eq!(3, c.matches("while (array[idx]) {").count());
    assert_eq!(
        c.matches('{').count(),
        c.matches('}').count(),
        "braces must balance"
    );
}

#[test]
fn nested_loops_compile_to_asm() {
    let program = tokenize(NESTED.as_bytes());
    let asm = generate_source(&program, NasmEmitter::new(30_000)).unwrap();

    for label in 0..3 {
        assert!(asm.contains(&format!("je close_{}\n", label)));
        assert!(asm.contains(&format!("jne open_{}\n", label)));
        assert!(asm.contains(&format!("\nopen_{}:\n", label)));
        assert!(asm.contains(&format!("\nclose_{}:\n", label)));
    }
}

#[test]
fn eight_plus_then_dot_writes_eight() {
    let (output, _) = interpret("++++++++.", b"").unwrap();
    assert_eq!(vec![8u8], output);
}

#[test]
fn zeroing_loop_is_rewritten_in_both_emitters() {
    let program = tokenize(b"+++++[-]");

    let c = generate_source(&program, CEmitter::new(30_000)).unwrap();
    assert!(c.contains("array[idx] = 0;"));
    assert!(!c.contains("while"));

    let asm = generate_source(&program, NasmEmitter::new(30_000)).unwrap();
    assert!(asm.contains("mov byte [r8], 0"));
    assert!(!asm.contains("je "));
}

#[test]
fn unmatched_close_is_rejected_everywhere() {
    let source = "+++[-]>.]";

    let err = interpret(source, b"").unwrap_err();
    assert_eq!(
        Some(Reason::TooManyCloseBrackets),
        err.as_compilation_error().map(|e| e.reason())
    );

    let program = tokenize(source.as_bytes());
    let err = generate_source(&program, CEmitter::new(30_000)).unwrap_err();
    assert!(err.is_malformed_program());
    let err = generate_source(&program, NasmEmitter::new(30_000)).unwrap_err();
    assert!(err.is_malformed_program());
}

#[test]
fn registry_selects_backends_by_name() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        cc: String::from("bfcc-test-missing-cc"),
        ..Config::default()
    };
    let registry = Registry::with_builtins(&config);

    assert!(registry.get("brainfork").is_none());

    let c = registry.get("c").unwrap();
    let output = dir.path().join("hello");
    let err = c.generate("+[-]]", &output).unwrap_err();
    assert!(err.as_compilation_error().is_some());
    assert!(fs::read_dir(dir.path()).unwrap().next().is_none());

    // a failure doesn't affect the next lookup
    let err = registry.get("c").unwrap().generate("+.", &output).unwrap_err();
    assert!(matches!(err, Error::Toolchain { .. }));
    assert!(dir.path().join("hello.c").exists());
}

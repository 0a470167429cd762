// ABOUTME: End-to-end integration tests driving the compiled `umbra` binary

use std::io::Write;
use std::process::Command;
use umbra::env::Environment;
use umbra::error::EvalOutcome;
use umbra::eval::eval_module;
use umbra::parser::parse_source;
use umbra::value::Value;

fn umbra_bin() -> &'static str {
    env!("CARGO_BIN_EXE_umbra")
}

/// Runs a script file through the binary and returns (stdout, exit code).
fn run_script(source: &str) -> (String, i32) {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", source).unwrap();
    let output = Command::new(umbra_bin())
        .arg(file.path())
        .output()
        .expect("failed to run umbra binary");
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

mod s1_arithmetic {
    use super::*;

    #[test]
    fn precedence_and_print() {
        let (stdout, code) = run_script("const x num = 1 + 2 * 3\nstdout x");
        assert_eq!(stdout, "7");
        assert_eq!(code, 0);
    }
}

mod s2_array_assign_and_length {
    use super::*;

    #[test]
    fn append_past_end_then_length() {
        let (stdout, code) = run_script("mut a arr = [1,2,3]\na[3] = 4\nstdout ~a");
        assert_eq!(stdout, "4");
        assert_eq!(code, 0);
    }
}

mod s3_enum_match {
    use super::*;

    #[test]
    fn matched_member_invokes_handler() {
        let (stdout, code) = run_script(
            r#"
            enum Maybe { Some(num) None }
            const v = Maybe::Some(42)
            match v {
              Maybe::Some |x num| { stdout x }
              Maybe::None  || { stdout "nothing" }
            }
            "#,
        );
        assert_eq!(stdout, "42");
        assert_eq!(code, 0);
    }
}

mod s4_for_loop {
    use super::*;

    #[test]
    fn prints_each_iteration() {
        let (stdout, code) = run_script("for const i num = 0, 3 { stdout i }");
        assert_eq!(stdout, "0123");
        assert_eq!(code, 0);
    }
}

mod s5_recursive_factorial {
    use super::*;

    #[test]
    fn factorial_of_five() {
        let (stdout, code) = run_script(
            r#"
            def fact(n num) num {
              if n <= 1 { return 1 }
              return n * fact(n - 1)
            }
            stdout fact(5)
            "#,
        );
        assert_eq!(stdout, "120");
        assert_eq!(code, 0);
    }
}

mod s6_array_destructuring {
    use super::*;

    #[test]
    fn sums_destructured_elements() {
        let (stdout, code) = run_script("const [a, b, c] = [10, 20, 30]\nstdout a + b + c");
        assert_eq!(stdout, "60");
        assert_eq!(code, 0);
    }
}

mod exit_codes {
    use super::*;

    #[test]
    fn syntax_error_exits_65() {
        let (_, code) = run_script("const x num = ");
        assert_eq!(code, 65);
    }

    #[test]
    fn runtime_error_exits_1() {
        let (_, code) = run_script("stdout undefined_name");
        assert_eq!(code, 1);
    }

    #[test]
    fn bad_cli_flag_exits_64() {
        let output = Command::new(umbra_bin())
            .arg("--not-a-real-flag")
            .output()
            .unwrap();
        assert_eq!(output.status.code(), Some(64));
    }

    #[test]
    fn missing_file_exits_1() {
        let output = Command::new(umbra_bin())
            .arg("/no/such/file.u")
            .output()
            .unwrap();
        assert_eq!(output.status.code(), Some(1));
    }
}


mod debug_flags {
    use super::*;

    #[test]
    fn tokens_flag_dumps_without_evaluating() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "stdout 1").unwrap();
        let output = Command::new(umbra_bin())
            .arg("--tokens")
            .arg(file.path())
            .output()
            .unwrap();
        assert!(output.status.success());
        assert!(String::from_utf8_lossy(&output.stdout).is_empty());
    }

    #[test]
    fn ast_flag_dumps_without_evaluating() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "stdout 1").unwrap();
        let output = Command::new(umbra_bin())
            .arg("--ast")
            .arg(file.path())
            .output()
            .unwrap();
        assert!(output.status.success());
        assert!(String::from_utf8_lossy(&output.stdout).is_empty());
    }
}

// The remaining invariants from the testable-properties list are exercised
// directly against the library, since they're about evaluator/parser
// semantics rather than process-level behavior.

#[test]
fn environment_shadowing_does_not_leak() {
    let module = parse_source(
        r#"
        const x num = 1
        def shadow() num {
            const x num = 2
            return x
        }
        const inner num = shadow()
        "#,
    )
    .unwrap();
    let env = Environment::new();
    eval_module(&module, &env).unwrap();
    assert!(matches!(env.get("x", true).unwrap().get_value(), Value::Number(n) if n == 1.0));
    assert!(matches!(env.get("inner", true).unwrap().get_value(), Value::Number(n) if n == 2.0));
}

#[test]
fn immutable_assignment_raises_rt040() {
    let module = parse_source("const n num = 1\nn = 2").unwrap();
    let env = Environment::new();
    let err = eval_module(&module, &env).unwrap_err();
    match err {
        EvalOutcome::Error(e) => assert_eq!(e.code(), "RT040"),
        other => panic!("expected error, got {:?}", other),
    }
}

#[test]
fn declared_type_mismatch_raises_ty001() {
    let module = parse_source("const n num = true").unwrap();
    let env = Environment::new();
    let err = eval_module(&module, &env).unwrap_err();
    match err {
        EvalOutcome::Error(e) => assert_eq!(e.code(), "TY001"),
        other => panic!("expected error, got {:?}", other),
    }
}

#[test]
fn enum_equality_compares_signature_and_member_only() {
    let module = parse_source(
        r#"
        enum E { A(num) B }
        const same bool = E::A(1) == E::A(1)
        const diff_args bool = E::A(1) == E::A(2)
        const cross bool = E::A(1) enumof E::B
        const self_kind bool = E::A(1) enumof E::A(9)
        "#,
    )
    .unwrap();
    let env = Environment::new();
    eval_module(&module, &env).unwrap();
    assert!(matches!(env.get("same", true).unwrap().get_value(), Value::Bool(true)));
    assert!(matches!(env.get("diff_args", true).unwrap().get_value(), Value::Bool(false)));
    assert!(matches!(env.get("cross", true).unwrap().get_value(), Value::Bool(false)));
    assert!(matches!(env.get("self_kind", true).unwrap().get_value(), Value::Bool(true)));
}

#[test]
fn match_falls_through_without_error_when_unmatched() {
    let module = parse_source(
        r#"
        enum E { A B }
        const v = E::A
        match v {
          E::B || { stdout "unreachable" }
        }
        "#,
    )
    .unwrap();
    let env = Environment::new();
    eval_module(&module, &env).unwrap();
}

#[test]
fn closure_captures_mutable_slot_late() {
    let module = parse_source(
        r#"
        mut counter num = 0
        def bump() num {
            counter = counter + 1
            return counter
        }
        const first num = bump()
        const second num = bump()
        "#,
    )
    .unwrap();
    let env = Environment::new();
    eval_module(&module, &env).unwrap();
    assert!(matches!(env.get("first", true).unwrap().get_value(), Value::Number(n) if n == 1.0));
    assert!(matches!(env.get("second", true).unwrap().get_value(), Value::Number(n) if n == 2.0));
}

#[test]
fn nan_never_equals_itself() {
    let module = parse_source("const x bool = num(\"abc\") == num(\"abc\")").unwrap();
    let env = Environment::new();
    eval_module(&module, &env).unwrap();
    assert!(matches!(env.get("x", true).unwrap().get_value(), Value::Bool(false)));
}

#[test]
fn string_literal_escapes_resolve_on_display() {
    let expr_module = parse_source("const s str = \"a\\nb\"").unwrap();
    let env = Environment::new();
    eval_module(&expr_module, &env).unwrap();
    let s = env.get("s", true).unwrap().get_value();
    match s {
        Value::Str(ref text) => assert_eq!(text, "a\nb"),
        other => panic!("expected string, got {:?}", other),
    }
}

#[test]
fn negative_range_yields_empty_array() {
    let module = parse_source("const r arr = range -5").unwrap();
    let env = Environment::new();
    eval_module(&module, &env).unwrap();
    assert!(matches!(env.get("r", true).unwrap().get_value(), Value::Array(ref v) if v.is_empty()));
}

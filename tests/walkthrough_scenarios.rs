//! End-to-end scenarios exercising widening, recursion, string handling,
//! an unrecognized operator, and the two named semantic-error messages,
//! run against the full pipeline.

use halite::diagnostics::Diagnostic;
use test_utils::{assert_output, expect_check_failure, expect_diagnostic_containing};

#[test]
fn scenario_one_widening_in_mixed_arithmetic() {
    assert_output(
        r#"let x: int = 10; let y: float = 3.14; let z: float = x + y; print("Result:", z);"#,
        "Result: 13.14\n",
    );
}

#[test]
fn scenario_two_recursive_factorial() {
    let source = r#"
    fn fatorial(n: int): int {
        if (n <= 1) {
            return 1;
        }
        return n * fatorial(n - 1);
    }
    let num: int = 5;
    print("Fatorial de", num, "é", fatorial(num));
    "#;
    assert_output(source, "Fatorial de 5 é 120\n");
}

#[test]
fn scenario_three_string_concatenation_and_len() {
    let source = r#"let s: string = "Olá, " + "Craze!"; print(s); print("Tamanho:", len(s));"#;
    assert_output(source, "Olá, Craze!\nTamanho: 12\n");
}

#[test]
fn scenario_four_percent_is_not_a_recognized_token() {
    let source = r#"
    let i: int = 0;
    while (i < 5) {
        if (i % 2 == 0) {
            print(i);
        }
        i = i + 1;
    }
    "#;
    expect_diagnostic_containing(source, "unexpected character '%'");

    let failure = expect_check_failure(source);
    assert!(
        failure.errors.iter().any(|e| matches!(e, Diagnostic::Lexical(_))),
        "expected a lexical diagnostic, got: {:#?}",
        failure.errors
    );
}

#[test]
fn scenario_five_assigning_a_string_literal_to_an_int_declaration() {
    let failure = expect_check_failure(r#"let x: int = "string";"#);
    assert!(
        failure
            .errors
            .iter()
            .any(|e| e.to_string().contains("incompatible initializer")),
        "got: {:#?}",
        failure.errors
    );
}

#[test]
fn scenario_six_non_void_function_with_no_return_statement() {
    let failure = expect_check_failure("fn f(): int { let x: int = 10; }");
    assert!(
        failure
            .errors
            .iter()
            .any(|e| e.to_string().contains("must return a value")),
        "got: {:#?}",
        failure.errors
    );
}

use test_utils::{assert_output, expect_diagnostic_containing};

#[test]
fn assignment_updates_existing_variable() {
    assert_output(
        "let x: int = 13; print(x); x = 42; print(x);",
        "13\n42\n",
    );
}

#[test]
fn assignment_expression_evaluates_to_the_assigned_value() {
    assert_output(
        "let x: int = 0; let y: int = (x = 17); print(x, y);",
        "17 17\n",
    );
}

#[test]
fn assignment_widens_int_into_float_variable() {
    assert_output("let x: float = 1.0; x = 2; print(x);", "2\n");
}

#[test]
fn assigning_to_a_non_variable_is_a_parse_error() {
    expect_diagnostic_containing("1 + 1 = 2;", "left-hand side");
}

#[test]
fn assigning_to_an_undeclared_variable_is_an_error() {
    expect_diagnostic_containing("x = 1;", "not declared");
}

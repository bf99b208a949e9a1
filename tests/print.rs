use test_utils::assert_output;

#[test]
fn print_joins_multiple_arguments_with_spaces() {
    assert_output(r#"print("a", "b", "c");"#, "a b c\n");
}

#[test]
fn print_is_exempt_from_arity_checking() {
    assert_output("print();", "\n");
    assert_output("print(1);", "1\n");
    assert_output("print(1, 2, 3, 4, 5);", "1 2 3 4 5\n");
}

#[test]
fn print_accepts_the_result_of_a_block_like_expression() {
    let source = r#"
    fn from_function(): string {
        return "from function";
    }
    print(from_function(), if_value());

    fn if_value(): int {
        if (true) {
            return 1;
        }
        return 0;
    }
    "#;
    assert_output(source, "from function 1\n");
}

#[test]
fn print_formats_each_value_type() {
    assert_output(
        r#"print(1, 1.5, "text", true, false);"#,
        "1 1.5 text true false\n",
    );
}

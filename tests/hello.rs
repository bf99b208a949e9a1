use test_utils::assert_output;

#[test]
fn prints_hello_world() {
    assert_output(r#"print("Hello, World!");"#, "Hello, World!\n");
}

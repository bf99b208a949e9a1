use test_utils::assert_output;

const FIB: &str = r#"
fn fib(n: int): int {
    if (n < 2) {
        return n;
    }
    return fib(n - 1) + fib(n - 2);
}

print(fib(20));
"#;

#[test]
fn recursive_fibonacci() {
    assert_output(FIB, "6765\n");
}

#[test]
fn iterative_fibonacci_matches_recursive() {
    let source = r#"
    let a: int = 0;
    let b: int = 1;
    let i: int = 0;
    while (i < 20) {
        let next: int = a + b;
        a = b;
        b = next;
        i = i + 1;
    }
    print(a);
    "#;
    assert_output(source, "6765\n");
}

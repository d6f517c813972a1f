mod common;

use common::run_file_process;

fn assert_static_error(source: &str, expected_message: &str) {
    let output = run_file_process(source);
    assert_eq!(output.status.code(), Some(65));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains(expected_message), "stderr was: {stderr}");
}

#[test]
fn unterminated_string_is_a_scan_error() {
    assert_static_error("print \"never closed;", "Unterminated string");
}

#[test]
fn unexpected_character_is_a_scan_error() {
    assert_static_error("var a = 1 @ 2;", "Unexpected character '@'");
}

#[test]
fn missing_semicolon_is_a_parse_error() {
    assert_static_error("var a = 1", "Expect ';' after variable decleration");
}

#[test]
fn invalid_assignment_target_is_a_parse_error() {
    assert_static_error("1 = 2;", "Invalid assignment target");
}

#[test]
fn break_outside_a_loop_is_a_resolve_error() {
    assert_static_error("break;", "Cannot break outside of a loop");
}

#[test]
fn return_outside_a_function_is_a_resolve_error() {
    assert_static_error("return 1;", "Cannot return from top-level code");
}

#[test]
fn returning_a_value_from_init_is_a_resolve_error() {
    assert_static_error("class Foo { init() { return 1; } }", "Cannot return a value from an initializer");
}

#[test]
fn class_inheriting_from_itself_is_a_resolve_error() {
    assert_static_error("class Foo < Foo {}", "A class cannot inherit from itself");
}

#[test]
fn this_outside_a_class_is_a_resolve_error() {
    assert_static_error("print this;", "Cannot use 'this' outside of a class");
}

#[test]
fn shadowing_within_the_same_scope_is_a_resolve_error() {
    assert_static_error("{ var a = 1; var a = 2; }", "A variable is already defined with name 'a' in this scope");
}

#[test]
fn reading_a_variable_in_its_own_initializer_is_a_resolve_error() {
    assert_static_error("{ var a = a; }", "Cannot read local variable in its own initializer");
}

#[test]
fn super_outside_a_class_is_a_resolve_error() {
    assert_static_error("print super.speak();", "Cannot use 'super' outside of a class");
}

#[test]
fn super_without_a_superclass_is_a_resolve_error() {
    assert_static_error(
        "class Foo { speak() { super.speak(); } }",
        "Cannot use 'super' in a class with no superclass",
    );
}

#[test]
fn more_than_255_parameters_is_a_parse_error() {
    let params = (0..256).map(|i| format!("p{i}")).collect::<Vec<_>>().join(", ");
    let source = format!("fun tooMany({params}) {{}}");
    assert_static_error(&source, "Cannot have more than 255 parameters");
}

#[test]
fn more_than_255_arguments_is_a_parse_error() {
    let args = (0..256).map(|i| i.to_string()).collect::<Vec<_>>().join(", ");
    let source = format!("fun ignore() {{}} ignore({args});");
    assert_static_error(&source, "Cannot have more than 255 arguments");
}

mod common;

use common::run_file_process;

#[test]
fn undefined_variable_exits_seventy() {
    let output = run_file_process("print nowhere;");
    assert_eq!(output.status.code(), Some(70));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Undefined variable 'nowhere'"), "stderr was: {stderr}");
}

#[test]
fn calling_a_non_callable_value_exits_seventy() {
    let output = run_file_process(r#"var x = 1; x();"#);
    assert_eq!(output.status.code(), Some(70));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Can only call functions and classes"), "stderr was: {stderr}");
}

#[test]
fn wrong_arity_exits_seventy() {
    let output = run_file_process(r#"fun add(a, b) { return a + b; } add(1);"#);
    assert_eq!(output.status.code(), Some(70));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Expected 2 arguments but got 1"), "stderr was: {stderr}");
}

#[test]
fn adding_a_number_and_a_string_exits_seventy() {
    let output = run_file_process(r#"print 1 + "a";"#);
    assert_eq!(output.status.code(), Some(70));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Operands must be two numbers or two strings"), "stderr was: {stderr}");
}

#[test]
fn accessing_a_field_on_a_non_instance_exits_seventy() {
    let output = run_file_process(r#"var x = 1; print x.field;"#);
    assert_eq!(output.status.code(), Some(70));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Only instances have properties"), "stderr was: {stderr}");
}

#[test]
fn undefined_property_on_an_instance_exits_seventy() {
    let output = run_file_process(r#"class Box {} Box().missing;"#);
    assert_eq!(output.status.code(), Some(70));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Undefined property 'missing'"), "stderr was: {stderr}");
}

#[test]
fn inheriting_from_a_non_class_exits_seventy() {
    let output = run_file_process(r#"var NotAClass = 1; class Sub < NotAClass {}"#);
    assert_eq!(output.status.code(), Some(70));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Superclass must be a class"), "stderr was: {stderr}");
}

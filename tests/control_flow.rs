mod common;

use common::run;

#[test]
fn if_else_picks_the_matching_branch() {
    let source = r#"
        if (1 < 2) print "yes"; else print "no";
        if (2 < 1) print "yes"; else print "no";
    "#;
    assert_eq!(run(source), "yes\nno\n");
}

#[test]
fn if_without_else_is_a_no_op_when_false() {
    assert_eq!(run(r#"if (false) print "unreachable";"#), "");
}

#[test]
fn while_loop_runs_until_condition_is_false() {
    let source = r#"
        var i = 0;
        while (i < 3) {
            print i;
            i = i + 1;
        }
    "#;
    assert_eq!(run(source), "0\n1\n2\n");
}

#[test]
fn break_exits_only_the_innermost_loop() {
    let source = r#"
        var i = 0;
        while (i < 3) {
            var j = 0;
            while (j < 3) {
                if (j == 1) break;
                print "inner " + i + " " + j;
                j = j + 1;
            }
            i = i + 1;
        }
    "#;
    assert_eq!(run(source), "inner 0 0\ninner 1 0\ninner 2 0\n");
}

#[test]
fn for_loop_desugars_into_while() {
    let source = r#"
        for (var i = 0; i < 3; i = i + 1) {
            print i;
        }
    "#;
    assert_eq!(run(source), "0\n1\n2\n");
}

#[test]
fn for_loop_without_clauses_runs_forever_until_broken() {
    let source = r#"
        var i = 0;
        for (;;) {
            if (i >= 2) break;
            print i;
            i = i + 1;
        }
    "#;
    assert_eq!(run(source), "0\n1\n");
}

#[test]
fn block_scoping_does_not_leak_into_the_enclosing_scope() {
    let source = r#"
        var a = "outer";
        {
            var a = "inner";
            print a;
        }
        print a;
    "#;
    assert_eq!(run(source), "inner\nouter\n");
}

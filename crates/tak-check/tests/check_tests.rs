use tak_check::check_program;
use tak_common::CompilerOptions;
use tak_lexer::Lexer;
use tak_parser::Parser;
use tak_postparse::postparse_verify;

/// Parses, post-parses, and checks `src`, asserting every stage before
/// the checker succeeds cleanly (the checker's own verdict is left to
/// the caller).
fn check(src: &str) -> Parser {
    let options = CompilerOptions::new("t.tak", "t.out");
    let mut parser = Parser::new(&options);
    let mut lexer = Lexer::new("t.tak", src.as_bytes().to_vec());
    parser.parse_program(&mut lexer, "t.tak");
    assert!(!parser.diagnostics.failed(), "parse failed: {:?}", parser.diagnostics.error_count());
    assert!(postparse_verify(&mut parser, &mut lexer), "postparse failed: {:?}", parser.diagnostics.error_count());
    check_program(&mut parser);
    parser
}

#[test]
fn a_well_typed_program_checks_clean() {
    let parser = check(
        r#"
        add := proc(a: i32, b: i32) -> i32 {
            ret a + b;
        }

        x : i32 = add(1, 2);
        "#,
    );
    assert!(!parser.diagnostics.failed(), "{:?}", parser.diagnostics.error_count());
}

#[test]
fn assigning_to_a_constant_is_rejected() {
    let parser = check(
        r#"
        run := proc() {
            x :: i32 = 1;
            x = 2;
            ret;
        }
        "#,
    );
    assert!(parser.diagnostics.failed());
}

#[test]
fn call_argument_count_mismatch_is_reported() {
    let parser = check(
        r#"
        add := proc(a: i32, b: i32) -> i32 {
            ret a + b;
        }

        x : i32 = add(1);
        "#,
    );
    assert!(parser.diagnostics.failed());
}

#[test]
fn call_argument_type_mismatch_is_reported() {
    let parser = check(
        r#"
        needs_int := proc(a: i32) {
            ret;
        }

        y : f32 = 1.5;
        needs_int(y);
        "#,
    );
    assert!(parser.diagnostics.failed());
}

#[test]
fn member_access_through_a_pointer_resolves_the_field_type() {
    let parser = check(
        r#"
        struct Point {
            x: i32;
            y: i32;
        }

        get_x := proc(p: ^Point) -> i32 {
            ret p.x;
        }

        origin : Point = {0, 0};
        value : i32 = get_x(&origin);
        "#,
    );
    assert!(!parser.diagnostics.failed(), "{:?}", parser.diagnostics.error_count());
}

#[test]
fn struct_braced_initializer_checks_member_types() {
    let parser = check(
        r#"
        struct Point {
            x: i32;
            y: i32;
        }

        p : Point = {1, 2};
        "#,
    );
    assert!(!parser.diagnostics.failed(), "{:?}", parser.diagnostics.error_count());
}

#[test]
fn struct_braced_initializer_with_wrong_member_count_is_rejected() {
    let parser = check(
        r#"
        struct Point {
            x: i32;
            y: i32;
        }

        p : Point = {1};
        "#,
    );
    assert!(parser.diagnostics.failed());
}

#[test]
fn inferred_array_length_comes_from_the_braced_initializer() {
    let parser = check(
        r#"
        xs : i32[] = {1, 2, 3};
        "#,
    );
    assert!(!parser.diagnostics.failed(), "{:?}", parser.diagnostics.error_count());
}

#[test]
fn break_outside_of_a_loop_is_rejected() {
    let parser = check(
        r#"
        run := proc() {
            brk;
            ret;
        }
        "#,
    );
    assert!(parser.diagnostics.failed());
}

#[test]
fn break_inside_a_loop_is_accepted() {
    let parser = check(
        r#"
        run := proc() {
            i := 0;
            while (i < 10) {
                brk;
            }
            ret;
        }
        "#,
    );
    assert!(!parser.diagnostics.failed(), "{:?}", parser.diagnostics.error_count());
}

#[test]
fn returning_a_mismatched_type_is_rejected() {
    let parser = check(
        r#"
        struct Point {
            x: i32;
        }

        make_point := proc() -> Point {
            ret nullptr;
        }
        "#,
    );
    assert!(parser.diagnostics.failed());
}

#[test]
fn cast_from_bare_void_is_rejected() {
    let parser = check(
        r#"
        run := proc() {
            x : ^void = nullptr;
            y := cast(void, x);
            z := cast(i32, y);
            ret;
        }
        "#,
    );
    assert!(parser.diagnostics.failed());
}

#[test]
fn cast_between_pointer_and_matching_width_integer_is_accepted() {
    let parser = check(
        r#"
        run := proc() {
            x : i32 = 0;
            p := &x;
            n := cast(u64, p);
            ret;
        }
        "#,
    );
    assert!(!parser.diagnostics.failed(), "{:?}", parser.diagnostics.error_count());
}

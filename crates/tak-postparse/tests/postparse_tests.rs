use tak_common::CompilerOptions;
use tak_entity::SymbolFlags;
use tak_lexer::Lexer;
use tak_parser::Parser;
use tak_postparse::postparse_verify;

fn parse(src: &str) -> (Parser, Lexer) {
    let options = CompilerOptions::new("t.tak", "t.out");
    let mut parser = Parser::new(&options);
    let mut lexer = Lexer::new("t.tak", src.as_bytes().to_vec());
    parser.parse_program(&mut lexer, "t.tak");
    (parser, lexer)
}

#[test]
fn full_pipeline_resolves_generic_procedures_and_structures_together() {
    let (mut parser, mut lexer) = parse(
        r#"
        struct Box<T> {
            value: T;
        }

        identity := proc<T>(value: T) -> T {
            ret value;
        }

        x : Box<i32> = {1};
        y : i32 = identity<i32>(5);
        "#,
    );
    assert!(!parser.diagnostics.failed(), "{:?}", parser.diagnostics.error_count());
    assert!(postparse_verify(&mut parser, &mut lexer), "{:?}", parser.diagnostics.error_count());

    assert!(parser.table.lookup_type("\\Box").is_none(), "generic base struct was collected");
    assert!(parser.table.lookup_type("Box[I32]").is_some());
    assert!(parser.table.lookup_scoped_symbol("identity[I32]").is_some());
}

#[test]
fn leftover_placeholder_short_circuits_before_monomorphization_runs() {
    let (mut parser, mut lexer) = parse("ret undeclared;");
    assert!(!postparse_verify(&mut parser, &mut lexer));
    assert!(parser.diagnostics.failed());
}

#[test]
fn mutual_forward_reference_between_two_procedures_leaves_no_leftover_placeholder() {
    let (mut parser, mut lexer) = parse(
        r#"
        f := proc() -> i32 { ret g(); }
        g := proc() -> i32 { ret 0; }
        "#,
    );
    assert!(!parser.diagnostics.failed(), "{:?}", parser.diagnostics.error_count());
    assert!(postparse_verify(&mut parser, &mut lexer), "{:?}", parser.diagnostics.error_count());
    assert!(parser.table.placeholder_symbols().is_empty());
}

#[test]
fn generic_procedure_argument_count_mismatch_is_reported_at_the_call_site() {
    let (mut parser, mut lexer) = parse(
        r#"
        pair := proc<A, B>(a: A, b: B) -> A {
            ret a;
        }

        x : i32 = pair<i32>(1);
        "#,
    );
    assert!(!parser.diagnostics.failed(), "base and call site should both parse cleanly");
    assert!(!postparse_verify(&mut parser, &mut lexer));
    assert!(parser.diagnostics.failed());
}

#[test]
fn generic_procedure_marked_foreign_is_rejected() {
    let (mut parser, mut lexer) = parse(
        r#"
        identity := proc<T>(value: T) -> T {
            ret value;
        }

        x : i32 = identity<i32>(5);
        "#,
    );
    assert!(!parser.diagnostics.failed());

    let base_index = parser.table.lookup_scoped_symbol("\\identity").expect("base registered").symbol_index;
    parser.table.lookup_symbol_mut(base_index).unwrap().flags.insert(SymbolFlags::FOREIGN);

    assert!(!postparse_verify(&mut parser, &mut lexer));
    assert!(parser.diagnostics.failed());
}

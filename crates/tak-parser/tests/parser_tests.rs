use tak_common::CompilerOptions;
use tak_entity::{SymbolKind, TypeName};
use tak_lexer::Lexer;
use tak_parser::{AstNodeData, Parser};

fn parse_src(src: &str) -> Parser {
    let options = CompilerOptions::new("t.tak", "t.out");
    let mut parser = Parser::new(&options);
    let mut lexer = Lexer::new("t.tak", src.as_bytes().to_vec());
    parser.parse_program(&mut lexer, "t.tak");
    parser
}

#[test]
fn parses_a_global_variable_declaration() {
    let parser = parse_src("x : i32 = 5;");
    assert!(!parser.diagnostics.failed());
    assert_eq!(parser.ast.toplevel.len(), 1);
    let node = parser.ast.get(parser.ast.toplevel[0]);
    match &node.data {
        AstNodeData::VarDecl { name, symbol_index, .. } => {
            assert_eq!(name, "x");
            let sym = parser.table.lookup_symbol(*symbol_index).expect("symbol recorded");
            assert_eq!(sym.kind, SymbolKind::Variable);
        }
        other => panic!("expected VarDecl, got {other:?}"),
    }
}

#[test]
fn unresolved_identifier_becomes_a_placeholder_instead_of_an_error() {
    // `undeclared` is referenced before any declaration exists for it.
    // The grammar installs a placeholder symbol rather than failing the
    // parse outright.
    let parser = parse_src("ret undeclared;");
    assert!(!parser.diagnostics.failed());
}

#[test]
fn parses_a_procedure_with_a_branch_and_return() {
    let parser = parse_src(
        r#"
        add := proc(a: i32, b: i32) -> i32 {
            if (a > b) {
                ret a;
            } else {
                ret b;
            }
        }
        "#,
    );
    assert!(!parser.diagnostics.failed(), "{:?}", parser.diagnostics.error_count());
    assert_eq!(parser.ast.toplevel.len(), 1);
    let node = parser.ast.get(parser.ast.toplevel[0]);
    match &node.data {
        AstNodeData::ProcDecl { name, params, body, .. } => {
            assert_eq!(name, "add");
            assert_eq!(params.len(), 2);
            assert_eq!(body.len(), 1);
            match &parser.ast.get(body[0]).data {
                AstNodeData::Branch { conditions, bodies, else_body, .. } => {
                    assert_eq!(conditions.len(), 1);
                    assert_eq!(bodies.len(), 1);
                    assert!(else_body.is_some());
                }
                other => panic!("expected Branch, got {other:?}"),
            }
        }
        other => panic!("expected ProcDecl, got {other:?}"),
    }
}

#[test]
fn struct_definition_registers_a_user_type() {
    let parser = parse_src(
        r#"
        struct Point {
            x: i32;
            y: i32;
        }
        "#,
    );
    assert!(!parser.diagnostics.failed());
    let ty = parser.table.lookup_type("\\Point").expect("Point registered in the type table");
    assert_eq!(ty.members.len(), 2);
    assert_eq!(ty.members[0].name, "x");
}

#[test]
fn compose_block_attaches_a_method_member_to_its_target_struct() {
    let parser = parse_src(
        r#"
        struct Point {
            x: i32;
            y: i32;
        }

        compose Point {
            getx := proc(self: ^Point) -> i32 {
                ret self.x;
            }
        }
        "#,
    );
    assert!(!parser.diagnostics.failed());
    let ty = parser.table.lookup_type("\\Point").expect("Point registered in the type table");
    assert!(ty.members.iter().any(|m| m.name == "getx"));
}

#[test]
fn generic_procedure_base_is_flagged_and_call_site_instantiation_registers_a_permutation() {
    let parser = parse_src(
        r#"
        identity := proc<T>(value: T) -> T {
            ret value;
        }

        x : i32 = identity<i32>(5);
        "#,
    );
    assert!(!parser.diagnostics.failed(), "{:?}", parser.diagnostics.error_count());
    let base = parser.table.lookup_scoped_symbol("\\identity").expect("base symbol exists");
    assert!(base.is_generic_base());

    // The call-site instantiation should have registered a permutation
    // symbol mangled on the base's name and argument types.
    let permutation = parser.table.lookup_scoped_symbol("identity[I32]");
    assert!(permutation.is_some(), "expected a registered generic permutation");
    assert!(permutation.unwrap().is_generic_permutation());
}

#[test]
fn namespaced_declaration_is_reachable_through_its_qualified_path() {
    let parser = parse_src(
        r#"
        namespace outer {
            value : i32 = 1;
        }
        "#,
    );
    assert!(!parser.diagnostics.failed());
    assert!(parser.table.lookup_scoped_symbol("\\outer\\value").is_some());
}

#[test]
fn for_loop_with_a_declared_induction_variable_parses_all_three_clauses() {
    let parser = parse_src(
        r#"
        sum := proc() -> i32 {
            total : i32 = 0;
            for (i := 0; i < 10; i = i + 1) {
                total = total + i;
            }
            ret total;
        }
        "#,
    );
    assert!(!parser.diagnostics.failed(), "{:?}", parser.diagnostics.error_count());
    let node = parser.ast.get(parser.ast.toplevel[0]);
    let AstNodeData::ProcDecl { body, .. } = &node.data else { panic!("expected ProcDecl") };
    let for_node = body.iter().find_map(|&id| match &parser.ast.get(id).data {
        AstNodeData::For { init, condition, update, body } => Some((init.is_some(), condition.is_some(), update.is_some(), body.len())),
        _ => None,
    });
    let (has_init, has_condition, has_update, body_len) = for_node.expect("a For node in the procedure body");
    assert!(has_init);
    assert!(has_condition);
    assert!(has_update);
    assert_eq!(body_len, 1);
}

#[test]
fn enum_definition_auto_increments_unlabeled_variants() {
    let parser = parse_src(
        r#"
        enum Color {
            Red,
            Green,
            Blue = 10,
            Purple,
        }
        "#,
    );
    assert!(!parser.diagnostics.failed());
    let node = parser.ast.get(parser.ast.toplevel[0]);
    let AstNodeData::EnumDef { variants, .. } = &node.data else { panic!("expected EnumDef") };
    assert_eq!(variants, &vec![
        ("Red".to_string(), Some(0)),
        ("Green".to_string(), Some(1)),
        ("Blue".to_string(), Some(10)),
        ("Purple".to_string(), Some(11)),
    ]);
}

#[test]
fn switch_statement_collects_cases_and_a_default() {
    let parser = parse_src(
        r#"
        classify := proc(n: i32) -> i32 {
            switch (n) {
                case 1 {
                    ret 10;
                }
                case 2 {
                    ret 20;
                }
                default {
                    ret 0;
                }
            }
        }
        "#,
    );
    assert!(!parser.diagnostics.failed(), "{:?}", parser.diagnostics.error_count());
    let node = parser.ast.get(parser.ast.toplevel[0]);
    let AstNodeData::ProcDecl { body, .. } = &node.data else { panic!("expected ProcDecl") };
    let AstNodeData::Switch { cases, .. } = &parser.ast.get(body[0]).data else { panic!("expected Switch") };
    assert_eq!(cases.len(), 3);
    assert!(cases[0].value.is_some());
    assert!(cases.last().unwrap().value.is_none());
}

#[test]
fn fallthrough_parses_as_its_own_statement_inside_a_case_body() {
    let parser = parse_src(
        r#"
        classify := proc(n: i32) -> i32 {
            switch (n) {
                case 1 {
                    fallthrough;
                }
                default {
                    ret 0;
                }
            }
        }
        "#,
    );
    assert!(!parser.diagnostics.failed(), "{:?}", parser.diagnostics.error_count());
    let node = parser.ast.get(parser.ast.toplevel[0]);
    let AstNodeData::ProcDecl { body, .. } = &node.data else { panic!("expected ProcDecl") };
    let AstNodeData::Switch { cases, .. } = &parser.ast.get(body[0]).data else { panic!("expected Switch") };
    assert!(matches!(parser.ast.get(cases[0].body[0]).data, AstNodeData::Fallthrough));
}

#[test]
fn pointer_type_reference_to_an_undeclared_struct_creates_a_placeholder_type() {
    let parser = parse_src("describe := proc(p: ^Widget) -> void { }");
    assert!(!parser.diagnostics.failed());
    let ty = parser.table.lookup_type("\\Widget").expect("placeholder type registered");
    assert!(ty.is_placeholder());
}

#[test]
fn array_dimensions_are_recorded_in_declaration_order() {
    let parser = parse_src("buf : i32[4][2] = {1};");
    assert!(!parser.diagnostics.failed());
    let node = parser.ast.get(parser.ast.toplevel[0]);
    let AstNodeData::VarDecl { declared_type, .. } = &node.data else { panic!("expected VarDecl") };
    let ty = declared_type.as_ref().expect("declared type present");
    assert!(matches!(ty.name, TypeName::Primitive(_)));
    // Declared innermost-bracket-first: `[4][2]` prepends each dimension,
    // so the outer `[2]` ends up first in `array_lengths`.
    assert_eq!(ty.array_lengths, vec![2, 4]);
}

#[test]
fn a_forward_referenced_procedure_resolves_to_the_same_symbol_index_once_declared() {
    let parser = parse_src(
        r#"
        f := proc() -> i32 { ret g(); }
        g := proc() -> i32 { ret 0; }
        "#,
    );
    assert!(!parser.diagnostics.failed(), "{:?}", parser.diagnostics.error_count());
    assert!(parser.table.placeholder_symbols().is_empty(), "g's placeholder should have resolved in place");

    let g = parser.table.lookup_scoped_symbol("\\g").expect("g declared");
    assert_eq!(g.kind, SymbolKind::Procedure);
}

#[test]
fn a_constant_procedure_declaration_using_double_colon_parses_its_body() {
    let parser = parse_src("f :: proc() -> i32 { ret 0; }");
    assert!(!parser.diagnostics.failed(), "{:?}", parser.diagnostics.error_count());
    assert_eq!(parser.ast.toplevel.len(), 1);
    let node = parser.ast.get(parser.ast.toplevel[0]);
    match &node.data {
        AstNodeData::ProcDecl { name, symbol_index, .. } => {
            assert_eq!(name, "f");
            let sym = parser.table.lookup_symbol(*symbol_index).expect("symbol recorded");
            assert_eq!(sym.kind, SymbolKind::Procedure);
            assert!(sym.ty.flags.contains(tak_entity::TypeFlags::CONSTANT));
        }
        other => panic!("expected ProcDecl, got {other:?}"),
    }
}

#[test]
fn redeclaring_a_struct_under_the_same_name_is_a_naming_conflict() {
    let parser = parse_src(
        r#"
        struct Point { x: i32; y: i32; }
        struct Point { x: i32; y: i32; }
        "#,
    );
    assert!(parser.diagnostics.failed());
}

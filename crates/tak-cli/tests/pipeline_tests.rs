//! Whole-pipeline scenarios driven through [`tak_cli::driver::compile`],
//! the same entry point the `tak` binary uses. Mirrors a handful of the
//! scenarios a complete implementation of this front end is expected to
//! satisfy: placeholder resolution, illegal dereference, numeric
//! promotion, and namespaced lookup.

use std::io::Write;

use tak_cli::driver::compile;
use tak_common::CompilerOptions;

fn compile_source(src: &str) -> tak_cli::driver::CompileOutcome {
    let mut file = tempfile::Builder::new().suffix(".tak").tempfile().unwrap();
    write!(file, "{src}").unwrap();
    let options = CompilerOptions::new(file.path().to_str().unwrap(), "a.out");
    compile(&options).unwrap()
}

#[test]
fn forward_reference_between_two_procedures_resolves_cleanly() {
    let outcome = compile_source(
        r#"
        f := proc() -> i32 { ret g(); }
        g := proc() -> i32 { ret 0; }
        "#,
    );
    assert!(outcome.ok, "{:?}", outcome.rendered_diagnostics);
}

#[test]
fn dereferencing_a_non_pointer_is_reported() {
    let outcome = compile_source("x : i32 = 0; y := *x;");
    assert!(!outcome.ok);
    assert!(outcome.rendered_diagnostics.iter().any(|d| d.contains("error")));
}

#[test]
fn a_non_concrete_literal_promotes_to_its_declared_target() {
    let outcome = compile_source("a : i64 = 1; b := a + 1;");
    assert!(outcome.ok, "{:?}", outcome.rendered_diagnostics);
}

#[test]
fn namespaced_lookup_resolves_the_longest_matching_prefix() {
    let outcome = compile_source(
        r#"
        namespace A {
            x : i32 = 0;
        }
        namespace A\B {
            y := x;
        }
        "#,
    );
    assert!(outcome.ok, "{:?}", outcome.rendered_diagnostics);
}

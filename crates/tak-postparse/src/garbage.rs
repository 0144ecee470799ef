//! Garbage collection: once every instantiation site has been resolved,
//! a generic base's type-table entry no longer serves any purpose —
//! nothing references it by name any more, only its concrete
//! permutations do.
//!
//! Grounded in `tak::postparse_delete_garbage_objects`
//! (`src/postparser/other.cpp`).

use tak_parser::Parser;

pub(crate) fn delete_garbage_objects(parser: &mut Parser) -> bool {
    for name in parser.table.generic_base_type_names() {
        parser.table.delete_type(&name);
    }
    !parser.diagnostics.failed()
}

#[cfg(test)]
mod tests {
    use tak_common::CompilerOptions;
    use tak_lexer::Lexer;

    use super::*;

    fn parse(src: &str) -> Parser {
        let options = CompilerOptions::new("t.tak", "t.out");
        let mut parser = Parser::new(&options);
        let mut lexer = Lexer::new("t.tak", src.as_bytes().to_vec());
        parser.parse_program(&mut lexer, "t.tak");
        parser
    }

    #[test]
    fn generic_base_struct_is_removed_after_its_permutations_exist() {
        let mut parser = parse(
            r#"
            struct Box<T> {
                value: T;
            }

            x : Box<i32> = {1};
            "#,
        );
        assert!(parser.table.lookup_type("\\Box").is_some());
        assert!(delete_garbage_objects(&mut parser));
        assert!(parser.table.lookup_type("\\Box").is_none());
        assert!(parser.table.lookup_type("Box[I32]").is_some(), "the concrete permutation survives");
    }

    #[test]
    fn non_generic_types_are_left_alone() {
        let mut parser = parse(
            r#"
            struct Point {
                x: i32;
            }
            "#,
        );
        assert!(delete_garbage_objects(&mut parser));
        assert!(parser.table.lookup_type("\\Point").is_some());
    }
}

//! Generic procedure monomorphization: repeatedly finds a still-pending
//! call-site permutation, locates its generic base, and reparses the
//! base's signature and body against the permutation's concrete type
//! arguments.
//!
//! Grounded in `tak::postparse_permute_generic_procedures` and
//! `tak::postparse_reparse_procedure_permutation`
//! (`src/postparser/generic_procedures.cpp`). The scan-clear-reparse
//! loop (rather than collecting a batch up front) matters: reparsing one
//! permutation's body can itself reference further generic
//! instantiations, which only become visible to the scan on its next
//! pass.

use tak_entity::{SymbolFlags, SymbolKind};
use tak_lexer::Lexer;
use tak_parser::Parser;

pub(crate) fn permute_generic_procedures(parser: &mut Parser, lexer: &mut Lexer) -> bool {
    loop {
        let Some(perm_index) = parser.table.find_symbol_index(|s| s.flags.contains(SymbolFlags::GENERIC_PERMUTATION)) else {
            break;
        };

        let Some(perm_symbol) = parser.table.lookup_symbol(perm_index).cloned() else {
            continue;
        };
        if let Some(sym) = parser.table.lookup_symbol_mut(perm_index) {
            sym.flags.remove(SymbolFlags::GENERIC_PERMUTATION);
        }

        let base_symbol_index = perm_symbol.ty.sym_ref;
        let base_ok = parser
            .table
            .lookup_symbol(base_symbol_index)
            .is_some_and(|base| !base.generic_type_names.is_empty() && base.kind == SymbolKind::Procedure);

        if !base_ok {
            parser.diagnostics.raise_error(
                &perm_symbol.file,
                perm_symbol.src_pos,
                perm_symbol.line_number,
                "Attempting to pass generic type parameters for a symbol that does not take any.",
            );
            continue;
        }

        parser.reparse_procedure_permutation(base_symbol_index, perm_index, lexer);
    }

    !parser.diagnostics.failed()
}

#[cfg(test)]
mod tests {
    use tak_common::CompilerOptions;
    use tak_parser::AstNodeData;

    use super::*;

    fn parse(src: &str) -> (Parser, Lexer) {
        let options = CompilerOptions::new("t.tak", "t.out");
        let mut parser = Parser::new(&options);
        let mut lexer = Lexer::new("t.tak", src.as_bytes().to_vec());
        parser.parse_program(&mut lexer, "t.tak");
        (parser, lexer)
    }

    #[test]
    fn call_site_permutation_is_reparsed_into_its_own_proc_decl() {
        let (mut parser, mut lexer) = parse(
            r#"
            identity := proc<T>(value: T) -> T {
                ret value;
            }

            x : i32 = identity<i32>(5);
            "#,
        );
        assert!(!parser.diagnostics.failed(), "{:?}", parser.diagnostics.error_count());
        assert!(permute_generic_procedures(&mut parser, &mut lexer));

        let perm = parser.table.lookup_scoped_symbol("identity[I32]").expect("permutation registered");
        assert!(!perm.is_generic_permutation(), "the pending flag is cleared once reparsed");

        let found = parser
            .ast
            .toplevel
            .iter()
            .any(|&id| matches!(&parser.ast.get(id).data, AstNodeData::ProcDecl { name, .. } if name == "identity[I32]"));
        assert!(found, "expected a reparsed ProcDecl for the permutation");
    }

    #[test]
    fn no_pending_permutations_is_a_no_op() {
        let (mut parser, mut lexer) = parse("x : i32 = 5;");
        assert!(permute_generic_procedures(&mut parser, &mut lexer));
    }
}

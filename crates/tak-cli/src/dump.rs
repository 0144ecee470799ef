//! `--dump-ast` / `--dump-symbols` / `--dump-types`: pretty-print the
//! typed tree this crate actually produces, since there is no back end
//! to hand it to. No custom pretty-printer exists elsewhere in this
//! workspace, so these reuse each type's derived `Debug` the same way
//! the checker's own unit tests assert on `{:?}` rather than a bespoke
//! formatter.

use tak_parser::{NodeId, Parser};

pub fn dump_ast(parser: &Parser) {
    eprintln!("=== AST ({} top-level declarations) ===", parser.ast.toplevel.len());
    for &id in &parser.ast.toplevel {
        dump_node(parser, id, 0);
    }
}

fn dump_node(parser: &Parser, id: NodeId, depth: usize) {
    let node = parser.ast.get(id);
    eprintln!("{}{:?}", "  ".repeat(depth), node.data);
}

pub fn dump_symbols(parser: &Parser) {
    let mut symbols = parser.table.all_symbols();
    symbols.sort_by_key(|s| s.symbol_index);
    eprintln!("=== Symbols ({}) ===", symbols.len());
    for symbol in symbols {
        eprintln!("{symbol:#?}");
    }
}

pub fn dump_types(parser: &Parser) {
    let mut types = parser.table.all_types();
    types.sort_by(|a, b| a.0.cmp(b.0));
    eprintln!("=== Types ({}) ===", types.len());
    for (name, user_type) in types {
        eprintln!("{name}: {user_type:#?}");
    }
}

//! Semantic checking: walks a fully parsed and post-parsed program,
//! resolving every expression's type and validating the contracts that
//! parsing alone can't (coercions, operator eligibility, loop context,
//! return-type agreement, struct initialization).
//!
//! Entry point is [`check_program`]. Grounded in `checker.hpp`'s
//! `Checker` class and `src/checker/get.cpp`; see `visit` and `coerce`
//! for the per-function grounding notes.

mod coerce;
mod literal;
mod visit;

pub use coerce::{
    addressed_type, are_array_types_equivalent, dereferenced_type, is_assignable, is_null_pointer_type, is_type_arithmetic_eligible,
    is_type_bwop_eligible, is_type_cast_permissible, is_type_coercion_permissible, is_type_invalid_in_inferred_context,
    is_type_lop_eligible, promote_binary_operands, types_are_identical,
};
pub use literal::singleton_literal_type;

use tak_entity::TypeData;
use tak_parser::{AstNode, AstNodeData, Parser};

/// Per-traversal state threaded through every `visit_*` call: the parser
/// being checked, how many enclosing loops we're nested in (for
/// `break`/`continue`), and the declared return type of the enclosing
/// procedure (`None` outside any procedure, `Some(None)` inside a
/// procedure with no declared return type).
pub struct CheckerContext<'p> {
    pub parser: &'p mut Parser,
    loop_depth: u32,
    return_type: Option<Option<TypeData>>,
}

impl<'p> CheckerContext<'p> {
    fn new(parser: &'p mut Parser) -> Self {
        Self { parser, loop_depth: 0, return_type: None }
    }

    fn raise(&mut self, node: &AstNode, message: impl Into<String>) {
        self.parser.diagnostics.raise_error(&node.file, node.pos, node.line, message);
    }

    fn raise_warning(&mut self, node: &AstNode, message: impl Into<String>) {
        self.parser.diagnostics.raise_warning(&node.file, node.pos, node.line, message);
    }
}

/// A top-level generic base (a `ProcDecl`/`StructDef` still carrying its
/// own generic parameter names) is parsed and sits in `ast.toplevel`
/// alongside its concrete permutations, but its body refers to its
/// generic parameters as though they were ordinary struct names bound
/// only for the duration of parsing. There's nothing left to check on
/// it; only its permutations (pushed separately, with
/// `generic_type_names` empty) carry real types. Struct/enum
/// definitions never need expression-level checking at all: the fields
/// they declare are already fully resolved `TypeData` by the time
/// parsing finishes.
fn skip_at_toplevel(data: &AstNodeData) -> bool {
    match data {
        AstNodeData::StructDef { .. } | AstNodeData::EnumDef { .. } => true,
        AstNodeData::ProcDecl { generic_type_names, .. } => !generic_type_names.is_empty(),
        _ => false,
    }
}

/// Checks every top-level declaration of `parser`'s AST. Returns `true`
/// if no error was raised. Stops early once the diagnostic sink's error
/// ceiling is reached, same as the lexer and parser.
pub fn check_program(parser: &mut Parser) -> bool {
    let toplevel = parser.ast.toplevel.clone();
    tracing::debug!(declarations = toplevel.len(), "checking program");
    let mut ctx = CheckerContext::new(parser);
    for id in toplevel {
        if ctx.parser.diagnostics.ceiling_reached() {
            break;
        }
        if skip_at_toplevel(&ctx.parser.ast.get(id).data) {
            continue;
        }
        visit::visit_node(&mut ctx, id);
    }
    !ctx.parser.diagnostics.failed()
}

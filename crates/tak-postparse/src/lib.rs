//! The post-parse pass: runs once every file has been parsed, after
//! which no further placeholders or generic instantiations can be
//! introduced.
//!
//! Grounded in `tak::postparse_verify` (`src/postparser/other.cpp`): a
//! short-circuiting `&&` chain of four stages, each of which can only
//! make later stages' job smaller (resolving a placeholder never
//! creates new ones; reparsing a generic procedure's body may reference
//! more generic instantiations, which is why that stage loops to a
//! fixpoint rather than running once).

mod garbage;
mod generic_procedures;
mod generic_structures;
mod placeholders;

use tak_lexer::Lexer;
use tak_parser::Parser;

/// Runs the full post-parse pipeline against `parser`'s entity table and
/// AST. `lexer` is reused (and repeatedly reset) to reparse generic
/// procedure bodies; its contents on return are unspecified.
///
/// Returns `false` once any stage has raised an error on `parser`'s
/// diagnostic sink; the caller should not proceed to semantic checking
/// in that case, matching `tak::postparse_verify`'s short-circuiting
/// chain.
pub fn postparse_verify(parser: &mut Parser, lexer: &mut Lexer) -> bool {
    let _span = tracing::debug_span!("postparse_verify").entered();
    placeholders::check_leftover_placeholders(parser)
        && generic_procedures::permute_generic_procedures(parser, lexer)
        && generic_structures::permute_generic_structures(parser)
        && garbage::delete_garbage_objects(parser)
}

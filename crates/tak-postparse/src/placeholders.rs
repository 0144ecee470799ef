//! Leftover-placeholder sweep: every symbol or type still flagged
//! `PLACEHOLDER` once all files are parsed was forward-referenced but
//! never actually declared.
//!
//! Grounded in `tak::postparse_check_leftover_placeholders`
//! (`src/postparser/other.cpp`), which walks both tables and raises one
//! error per unresolved entry naming its first point of use.

use tak_parser::Parser;

pub(crate) fn check_leftover_placeholders(parser: &mut Parser) -> bool {
    let unresolved_symbols: Vec<_> = parser
        .table
        .placeholder_symbols()
        .into_iter()
        .map(|sym| (sym.canonical_name(), sym.file.clone(), sym.src_pos, sym.line_number))
        .collect();
    for (name, file, pos, line) in unresolved_symbols {
        parser.diagnostics.raise_error(&file, pos, line, format!("Failed to resolve symbol \"{name}\", first usage is here."));
    }

    let unresolved_types: Vec<_> = parser
        .table
        .placeholder_types()
        .into_iter()
        .map(|(name, ty)| (name.clone(), ty.file_first_used.clone(), ty.pos_first_used, ty.line_first_used))
        .collect();
    for (name, file, pos, line) in unresolved_types {
        parser.diagnostics.raise_error(&file, pos, line, format!("Failed to resolve type \"{name}\", first usage is here."));
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
    fn unresolved_identifier_is_reported_once_postparse_runs() {
        let mut parser = parse("ret undeclared;");
        assert!(!parser.diagnostics.failed());
        assert!(!check_leftover_placeholders(&mut parser));
        assert!(parser.diagnostics.failed());
    }

    #[test]
    fn fully_declared_program_has_no_leftover_placeholders() {
        let mut parser = parse("x : i32 = 5;");
        assert!(check_leftover_placeholders(&mut parser));
    }

    #[test]
    fn pointer_to_an_undeclared_struct_is_reported_as_an_unresolved_type() {
        let mut parser = parse("describe := proc(p: ^Widget) -> void { }");
        assert!(!check_leftover_placeholders(&mut parser));
        assert!(parser.diagnostics.failed());
    }
}

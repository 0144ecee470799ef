use std::io::Write;

use tak_common::DiagnosticSink;
use tak_lexer::{Lexer, TokenType};

fn lex_all(src: &str) -> Vec<TokenType> {
    let mut lexer = Lexer::new("t.tak", src.as_bytes().to_vec());
    let mut types = Vec::new();
    loop {
        let tok = lexer.current().clone();
        if tok.ty == TokenType::Eof {
            types.push(tok.ty);
            break;
        }
        types.push(tok.ty);
        lexer.advance(1);
    }
    types
}

#[test]
fn skips_bom_and_whitespace() {
    let mut src = vec![0xEF, 0xBB, 0xBF];
    src.extend_from_slice(b"  x");
    let mut lexer = Lexer::new("t.tak", src);
    let tok = lexer.current();
    assert_eq!(tok.ty, TokenType::Identifier);
    assert_eq!(&*tok.value, "x");
    assert_eq!(tok.src_pos, 5);
}

#[test]
fn recognizes_keywords_and_identifiers() {
    let types = lex_all("ret x proc namespace compose");
    assert_eq!(
        types,
        vec![
            TokenType::KwRet,
            TokenType::Identifier,
            TokenType::KwProc,
            TokenType::KwNamespace,
            TokenType::KwCompose,
            TokenType::Eof,
        ]
    );
}

#[test]
fn recognizes_boolean_and_type_keywords() {
    let types = lex_all("true false i32 bool");
    assert_eq!(
        types,
        vec![
            TokenType::BooleanLiteral,
            TokenType::BooleanLiteral,
            TokenType::KwI32,
            TokenType::KwBool,
            TokenType::Eof,
        ]
    );
}

#[test]
fn numeric_literals() {
    let types = lex_all("123 0xFF 1.5 1.5e10 1.5e-3");
    assert_eq!(
        types,
        vec![
            TokenType::IntegerLiteral,
            TokenType::HexLiteral,
            TokenType::FloatLiteral,
            TokenType::FloatLiteral,
            TokenType::FloatLiteral,
            TokenType::Eof,
        ]
    );
}

#[test]
fn malformed_float_is_illegal() {
    let types = lex_all("1.2.3");
    assert_eq!(types[0], TokenType::Illegal);
}

#[test]
fn operators_include_compound_assignment_and_shifts() {
    let types = lex_all("a += 1; b <<= 2; c == d; e != f; g || h;");
    assert!(types.contains(&TokenType::PlusEq));
    assert!(types.contains(&TokenType::LshiftEq));
    assert!(types.contains(&TokenType::Equals));
    assert!(types.contains(&TokenType::NotEquals));
    assert!(types.contains(&TokenType::LogicalOr));
}

#[test]
fn distinguishes_minus_arrow_and_minus_eq() {
    let types = lex_all("a - b; f := proc() -> i32 { ret 0; } c -= 1;");
    assert!(types.contains(&TokenType::Minus));
    assert!(types.contains(&TokenType::Arrow));
    assert!(types.contains(&TokenType::MinusEq));
}

#[test]
fn string_literal_with_escaped_quote() {
    let types = lex_all(r#" "a\"b" "#);
    assert_eq!(types[0], TokenType::StringLiteral);
}

#[test]
fn unterminated_string_is_illegal() {
    let types = lex_all("\"abc");
    assert_eq!(types[0], TokenType::Illegal);
}

#[test]
fn embedded_nul_terminates_an_identifier_run() {
    let mut lexer = Lexer::new("t.tak", b"ab\0cd".to_vec());
    let tok = lexer.current().clone();
    assert_eq!(tok.ty, TokenType::Identifier);
    assert_eq!(&*tok.value, "ab");
}

#[test]
fn standalone_nul_byte_is_illegal_not_a_premature_eof() {
    let mut lexer = Lexer::new("t.tak", b"\0x".to_vec());
    let tok = lexer.current().clone();
    assert_eq!(tok.ty, TokenType::Illegal);
    lexer.advance(1);
    assert_eq!(lexer.current().ty, TokenType::Identifier);
}

#[test]
fn raw_string_only_unescapes_backtick() {
    let mut lexer = Lexer::new("t.tak", "`a\\nb`".as_bytes().to_vec());
    let tok = lexer.current();
    assert_eq!(tok.ty, TokenType::RawStringLiteral);
    assert_eq!(&*tok.value, "`a\\nb`");
}

#[test]
fn peek_does_not_consume() {
    let mut lexer = Lexer::new("t.tak", "a b c".as_bytes().to_vec());
    let first = lexer.current().clone();
    let peeked = lexer.peek(1);
    assert_eq!(&*peeked.value, "b");
    assert_eq!(&*lexer.current().value, &*first.value);
}

#[test]
fn namespace_separator_and_colon_forms() {
    let types = lex_all(r"A\B x : i32 y :: 5");
    assert!(types.contains(&TokenType::Backslash));
    assert!(types.contains(&TokenType::Colon));
    assert!(types.contains(&TokenType::ColonColon));
}

#[test]
fn from_path_reads_file_contents() {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    file.write_all(b"x := 1;").expect("write temp file");

    let mut lexer = Lexer::from_path(file.path()).expect("lex temp file");
    assert_eq!(&*lexer.current().value, "x");
}

#[test]
fn report_illegal_uses_token_position() {
    let mut lexer = Lexer::new("t.tak", "\"abc".as_bytes().to_vec());
    let tok = lexer.current().clone();
    let mut sink = DiagnosticSink::new(35, false);
    lexer.report_illegal(&mut sink, &tok);
    assert_eq!(sink.error_count(), 1);
}

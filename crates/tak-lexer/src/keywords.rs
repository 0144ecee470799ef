//! Keyword and type-keyword lookup tables.
//!
//! Grounded in `tak::lexer_infer_ambiguous_token`
//! (`src/lexer/ambiguous_token.cpp`), restricted to the language's actual
//! keyword surface. The original's `keywords` map omits `compose` (an
//! in-progress-refactor gap) and puts `proc` in its `type_identifiers`
//! map; here `compose` and `proc` are both ordinary keywords, matching
//! the language surface as specified.

use crate::token::TokenType;

/// Look up a scanned identifier-shaped slice against the keyword table.
#[must_use]
pub fn lookup_keyword(text: &str) -> Option<TokenType> {
    Some(match text {
        "ret" => TokenType::KwRet,
        "brk" => TokenType::KwBrk,
        "cont" => TokenType::KwCont,
        "for" => TokenType::KwFor,
        "while" => TokenType::KwWhile,
        "do" => TokenType::KwDo,
        "if" => TokenType::KwIf,
        "elif" => TokenType::KwElif,
        "else" => TokenType::KwElse,
        "struct" => TokenType::KwStruct,
        "enum" => TokenType::KwEnum,
        "switch" => TokenType::KwSwitch,
        "case" => TokenType::KwCase,
        "default" => TokenType::KwDefault,
        "blk" => TokenType::KwBlk,
        "cast" => TokenType::KwCast,
        "defer" => TokenType::KwDefer,
        "defer_if" => TokenType::KwDeferIf,
        "sizeof" => TokenType::KwSizeof,
        "nullptr" => TokenType::KwNullptr,
        "fallthrough" => TokenType::KwFallthrough,
        "namespace" => TokenType::KwNamespace,
        "compose" => TokenType::KwCompose,
        "proc" => TokenType::KwProc,
        _ => return None,
    })
}

/// Look up a scanned identifier-shaped slice against the type-keyword
/// table.
#[must_use]
pub fn lookup_type_keyword(text: &str) -> Option<TokenType> {
    Some(match text {
        "u8" => TokenType::KwU8,
        "i8" => TokenType::KwI8,
        "u16" => TokenType::KwU16,
        "i16" => TokenType::KwI16,
        "u32" => TokenType::KwU32,
        "i32" => TokenType::KwI32,
        "u64" => TokenType::KwU64,
        "i64" => TokenType::KwI64,
        "f32" => TokenType::KwF32,
        "f64" => TokenType::KwF64,
        "bool" => TokenType::KwBool,
        "void" => TokenType::KwVoid,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_table_covers_full_surface() {
        for kw in [
            "ret", "brk", "cont", "for", "while", "do", "if", "elif", "else", "struct", "enum",
            "switch", "case", "default", "blk", "cast", "defer", "defer_if", "sizeof", "nullptr",
            "fallthrough", "namespace", "compose", "proc",
        ] {
            assert!(lookup_keyword(kw).is_some(), "missing keyword {kw}");
        }
    }

    #[test]
    fn type_keyword_table_covers_full_surface() {
        for kw in [
            "u8", "i8", "u16", "i16", "u32", "i32", "u64", "i64", "f32", "f64", "bool", "void",
        ] {
            assert!(lookup_type_keyword(kw).is_some(), "missing type keyword {kw}");
        }
    }

    #[test]
    fn unknown_identifier_is_neither() {
        assert_eq!(lookup_keyword("foo"), None);
        assert_eq!(lookup_type_keyword("foo"), None);
    }
}

//! Token model.
//!
//! Grounded in the original `tak::Token` (`include/lexer.hpp`,
//! `src/support/token_util.cpp`): a coarse `kind` used by the parser to pick
//! a dispatch bucket, a fine-grained `TokenType` tag, the raw source text,
//! and a position. Unlike the original's `std::string_view` into a
//! `std::vector<char>`, `value` is an owned `Box<str>` so a `Token` carries
//! no borrow of the lexer's buffer; tokens are small and short-lived enough
//! that the copy is immaterial.

/// Coarse token classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Keyword,
    Literal,
    Identifier,
    TypeKeyword,
    Operator,
    Punctuation,
    Unspecific,
    Eof,
    Illegal,
}

/// Fine-grained token tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenType {
    // Keywords
    KwRet,
    KwBrk,
    KwCont,
    KwFor,
    KwWhile,
    KwDo,
    KwIf,
    KwElif,
    KwElse,
    KwStruct,
    KwEnum,
    KwSwitch,
    KwCase,
    KwDefault,
    KwBlk,
    KwCast,
    KwDefer,
    KwDeferIf,
    KwSizeof,
    KwNullptr,
    KwFallthrough,
    KwNamespace,
    KwCompose,
    KwProc,

    // Type keywords
    KwU8,
    KwI8,
    KwU16,
    KwI16,
    KwU32,
    KwI32,
    KwU64,
    KwI64,
    KwF32,
    KwF64,
    KwBool,
    KwVoid,

    // Literals
    IntegerLiteral,
    HexLiteral,
    FloatLiteral,
    StringLiteral,
    RawStringLiteral,
    CharacterLiteral,
    BooleanLiteral,

    Identifier,

    // Operators: assignment (level 0, right-assoc)
    ValueAssignment,
    PlusEq,
    MinusEq,
    AsteriskEq,
    FwdslashEq,
    PercentEq,
    LshiftEq,
    RshiftEq,
    AmpersandEq,
    PipeEq,
    CaretEq,

    // Operators: levels 1-9
    LogicalOr,
    Pipe,
    Caret,
    Ampersand,
    Equals,
    NotEquals,
    Lessthan,
    LessthanEq,
    Greaterthan,
    GreaterthanEq,
    Lshift,
    Rshift,
    Plus,
    Minus,
    Asterisk,
    Fwdslash,
    Percent,

    // Unary-only operators
    Exclamation,
    Tilde,

    // Punctuation
    Lparen,
    Rparen,
    Lbrace,
    Rbrace,
    Lsquarebracket,
    Rsquarebracket,
    Comma,
    Semicolon,
    Dot,
    Colon,
    ColonColon,
    Arrow,
    Backslash,
    At,

    Eof,
    Illegal,
}

impl TokenType {
    /// The coarse `TokenKind` this tag belongs to.
    #[must_use]
    pub fn kind(self) -> TokenKind {
        use TokenType::*;
        match self {
            KwRet | KwBrk | KwCont | KwFor | KwWhile | KwDo | KwIf | KwElif | KwElse | KwStruct
            | KwEnum | KwSwitch | KwCase | KwDefault | KwBlk | KwCast | KwDefer | KwDeferIf
            | KwSizeof | KwNullptr | KwFallthrough | KwNamespace | KwCompose | KwProc => {
                TokenKind::Keyword
            }
            KwU8 | KwI8 | KwU16 | KwI16 | KwU32 | KwI32 | KwU64 | KwI64 | KwF32 | KwF64 | KwBool
            | KwVoid => TokenKind::TypeKeyword,
            IntegerLiteral | HexLiteral | FloatLiteral | StringLiteral | RawStringLiteral
            | CharacterLiteral | BooleanLiteral => TokenKind::Literal,
            Identifier => TokenKind::Identifier,
            ValueAssignment | PlusEq | MinusEq | AsteriskEq | FwdslashEq | PercentEq
            | LshiftEq | RshiftEq | AmpersandEq | PipeEq | CaretEq | LogicalOr | Pipe | Caret
            | Ampersand | Equals | NotEquals | Lessthan | LessthanEq | Greaterthan
            | GreaterthanEq | Lshift | Rshift | Plus | Minus | Asterisk | Fwdslash | Percent
            | Exclamation | Tilde => TokenKind::Operator,
            Lparen | Rparen | Lbrace | Rbrace | Lsquarebracket | Rsquarebracket | Comma
            | Semicolon | Dot | Colon | ColonColon | Arrow | Backslash | At => {
                TokenKind::Punctuation
            }
            Eof => TokenKind::Eof,
            Illegal => TokenKind::Illegal,
        }
    }

    /// Binary-operator precedence, ascending. `None` for token types that
    /// are never a binary operator.
    #[must_use]
    pub fn binary_precedence(self) -> Option<u8> {
        use TokenType::*;
        Some(match self {
            ValueAssignment | PlusEq | MinusEq | AsteriskEq | FwdslashEq | PercentEq
            | LshiftEq | RshiftEq | AmpersandEq | PipeEq | CaretEq => 0,
            LogicalOr => 1,
            Pipe => 2,
            Caret => 3,
            Ampersand => 4,
            Equals | NotEquals => 5,
            Lessthan | LessthanEq | Greaterthan | GreaterthanEq => 6,
            Lshift | Rshift => 7,
            Plus | Minus => 8,
            Asterisk | Fwdslash | Percent => 9,
            _ => return None,
        })
    }

    /// Whether this token type may begin a unary prefix expression
    /// (`- + ~ ! & *`).
    #[must_use]
    pub fn is_unary_prefix(self) -> bool {
        matches!(
            self,
            TokenType::Minus
                | TokenType::Plus
                | TokenType::Tilde
                | TokenType::Exclamation
                | TokenType::Ampersand
                | TokenType::Asterisk
        )
    }

    /// Whether an assignment-class operator (level 0) is right-associative.
    /// All of them are; kept as a named predicate for callers climbing
    /// precedence so the right-assoc special case reads as intent, not a
    /// magic `== 0`.
    #[must_use]
    pub fn is_right_assoc(self) -> bool {
        self.binary_precedence() == Some(0)
    }
}

/// A single lexed token. `value` is empty for punctuation/operator tokens
/// whose text is implied by `ty`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub ty: TokenType,
    pub value: Box<str>,
    pub src_pos: u32,
    pub line: u32,
}

impl Token {
    #[must_use]
    pub fn new(ty: TokenType, value: impl Into<Box<str>>, src_pos: u32, line: u32) -> Self {
        Self { kind: ty.kind(), ty, value: value.into(), src_pos, line }
    }

    #[must_use]
    pub fn is(&self, ty: TokenType) -> bool {
        self.ty == ty
    }

    #[must_use]
    pub fn eof(src_pos: u32, line: u32) -> Self {
        Self::new(TokenType::Eof, "", src_pos, line)
    }

    #[must_use]
    pub fn illegal(value: impl Into<Box<str>>, src_pos: u32, line: u32) -> Self {
        Self::new(TokenType::Illegal, value, src_pos, line)
    }
}

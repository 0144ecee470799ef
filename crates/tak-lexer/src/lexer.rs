//! The lexer.
//!
//! Grounded in `tak::Lexer` (`include/lexer.hpp`, `src/lexer/lex.cpp`,
//! `src/lexer/iterate.cpp`, `src/lexer/init.cpp`,
//! `src/lexer/ambiguous_token.cpp`) for the buffer/cursor/line/slot shape,
//! the dispatch-by-first-byte loop, the UTF-8 continuation-count skip, and
//! the numeric-literal scanning rules. The handler bodies for the quoted
//! literals (`"…"`, `` `…` ``, `'…'`) are not present in that source (only
//! their declarations survive in `include/lexer.hpp`); they are written
//! here directly from the literal grammar and the escape table in
//! `src/lexer/util.cpp` (reused via [`crate::strings`]).
//!
//! Where the original prints lexical errors directly to the terminal
//! (`Lexer::raise_error`, `src/lexer/errors.cpp`), this lexer has no
//! terminal dependency: unterminated literals and malformed UTF-8 are
//! returned as a [`TokenType::Illegal`] token whose `value` is the
//! diagnostic message, and [`Lexer::report`] lets a caller holding a
//! `DiagnosticSink` turn that (or any other message) into a recorded
//! diagnostic using the token's own position.

use tak_common::{Diagnostic, DiagnosticCategory, DiagnosticSink};

use crate::keywords::{lookup_keyword, lookup_type_keyword};
use crate::token::{Token, TokenType};

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Tokenizes one source file's byte buffer with one token of lookahead.
///
/// Mirrors `tak::Lexer`'s fields: the byte buffer, a byte cursor, a
/// 1-based line counter, and a single-slot current-token buffer. The slot
/// starts empty (the original's `TOKEN_NONE` sentinel); [`Lexer::current`]
/// lazily advances once to fill it.
#[derive(Debug)]
pub struct Lexer {
    file: String,
    src: Vec<u8>,
    src_index: usize,
    curr_line: u32,
    current: Option<Token>,
}

impl Lexer {
    /// Build a lexer over `src`, skipping a leading UTF-8 BOM if present.
    #[must_use]
    pub fn new(file: impl Into<String>, src: Vec<u8>) -> Self {
        let src_index = if src.starts_with(&UTF8_BOM) { 3 } else { 0 };
        Self { file: file.into(), src, src_index, curr_line: 1, current: None }
    }

    #[must_use]
    pub fn file(&self) -> &str {
        &self.file
    }

    #[must_use]
    pub fn source(&self) -> &[u8] {
        &self.src
    }

    /// Read `path` into a buffer and build a lexer over it. Mirrors
    /// `tak::Lexer::init(const std::string&)` (`src/lexer/init.cpp`),
    /// which reads the whole file up front rather than streaming it.
    pub fn from_path(path: impl AsRef<std::path::Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let src = std::fs::read(path)?;
        Ok(Self::new(path.to_string_lossy().into_owned(), src))
    }

    /// Re-seek this lexer onto a (possibly different) file's buffer at a
    /// specific byte offset and line, invalidating the current slot.
    /// Backs both the parser's include-file switch (offset 0, line 1) and
    /// the post-parser's re-seek to a stored generic-base position for a
    /// coroutine-free reparse.
    pub fn reset(&mut self, file: impl Into<String>, src: Vec<u8>, byte_offset: u32, line: u32) {
        self.file = file.into();
        self.src = src;
        self.src_index = byte_offset as usize;
        self.curr_line = line;
        self.current = None;
    }

    /// Return the token in the current slot, advancing once if it is
    /// empty.
    pub fn current(&mut self) -> &Token {
        if self.current.is_none() {
            self.advance(1);
        }
        self.current.as_ref().expect("just filled")
    }

    /// Advance `amnt` tokens, saving and restoring the cursor, line, and
    /// slot around it, then return the token `amnt` positions ahead
    /// without consuming it.
    pub fn peek(&mut self, amnt: u32) -> Token {
        if self.current.is_none() {
            self.advance(1);
        }

        let saved_line = self.curr_line;
        let saved_index = self.src_index;
        let saved_current = self.current.clone();

        self.advance(amnt);
        let peeked = self.current.clone().expect("just filled");

        self.curr_line = saved_line;
        self.src_index = saved_index;
        self.current = saved_current;

        peeked
    }

    /// Advance the current slot forward by `amnt` tokens.
    pub fn advance(&mut self, amnt: u32) {
        for _ in 0..amnt {
            let tok = loop {
                if let Some(tok) = self.step() {
                    break tok;
                }
            };
            self.current = Some(tok);
        }
    }

    /// Record `message` against the current token's position.
    pub fn report(&self, sink: &mut DiagnosticSink, message: impl Into<String>) -> bool {
        let tok = self.current.as_ref();
        let (pos, line) = tok.map_or((self.src_index as u32, self.curr_line), |t| (t.src_pos, t.line));
        sink.raise_error(&self.file, pos, line, message)
    }

    /// Render a token flagged [`TokenType::Illegal`] by the scanner (its
    /// `value` carries the diagnostic message) into the sink.
    pub fn report_illegal(&self, sink: &mut DiagnosticSink, tok: &Token) -> bool {
        debug_assert!(tok.ty == TokenType::Illegal);
        sink.raise_error(&self.file, tok.src_pos, tok.line, tok.value.as_ref())
    }

    fn current_byte(&self) -> Option<u8> {
        self.src.get(self.src_index).copied()
    }

    fn peek_byte(&self) -> Option<u8> {
        self.src.get(self.src_index + 1).copied()
    }

    fn advance_char(&mut self, amnt: usize) {
        self.src_index = (self.src_index + amnt).min(self.src.len());
    }

    fn is_current_utf8_begin(&self) -> bool {
        self.current_byte().is_some_and(|b| b >= 0x80)
    }

    /// Skip one multi-byte UTF-8 sequence starting at the cursor. Returns
    /// `false` on a malformed leading byte (caller reports a fatal UTF-8
    /// error and produces an illegal token rather than the original's
    /// `exit(1)`; reporting here never throws or aborts the process).
    fn skip_utf8_sequence(&mut self) -> bool {
        let Some(c) = self.current_byte() else { return false };
        let len = if c & 0xE0 == 0xC0 {
            2
        } else if c & 0xF0 == 0xE0 {
            3
        } else if c & 0xF8 == 0xF0 {
            4
        } else {
            return false;
        };
        self.advance_char(len);
        true
    }

    /// Produce the next token, or `None` if the cursor sat on whitespace
    /// and the caller should loop again (mirrors the original's
    /// `TOKEN_NONE` sentinel loop in `Lexer::advance`).
    fn step(&mut self) -> Option<Token> {
        let start = self.src_index as u32;
        let line = self.curr_line;

        let Some(b) = self.current_byte() else {
            return Some(Token::eof(self.src.len() as u32, self.curr_line));
        };

        match b {
            b' ' | b'\r' | 0x08 | b'\t' => {
                self.advance_char(1);
                None
            }
            b'\n' => {
                self.advance_char(1);
                self.curr_line += 1;
                None
            }
            b';' => self.single(TokenType::Semicolon, start, line),
            b'(' => self.single(TokenType::Lparen, start, line),
            b')' => self.single(TokenType::Rparen, start, line),
            b'{' => self.single(TokenType::Lbrace, start, line),
            b'}' => self.single(TokenType::Rbrace, start, line),
            b'[' => self.single(TokenType::Lsquarebracket, start, line),
            b']' => self.single(TokenType::Rsquarebracket, start, line),
            b',' => self.single(TokenType::Comma, start, line),
            b'.' => self.single(TokenType::Dot, start, line),
            b'\\' => self.single(TokenType::Backslash, start, line),
            b'@' => self.single(TokenType::At, start, line),
            b'~' => self.single(TokenType::Tilde, start, line),
            b'+' => Some(self.one_or_two(start, line, b'=', TokenType::Plus, TokenType::PlusEq)),
            b'*' => Some(self.one_or_two(start, line, b'=', TokenType::Asterisk, TokenType::AsteriskEq)),
            b'/' => Some(self.one_or_two(start, line, b'=', TokenType::Fwdslash, TokenType::FwdslashEq)),
            b'%' => Some(self.one_or_two(start, line, b'=', TokenType::Percent, TokenType::PercentEq)),
            b'=' => Some(self.one_or_two(start, line, b'=', TokenType::ValueAssignment, TokenType::Equals)),
            b'!' => Some(self.one_or_two(start, line, b'=', TokenType::Exclamation, TokenType::NotEquals)),
            b'^' => Some(self.one_or_two(start, line, b'=', TokenType::Caret, TokenType::CaretEq)),
            b'-' => Some(self.minus(start, line)),
            b':' => Some(self.one_or_two(start, line, b':', TokenType::Colon, TokenType::ColonColon)),
            b'&' => Some(self.one_or_two(start, line, b'=', TokenType::Ampersand, TokenType::AmpersandEq)),
            b'|' => Some(self.pipe(start, line)),
            b'<' => Some(self.shift_or_compare(start, line, b'<', TokenType::Lessthan, TokenType::LessthanEq, TokenType::Lshift, TokenType::LshiftEq)),
            b'>' => Some(self.shift_or_compare(start, line, b'>', TokenType::Greaterthan, TokenType::GreaterthanEq, TokenType::Rshift, TokenType::RshiftEq)),
            b'"' => Some(self.scan_quoted(start, line, b'"', TokenType::StringLiteral)),
            b'`' => Some(self.scan_quoted(start, line, b'`', TokenType::RawStringLiteral)),
            b'\'' => Some(self.scan_char_literal(start, line)),
            _ => Some(self.scan_ambiguous(start, line)),
        }
    }

    fn single(&mut self, ty: TokenType, start: u32, line: u32) -> Option<Token> {
        self.advance_char(1);
        Some(Token::new(ty, text_of(ty), start, line))
    }

    fn one_or_two(&mut self, start: u32, line: u32, second: u8, one: TokenType, two: TokenType) -> Token {
        if self.peek_byte() == Some(second) {
            self.advance_char(2);
            Token::new(two, text_of(two), start, line)
        } else {
            self.advance_char(1);
            Token::new(one, text_of(one), start, line)
        }
    }

    fn minus(&mut self, start: u32, line: u32) -> Token {
        match self.peek_byte() {
            Some(b'=') => {
                self.advance_char(2);
                Token::new(TokenType::MinusEq, "-=", start, line)
            }
            Some(b'>') => {
                self.advance_char(2);
                Token::new(TokenType::Arrow, "->", start, line)
            }
            _ => {
                self.advance_char(1);
                Token::new(TokenType::Minus, "-", start, line)
            }
        }
    }

    fn pipe(&mut self, start: u32, line: u32) -> Token {
        match self.peek_byte() {
            Some(b'=') => {
                self.advance_char(2);
                Token::new(TokenType::PipeEq, "|=", start, line)
            }
            Some(b'|') => {
                self.advance_char(2);
                Token::new(TokenType::LogicalOr, "||", start, line)
            }
            _ => {
                self.advance_char(1);
                Token::new(TokenType::Pipe, "|", start, line)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn shift_or_compare(
        &mut self,
        start: u32,
        line: u32,
        shift_byte: u8,
        cmp: TokenType,
        cmp_eq: TokenType,
        shift: TokenType,
        shift_eq: TokenType,
    ) -> Token {
        if self.peek_byte() == Some(b'=') {
            self.advance_char(2);
            return Token::new(cmp_eq, text_of(cmp_eq), start, line);
        }
        if self.peek_byte() == Some(shift_byte) {
            self.advance_char(2);
            if self.current_byte() == Some(b'=') {
                self.advance_char(1);
                return Token::new(shift_eq, text_of(shift_eq), start, line);
            }
            return Token::new(shift, text_of(shift), start, line);
        }
        self.advance_char(1);
        Token::new(cmp, text_of(cmp), start, line)
    }

    /// Scan `"…"` or `` `…` ``, tracking `\`-escapes so an escaped close
    /// quote doesn't terminate the literal early.
    fn scan_quoted(&mut self, start: u32, line: u32, quote: u8, ty: TokenType) -> Token {
        self.advance_char(1);
        loop {
            match self.current_byte() {
                None | Some(b'\n') => {
                    return Token::illegal("unterminated string literal", start, line);
                }
                Some(b'\\') => self.advance_char(2),
                Some(b) if b == quote => {
                    self.advance_char(1);
                    break;
                }
                _ => self.advance_char(1),
            }
        }
        let raw = self.slice(start as usize, self.src_index);
        Token::new(ty, raw, start, line)
    }

    fn scan_char_literal(&mut self, start: u32, line: u32) -> Token {
        self.advance_char(1);
        match self.current_byte() {
            Some(b'\\') => self.advance_char(2),
            Some(_) => self.advance_char(1),
            None => return Token::illegal("unterminated character literal", start, line),
        }
        if self.current_byte() != Some(b'\'') {
            return Token::illegal("unterminated character literal", start, line);
        }
        self.advance_char(1);
        let raw = self.slice(start as usize, self.src_index);
        Token::new(TokenType::CharacterLiteral, raw, start, line)
    }

    /// If the first byte is a digit, recognize a numeric literal; else
    /// scan a maximal identifier/keyword run, UTF-8 aware.
    fn scan_ambiguous(&mut self, start: u32, line: u32) -> Token {
        if self.current_byte().is_some_and(|b| b.is_ascii_digit()) {
            return self.scan_numeric(start, line);
        }

        loop {
            match self.current_byte() {
                None => break,
                // NUL always terminates a run, independent of the
                // illegal-start table.
                Some(0x00) => break,
                Some(b) if is_ident_illegal_start(b) => break,
                Some(_) if self.is_current_utf8_begin() => {
                    if !self.skip_utf8_sequence() {
                        return Token::illegal("malformed UTF-8 sequence", start, line);
                    }
                }
                Some(_) => self.advance_char(1),
            }
        }

        let raw = self.slice(start as usize, self.src_index);
        if raw.is_empty() {
            // A stray NUL outside any identifier run breaks the loop with
            // nothing consumed; treat it as illegal rather than reporting
            // a premature end of file.
            if self.current_byte() == Some(0x00) {
                self.advance_char(1);
                return Token::illegal("illegal NUL byte in source", start, line);
            }
            return Token::eof(self.src.len() as u32, self.curr_line);
        }

        if raw == "true" || raw == "false" {
            return Token::new(TokenType::BooleanLiteral, raw, start, line);
        }
        if let Some(kw) = lookup_keyword(raw) {
            return Token::new(kw, raw, start, line);
        }
        if let Some(kw) = lookup_type_keyword(raw) {
            return Token::new(kw, raw, start, line);
        }
        Token::new(TokenType::Identifier, raw, start, line)
    }

    /// `0x[0-9a-fA-F]+`, or `[0-9]+(\.[0-9]+([eE][+-]?[0-9]+)?)?`. A
    /// second `.`, an `e` before any `.`, or a second `e` is illegal.
    fn scan_numeric(&mut self, start: u32, line: u32) -> Token {
        if self.current_byte() == Some(b'0') && self.peek_byte() == Some(b'x') {
            return self.scan_hex(start, line);
        }

        let mut passed_dot = false;
        let mut within_exponent = false;

        loop {
            match self.current_byte() {
                None => break,
                Some(b'.') => {
                    if passed_dot || within_exponent {
                        let message = format!(
                            "malformed numeric literal '{}'",
                            self.slice(start as usize, self.src_index + 1)
                        );
                        self.advance_char(1);
                        return Token::illegal(message, start, line);
                    }
                    passed_dot = true;
                    self.advance_char(1);
                }
                Some(b'e' | b'E') => {
                    if !passed_dot || within_exponent {
                        break;
                    }
                    within_exponent = true;
                    self.advance_char(1);
                    if matches!(self.current_byte(), Some(b'+' | b'-')) {
                        self.advance_char(1);
                    }
                    if !self.current_byte().is_some_and(|b| b.is_ascii_digit()) {
                        let raw = self.slice(start as usize, self.src_index);
                        return Token::illegal(format!("malformed numeric literal '{raw}'"), start, line);
                    }
                }
                Some(b) if b.is_ascii_digit() => self.advance_char(1),
                Some(_) => break,
            }
        }

        let raw = self.slice(start as usize, self.src_index);
        let ty = if passed_dot { TokenType::FloatLiteral } else { TokenType::IntegerLiteral };
        Token::new(ty, raw, start, line)
    }

    fn scan_hex(&mut self, start: u32, line: u32) -> Token {
        self.advance_char(2);
        let digits_start = self.src_index;
        while self.current_byte().is_some_and(|b| b.is_ascii_hexdigit()) {
            self.advance_char(1);
        }
        if self.src_index == digits_start {
            let raw = self.slice(start as usize, self.src_index);
            return Token::illegal(format!("malformed hex literal '{raw}'"), start, line);
        }
        let raw = self.slice(start as usize, self.src_index);
        Token::new(TokenType::HexLiteral, raw, start, line)
    }

    fn slice(&self, start: usize, end: usize) -> &str {
        std::str::from_utf8(&self.src[start..end]).unwrap_or("")
    }
}

/// Bytes that can never continue an identifier/keyword/numeric run: every
/// dispatch-table byte plus whitespace. Anything else (including UTF-8
/// continuation/lead bytes) is fair game.
fn is_ident_illegal_start(b: u8) -> bool {
    matches!(
        b,
        b' ' | b'\r'
            | 0x08
            | b'\t'
            | b'\n'
            | b';'
            | b'('
            | b')'
            | b'{'
            | b'}'
            | b'['
            | b']'
            | b','
            | b'.'
            | b'\\'
            | b'@'
            | b'~'
            | b'+'
            | b'*'
            | b'/'
            | b'%'
            | b'='
            | b'!'
            | b'^'
            | b'-'
            | b':'
            | b'&'
            | b'|'
            | b'<'
            | b'>'
            | b'"'
            | b'`'
            | b'\''
    )
}

fn text_of(ty: TokenType) -> &'static str {
    use TokenType::*;
    match ty {
        Semicolon => ";",
        Lparen => "(",
        Rparen => ")",
        Lbrace => "{",
        Rbrace => "}",
        Lsquarebracket => "[",
        Rsquarebracket => "]",
        Comma => ",",
        Dot => ".",
        Backslash => "\\",
        At => "@",
        Tilde => "~",
        Plus => "+",
        PlusEq => "+=",
        Minus => "-",
        MinusEq => "-=",
        Arrow => "->",
        Asterisk => "*",
        AsteriskEq => "*=",
        Fwdslash => "/",
        FwdslashEq => "/=",
        Percent => "%",
        PercentEq => "%=",
        ValueAssignment => "=",
        Equals => "==",
        Exclamation => "!",
        NotEquals => "!=",
        Caret => "^",
        CaretEq => "^=",
        Colon => ":",
        ColonColon => "::",
        Ampersand => "&",
        AmpersandEq => "&=",
        Pipe => "|",
        PipeEq => "|=",
        LogicalOr => "||",
        Lessthan => "<",
        LessthanEq => "<=",
        Lshift => "<<",
        LshiftEq => "<<=",
        Greaterthan => ">",
        GreaterthanEq => ">=",
        Rshift => ">>",
        RshiftEq => ">>=",
        _ => "",
    }
}

/// Render a [`Diagnostic`] standalone, without going through a
/// [`DiagnosticSink`] — used by callers (e.g. the include-queue driver)
/// that need to report a fatal I/O error before any sink exists.
#[must_use]
pub fn standalone_diagnostic(file: &str, message: impl Into<String>) -> Diagnostic {
    Diagnostic { file: file.to_string(), src_pos: 0, line: 0, message: message.into(), category: DiagnosticCategory::Error }
}

//! The parser driver: entry points, operator precedence climbing, and
//! the top-level include-processing loop.
//!
//! Grounded in `tak::parse` / `tak::parse_keyword` (`src/parser/begin.cpp`):
//! `parse` dispatches on the current token to a primary-expression
//! handler, then loops on postfix operators (subscript, call, member
//! access, binary operator) before checking for a terminator.

use std::rc::Rc;

use tak_common::{CompilerOptions, DiagnosticSink};
use tak_entity::EntityTable;
use tak_lexer::{Lexer, TokenType};

use crate::ast::{Ast, AstNodeData, NodeId};
use crate::include::IncludeQueue;

/// Owns the AST arena, the entity table, the include queue, and the
/// diagnostic sink for one compilation.
pub struct Parser {
    pub ast: Ast,
    pub table: EntityTable,
    pub diagnostics: DiagnosticSink,
    pub include_queue: IncludeQueue,
    pub(crate) current_file: Rc<str>,
    pub(crate) inside_parenthesized_expression: u32,
}

impl Parser {
    #[must_use]
    pub fn new(options: &CompilerOptions) -> Self {
        Self {
            ast: Ast::new(),
            table: EntityTable::new(),
            diagnostics: DiagnosticSink::new(options.max_error_count, options.warn_is_error()),
            include_queue: IncludeQueue::new(),
            current_file: Rc::from(options.input_file.as_str()),
            inside_parenthesized_expression: 0,
        }
    }

    /// Parses `lexer`'s entire token stream as a sequence of top-level
    /// declarations, then drains the include queue, re-initializing the
    /// lexer for each pending file in queue order: across files, includes
    /// are processed in the order they were queued.
    pub fn parse_program(&mut self, lexer: &mut Lexer, root_file: impl Into<String>) {
        let root_file = root_file.into();
        tracing::debug!(file = %root_file, "parsing root file");
        self.current_file = Rc::from(root_file.as_str());
        self.parse_toplevel_into_current_file(lexer);

        while let Some(path) = self.include_queue.next_pending() {
            let Ok(src) = std::fs::read(&path) else {
                self.diagnostics.raise_error(&path, 0, 0, format!("failed to read included file '{path}'"));
                self.include_queue.mark_done(&path);
                continue;
            };
            tracing::debug!(file = %path, "parsing included file");
            lexer.reset(path.clone(), src, 0, 1);
            self.current_file = Rc::from(path.as_str());
            self.parse_toplevel_into_current_file(lexer);
            self.include_queue.mark_done(&path);
        }
    }

    fn parse_toplevel_into_current_file(&mut self, lexer: &mut Lexer) {
        loop {
            if lexer.current().ty == TokenType::Eof {
                break;
            }
            if self.diagnostics.ceiling_reached() {
                break;
            }
            if lexer.current().ty == TokenType::At {
                self.parse_compiler_directive(lexer);
                continue;
            }
            match self.parse(lexer, false, false) {
                Some(node) => self.ast.toplevel.push(node),
                None => {
                    // A parse error aborts the current statement; resynchronize
                    // by skipping to the next top-level terminator so later
                    // declarations still have a chance to parse.
                    self.skip_to_next_toplevel(lexer);
                }
            }
        }
    }

    fn skip_to_next_toplevel(&mut self, lexer: &mut Lexer) {
        while lexer.current().ty != TokenType::Eof
            && lexer.current().ty != TokenType::Semicolon
            && lexer.current().ty != TokenType::Rbrace
        {
            lexer.advance(1);
        }
        if lexer.current().ty != TokenType::Eof {
            lexer.advance(1);
        }
    }

    pub(crate) fn push_node(&mut self, data: AstNodeData, pos: u32, line: u32) -> NodeId {
        self.ast.push(data, pos, line, Rc::clone(&self.current_file))
    }

    /// Reads a possibly `\`-separated identifier path (`A\B\x`) without
    /// consuming the token that follows it.
    pub(crate) fn parse_namespaced_name(&mut self, lexer: &mut Lexer) -> Option<String> {
        if lexer.current().ty != TokenType::Identifier {
            lexer.report(&mut self.diagnostics, "Expected identifier.");
            return None;
        }
        let mut full_name = lexer.current().value.to_string();
        while lexer.peek(1).ty == TokenType::Backslash {
            lexer.advance(2);
            if lexer.current().ty != TokenType::Identifier {
                lexer.report(&mut self.diagnostics, "Expected namespace identifier.");
                return None;
            }
            full_name.push('\\');
            full_name.push_str(&lexer.current().value);
        }
        lexer.advance(1);
        Some(full_name)
    }

    /// Parses one expression or statement.
    ///
    /// `nocheck_term` suppresses the trailing `;`/`,` check regardless of
    /// node kind; `parse_single` stops after the primary + postfix-access
    /// chain without climbing into a binary expression (used while
    /// parsing call arguments and subscripts, where the enclosing
    /// delimiter is the terminator).
    pub fn parse(&mut self, lexer: &mut Lexer, nocheck_term: bool, parse_single: bool) -> Option<NodeId> {
        let curr = lexer.current().clone();
        if curr.ty == TokenType::Eof {
            return None;
        }

        let mut expr = if curr.ty == TokenType::At {
            return self.parse_compiler_directive(lexer);
        } else if curr.ty == TokenType::Lparen {
            self.parse_parenthesized_expression(lexer)?
        } else if curr.ty == TokenType::Lbrace {
            self.parse_braced_expression(lexer)?
        } else if curr.kind == tak_lexer::TokenKind::Literal {
            self.parse_singleton_literal(lexer)?
        } else if curr.kind == tak_lexer::TokenKind::Keyword {
            self.parse_keyword(lexer)?
        } else if curr.ty == TokenType::Identifier {
            if lexer.peek(1).ty == TokenType::Colon || lexer.peek(1).ty == TokenType::ColonColon {
                // Declarations consume their own terminator (a `}` for
                // procedure/struct bodies, a `;` otherwise), so they bypass
                // the postfix/terminal handling below entirely.
                return self.parse_decl(lexer, nocheck_term);
            }
            self.parse_identifier(lexer)?
        } else if curr.ty.is_unary_prefix() {
            self.parse_unary_expression(lexer)?
        } else {
            lexer.report(&mut self.diagnostics, "Unexpected token.");
            return None;
        };

        if Ast::never_needs_terminal(&self.ast.get(expr).data) {
            return Some(expr);
        }

        loop {
            match lexer.current().ty {
                TokenType::Lsquarebracket => expr = self.parse_subscript(expr, lexer)?,
                TokenType::Lparen => expr = self.parse_call(expr, lexer)?,
                TokenType::Dot => expr = self.parse_trailing_member_access(expr, lexer)?,
                ty if ty.binary_precedence().is_some() && !parse_single => {
                    expr = self.parse_binary_expression(expr, lexer, 0)?;
                }
                _ => break,
            }
        }

        if lexer.current().ty == TokenType::Rparen {
            if self.inside_parenthesized_expression == 0 {
                lexer.report(&mut self.diagnostics, "Unexpected token.");
                return None;
            }
            if !parse_single {
                self.inside_parenthesized_expression -= 1;
                lexer.advance(1);
            }
        }

        if nocheck_term || parse_single {
            return Some(expr);
        }

        if lexer.current().ty == TokenType::Semicolon || lexer.current().ty == TokenType::Comma {
            if self.inside_parenthesized_expression > 0 {
                lexer.report(&mut self.diagnostics, "Unexpected token inside of parenthesized expression.");
                return None;
            }
            lexer.advance(1);
            return Some(expr);
        }

        lexer.report(&mut self.diagnostics, "Unexpected token following expression.");
        None
    }

    pub(crate) fn parse_keyword(&mut self, lexer: &mut Lexer) -> Option<NodeId> {
        match lexer.current().ty {
            TokenType::KwRet => self.parse_ret(lexer),
            TokenType::KwIf => self.parse_branch(lexer),
            TokenType::KwSwitch => self.parse_switch(lexer),
            TokenType::KwWhile => self.parse_while(lexer),
            TokenType::KwFor => self.parse_for(lexer),
            TokenType::KwStruct => self.parse_structdef(lexer),
            TokenType::KwCont => self.parse_cont(lexer),
            TokenType::KwBrk => self.parse_brk(lexer),
            TokenType::KwFallthrough => self.parse_fallthrough(lexer),
            TokenType::KwNamespace => self.parse_namespace(lexer),
            TokenType::KwDo => self.parse_dowhile(lexer),
            TokenType::KwBlk => self.parse_block(lexer),
            TokenType::KwCast => self.parse_cast(lexer),
            TokenType::KwEnum => self.parse_enumdef(lexer),
            TokenType::KwDefer => self.parse_defer(lexer),
            TokenType::KwDeferIf => self.parse_defer_if(lexer),
            TokenType::KwSizeof => self.parse_sizeof(lexer),
            TokenType::KwNullptr => self.parse_nullptr(lexer),
            TokenType::KwCompose => self.parse_compose(lexer),
            _ => {
                lexer.report(&mut self.diagnostics, "This keyword is not allowed here.");
                None
            }
        }
    }

    pub(crate) fn parse_compiler_directive(&mut self, lexer: &mut Lexer) -> Option<NodeId> {
        lexer.advance(1);
        if lexer.current().ty != TokenType::Identifier || &*lexer.current().value != "include" {
            lexer.report(&mut self.diagnostics, "Unknown compiler directive.");
            return None;
        }
        lexer.advance(1);
        if lexer.current().ty != TokenType::StringLiteral {
            lexer.report(&mut self.diagnostics, "Expected a string literal path after '@include'.");
            return None;
        }
        let path = lexer.current().value.to_string();
        lexer.advance(1);
        if lexer.current().ty == TokenType::Semicolon {
            lexer.advance(1);
        }
        self.include_queue.enqueue(path);
        None
    }
}

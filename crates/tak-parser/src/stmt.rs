//! Statement parsing: blocks, branches, loops, `switch`, and the
//! control-flow/defer keywords.
//!
//! Grounded in `tak::parse_keyword`'s dispatch table (`src/parser/begin.cpp`)
//! for which keyword maps to which parser; the bodies themselves are
//! reconstructed from first principles since the corresponding `.cpp`
//! files did not survive in the retrieved source tree.

use tak_lexer::{Lexer, TokenType};

use crate::ast::{AstNodeData, NodeId, SwitchCase};
use crate::parser::Parser;

impl Parser {
    /// Parses a `{ ... }`-delimited statement sequence, recognizing
    /// `@include` directives inline the same way the top-level driver
    /// loop does.
    pub(crate) fn parse_statement_block(&mut self, lexer: &mut Lexer) -> Option<Vec<NodeId>> {
        if lexer.current().ty != TokenType::Lbrace {
            lexer.report(&mut self.diagnostics, "Expected '{'.");
            return None;
        }
        lexer.advance(1);

        let mut body = Vec::new();
        while lexer.current().ty != TokenType::Rbrace {
            if lexer.current().ty == TokenType::Eof {
                lexer.report(&mut self.diagnostics, "Unexpected end of file inside block.");
                return None;
            }
            if lexer.current().ty == TokenType::At {
                self.parse_compiler_directive(lexer);
                continue;
            }
            body.push(self.parse(lexer, false, false)?);
        }
        lexer.advance(1);
        Some(body)
    }

    pub(crate) fn parse_block(&mut self, lexer: &mut Lexer) -> Option<NodeId> {
        let (pos, line) = (lexer.current().src_pos, lexer.current().line);
        lexer.advance(1);
        self.table.push_scope();
        let body = self.parse_statement_block(lexer);
        let _ = self.table.pop_scope();
        let body = body?;
        let node = self.push_node(AstNodeData::Block { body: body.clone() }, pos, line);
        self.ast.attach_children(node, &body);
        Some(node)
    }

    /// Leaves the trailing `;` for the caller's uniform terminal check
    /// (`parser.rs::parse`), matching how every other statement form that
    /// doesn't end in its own `}` is terminated.
    pub(crate) fn parse_ret(&mut self, lexer: &mut Lexer) -> Option<NodeId> {
        let (pos, line) = (lexer.current().src_pos, lexer.current().line);
        lexer.advance(1);
        let value = if lexer.current().ty == TokenType::Semicolon {
            None
        } else {
            Some(self.parse(lexer, true, true)?)
        };
        let node = self.push_node(AstNodeData::Return { value }, pos, line);
        if let Some(v) = value {
            self.ast.attach_children(node, &[v]);
        }
        Some(node)
    }

    pub(crate) fn parse_brk(&mut self, lexer: &mut Lexer) -> Option<NodeId> {
        let (pos, line) = (lexer.current().src_pos, lexer.current().line);
        lexer.advance(1);
        Some(self.push_node(AstNodeData::Break, pos, line))
    }

    pub(crate) fn parse_cont(&mut self, lexer: &mut Lexer) -> Option<NodeId> {
        let (pos, line) = (lexer.current().src_pos, lexer.current().line);
        lexer.advance(1);
        Some(self.push_node(AstNodeData::Continue, pos, line))
    }

    /// `fallthrough;` — only meaningful as the last statement of a
    /// `switch` case body; the checker rejects it anywhere else.
    pub(crate) fn parse_fallthrough(&mut self, lexer: &mut Lexer) -> Option<NodeId> {
        let (pos, line) = (lexer.current().src_pos, lexer.current().line);
        lexer.advance(1);
        Some(self.push_node(AstNodeData::Fallthrough, pos, line))
    }

    fn expect_parenthesized_condition(&mut self, lexer: &mut Lexer) -> Option<NodeId> {
        if lexer.current().ty != TokenType::Lparen {
            lexer.report(&mut self.diagnostics, "Expected '(' before condition.");
            return None;
        }
        lexer.advance(1);
        self.inside_parenthesized_expression += 1;
        self.parse(lexer, true, false)
    }

    /// `if (cond) { body } (elif (cond) { body})* (else { body})?`.
    pub(crate) fn parse_branch(&mut self, lexer: &mut Lexer) -> Option<NodeId> {
        let (pos, line) = (lexer.current().src_pos, lexer.current().line);
        let mut conditions = Vec::new();
        let mut bodies = Vec::new();

        lexer.advance(1); // 'if'
        conditions.push(self.expect_parenthesized_condition(lexer)?);
        self.table.push_scope();
        let body = self.parse_statement_block(lexer);
        let _ = self.table.pop_scope();
        bodies.push(body?);

        while lexer.current().ty == TokenType::KwElif {
            lexer.advance(1);
            conditions.push(self.expect_parenthesized_condition(lexer)?);
            self.table.push_scope();
            let body = self.parse_statement_block(lexer);
            let _ = self.table.pop_scope();
            bodies.push(body?);
        }

        let else_body = if lexer.current().ty == TokenType::KwElse {
            lexer.advance(1);
            self.table.push_scope();
            let body = self.parse_statement_block(lexer);
            let _ = self.table.pop_scope();
            Some(body?)
        } else {
            None
        };

        let mut all_children: Vec<NodeId> = conditions.clone();
        for body in &bodies {
            all_children.extend(body.iter().copied());
        }
        if let Some(body) = &else_body {
            all_children.extend(body.iter().copied());
        }

        let node = self.push_node(AstNodeData::Branch { conditions, bodies, else_body }, pos, line);
        self.ast.attach_children(node, &all_children);
        Some(node)
    }

    /// `switch (target) { case <const> { body } ... default { body } }`.
    pub(crate) fn parse_switch(&mut self, lexer: &mut Lexer) -> Option<NodeId> {
        let (pos, line) = (lexer.current().src_pos, lexer.current().line);
        lexer.advance(1);
        let target = self.expect_parenthesized_condition(lexer)?;

        if lexer.current().ty != TokenType::Lbrace {
            lexer.report(&mut self.diagnostics, "Expected '{' opening switch body.");
            return None;
        }
        lexer.advance(1);

        let mut cases = Vec::new();
        let mut saw_default = false;
        while lexer.current().ty != TokenType::Rbrace {
            let value = match lexer.current().ty {
                TokenType::KwCase => {
                    lexer.advance(1);
                    Some(self.parse(lexer, true, true)?)
                }
                TokenType::KwDefault => {
                    if saw_default {
                        lexer.report(&mut self.diagnostics, "Duplicate 'default' case.");
                        return None;
                    }
                    saw_default = true;
                    lexer.advance(1);
                    None
                }
                _ => {
                    lexer.report(&mut self.diagnostics, "Expected 'case' or 'default'.");
                    return None;
                }
            };
            self.table.push_scope();
            let body = self.parse_statement_block(lexer);
            let _ = self.table.pop_scope();
            cases.push(SwitchCase { value, body: body? });
        }
        lexer.advance(1);

        let mut children = vec![target];
        for case in &cases {
            if let Some(v) = case.value {
                children.push(v);
            }
            children.extend(case.body.iter().copied());
        }

        let node = self.push_node(AstNodeData::Switch { target, cases }, pos, line);
        self.ast.attach_children(node, &children);
        Some(node)
    }

    pub(crate) fn parse_while(&mut self, lexer: &mut Lexer) -> Option<NodeId> {
        let (pos, line) = (lexer.current().src_pos, lexer.current().line);
        lexer.advance(1);
        let condition = self.expect_parenthesized_condition(lexer)?;
        self.table.push_scope();
        let body = self.parse_statement_block(lexer);
        let _ = self.table.pop_scope();
        let body = body?;

        let mut children = vec![condition];
        children.extend(body.iter().copied());
        let node = self.push_node(AstNodeData::While { condition, body }, pos, line);
        self.ast.attach_children(node, &children);
        Some(node)
    }

    /// `do { body } while (cond);`.
    pub(crate) fn parse_dowhile(&mut self, lexer: &mut Lexer) -> Option<NodeId> {
        let (pos, line) = (lexer.current().src_pos, lexer.current().line);
        lexer.advance(1);
        self.table.push_scope();
        let body = self.parse_statement_block(lexer);
        let _ = self.table.pop_scope();
        let body = body?;

        if lexer.current().ty != TokenType::KwWhile {
            lexer.report(&mut self.diagnostics, "Expected 'while' closing 'do' block.");
            return None;
        }
        lexer.advance(1);
        let condition = self.expect_parenthesized_condition(lexer)?;
        if lexer.current().ty == TokenType::Semicolon {
            lexer.advance(1);
        }

        let mut children = body.clone();
        children.push(condition);
        let node = self.push_node(AstNodeData::DoWhile { condition, body }, pos, line);
        self.ast.attach_children(node, &children);
        Some(node)
    }

    /// `for (init; cond; update) { body }`; any of the three clauses may
    /// be empty.
    pub(crate) fn parse_for(&mut self, lexer: &mut Lexer) -> Option<NodeId> {
        let (pos, line) = (lexer.current().src_pos, lexer.current().line);
        lexer.advance(1);
        if lexer.current().ty != TokenType::Lparen {
            lexer.report(&mut self.diagnostics, "Expected '(' after 'for'.");
            return None;
        }
        lexer.advance(1);
        self.inside_parenthesized_expression += 1;

        self.table.push_scope();

        let init = if lexer.current().ty == TokenType::Semicolon {
            None
        } else {
            Some(self.parse(lexer, true, false)?)
        };
        if lexer.current().ty != TokenType::Semicolon {
            lexer.report(&mut self.diagnostics, "Expected ';' after 'for' init clause.");
            let _ = self.table.pop_scope();
            return None;
        }
        lexer.advance(1);

        let condition = if lexer.current().ty == TokenType::Semicolon {
            None
        } else {
            Some(self.parse(lexer, true, false)?)
        };
        if lexer.current().ty != TokenType::Semicolon {
            lexer.report(&mut self.diagnostics, "Expected ';' after 'for' condition clause.");
            let _ = self.table.pop_scope();
            return None;
        }
        lexer.advance(1);

        // A present `update` clause is parsed with `parse_single: false`, so
        // its own call to `parse` consumes the closing ')' and decrements
        // `inside_parenthesized_expression` itself (same as any other
        // parenthesized sub-expression). Only the empty case needs it done
        // here directly.
        let update = if lexer.current().ty == TokenType::Rparen {
            self.inside_parenthesized_expression -= 1;
            lexer.advance(1);
            None
        } else {
            let upd = self.parse(lexer, true, false)?;
            Some(upd)
        };

        let body = self.parse_statement_block(lexer);
        let _ = self.table.pop_scope();
        let body = body?;

        let mut children = Vec::new();
        children.extend(init);
        children.extend(condition);
        children.extend(update);
        children.extend(body.iter().copied());

        let node = self.push_node(AstNodeData::For { init, condition, update, body }, pos, line);
        self.ast.attach_children(node, &children);
        Some(node)
    }

    pub(crate) fn parse_defer(&mut self, lexer: &mut Lexer) -> Option<NodeId> {
        let (pos, line) = (lexer.current().src_pos, lexer.current().line);
        lexer.advance(1);
        let body = if lexer.current().ty == TokenType::Lbrace {
            self.parse_statement_block(lexer)?
        } else {
            vec![self.parse(lexer, false, false)?]
        };
        let node = self.push_node(AstNodeData::Defer { body: body.clone() }, pos, line);
        self.ast.attach_children(node, &body);
        Some(node)
    }

    pub(crate) fn parse_defer_if(&mut self, lexer: &mut Lexer) -> Option<NodeId> {
        let (pos, line) = (lexer.current().src_pos, lexer.current().line);
        lexer.advance(1);
        let condition = self.expect_parenthesized_condition(lexer)?;
        let body = if lexer.current().ty == TokenType::Lbrace {
            self.parse_statement_block(lexer)?
        } else {
            vec![self.parse(lexer, false, false)?]
        };
        let mut children = vec![condition];
        children.extend(body.iter().copied());
        let node = self.push_node(AstNodeData::DeferIf { condition, body }, pos, line);
        self.ast.attach_children(node, &children);
        Some(node)
    }
}

//! Expression parsing: literals, identifiers, unary/binary operators,
//! postfix access, and parenthesized/braced sub-expressions.
//!
//! Grounded in `tak::parse_identifier` / `parse_member_access`
//! (`src/parser/ident.cpp`) for identifier and dotted-path resolution:
//! an unresolved reference installs a placeholder symbol at global scope
//! rather than raising an error, so forward references always resolve to
//! *some* index at parse time.

use tak_entity::{SymbolFlags, SymbolKind, TypeData};
use tak_lexer::TokenType;

use crate::ast::{AstNodeData, FieldInit, LiteralKind, NodeId};
use crate::parser::Parser;

impl Parser {
    pub(crate) fn parse_singleton_literal(&mut self, lexer: &mut tak_lexer::Lexer) -> Option<NodeId> {
        let tok = lexer.current().clone();
        let kind = match tok.ty {
            TokenType::IntegerLiteral | TokenType::HexLiteral => LiteralKind::Integer,
            TokenType::FloatLiteral => LiteralKind::Float,
            TokenType::StringLiteral | TokenType::RawStringLiteral => LiteralKind::String,
            TokenType::CharacterLiteral => LiteralKind::Char,
            TokenType::BooleanLiteral => LiteralKind::Bool,
            _ => {
                lexer.report(&mut self.diagnostics, "Expected a literal.");
                return None;
            }
        };
        lexer.advance(1);
        Some(self.push_node(AstNodeData::SingletonLiteral { kind, value: tok.value }, tok.src_pos, tok.line))
    }

    pub(crate) fn parse_nullptr(&mut self, lexer: &mut tak_lexer::Lexer) -> Option<NodeId> {
        let tok = lexer.current().clone();
        lexer.advance(1);
        Some(self.push_node(AstNodeData::SingletonLiteral { kind: LiteralKind::Nullptr, value: "nullptr".into() }, tok.src_pos, tok.line))
    }

    pub(crate) fn parse_unary_expression(&mut self, lexer: &mut tak_lexer::Lexer) -> Option<NodeId> {
        let tok = lexer.current().clone();
        lexer.advance(1);
        let operand = self.parse(lexer, true, true)?;
        Some(self.push_node(AstNodeData::UnaryExpr { operator: tok.ty, operand }, tok.src_pos, tok.line))
    }

    /// Implements precedence climbing: `min_prec` is the minimum binding
    /// power an operator must have to be consumed at this recursion
    /// level.
    pub(crate) fn parse_binary_expression(&mut self, mut left: NodeId, lexer: &mut tak_lexer::Lexer, min_prec: u8) -> Option<NodeId> {
        loop {
            let op = lexer.current().ty;
            let Some(prec) = op.binary_precedence() else { return Some(left) };
            if prec < min_prec {
                return Some(left);
            }
            let (pos, line) = (lexer.current().src_pos, lexer.current().line);
            lexer.advance(1);

            let mut right = self.parse(lexer, true, true)?;

            loop {
                let next_op = lexer.current().ty;
                let Some(next_prec) = next_op.binary_precedence() else { break };
                let climbs = if op.is_right_assoc() { next_prec >= prec } else { next_prec > prec };
                if !climbs {
                    break;
                }
                right = self.parse_binary_expression(right, lexer, next_prec)?;
            }

            left = self.push_node(AstNodeData::BinaryExpr { operator: op, left, right }, pos, line);
        }
    }

    pub(crate) fn parse_subscript(&mut self, target: NodeId, lexer: &mut tak_lexer::Lexer) -> Option<NodeId> {
        let (pos, line) = (lexer.current().src_pos, lexer.current().line);
        lexer.advance(1);
        let index = self.parse(lexer, true, true)?;
        if lexer.current().ty != TokenType::Rsquarebracket {
            lexer.report(&mut self.diagnostics, "Expected ']'.");
            return None;
        }
        lexer.advance(1);
        Some(self.push_node(AstNodeData::Subscript { target, index }, pos, line))
    }

    pub(crate) fn parse_call(&mut self, callee: NodeId, lexer: &mut tak_lexer::Lexer) -> Option<NodeId> {
        let (pos, line) = (lexer.current().src_pos, lexer.current().line);
        lexer.advance(1);
        let mut arguments = Vec::new();
        while lexer.current().ty != TokenType::Rparen {
            arguments.push(self.parse(lexer, true, true)?);
            if lexer.current().ty == TokenType::Comma {
                lexer.advance(1);
            } else {
                break;
            }
        }
        if lexer.current().ty != TokenType::Rparen {
            lexer.report(&mut self.diagnostics, "Expected ')' in call argument list.");
            return None;
        }
        lexer.advance(1);
        Some(self.push_node(AstNodeData::Call { callee, arguments }, pos, line))
    }

    pub(crate) fn parse_trailing_member_access(&mut self, target: NodeId, lexer: &mut tak_lexer::Lexer) -> Option<NodeId> {
        let (pos, line) = (lexer.current().src_pos, lexer.current().line);
        let mut path = Vec::new();
        while lexer.current().ty == TokenType::Dot {
            lexer.advance(1);
            if lexer.current().ty != TokenType::Identifier {
                lexer.report(&mut self.diagnostics, "Expected struct member name.");
                return None;
            }
            path.push(lexer.current().value.to_string());
            lexer.advance(1);
        }
        Some(self.push_node(AstNodeData::MemberAccess { target, path }, pos, line))
    }

    pub(crate) fn parse_parenthesized_expression(&mut self, lexer: &mut tak_lexer::Lexer) -> Option<NodeId> {
        lexer.advance(1);
        self.inside_parenthesized_expression += 1;
        self.parse(lexer, true, false)
    }

    pub(crate) fn parse_braced_expression(&mut self, lexer: &mut tak_lexer::Lexer) -> Option<NodeId> {
        let (pos, line) = (lexer.current().src_pos, lexer.current().line);
        lexer.advance(1);
        let mut fields = Vec::new();
        while lexer.current().ty != TokenType::Rbrace {
            let name = if lexer.current().ty == TokenType::Dot {
                lexer.advance(1);
                if lexer.current().ty != TokenType::Identifier {
                    lexer.report(&mut self.diagnostics, "Expected field name after '.'.");
                    return None;
                }
                let name = lexer.current().value.to_string();
                lexer.advance(1);
                if lexer.current().ty != TokenType::ValueAssignment {
                    lexer.report(&mut self.diagnostics, "Expected '=' after designated field name.");
                    return None;
                }
                lexer.advance(1);
                Some(name)
            } else {
                None
            };
            let value = self.parse(lexer, true, true)?;
            fields.push(FieldInit { name, value });
            if lexer.current().ty == TokenType::Comma {
                lexer.advance(1);
            } else {
                break;
            }
        }
        if lexer.current().ty != TokenType::Rbrace {
            lexer.report(&mut self.diagnostics, "Expected '}' closing braced expression.");
            return None;
        }
        lexer.advance(1);
        Some(self.push_node(AstNodeData::BracedExpr { fields }, pos, line))
    }

    pub(crate) fn parse_cast(&mut self, lexer: &mut tak_lexer::Lexer) -> Option<NodeId> {
        let (pos, line) = (lexer.current().src_pos, lexer.current().line);
        lexer.advance(1);
        if lexer.current().ty != TokenType::Lparen {
            lexer.report(&mut self.diagnostics, "Expected '(' after 'cast'.");
            return None;
        }
        lexer.advance(1);
        let target_type = self.parse_type(lexer)?;
        if lexer.current().ty != TokenType::Comma {
            lexer.report(&mut self.diagnostics, "Expected ',' between cast type and expression.");
            return None;
        }
        lexer.advance(1);
        let operand = self.parse(lexer, true, true)?;
        if lexer.current().ty != TokenType::Rparen {
            lexer.report(&mut self.diagnostics, "Expected ')' closing cast.");
            return None;
        }
        lexer.advance(1);
        Some(self.push_node(AstNodeData::Cast { target_type, operand }, pos, line))
    }

    pub(crate) fn parse_sizeof(&mut self, lexer: &mut tak_lexer::Lexer) -> Option<NodeId> {
        let (pos, line) = (lexer.current().src_pos, lexer.current().line);
        lexer.advance(1);
        if lexer.current().ty != TokenType::Lparen {
            lexer.report(&mut self.diagnostics, "Expected '(' after 'sizeof'.");
            return None;
        }
        lexer.advance(1);

        let looks_like_type = Self::primitive_from_token(lexer.current().ty).is_some()
            || lexer.current().ty == TokenType::Caret
            || lexer.current().ty == TokenType::KwProc;

        let (operand_type, operand) = if looks_like_type {
            (Some(self.parse_type(lexer)?), None)
        } else {
            (None, Some(self.parse(lexer, true, true)?))
        };

        if lexer.current().ty != TokenType::Rparen {
            lexer.report(&mut self.diagnostics, "Expected ')' closing sizeof.");
            return None;
        }
        lexer.advance(1);
        Some(self.push_node(AstNodeData::Sizeof { operand_type, operand }, pos, line))
    }

    fn primitive_from_token(ty: TokenType) -> Option<tak_entity::Primitive> {
        use tak_entity::Primitive::*;
        Some(match ty {
            TokenType::KwU8 => U8,
            TokenType::KwI8 => I8,
            TokenType::KwU16 => U16,
            TokenType::KwI16 => I16,
            TokenType::KwU32 => U32,
            TokenType::KwI32 => I32,
            TokenType::KwU64 => U64,
            TokenType::KwI64 => I64,
            TokenType::KwF32 => F32,
            TokenType::KwF64 => F64,
            TokenType::KwBool => Bool,
            TokenType::KwVoid => Void,
            _ => return None,
        })
    }

    pub(crate) fn parse_identifier(&mut self, lexer: &mut tak_lexer::Lexer) -> Option<NodeId> {
        let (pos, line) = (lexer.current().src_pos, lexer.current().line);
        let name = self.parse_namespaced_name(lexer)?;

        let canonical = self.table.get_canonical_sym_name(&name);
        let existing = self
            .table
            .lookup_scoped_symbol(&canonical)
            .map(|sym| (sym.symbol_index, sym.is_generic_base() && sym.kind == SymbolKind::Procedure));

        let symbol_index = if let Some((index, is_generic_base)) = existing {
            if is_generic_base && lexer.current().ty == TokenType::Lessthan {
                return self.parse_generic_instantiation(&canonical, pos, line, lexer);
            }
            index
        } else {
            self.table.create_placeholder_symbol(name, pos, line, self.current_file.to_string())
        };

        let ident = self.push_node(AstNodeData::Identifier { name: canonical, symbol_index }, pos, line);

        if lexer.current().ty == TokenType::Dot {
            return self.parse_trailing_member_access(ident, lexer);
        }
        Some(ident)
    }

    /// Parses `<T, U>(args)` at a generic procedure's call site and
    /// registers the concrete permutation via
    /// `create_generic_proc_permutation`.
    fn parse_generic_instantiation(&mut self, base_canonical: &str, pos: u32, line: u32, lexer: &mut tak_lexer::Lexer) -> Option<NodeId> {
        lexer.advance(1);
        let mut type_args = Vec::new();
        while lexer.current().ty != TokenType::Greaterthan {
            type_args.push(self.parse_type(lexer)?);
            if lexer.current().ty == TokenType::Comma {
                lexer.advance(1);
            } else {
                break;
            }
        }
        if lexer.current().ty != TokenType::Greaterthan {
            lexer.report(&mut self.diagnostics, "Expected '>' closing generic argument list.");
            return None;
        }
        lexer.advance(1);

        let perm_ty = TypeData::procedure(type_args, None);
        let symbol_index = match self.table.create_generic_proc_permutation(base_canonical, perm_ty, pos, line, self.current_file.to_string()) {
            Ok(idx) => idx,
            Err(err) => {
                lexer.report(&mut self.diagnostics, err.to_string());
                return None;
            }
        };

        Some(self.push_node(AstNodeData::Identifier { name: base_canonical.to_string(), symbol_index }, pos, line))
    }

    /// `ident : type [= expr]`, `ident := expr`, or `ident :: expr`.
    /// Procedure declarations are routed here too, since `proc` only
    /// appears as the RHS of `:=`.
    ///
    /// `nocheck_term` suppresses the trailing terminal check entirely,
    /// leaving the lexer positioned right after the declaration for a
    /// caller that manages its own separator (a `for` loop's `init`
    /// clause, which is itself inside parentheses).
    pub(crate) fn parse_decl(&mut self, lexer: &mut tak_lexer::Lexer, nocheck_term: bool) -> Option<NodeId> {
        let (pos, line) = (lexer.current().src_pos, lexer.current().line);
        if lexer.current().ty != TokenType::Identifier {
            lexer.report(&mut self.diagnostics, "Expected identifier in declaration.");
            return None;
        }
        let name = lexer.current().value.to_string();
        lexer.advance(1);

        let is_constant = lexer.current().ty == TokenType::ColonColon;
        if lexer.current().ty != TokenType::Colon && !is_constant {
            lexer.report(&mut self.diagnostics, "Expected ':' or '::' in declaration.");
            return None;
        }
        lexer.advance(1);

        if is_constant && lexer.current().ty == TokenType::KwProc {
            return self.parse_proc_decl(name, pos, line, lexer, false, is_constant);
        }

        let declared_type = if lexer.current().ty == TokenType::ValueAssignment {
            None
        } else {
            Some(self.parse_type(lexer)?)
        };

        if lexer.current().ty == TokenType::ValueAssignment && lexer.peek(1).ty == TokenType::KwProc {
            return self.parse_proc_decl(name, pos, line, lexer, true, is_constant);
        }

        let initializer = if lexer.current().ty == TokenType::ValueAssignment {
            lexer.advance(1);
            Some(self.parse(lexer, true, true)?)
        } else {
            None
        };

        let mut flags = SymbolFlags::empty();
        if self.table.scope_depth() == 1 {
            flags.insert(SymbolFlags::GLOBAL);
        }
        let mut ty = declared_type.clone().unwrap_or_default();
        if is_constant {
            ty.flags.insert(tak_entity::TypeFlags::CONSTANT);
        }
        let canonical = self.table.get_canonical_sym_name(&name);
        let existing_placeholder = self.table.lookup_scoped_symbol(&canonical).filter(|sym| sym.is_placeholder()).map(|sym| sym.symbol_index);
        let symbol_index = if let Some(index) = existing_placeholder {
            let _ = self.table.resolve_placeholder_symbol(index, SymbolKind::Variable, ty, flags);
            index
        } else {
            self.table.create_symbol(name.clone(), SymbolKind::Variable, ty, pos, line, self.current_file.to_string(), flags)
        };

        let node = self.push_node(AstNodeData::VarDecl { name, declared_type, symbol_index, initializer }, pos, line);
        if let Some(init) = initializer {
            self.ast.attach_children(node, &[init]);
        }

        if nocheck_term {
            return Some(node);
        }

        if lexer.current().ty == TokenType::Semicolon || lexer.current().ty == TokenType::Comma {
            if self.inside_parenthesized_expression > 0 {
                lexer.report(&mut self.diagnostics, "Unexpected token inside of parenthesized expression.");
                return None;
            }
            lexer.advance(1);
            return Some(node);
        }
        lexer.report(&mut self.diagnostics, "Unexpected token following declaration.");
        None
    }
}

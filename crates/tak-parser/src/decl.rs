//! Declarations: procedures, structs, enums, namespaces, and compose
//! blocks.
//!
//! Grounded in `tak::parse_structdef` (`src/parser/structdef.cpp`),
//! `tak::parse_namespace` (`src/parser/namespace.cpp`), and
//! `tak::postparse_reparse_procedure_permutation`
//! (`src/postparser/generic_procedures.cpp`) for the generic-parameter
//! list / type-alias-install-then-remove pattern, reused here for the
//! first parse of a generic base's signature.

use std::rc::Rc;

use tak_entity::{SymbolFlags, SymbolKind, TypeData, TypeFlags, UserType, UserTypeFlags};
use tak_lexer::{Lexer, TokenType};

use crate::ast::{AstNodeData, NodeId};
use crate::parser::Parser;

impl Parser {
    /// Parses `<T, U>` generic parameter names, if present.
    fn parse_generic_param_names(&mut self, lexer: &mut Lexer) -> Vec<String> {
        if lexer.current().ty != TokenType::Lessthan {
            return Vec::new();
        }
        lexer.advance(1);
        let mut names = Vec::new();
        while lexer.current().ty == TokenType::Identifier {
            names.push(lexer.current().value.to_string());
            lexer.advance(1);
            if lexer.current().ty == TokenType::Comma {
                lexer.advance(1);
            } else {
                break;
            }
        }
        if lexer.current().ty == TokenType::Greaterthan {
            lexer.advance(1);
        } else {
            lexer.report(&mut self.diagnostics, "Expected '>' closing generic parameter list.");
        }
        names
    }

    /// `ident := proc<T,U>(params) -> type { body }` or
    /// `ident :: proc<T,U>(params) -> type { body }`. `has_value_assignment`
    /// is true for the `:=` form (current token is still `=`, with `proc`
    /// one token further on) and false for the `::` form (the `::` is
    /// already consumed by the caller, so current token is `proc`
    /// directly). The generic parameter names (if any) are installed as
    /// type aliases for the duration of parsing the signature and body,
    /// same as the post-parser does for a permutation reparse.
    pub(crate) fn parse_proc_decl(&mut self, name: String, pos: u32, line: u32, lexer: &mut Lexer, has_value_assignment: bool, is_constant: bool) -> Option<NodeId> {
        if has_value_assignment {
            lexer.advance(1); // consume '='
        }
        lexer.advance(1); // consume 'proc'

        let generic_type_names = self.parse_generic_param_names(lexer);
        for generic_name in &generic_type_names {
            self.table.create_type_alias(generic_name.clone(), TypeData::struct_named(generic_name.clone()));
        }

        let mut flags = SymbolFlags::empty();
        if self.table.scope_depth() == 1 {
            flags.insert(SymbolFlags::GLOBAL);
        }
        if !generic_type_names.is_empty() {
            flags.insert(SymbolFlags::GENERIC_BASE);
        }

        let canonical = self.table.get_canonical_sym_name(&name);
        let existing_placeholder = self.table.lookup_scoped_symbol(&canonical).filter(|sym| sym.is_placeholder()).map(|sym| sym.symbol_index);

        let symbol_index = if let Some(index) = existing_placeholder {
            let _ = self.table.resolve_placeholder_symbol(index, SymbolKind::Procedure, TypeData::default(), flags);
            index
        } else {
            self.table.create_symbol(name.clone(), SymbolKind::Procedure, TypeData::default(), pos, line, self.current_file.to_string(), flags)
        };

        let result = self.parse_proc_signature_and_body(lexer);

        for generic_name in &generic_type_names {
            self.table.delete_type_alias(generic_name);
        }

        let (params, return_type, body, is_method_of) = result?;

        let mut proc_ty = TypeData::procedure(params.iter().map(|(_, t)| t.clone()).collect(), return_type.clone());
        if is_constant {
            proc_ty.flags.insert(TypeFlags::CONSTANT);
        }
        if let Some(sym) = self.table.lookup_symbol_mut(symbol_index) {
            sym.ty = proc_ty;
            sym.generic_type_names = generic_type_names.clone();
        }

        let node = self.push_node(
            AstNodeData::ProcDecl { name, generic_type_names, params, return_type, symbol_index, body: body.clone(), is_method_of },
            pos,
            line,
        );
        self.ast.attach_children(node, &body);
        Some(node)
    }

    #[allow(clippy::type_complexity)]
    pub(crate) fn parse_proc_signature_and_body(
        &mut self,
        lexer: &mut Lexer,
    ) -> Option<(Vec<(String, TypeData)>, Option<TypeData>, Vec<NodeId>, Option<String>)> {
        if lexer.current().ty != TokenType::Lparen {
            lexer.report(&mut self.diagnostics, "Expected '(' in procedure signature.");
            return None;
        }
        lexer.advance(1);

        let mut params = Vec::new();
        let mut is_method_of = None;
        while lexer.current().ty != TokenType::Rparen {
            if lexer.current().ty != TokenType::Identifier {
                lexer.report(&mut self.diagnostics, "Expected parameter name.");
                return None;
            }
            let param_name = lexer.current().value.to_string();
            lexer.advance(1);
            if lexer.current().ty != TokenType::Colon {
                lexer.report(&mut self.diagnostics, "Expected ':' in parameter declaration.");
                return None;
            }
            lexer.advance(1);
            let mut param_ty = self.parse_type(lexer)?;
            param_ty.flags.insert(TypeFlags::PROCARG);

            if params.is_empty() && param_ty.is_pointer() && param_ty.pointer_depth == 1 {
                if let tak_entity::TypeName::Struct(struct_name) = &param_ty.name {
                    is_method_of = Some(struct_name.clone());
                }
            }

            params.push((param_name, param_ty));
            if lexer.current().ty == TokenType::Comma {
                lexer.advance(1);
            } else {
                break;
            }
        }
        if lexer.current().ty != TokenType::Rparen {
            lexer.report(&mut self.diagnostics, "Expected ')' closing parameter list.");
            return None;
        }
        lexer.advance(1);

        let return_type = if lexer.current().ty == TokenType::Arrow {
            lexer.advance(1);
            Some(self.parse_type(lexer)?)
        } else {
            None
        };

        if lexer.current().ty == TokenType::Semicolon {
            // A foreign/forward procedure declaration with no body.
            lexer.advance(1);
            return Some((params, return_type, Vec::new(), is_method_of));
        }

        self.table.push_scope();
        let body = self.parse_statement_block(lexer);
        if self.table.pop_scope().is_err() {
            lexer.report(&mut self.diagnostics, "internal error: scope stack underflow leaving procedure body.");
        }
        let body = body?;
        Some((params, return_type, body, is_method_of))
    }

    /// `struct Name<T,U> { member: type; ... }`.
    pub(crate) fn parse_structdef(&mut self, lexer: &mut Lexer) -> Option<NodeId> {
        let (pos, line) = (lexer.current().src_pos, lexer.current().line);
        lexer.advance(1);
        if lexer.current().ty != TokenType::Identifier {
            lexer.report(&mut self.diagnostics, "Expected struct name.");
            return None;
        }
        let name = lexer.current().value.to_string();
        lexer.advance(1);

        let generic_type_names = self.parse_generic_param_names(lexer);
        for generic_name in &generic_type_names {
            self.table.create_type_alias(generic_name.clone(), TypeData::struct_named(generic_name.clone()));
        }

        if lexer.current().ty != TokenType::Lbrace {
            lexer.report(&mut self.diagnostics, "Expected '{' opening struct body.");
            for generic_name in &generic_type_names {
                self.table.delete_type_alias(generic_name);
            }
            return None;
        }
        lexer.advance(1);

        let mut members = Vec::new();
        while lexer.current().ty != TokenType::Rbrace {
            if lexer.current().ty != TokenType::Identifier {
                lexer.report(&mut self.diagnostics, "Expected member name.");
                break;
            }
            let member_name = lexer.current().value.to_string();
            lexer.advance(1);
            if lexer.current().ty != TokenType::Colon {
                lexer.report(&mut self.diagnostics, "Expected ':' in member declaration.");
                break;
            }
            lexer.advance(1);
            let Some(member_ty) = self.parse_type(lexer) else { break };
            members.push((member_name, member_ty));
            if lexer.current().ty == TokenType::Semicolon {
                lexer.advance(1);
            }
        }

        for generic_name in &generic_type_names {
            self.table.delete_type_alias(generic_name);
        }

        if lexer.current().ty != TokenType::Rbrace {
            lexer.report(&mut self.diagnostics, "Expected '}' closing struct body.");
            return None;
        }
        lexer.advance(1);

        let canonical = self.table.get_canonical_type_name(&name);
        let mut user_type = UserType::new(pos, line, self.current_file.to_string());
        user_type.members = members
            .iter()
            .map(|(member_name, ty)| tak_entity::MemberData { name: member_name.clone(), ty: ty.clone() })
            .collect();
        if !generic_type_names.is_empty() {
            user_type.flags.insert(UserTypeFlags::GENERIC_BASE);
            user_type.generic_type_names = Some(generic_type_names.clone());
        }

        if self.table.type_exists(&canonical) {
            let is_placeholder = self.table.lookup_type(&canonical).is_some_and(|existing| existing.is_placeholder());
            if !is_placeholder {
                lexer.report(&mut self.diagnostics, format!("Naming conflict: type \"{canonical}\" already exists."));
                return None;
            }
        }
        self.table.create_type(canonical.clone(), user_type);

        Some(self.push_node(AstNodeData::StructDef { name: canonical, generic_type_names, members }, pos, line))
    }

    pub(crate) fn parse_enumdef(&mut self, lexer: &mut Lexer) -> Option<NodeId> {
        let (pos, line) = (lexer.current().src_pos, lexer.current().line);
        lexer.advance(1);
        if lexer.current().ty != TokenType::Identifier {
            lexer.report(&mut self.diagnostics, "Expected enum name.");
            return None;
        }
        let name = lexer.current().value.to_string();
        lexer.advance(1);

        let underlying = if lexer.current().ty == TokenType::Colon {
            lexer.advance(1);
            self.parse_type(lexer)?
        } else {
            TypeData::primitive(tak_entity::Primitive::I32)
        };

        if lexer.current().ty != TokenType::Lbrace {
            lexer.report(&mut self.diagnostics, "Expected '{' opening enum body.");
            return None;
        }
        lexer.advance(1);

        let mut variants = Vec::new();
        let mut next_value: i64 = 0;
        while lexer.current().ty != TokenType::Rbrace {
            if lexer.current().ty != TokenType::Identifier {
                lexer.report(&mut self.diagnostics, "Expected enum variant name.");
                break;
            }
            let variant_name = lexer.current().value.to_string();
            lexer.advance(1);

            let value = if lexer.current().ty == TokenType::ValueAssignment {
                lexer.advance(1);
                let parsed = if lexer.current().ty == TokenType::IntegerLiteral || lexer.current().ty == TokenType::HexLiteral {
                    tak_lexer::numeric::parse_integer_value(&lexer.current().value).map(|v| v as i64)
                } else {
                    None
                };
                lexer.advance(1);
                parsed
            } else {
                None
            };

            next_value = value.unwrap_or(next_value);
            variants.push((variant_name, Some(next_value)));
            next_value += 1;

            if lexer.current().ty == TokenType::Comma {
                lexer.advance(1);
            } else {
                break;
            }
        }

        if lexer.current().ty != TokenType::Rbrace {
            lexer.report(&mut self.diagnostics, "Expected '}' closing enum body.");
            return None;
        }
        lexer.advance(1);

        let canonical = self.table.get_canonical_type_name(&name);
        Some(self.push_node(AstNodeData::EnumDef { name: canonical, underlying, variants }, pos, line))
    }

    /// `namespace A\B { ... }`. Pushes each segment for the duration of
    /// the body.
    pub(crate) fn parse_namespace(&mut self, lexer: &mut Lexer) -> Option<NodeId> {
        let (pos, line) = (lexer.current().src_pos, lexer.current().line);
        lexer.advance(1);

        let mut path = Vec::new();
        loop {
            if lexer.current().ty != TokenType::Identifier {
                lexer.report(&mut self.diagnostics, "Expected namespace identifier.");
                return None;
            }
            path.push(lexer.current().value.to_string());
            lexer.advance(1);
            if lexer.current().ty == TokenType::Backslash {
                lexer.advance(1);
            } else {
                break;
            }
        }

        for segment in &path {
            self.table.push_namespace(segment.clone());
        }

        if lexer.current().ty != TokenType::Lbrace {
            lexer.report(&mut self.diagnostics, "Expected '{' opening namespace body.");
            for _ in &path {
                let _ = self.table.pop_namespace();
            }
            return None;
        }
        lexer.advance(1);

        let mut body = Vec::new();
        while lexer.current().ty != TokenType::Rbrace && lexer.current().ty != TokenType::Eof {
            if lexer.current().ty == TokenType::At {
                self.parse_compiler_directive(lexer);
                continue;
            }
            match self.parse(lexer, false, false) {
                Some(node) => body.push(node),
                None => break,
            }
        }
        if lexer.current().ty == TokenType::Rbrace {
            lexer.advance(1);
        } else {
            lexer.report(&mut self.diagnostics, "Expected '}' closing namespace body.");
        }

        for _ in &path {
            let _ = self.table.pop_namespace();
        }

        let node = self.push_node(AstNodeData::NamespaceDecl { path, body: body.clone() }, pos, line);
        self.ast.attach_children(node, &body);
        Some(node)
    }

    /// `compose Name { proc declarations }`. Each procedure whose first
    /// parameter is a pointer-depth-1 pointer to `Name` is added as a
    /// method member.
    pub(crate) fn parse_compose(&mut self, lexer: &mut Lexer) -> Option<NodeId> {
        let (pos, line) = (lexer.current().src_pos, lexer.current().line);
        lexer.advance(1);
        if lexer.current().ty != TokenType::Identifier {
            lexer.report(&mut self.diagnostics, "Expected struct name after 'compose'.");
            return None;
        }
        let name = lexer.current().value.to_string();
        lexer.advance(1);
        let canonical = self.table.get_canonical_type_name(&name);
        if !self.table.type_exists(&canonical) {
            self.table.create_placeholder_type(canonical.clone(), pos, line, self.current_file.to_string());
        }

        if lexer.current().ty != TokenType::Lbrace {
            lexer.report(&mut self.diagnostics, "Expected '{' opening compose body.");
            return None;
        }
        lexer.advance(1);

        let mut methods = Vec::new();
        while lexer.current().ty != TokenType::Rbrace && lexer.current().ty != TokenType::Eof {
            let peek = lexer.peek(1).ty;
            if lexer.current().ty != TokenType::Identifier || (peek != TokenType::ColonColon && peek != TokenType::Colon) {
                lexer.report(&mut self.diagnostics, "Expected a procedure declaration inside a compose block.");
                break;
            }
            match self.parse_decl(lexer, false) {
                Some(node) => methods.push(node),
                None => break,
            }
        }
        if lexer.current().ty == TokenType::Rbrace {
            lexer.advance(1);
        } else {
            lexer.report(&mut self.diagnostics, "Expected '}' closing compose body.");
        }

        for &method in &methods {
            let AstNodeData::ProcDecl { name: method_name, symbol_index, params, .. } = &self.ast.get(method).data else { continue };
            let is_method = params.first().is_some_and(|(_, ty)| {
                ty.is_pointer() && ty.pointer_depth == 1 && matches!(&ty.name, tak_entity::TypeName::Struct(n) if *n == canonical)
            });
            if !is_method {
                continue;
            }
            let method_name = method_name.clone();
            let symbol_index = *symbol_index;
            if let Some(user_type) = self.table.lookup_type_mut(&canonical) {
                let mut member_ty = TypeData::procedure(Vec::new(), None);
                member_ty.flags.insert(TypeFlags::PROC_METHOD);
                member_ty.sym_ref = symbol_index;
                user_type.members.push(tak_entity::MemberData { name: method_name, ty: member_ty });
            }
        }

        let node = self.push_node(AstNodeData::Compose { target_struct: canonical, methods: methods.clone() }, pos, line);
        self.ast.attach_children(node, &methods);
        Some(node)
    }

    /// Re-parses a generic procedure's signature and body for one concrete
    /// permutation: seeks `lexer` back to the base declaration's source
    /// position, installs the base's generic parameter names as type
    /// aliases bound to the permutation's concrete type arguments, and
    /// reparses. The resulting body belongs to a fresh `ProcDecl` node
    /// recorded under `perm_symbol_index` rather than the base's.
    ///
    /// `base_symbol_index` names the `GENERIC_BASE` symbol;
    /// `perm_symbol_index` names the already-registered
    /// `GENERIC_PERMUTATION` symbol (created at the call site by
    /// `create_generic_proc_permutation`) whose `ty.parameters` hold the
    /// concrete type arguments supplied there.
    pub fn reparse_procedure_permutation(&mut self, base_symbol_index: u32, perm_symbol_index: u32, lexer: &mut Lexer) -> Option<NodeId> {
        let base = self.table.lookup_symbol(base_symbol_index)?.clone();
        let perm = self.table.lookup_symbol(perm_symbol_index)?.clone();

        if base.flags.contains(SymbolFlags::FOREIGN) {
            self.diagnostics.raise_error(&base.file, base.src_pos, base.line_number, "Generic procedures cannot be marked as external.");
            return None;
        }

        let type_args: Vec<TypeData> = perm.ty.parameters.as_ref().map(|rc| rc.as_ref().clone()).unwrap_or_default();
        if base.generic_type_names.len() != type_args.len() {
            self.diagnostics.raise_error(
                &perm.file,
                perm.src_pos,
                perm.line_number,
                format!("Expected {} generic type argument(s) for '{}', found {}.", base.generic_type_names.len(), base.name, type_args.len()),
            );
            return None;
        }

        if lexer.file() != base.file {
            let Ok(src) = std::fs::read(&base.file) else {
                self.diagnostics.raise_error(&perm.file, perm.src_pos, perm.line_number, format!("failed to re-read '{}' to instantiate generic procedure '{}'", base.file, base.name));
                return None;
            };
            lexer.reset(base.file.clone(), src, base.src_pos, base.line_number);
        } else {
            let src = lexer.source().to_vec();
            lexer.reset(base.file.clone(), src, base.src_pos, base.line_number);
        }
        while lexer.current().ty != TokenType::Lparen && lexer.current().ty != TokenType::Eof {
            lexer.advance(1);
        }

        let namespace_segments: Vec<&str> = base.namespace.split('\\').filter(|s| !s.is_empty()).collect();
        for segment in &namespace_segments {
            self.table.push_namespace(*segment);
        }
        self.table.push_scope();
        for (generic_name, arg) in base.generic_type_names.iter().zip(type_args.iter()) {
            self.table.create_type_alias(generic_name.clone(), arg.clone());
        }

        let saved_file = Rc::clone(&self.current_file);
        self.current_file = Rc::from(base.file.as_str());

        let result = self.parse_proc_signature_and_body(lexer);

        for generic_name in &base.generic_type_names {
            self.table.delete_type_alias(generic_name);
        }
        let _ = self.table.pop_scope();
        for _ in &namespace_segments {
            let _ = self.table.pop_namespace();
        }

        let node = result.map(|(params, return_type, body, is_method_of)| {
            let proc_ty = TypeData::procedure(params.iter().map(|(_, t)| t.clone()).collect(), return_type.clone());
            if let Some(sym) = self.table.lookup_symbol_mut(perm_symbol_index) {
                sym.ty = proc_ty;
            }
            let node = self.push_node(
                AstNodeData::ProcDecl { name: perm.name.clone(), generic_type_names: Vec::new(), params, return_type, symbol_index: perm_symbol_index, body: body.clone(), is_method_of },
                base.src_pos,
                base.line_number,
            );
            self.ast.attach_children(node, &body);
            self.ast.toplevel.push(node);
            node
        });

        self.current_file = saved_file;
        node
    }
}

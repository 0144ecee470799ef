//! The type expression sub-parser.
//!
//! Reads any number of pointer markers `^`, then a primitive keyword, a
//! procedure signature, or a namespaced struct identifier, and finally
//! any number of array brackets which prepend dimensions in reverse onto
//! `array_lengths`. The original's surviving parser files never settled
//! on one `parse_type` routine (`parser_typetbl.cpp` / `typetbl.cpp` are
//! a duplicate pair); this implementation follows the simpler, directly
//! stated contract.

use tak_entity::{Primitive, TypeData, TypeFlags};
use tak_lexer::{Lexer, TokenType};

use crate::parser::Parser;

impl Parser {
    /// Parses one type expression, installing a placeholder type for any
    /// struct name not yet declared (resolved or reported by the
    /// post-parser's leftover-placeholder sweep).
    pub fn parse_type(&mut self, lexer: &mut Lexer) -> Option<TypeData> {
        let mut pointer_depth: u16 = 0;
        while lexer.current().ty == TokenType::Caret {
            pointer_depth += 1;
            lexer.advance(1);
        }

        let mut ty = if lexer.current().ty == TokenType::KwProc {
            self.parse_procedure_type(lexer)?
        } else if let Some(prim) = Self::primitive_from_token(lexer.current().ty) {
            lexer.advance(1);
            TypeData::primitive(prim)
        } else if lexer.current().ty == TokenType::Identifier {
            self.parse_struct_type_reference(lexer)?
        } else {
            lexer.report(&mut self.diagnostics, "Expected a type.");
            return None;
        };

        for _ in 0..pointer_depth {
            ty = ty.pointer_to();
        }

        let mut dims = Vec::new();
        while lexer.current().ty == TokenType::Lsquarebracket {
            lexer.advance(1);
            let len = if lexer.current().ty == TokenType::IntegerLiteral {
                let value = tak_lexer::numeric::parse_integer_value(&lexer.current().value).unwrap_or(0);
                lexer.advance(1);
                value as u32
            } else {
                0
            };
            if lexer.current().ty != TokenType::Rsquarebracket {
                lexer.report(&mut self.diagnostics, "Expected ']'.");
                return None;
            }
            lexer.advance(1);
            dims.push(len);
        }

        if !dims.is_empty() {
            dims.reverse();
            ty.array_lengths = dims;
            ty.flags.insert(TypeFlags::ARRAY);
        }

        Some(ty)
    }

    fn primitive_from_token(ty: TokenType) -> Option<Primitive> {
        Some(match ty {
            TokenType::KwU8 => Primitive::U8,
            TokenType::KwI8 => Primitive::I8,
            TokenType::KwU16 => Primitive::U16,
            TokenType::KwI16 => Primitive::I16,
            TokenType::KwU32 => Primitive::U32,
            TokenType::KwI32 => Primitive::I32,
            TokenType::KwU64 => Primitive::U64,
            TokenType::KwI64 => Primitive::I64,
            TokenType::KwF32 => Primitive::F32,
            TokenType::KwF64 => Primitive::F64,
            TokenType::KwBool => Primitive::Bool,
            TokenType::KwVoid => Primitive::Void,
            _ => return None,
        })
    }

    fn parse_procedure_type(&mut self, lexer: &mut Lexer) -> Option<TypeData> {
        lexer.advance(1);
        if lexer.current().ty != TokenType::Lparen {
            lexer.report(&mut self.diagnostics, "Expected '(' in procedure type.");
            return None;
        }
        lexer.advance(1);

        let mut params = Vec::new();
        while lexer.current().ty != TokenType::Rparen {
            params.push(self.parse_type(lexer)?);
            if lexer.current().ty == TokenType::Comma {
                lexer.advance(1);
            } else {
                break;
            }
        }
        if lexer.current().ty != TokenType::Rparen {
            lexer.report(&mut self.diagnostics, "Expected ')' in procedure type.");
            return None;
        }
        lexer.advance(1);

        let return_type = if lexer.current().ty == TokenType::Arrow {
            lexer.advance(1);
            Some(self.parse_type(lexer)?)
        } else {
            None
        };

        Some(TypeData::procedure(params, return_type))
    }

    fn parse_struct_type_reference(&mut self, lexer: &mut Lexer) -> Option<TypeData> {
        let name = self.parse_namespaced_name(lexer)?;
        if let Some(alias) = self.table.lookup_type_alias(&name) {
            return Some(alias.clone());
        }

        let canonical = self.table.get_canonical_type_name(&name);
        if !self.table.type_exists(&canonical) {
            let (pos, line) = (lexer.current().src_pos, lexer.current().line);
            self.table.create_placeholder_type(canonical.clone(), pos, line, self.current_file.to_string());
        }

        if lexer.current().ty == TokenType::Lessthan && self.table.lookup_type(&canonical).is_some_and(tak_entity::UserType::is_generic_base) {
            return self.parse_generic_struct_instantiation(canonical, lexer);
        }

        Some(TypeData::struct_named(canonical))
    }

    /// `Name<Arg, ...>` in a type position. Registers a mangled-name
    /// permutation type entry, left unresolved (no members yet) for the
    /// post-parser's generic-structure pass to fill in.
    fn parse_generic_struct_instantiation(&mut self, base_canonical: String, lexer: &mut Lexer) -> Option<TypeData> {
        let (pos, line) = (lexer.current().src_pos, lexer.current().line);
        lexer.advance(1);
        let mut args = Vec::new();
        while lexer.current().ty != TokenType::Greaterthan {
            args.push(self.parse_type(lexer)?);
            if lexer.current().ty == TokenType::Comma {
                lexer.advance(1);
            } else {
                break;
            }
        }
        if lexer.current().ty != TokenType::Greaterthan {
            lexer.report(&mut self.diagnostics, "Expected '>' closing generic type argument list.");
            return None;
        }
        lexer.advance(1);

        let base_leaf = base_canonical.trim_start_matches('\\').rsplit('\\').next().unwrap_or(&base_canonical);
        let mangled = format!("{base_leaf}[{}]", args.iter().map(TypeData::mangled_name).collect::<Vec<_>>().join(","));

        if !self.table.type_exists(&mangled) {
            let mut permutation = tak_entity::UserType::new(pos, line, self.current_file.to_string());
            permutation.flags.insert(tak_entity::UserTypeFlags::GENERIC_PERMUTATION);
            permutation.generic_base = Some(base_canonical);
            permutation.generic_args = Some(args);
            self.table.create_type(mangled.clone(), permutation);
        }

        Some(TypeData::struct_named(mangled))
    }
}

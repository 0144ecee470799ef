//! Generic structure monomorphization: for each permutation type left
//! pending by a `Name<Args>` type reference, substitute the base
//! struct's generic parameter names with the concrete arguments across
//! every member, recursively, instantiating any further nested generic
//! member types it discovers along the way.
//!
//! No implementation of this pass survives in the retrieved source tree
//! (`postparse_permute_generic_structures` / `postparse_try_permute_member`
//! are declared in `include/postparser.hpp` but defined nowhere in the
//! corpus); this follows the same scan-clear-resolve shape as the
//! generic procedure pass it sits beside, since both monomorphize a
//! base against a positional argument list keyed by parameter name.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use tak_entity::{MemberData, TypeData, TypeFlags, TypeName, UserType, UserTypeFlags};
use tak_parser::Parser;

pub(crate) fn permute_generic_structures(parser: &mut Parser) -> bool {
    loop {
        let Some(perm_name) = parser.table.find_pending_generic_struct_permutation() else {
            break;
        };
        let Some(perm) = parser.table.lookup_type(&perm_name).cloned() else {
            continue;
        };

        let base_name = perm.generic_base.clone().unwrap_or_default();
        let args = perm.generic_args.clone().unwrap_or_default();

        let Some(base) = parser.table.lookup_type(&base_name).cloned() else {
            parser.diagnostics.raise_error(
                &perm.file_first_used,
                perm.pos_first_used,
                perm.line_first_used,
                format!("Unknown generic base type \"{base_name}\"."),
            );
            clear_pending(parser, &perm_name);
            continue;
        };

        let generic_names = base.generic_type_names.clone().unwrap_or_default();
        if generic_names.len() != args.len() {
            parser.diagnostics.raise_error(
                &perm.file_first_used,
                perm.pos_first_used,
                perm.line_first_used,
                format!("Expected {} generic type argument(s) for '{base_name}', found {}.", generic_names.len(), args.len()),
            );
            clear_pending(parser, &perm_name);
            continue;
        }

        let substitutions: FxHashMap<String, TypeData> = generic_names.into_iter().zip(args).collect();
        let substituted_members: Vec<MemberData> =
            base.members.iter().map(|member| MemberData { name: member.name.clone(), ty: substitute(parser, &member.ty, &substitutions) }).collect();

        if let Some(entry) = parser.table.lookup_type_mut(&perm_name) {
            entry.members = substituted_members;
            entry.flags.remove(UserTypeFlags::GENERIC_PERMUTATION);
            entry.generic_base = None;
            entry.generic_args = None;
        }
    }

    !parser.diagnostics.failed()
}

fn clear_pending(parser: &mut Parser, perm_name: &str) {
    if let Some(entry) = parser.table.lookup_type_mut(perm_name) {
        entry.flags.remove(UserTypeFlags::GENERIC_PERMUTATION);
    }
}

/// Substitutes every occurrence of a generic parameter name in `ty` with
/// its mapped concrete argument, recursing into procedure parameter/
/// return types and instantiating (or reusing) a concrete permutation
/// for any nested nominal generic reference it finds.
fn substitute(parser: &mut Parser, ty: &TypeData, substitutions: &FxHashMap<String, TypeData>) -> TypeData {
    if let TypeName::Struct(name) = &ty.name {
        if let Some(concrete) = substitutions.get(name) {
            return wrap_like(ty, concrete.clone());
        }
        let nested = parser.table.lookup_type(name).and_then(|t| t.generic_base.clone().zip(t.generic_args.clone()));
        if let Some((nested_base, nested_args)) = nested {
            let substituted_args: Vec<TypeData> = nested_args.iter().map(|arg| substitute(parser, arg, substitutions)).collect();
            let mangled = mangled_permutation_name(&nested_base, &substituted_args);
            if !parser.table.type_exists(&mangled) {
                let mut permutation = UserType::new(ty_location_hint(ty), 0, String::new());
                permutation.flags.insert(UserTypeFlags::GENERIC_PERMUTATION);
                permutation.generic_base = Some(nested_base);
                permutation.generic_args = Some(substituted_args);
                parser.table.create_type(mangled.clone(), permutation);
            }
            return wrap_like(ty, TypeData::struct_named(mangled));
        }
    }

    let mut out = ty.clone();
    if let Some(params) = &ty.parameters {
        out.parameters = Some(Rc::new(params.iter().map(|p| substitute(parser, p, substitutions)).collect()));
    }
    if let Some(ret) = &ty.return_type {
        out.return_type = Some(Rc::new(substitute(parser, ret, substitutions)));
    }
    out
}

/// `TypeData` doesn't itself carry a source position; reuses the pointer
/// depth as an otherwise-meaningless placeholder so two different call
/// sites creating the identical nested permutation don't collide over a
/// meaningful field. Purely cosmetic: nothing reads a permutation type's
/// `pos_first_used` once it's resolved.
fn ty_location_hint(ty: &TypeData) -> u32 {
    u32::from(ty.pointer_depth)
}

fn mangled_permutation_name(base_canonical: &str, args: &[TypeData]) -> String {
    let leaf = base_canonical.trim_start_matches('\\').rsplit('\\').next().unwrap_or(base_canonical);
    format!("{leaf}[{}]", args.iter().map(TypeData::mangled_name).collect::<Vec<_>>().join(","))
}

fn wrap_like(use_site: &TypeData, mut concrete: TypeData) -> TypeData {
    if use_site.pointer_depth > 0 {
        concrete.pointer_depth += use_site.pointer_depth;
        concrete.flags.insert(TypeFlags::POINTER);
    }
    if !use_site.array_lengths.is_empty() {
        let mut lengths = use_site.array_lengths.clone();
        lengths.extend(concrete.array_lengths.iter().copied());
        concrete.array_lengths = lengths;
        concrete.flags.insert(TypeFlags::ARRAY);
    }
    concrete
}

#[cfg(test)]
mod tests {
    use tak_common::CompilerOptions;
    use tak_entity::Primitive;
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
    fn instantiated_member_type_is_substituted_with_the_concrete_argument() {
        let mut parser = parse(
            r#"
            struct Box<T> {
                value: T;
            }

            x : Box<i32> = {1};
            "#,
        );
        assert!(!parser.diagnostics.failed(), "{:?}", parser.diagnostics.error_count());
        assert!(permute_generic_structures(&mut parser));

        let perm = parser.table.lookup_type("Box[I32]").expect("permutation type registered");
        assert!(!perm.is_unresolved_generic_permutation());
        assert_eq!(perm.members.len(), 1);
        assert_eq!(perm.members[0].ty.name, TypeName::Primitive(Primitive::I32));
    }

    #[test]
    fn pointer_to_generic_parameter_keeps_its_pointer_depth_after_substitution() {
        let mut parser = parse(
            r#"
            struct Node<T> {
                value: ^T;
            }

            x : Node<i32> = {};
            "#,
        );
        assert!(permute_generic_structures(&mut parser));
        let perm = parser.table.lookup_type("Node[I32]").expect("permutation type registered");
        assert_eq!(perm.members[0].ty.pointer_depth, 1);
        assert_eq!(perm.members[0].ty.name, TypeName::Primitive(Primitive::I32));
    }

    #[test]
    fn no_pending_permutations_is_a_no_op() {
        let mut parser = parse("x : i32 = 5;");
        assert!(permute_generic_structures(&mut parser));
    }
}

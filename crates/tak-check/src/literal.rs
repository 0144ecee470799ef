//! Singleton literal typing: integer/float literals produce a
//! `NON_CONCRETE` default type that promotes away on first coercion;
//! strings, chars, booleans, and `nullptr` are already concrete.
//!
//! Grounded in the declared-but-bodyless `convert_int_lit_to_type` /
//! `convert_float_lit_to_type` (`checker.hpp`) and this system's
//! singleton-literal contract.

use tak_entity::{Primitive, TypeData, TypeFlags};
use tak_parser::LiteralKind;

#[must_use]
pub fn convert_int_lit_to_type(text: &str) -> TypeData {
    let parsed = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        i128::from_str_radix(hex, 16).unwrap_or(0)
    } else {
        text.parse::<i128>().unwrap_or(0)
    };

    let prim = if parsed >= i128::from(i32::MIN) && parsed <= i128::from(i32::MAX) { Primitive::I32 } else { Primitive::I64 };
    let mut ty = TypeData::primitive(prim);
    ty.flags.insert(TypeFlags::NON_CONCRETE | TypeFlags::RVALUE);
    ty
}

#[must_use]
pub fn convert_float_lit_to_type(_text: &str) -> TypeData {
    let mut ty = TypeData::primitive(Primitive::F64);
    ty.flags.insert(TypeFlags::NON_CONCRETE | TypeFlags::RVALUE);
    ty
}

#[must_use]
pub fn convert_string_lit_to_type(text: &str) -> TypeData {
    let mut ty = TypeData::primitive(Primitive::U8);
    ty.array_lengths = vec![text.len() as u32 + 1];
    ty.flags.insert(TypeFlags::ARRAY | TypeFlags::RVALUE | TypeFlags::CONSTANT);
    ty
}

#[must_use]
pub fn convert_char_lit_to_type() -> TypeData {
    let mut ty = TypeData::primitive(Primitive::U8);
    ty.flags.insert(TypeFlags::RVALUE);
    ty
}

#[must_use]
pub fn convert_bool_lit_to_type() -> TypeData {
    let mut ty = TypeData::primitive(Primitive::Bool);
    ty.flags.insert(TypeFlags::RVALUE);
    ty
}

/// The distinguished "null pointer" type: a non-concrete `void*` that
/// [`crate::coerce::is_type_coercion_permissible`] accepts against any
/// pointer target.
#[must_use]
pub fn nullptr_type() -> TypeData {
    let mut ty = TypeData::primitive(Primitive::Void).pointer_to();
    ty.flags.insert(TypeFlags::NON_CONCRETE | TypeFlags::RVALUE);
    ty
}

#[must_use]
pub fn singleton_literal_type(kind: LiteralKind, text: &str) -> TypeData {
    match kind {
        LiteralKind::Integer => convert_int_lit_to_type(text),
        LiteralKind::Float => convert_float_lit_to_type(text),
        LiteralKind::String => convert_string_lit_to_type(text),
        LiteralKind::Char => convert_char_lit_to_type(),
        LiteralKind::Bool => convert_bool_lit_to_type(),
        LiteralKind::Nullptr => nullptr_type(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_integer_literal_defaults_to_i32() {
        let ty = convert_int_lit_to_type("5");
        assert_eq!(ty.name, tak_entity::TypeName::Primitive(Primitive::I32));
        assert!(ty.is_non_concrete());
    }

    #[test]
    fn integer_literal_beyond_i32_range_widens_to_i64() {
        let ty = convert_int_lit_to_type("5000000000");
        assert_eq!(ty.name, tak_entity::TypeName::Primitive(Primitive::I64));
    }

    #[test]
    fn hex_literal_parses_through_its_prefix() {
        let ty = convert_int_lit_to_type("0xFF");
        assert_eq!(ty.name, tak_entity::TypeName::Primitive(Primitive::I32));
    }

    #[test]
    fn string_literal_is_a_u8_array_sized_for_its_text_plus_terminator() {
        let ty = convert_string_lit_to_type("hi");
        assert!(ty.is_array());
        assert_eq!(ty.array_lengths, vec![3]);
    }
}

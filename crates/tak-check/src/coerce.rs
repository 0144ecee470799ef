//! Type compatibility: promotion of non-concrete literal types, coercion
//! checks for assignment/argument passing/braced initializers, the cast
//! table, and the operator-eligibility predicates `visit_node` consults
//! before dispatching on an operator class.
//!
//! Grounded in the declarations in `checker.hpp` (`types_are_identical`,
//! `type_promote_non_concrete`, `is_type_coercion_permissible`,
//! `is_type_cast_permissible`, `is_type_arithmetic_eligible`,
//! `is_type_bwop_eligible`, `is_type_lop_eligible`) and the address-of/
//! dereference helpers bodied in `src/checker/get.cpp`
//! (`get_addressed_type`, `get_dereferenced_type`). None of the other
//! function bodies declared there survive in the retrieved source, so
//! the promotion/coercion rules below are written directly from this
//! system's semantic-checker contract rather than ported line for line.

use tak_entity::{Primitive, TypeData, TypeFlags, TypeKind, TypeName};
use tak_lexer::TokenType;

#[must_use]
pub fn types_are_identical(a: &TypeData, b: &TypeData) -> bool {
    a.same_underlying_type(b)
}

/// The `nullptr` literal's distinguished type: a non-concrete void
/// pointer that coerces to any pointer type.
#[must_use]
pub fn is_null_pointer_type(ty: &TypeData) -> bool {
    ty.is_non_concrete() && ty.pointer_depth > 0 && matches!(ty.name, TypeName::Primitive(Primitive::Void))
}

#[must_use]
pub fn is_type_arithmetic_eligible(ty: &TypeData, operator: TokenType) -> bool {
    let TypeName::Primitive(p) = ty.name else { return false };
    if matches!(p, Primitive::Bool | Primitive::Void) {
        return false;
    }
    operator != TokenType::Percent || !p.is_float()
}

#[must_use]
pub fn is_type_bwop_eligible(ty: &TypeData) -> bool {
    matches!(ty.name, TypeName::Primitive(p) if p.is_integer())
}

#[must_use]
pub fn is_type_lop_eligible(ty: &TypeData) -> bool {
    ty.kind == TypeKind::Primitive || ty.is_pointer()
}

/// Whichever of two operand primitives a binary operator's result
/// should carry once both sides have been visited: a non-concrete side
/// promotes to the concrete side, two non-concrete sides promote to the
/// wider of their default widths, a same-width signed/unsigned mix picks
/// the unsigned primitive, and a float always beats an int regardless of
/// rank.
#[must_use]
pub fn promote_primitive_pair(left: Primitive, left_concrete: bool, right: Primitive, right_concrete: bool) -> Primitive {
    if !left_concrete && right_concrete {
        return right;
    }
    if left_concrete && !right_concrete {
        return left;
    }
    if left.is_float() != right.is_float() {
        return if left.is_float() { left } else { right };
    }
    if left.width() != right.width() {
        return if left.width() > right.width() { left } else { right };
    }
    if left.is_signed() != right.is_signed() {
        return if left.is_signed() { right } else { left };
    }
    left
}

/// Promotes `left`/`right` to their common operand type for a binary
/// expression, or `None` if either side isn't a bare primitive (the
/// caller reports this as an incompatible-operand-types error).
#[must_use]
pub fn promote_binary_operands(left: &TypeData, right: &TypeData) -> Option<TypeData> {
    let TypeName::Primitive(lp) = left.name else { return None };
    let TypeName::Primitive(rp) = right.name else { return None };
    let result = promote_primitive_pair(lp, !left.is_non_concrete(), rp, !right.is_non_concrete());
    let mut out = TypeData::primitive(result);
    out.flags.insert(TypeFlags::RVALUE);
    Some(out)
}

/// Whether a value of type `value` may be assigned, passed, or
/// initialized into a slot declared as `target`.
#[must_use]
pub fn is_type_coercion_permissible(target: &TypeData, value: &TypeData) -> bool {
    if target.is_pointer() && is_null_pointer_type(value) {
        return true;
    }
    if target.pointer_depth != value.pointer_depth || target.array_lengths != value.array_lengths {
        return false;
    }
    match (&target.name, &value.name) {
        (TypeName::Primitive(tp), TypeName::Primitive(vp)) => {
            if value.is_non_concrete() {
                !(vp.is_float() && !tp.is_float())
            } else {
                tp == vp
            }
        }
        (TypeName::Struct(tn), TypeName::Struct(vn)) => tn == vn,
        (TypeName::None, TypeName::None) => target.kind == TypeKind::Procedure && value.kind == TypeKind::Procedure,
        _ => false,
    }
}

/// Integer <-> integer, integer <-> float, float <-> float, pointer <->
/// pointer, and pointer <-> integer of matching width are the only
/// permissible casts; `void` is never valid on either side of a value
/// cast.
#[must_use]
pub fn is_type_cast_permissible(from: &TypeData, to: &TypeData) -> bool {
    if from.is_void() && !from.is_pointer() {
        return false;
    }
    if to.is_void() && !to.is_pointer() {
        return false;
    }
    if from.is_pointer() && to.is_pointer() {
        return true;
    }
    let numeric = |t: &TypeData| !t.is_pointer() && matches!(t.name, TypeName::Primitive(p) if !matches!(p, Primitive::Void));
    if from.is_pointer() != to.is_pointer() {
        let (ptr, int) = if from.is_pointer() { (from, to) } else { (to, from) };
        return ptr.array_lengths.is_empty() && numeric(int) && matches!(int.name, TypeName::Primitive(p) if p.width() == Primitive::U64.width());
    }
    numeric(from) && numeric(to)
}

/// Reading through a subscript, a dereference, or a member access:
/// removes one array dimension or one pointer level and clears `RVALUE`
/// (the result is addressable). Ported from `get_dereferenced_type`
/// (`src/checker/get.cpp`); rejects a bare (non-pointer) procedure type
/// and a bare `void*`.
#[must_use]
pub fn dereferenced_type(ty: &TypeData) -> Option<TypeData> {
    let mut out = if ty.is_array() {
        ty.clone().decayed()?
    } else if ty.is_pointer() {
        let d = ty.clone().dereferenced()?;
        d
    } else {
        return None;
    };

    if out.kind == TypeKind::Procedure && !out.is_pointer() {
        return None;
    }
    if out.is_void() && !out.is_pointer() {
        return None;
    }
    out.flags.remove(TypeFlags::RVALUE);
    Some(out)
}

/// Unary `&`: ported from `get_addressed_type` (`src/checker/get.cpp`).
/// Rejects array names and existing rvalues.
#[must_use]
pub fn addressed_type(ty: &TypeData) -> Option<TypeData> {
    if ty.is_array() || ty.flags.contains(TypeFlags::RVALUE) {
        return None;
    }
    let mut out = ty.clone().pointer_to();
    out.flags.insert(TypeFlags::RVALUE);
    Some(out)
}

/// Whether an lvalue of this type may appear on the left of `=`: not
/// `CONSTANT`, not `RVALUE`, and not a bare array name.
#[must_use]
pub fn is_assignable(ty: &TypeData) -> bool {
    !ty.flags.contains(TypeFlags::CONSTANT) && !ty.flags.contains(TypeFlags::RVALUE) && !ty.is_array()
}

#[must_use]
pub fn are_array_types_equivalent(a: &TypeData, b: &TypeData) -> bool {
    a.is_array() && b.is_array() && a.same_underlying_type(b)
}

/// A type that can't stand as the element type of an array whose size is
/// being inferred from a braced initializer: bare `void`, or a
/// non-pointer procedure type.
#[must_use]
pub fn is_type_invalid_in_inferred_context(ty: &TypeData) -> bool {
    (ty.is_void() && !ty.is_pointer()) || (ty.kind == TypeKind::Procedure && !ty.is_pointer())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_concrete_integer_literal_coerces_to_any_concrete_integer() {
        let target = TypeData::primitive(Primitive::I64);
        let mut literal = TypeData::primitive(Primitive::I32);
        literal.flags.insert(TypeFlags::NON_CONCRETE);
        assert!(is_type_coercion_permissible(&target, &literal));
    }

    #[test]
    fn float_literal_does_not_coerce_to_an_integer_target() {
        let target = TypeData::primitive(Primitive::I32);
        let mut literal = TypeData::primitive(Primitive::F64);
        literal.flags.insert(TypeFlags::NON_CONCRETE);
        assert!(!is_type_coercion_permissible(&target, &literal));
    }

    #[test]
    fn nullptr_coerces_to_any_pointer() {
        let mut nullptr_ty = TypeData::primitive(Primitive::Void).pointer_to();
        nullptr_ty.flags.insert(TypeFlags::NON_CONCRETE);
        let target = TypeData::primitive(Primitive::I32).pointer_to();
        assert!(is_type_coercion_permissible(&target, &nullptr_ty));
    }

    #[test]
    fn promotion_widens_to_the_larger_of_two_non_concrete_operands() {
        let mut a = TypeData::primitive(Primitive::I32);
        a.flags.insert(TypeFlags::NON_CONCRETE);
        let mut b = TypeData::primitive(Primitive::I64);
        b.flags.insert(TypeFlags::NON_CONCRETE);
        let result = promote_binary_operands(&a, &b).unwrap();
        assert_eq!(result.name, TypeName::Primitive(Primitive::I64));
    }

    #[test]
    fn float_dominates_int_regardless_of_rank() {
        let a = TypeData::primitive(Primitive::I64);
        let b = TypeData::primitive(Primitive::F32);
        let result = promote_binary_operands(&a, &b).unwrap();
        assert_eq!(result.name, TypeName::Primitive(Primitive::F32));
    }

    #[test]
    fn same_width_signed_unsigned_mix_picks_unsigned() {
        let a = TypeData::primitive(Primitive::I32);
        let b = TypeData::primitive(Primitive::U32);
        let result = promote_binary_operands(&a, &b).unwrap();
        assert_eq!(result.name, TypeName::Primitive(Primitive::U32));
    }

    #[test]
    fn dereferencing_a_pointer_clears_rvalue_and_one_level_of_depth() {
        let mut ty = TypeData::primitive(Primitive::I32).pointer_to();
        ty.flags.insert(TypeFlags::RVALUE);
        let deref = dereferenced_type(&ty).unwrap();
        assert_eq!(deref.pointer_depth, 0);
        assert!(!deref.flags.contains(TypeFlags::RVALUE));
    }

    #[test]
    fn dereferencing_a_bare_void_pointer_target_is_rejected() {
        let ty = TypeData::primitive(Primitive::Void).pointer_to().pointer_to();
        let deref = dereferenced_type(&ty).unwrap();
        assert!(deref.is_void());
        assert!(deref.is_pointer());

        let bare_void = TypeData::primitive(Primitive::Void).pointer_to();
        let deref_again = dereferenced_type(&bare_void).unwrap();
        assert!(dereferenced_type(&deref_again).is_none());
    }

    #[test]
    fn addressing_an_array_name_is_rejected() {
        let mut ty = TypeData::primitive(Primitive::I32);
        ty.array_lengths = vec![4];
        ty.flags.insert(TypeFlags::ARRAY);
        assert!(addressed_type(&ty).is_none());
    }

    #[test]
    fn cast_between_pointer_and_matching_width_integer_is_permitted() {
        let ptr = TypeData::primitive(Primitive::I32).pointer_to();
        let wide_int = TypeData::primitive(Primitive::U64);
        assert!(is_type_cast_permissible(&ptr, &wide_int));
        assert!(is_type_cast_permissible(&wide_int, &ptr));

        let narrow_int = TypeData::primitive(Primitive::I32);
        assert!(!is_type_cast_permissible(&ptr, &narrow_int));
    }

    #[test]
    fn cast_to_or_from_bare_void_is_rejected() {
        let void_ty = TypeData::primitive(Primitive::Void);
        let int_ty = TypeData::primitive(Primitive::I32);
        assert!(!is_type_cast_permissible(&void_ty, &int_ty));
        assert!(!is_type_cast_permissible(&int_ty, &void_ty));
    }
}

//! `TypeData`: the canonical type description shared by symbols, struct
//! members, and every checked expression.
//!
//! Grounded in `tak::TypeData` (`include/var_types.hpp`), generalized to
//! a fuller flag set than the original's `type_flags` enum carries —
//! (`FOREIGN_C`, `INTERNAL`, `PLACEHOLDER`, `GENBASE`, `GENPERM` are
//! missing from the surviving header, but are exercised by
//! `src/entity_table/symbols.cpp`'s `ENTITY_PLACEHOLDER` /
//! `ENTITY_GENPERM` and required by the post-parser's monomorphization
//! contract).

use std::rc::Rc;

use bitflags::bitflags;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct TypeFlags: u32 {
        const CONSTANT       = 1 << 0;
        const FOREIGN        = 1 << 1;
        const POINTER        = 1 << 2;
        const GLOBAL         = 1 << 3;
        const ARRAY          = 1 << 4;
        const PROCARG        = 1 << 5;
        const DEFAULT_INIT   = 1 << 6;
        const INFERRED       = 1 << 7;
        const NON_CONCRETE    = 1 << 8;
        const RVALUE         = 1 << 9;
        const UNINITIALIZED  = 1 << 10;
        const PROC_METHOD    = 1 << 11;
        const PROC_VARARGS   = 1 << 12;
        const FOREIGN_C      = 1 << 13;
        const INTERNAL       = 1 << 14;
        const PLACEHOLDER    = 1 << 15;
        const GENBASE        = 1 << 16;
        const GENPERM        = 1 << 17;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TypeKind {
    #[default]
    None,
    Primitive,
    Procedure,
    Struct,
}

/// The twelve primitive types, plus `void`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
    Bool,
    Void,
}

impl Primitive {
    #[must_use]
    pub fn is_signed(self) -> bool {
        matches!(self, Primitive::I8 | Primitive::I16 | Primitive::I32 | Primitive::I64 | Primitive::F32 | Primitive::F64)
    }

    #[must_use]
    pub fn is_float(self) -> bool {
        matches!(self, Primitive::F32 | Primitive::F64)
    }

    #[must_use]
    pub fn is_integer(self) -> bool {
        !self.is_float() && !matches!(self, Primitive::Bool | Primitive::Void)
    }

    /// Bit width, used by the checker's numeric-promotion rules and
    /// cast-table width checks.
    #[must_use]
    pub fn width(self) -> u32 {
        match self {
            Primitive::U8 | Primitive::I8 => 8,
            Primitive::U16 | Primitive::I16 => 16,
            Primitive::U32 | Primitive::I32 | Primitive::F32 => 32,
            Primitive::U64 | Primitive::I64 | Primitive::F64 => 64,
            Primitive::Bool => 8,
            Primitive::Void => 0,
        }
    }

    #[must_use]
    pub fn mangled_name(self) -> &'static str {
        match self {
            Primitive::U8 => "U8",
            Primitive::I8 => "I8",
            Primitive::U16 => "U16",
            Primitive::I16 => "I16",
            Primitive::U32 => "U32",
            Primitive::I32 => "I32",
            Primitive::U64 => "U64",
            Primitive::I64 => "I64",
            Primitive::F32 => "F32",
            Primitive::F64 => "F64",
            Primitive::Bool => "BOOL",
            Primitive::Void => "VOID",
        }
    }

    #[must_use]
    pub fn from_keyword(text: &str) -> Option<Self> {
        Some(match text {
            "u8" => Primitive::U8,
            "i8" => Primitive::I8,
            "u16" => Primitive::U16,
            "i16" => Primitive::I16,
            "u32" => Primitive::U32,
            "i32" => Primitive::I32,
            "u64" => Primitive::U64,
            "i64" => Primitive::I64,
            "f32" => Primitive::F32,
            "f64" => Primitive::F64,
            "bool" => Primitive::Bool,
            "void" => Primitive::Void,
            _ => return None,
        })
    }
}

/// The `name` field of `TypeData`: a primitive, a fully qualified struct
/// path, or empty (procedures carry no name of their own).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeName {
    None,
    Primitive(Primitive),
    Struct(String),
}

/// A fully resolved type expression.
///
/// `parameters` and `return_type` use `Rc` so generic permutations and
/// compose-block methods can share signature fragments without deep
/// copies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeData {
    pub kind: TypeKind,
    pub name: TypeName,
    pub pointer_depth: u16,
    pub array_lengths: Vec<u32>,
    pub flags: TypeFlags,
    pub parameters: Option<Rc<Vec<TypeData>>>,
    pub return_type: Option<Rc<TypeData>>,
    pub sym_ref: u32,
}

impl Default for TypeData {
    fn default() -> Self {
        Self {
            kind: TypeKind::None,
            name: TypeName::None,
            pointer_depth: 0,
            array_lengths: Vec::new(),
            flags: TypeFlags::empty(),
            parameters: None,
            return_type: None,
            sym_ref: 0,
        }
    }
}

impl TypeData {
    #[must_use]
    pub fn primitive(prim: Primitive) -> Self {
        Self { kind: TypeKind::Primitive, name: TypeName::Primitive(prim), ..Default::default() }
    }

    #[must_use]
    pub fn struct_named(canonical_name: impl Into<String>) -> Self {
        Self { kind: TypeKind::Struct, name: TypeName::Struct(canonical_name.into()), ..Default::default() }
    }

    #[must_use]
    pub fn procedure(parameters: Vec<TypeData>, return_type: Option<TypeData>) -> Self {
        Self {
            kind: TypeKind::Procedure,
            name: TypeName::None,
            parameters: Some(Rc::new(parameters)),
            return_type: return_type.map(Rc::new),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn is_pointer(&self) -> bool {
        self.flags.contains(TypeFlags::POINTER)
    }

    #[must_use]
    pub fn is_array(&self) -> bool {
        self.flags.contains(TypeFlags::ARRAY)
    }

    #[must_use]
    pub fn is_void(&self) -> bool {
        matches!(self.name, TypeName::Primitive(Primitive::Void))
    }

    #[must_use]
    pub fn is_non_concrete(&self) -> bool {
        self.flags.contains(TypeFlags::NON_CONCRETE)
    }

    /// Checks structural invariants that a well-formed `TypeData` must
    /// hold.
    #[must_use]
    pub fn invariants_hold(&self) -> bool {
        if self.is_pointer() != (self.pointer_depth > 0) {
            return false;
        }
        if self.is_array() != !self.array_lengths.is_empty() {
            return false;
        }
        if self.kind == TypeKind::Procedure && self.name != TypeName::None {
            return false;
        }
        if self.kind != TypeKind::Procedure && self.name == TypeName::None {
            return false;
        }
        if self.flags.contains(TypeFlags::RVALUE) && self.is_array() {
            return false;
        }
        true
    }

    /// Add one level of pointer indirection (unary `&`, or a leading `^`
    /// in a type expression).
    #[must_use]
    pub fn pointer_to(mut self) -> Self {
        self.pointer_depth += 1;
        self.flags.insert(TypeFlags::POINTER);
        self
    }

    /// Remove one level of pointer indirection (unary `*`). Returns
    /// `None` if this type is not a pointer.
    #[must_use]
    pub fn dereferenced(mut self) -> Option<Self> {
        if self.pointer_depth == 0 {
            return None;
        }
        self.pointer_depth -= 1;
        if self.pointer_depth == 0 {
            self.flags.remove(TypeFlags::POINTER);
        }
        Some(self)
    }

    /// Remove one array dimension (reading an element via subscript or
    /// member access). Returns `None` if this type is not an array.
    #[must_use]
    pub fn decayed(mut self) -> Option<Self> {
        if self.array_lengths.is_empty() {
            return None;
        }
        self.array_lengths.remove(0);
        if self.array_lengths.is_empty() {
            self.flags.remove(TypeFlags::ARRAY);
        }
        self.flags.remove(TypeFlags::RVALUE);
        Some(self)
    }

    /// Structurally equal ignoring flags that describe the *use site*
    /// rather than the *type* (`RVALUE`, `CONSTANT`, `PROCARG`, …) —
    /// used for array-element homogeneity and parameter/argument
    /// comparison.
    #[must_use]
    pub fn same_underlying_type(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.name == other.name
            && self.pointer_depth == other.pointer_depth
            && self.array_lengths == other.array_lengths
    }

    /// A short, stable mangled representation used to name generic
    /// procedure/structure permutations, e.g. `id[I32]`.
    #[must_use]
    pub fn mangled_name(&self) -> String {
        let mut out = String::new();
        for _ in 0..self.pointer_depth {
            out.push('^');
        }
        match &self.name {
            TypeName::None => out.push_str("PROC"),
            TypeName::Primitive(p) => out.push_str(p.mangled_name()),
            TypeName::Struct(name) => out.push_str(name.trim_start_matches('\\')),
        }
        for len in &self.array_lengths {
            out.push('[');
            if *len > 0 {
                out.push_str(&len.to_string());
            }
            out.push(']');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_invariant_holds_after_pointer_to() {
        let t = TypeData::primitive(Primitive::I32).pointer_to();
        assert!(t.invariants_hold());
        assert_eq!(t.pointer_depth, 1);
    }

    #[test]
    fn dereference_clears_pointer_flag_at_depth_zero() {
        let t = TypeData::primitive(Primitive::I32).pointer_to();
        let back = t.dereferenced().unwrap();
        assert!(!back.is_pointer());
        assert_eq!(back.pointer_depth, 0);
    }

    #[test]
    fn mangled_name_matches_generic_permutation_scenario() {
        assert_eq!(TypeData::primitive(Primitive::I32).mangled_name(), "I32");
        assert_eq!(TypeData::primitive(Primitive::F32).mangled_name(), "F32");
    }

    #[test]
    fn array_decay_removes_one_dimension() {
        let mut t = TypeData::primitive(Primitive::I32);
        t.array_lengths = vec![4, 8];
        t.flags.insert(TypeFlags::ARRAY);
        let decayed = t.decayed().unwrap();
        assert_eq!(decayed.array_lengths, vec![8]);
        assert!(decayed.is_array());
    }
}

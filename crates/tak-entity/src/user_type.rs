//! User-defined struct types: the entity table's record of every
//! `struct`/`compose` declaration.
//!
//! Grounded in `tak::UserType` (`include/var_types.hpp`) and
//! `tak::EntityTable::create_type` / `create_placeholder_type`
//! (`src/entity_table/types.cpp`).

use bitflags::bitflags;

use crate::types::TypeData;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct UserTypeFlags: u8 {
        const PLACEHOLDER        = 1 << 0;
        const GENERIC_BASE       = 1 << 1;
        const FOREIGN            = 1 << 2;
        /// A mangled-name instantiation of a generic base whose members
        /// haven't been substituted yet; `generic_base`/`generic_args`
        /// carry what the post-parser needs to resolve it.
        const GENERIC_PERMUTATION = 1 << 3;
    }
}

/// One field of a struct declaration, in source order.
#[derive(Clone, Debug)]
pub struct MemberData {
    pub name: String,
    pub ty: TypeData,
}

/// A struct type, keyed in [`crate::table::EntityTable`]'s type table by
/// its fully qualified canonical name.
#[derive(Clone, Debug)]
pub struct UserType {
    pub members: Vec<MemberData>,
    pub flags: UserTypeFlags,
    pub pos_first_used: u32,
    pub line_first_used: u32,
    pub file_first_used: String,
    /// Type parameter names, present only for a generic base.
    pub generic_type_names: Option<Vec<String>>,
    /// Canonical name of the generic base this is a permutation of.
    /// Present only while `GENERIC_PERMUTATION` is set and members are
    /// still unresolved.
    pub generic_base: Option<String>,
    /// Concrete type arguments this permutation was instantiated with,
    /// positional against the base's `generic_type_names`.
    pub generic_args: Option<Vec<TypeData>>,
}

impl UserType {
    #[must_use]
    pub fn new(pos_first_used: u32, line_first_used: u32, file_first_used: impl Into<String>) -> Self {
        Self {
            members: Vec::new(),
            flags: UserTypeFlags::empty(),
            pos_first_used,
            line_first_used,
            file_first_used: file_first_used.into(),
            generic_type_names: None,
            generic_base: None,
            generic_args: None,
        }
    }

    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.flags.contains(UserTypeFlags::PLACEHOLDER)
    }

    #[must_use]
    pub fn is_generic_base(&self) -> bool {
        self.flags.contains(UserTypeFlags::GENERIC_BASE)
    }

    #[must_use]
    pub fn is_unresolved_generic_permutation(&self) -> bool {
        self.flags.contains(UserTypeFlags::GENERIC_PERMUTATION)
    }

    #[must_use]
    pub fn member(&self, name: &str) -> Option<&MemberData> {
        self.members.iter().find(|m| m.name == name)
    }
}

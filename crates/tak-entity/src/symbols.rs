//! Symbols: the entity table's record of every declared or forward-
//! referenced name.
//!
//! Grounded in `tak::Symbol` (`include/var_types.hpp`) and
//! `tak::EntityTable::create_symbol` / `create_placeholder_symbol`
//! (`src/entity_table/symbols.cpp`), which additionally carry `file` and
//! `_namespace` fields the surviving header doesn't declare but the
//! implementation assigns on every creation path.

use bitflags::bitflags;

use crate::types::TypeData;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct SymbolFlags: u16 {
        const PLACEHOLDER         = 1 << 0;
        const GLOBAL              = 1 << 1;
        const FOREIGN             = 1 << 2;
        const INTERNAL            = 1 << 3;
        const FOREIGN_C           = 1 << 4;
        const GENERIC_BASE        = 1 << 5;
        const GENERIC_PERMUTATION = 1 << 6;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SymbolKind {
    #[default]
    None,
    Variable,
    Procedure,
    Struct,
}

/// A declared or forward-referenced name.
#[derive(Clone, Debug)]
pub struct Symbol {
    pub symbol_index: u32,
    pub name: String,
    pub kind: SymbolKind,
    pub ty: TypeData,
    pub src_pos: u32,
    pub line_number: u32,
    pub file: String,
    pub namespace: String,
    pub flags: SymbolFlags,
    /// Names of this symbol's type parameters, if it is a generic base.
    pub generic_type_names: Vec<String>,
}

impl Symbol {
    /// The fully qualified canonical name: `namespace` is always
    /// `\`-prefixed and `\`-suffixed.
    #[must_use]
    pub fn canonical_name(&self) -> String {
        format!("{}{}", self.namespace, self.name)
    }

    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.flags.contains(SymbolFlags::PLACEHOLDER)
    }

    #[must_use]
    pub fn is_generic_permutation(&self) -> bool {
        self.flags.contains(SymbolFlags::GENERIC_PERMUTATION)
    }

    #[must_use]
    pub fn is_generic_base(&self) -> bool {
        self.flags.contains(SymbolFlags::GENERIC_BASE)
    }
}

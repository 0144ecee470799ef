//! The entity table: scopes, namespaces, symbols, user types, and type
//! aliases for a single compilation.
//!
//! Grounded in `tak::EntityTable` (`src/entity_table/scope.cpp`,
//! `symbols.cpp`, `namespaces.cpp`, `types.cpp`). Scope and type-alias
//! maps are keyed by a symbol's or type's *fully qualified canonical
//! name* (namespace prefix + leaf), matching how `get_canonical_name`
//! (`namespaces.cpp`) resolves lookups against the scope stack — the
//! `Symbol`/`UserType` values themselves only store the leaf name plus a
//! separate namespace field.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tak_common::{TakInternalError, TakResult};

use crate::symbols::{Symbol, SymbolFlags, SymbolKind};
use crate::types::TypeData;
use crate::user_type::{UserType, UserTypeFlags};

/// Tracks lexical scopes, namespaces, symbols, user types, and type
/// aliases across one compilation unit.
pub struct EntityTable {
    scope_stack: SmallVec<[FxHashMap<String, u32>; 8]>,
    namespace_stack: SmallVec<[String; 4]>,
    sym_table: FxHashMap<u32, Symbol>,
    type_table: FxHashMap<String, UserType>,
    type_aliases: FxHashMap<String, TypeData>,
    next_symbol_index: u32,
}

impl Default for EntityTable {
    fn default() -> Self {
        let mut scope_stack = SmallVec::new();
        scope_stack.push(FxHashMap::default());
        Self {
            scope_stack,
            namespace_stack: SmallVec::new(),
            sym_table: FxHashMap::default(),
            type_table: FxHashMap::default(),
            type_aliases: FxHashMap::default(),
            next_symbol_index: 1,
        }
    }
}

impl EntityTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ---- scopes --------------------------------------------------

    pub fn push_scope(&mut self) {
        self.scope_stack.push(FxHashMap::default());
    }

    /// Pops the innermost scope. Scope index 0 (global) is never popped.
    pub fn pop_scope(&mut self) -> TakResult<()> {
        if self.scope_stack.len() <= 1 {
            return Err(TakInternalError::ScopeStackUnderflow);
        }
        self.scope_stack.pop();
        Ok(())
    }

    #[must_use]
    pub fn scope_depth(&self) -> usize {
        self.scope_stack.len()
    }

    #[must_use]
    pub fn scoped_symbol_exists(&self, canonical_name: &str) -> bool {
        self.scope_stack.iter().rev().any(|scope| scope.contains_key(canonical_name))
    }

    #[must_use]
    pub fn scoped_symbol_exists_at_current_scope(&self, canonical_name: &str) -> bool {
        self.scope_stack.last().is_some_and(|scope| scope.contains_key(canonical_name))
    }

    #[must_use]
    pub fn lookup_scoped_symbol(&self, canonical_name: &str) -> Option<&Symbol> {
        let index = self.scope_stack.iter().rev().find_map(|scope| scope.get(canonical_name))?;
        self.sym_table.get(index)
    }

    #[must_use]
    pub fn lookup_scoped_symbol_mut(&mut self, canonical_name: &str) -> Option<&mut Symbol> {
        let index = *self.scope_stack.iter().rev().find_map(|scope| scope.get(canonical_name))?;
        self.sym_table.get_mut(&index)
    }

    // ---- namespaces ------------------------------------------------

    pub fn push_namespace(&mut self, name: impl Into<String>) {
        self.namespace_stack.push(name.into());
    }

    pub fn pop_namespace(&mut self) -> TakResult<()> {
        if self.namespace_stack.pop().is_none() {
            return Err(TakInternalError::ScopeStackUnderflow);
        }
        Ok(())
    }

    /// The current namespace prefix: `\`-prefixed and `\`-suffixed, e.g.
    /// `\A\B\` while inside `namespace A { namespace B { ... } }`, or just
    /// `\` at global scope.
    #[must_use]
    pub fn current_namespace_prefix(&self) -> String {
        let mut prefix = String::from("\\");
        for segment in &self.namespace_stack {
            prefix.push_str(segment);
            prefix.push('\\');
        }
        prefix
    }

    fn canonical_name_checking(&self, name: &str, exists: impl Fn(&str) -> bool) -> String {
        let first_segment = name.split('\\').next().unwrap_or(name);

        let mut prefix = String::from("\\");
        let mut last_exists: Option<String> = None;

        for segment in &self.namespace_stack {
            prefix.push_str(segment);
            prefix.push('\\');

            let candidate = format!("{prefix}{name}");
            if exists(&candidate) {
                last_exists = Some(candidate);
            }

            if segment == first_segment {
                break;
            }
        }

        last_exists.unwrap_or_else(|| format!("{}{}", self.current_namespace_prefix(), name))
    }

    /// Resolves `name` against the namespace stack, walking outward and
    /// preferring the innermost namespace that already declares it,
    /// falling back to the fully qualified name in the current namespace
    /// (`namespaces.cpp`'s `get_canonical_name`).
    #[must_use]
    pub fn get_canonical_sym_name(&self, name: &str) -> String {
        self.canonical_name_checking(name, |candidate| self.scoped_symbol_exists(candidate))
    }

    #[must_use]
    pub fn get_canonical_type_name(&self, name: &str) -> String {
        self.canonical_name_checking(name, |candidate| self.type_table.contains_key(candidate))
    }

    // ---- symbols -----------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    fn insert_symbol(
        &mut self,
        name: impl Into<String>,
        namespace: String,
        kind: SymbolKind,
        ty: TypeData,
        src_pos: u32,
        line_number: u32,
        file: impl Into<String>,
        flags: SymbolFlags,
        at_global_scope: bool,
    ) -> u32 {
        let index = self.next_symbol_index;
        self.next_symbol_index += 1;
        let name = name.into();
        let canonical = format!("{namespace}{name}");

        let symbol = Symbol {
            symbol_index: index,
            name,
            kind,
            ty,
            src_pos,
            line_number,
            file: file.into(),
            namespace,
            flags,
            generic_type_names: Vec::new(),
        };
        self.sym_table.insert(index, symbol);
        let scope = if at_global_scope { &mut self.scope_stack[0] } else { self.scope_stack.last_mut().expect("scope stack is never empty") };
        scope.insert(canonical, index);
        index
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_symbol(
        &mut self,
        name: impl Into<String>,
        kind: SymbolKind,
        ty: TypeData,
        src_pos: u32,
        line_number: u32,
        file: impl Into<String>,
        flags: SymbolFlags,
    ) -> u32 {
        let namespace = self.current_namespace_prefix();
        self.insert_symbol(name, namespace, kind, ty, src_pos, line_number, file, flags, false)
    }

    /// Creates a symbol standing in for a name used before its
    /// declaration is seen (forward reference across a compose block or
    /// include boundary). Always inserted at the global scope (scope
    /// index 0), matching `tak::EntityTable::create_placeholder_symbol`'s
    /// `scope_stack_.front()[name] = curr_sym_index_;` — the real
    /// declaration that resolves it may land in a different scope than
    /// wherever the forward reference itself was seen.
    pub fn create_placeholder_symbol(&mut self, name: impl Into<String>, src_pos: u32, line_number: u32, file: impl Into<String>) -> u32 {
        let namespace = self.current_namespace_prefix();
        self.insert_symbol(name, namespace, SymbolKind::None, TypeData::default(), src_pos, line_number, file, SymbolFlags::PLACEHOLDER, true)
    }

    /// Rewrites a placeholder symbol in place once its real declaration
    /// is found, preserving its symbol index so existing references
    /// (AST nodes holding the index) stay valid.
    pub fn resolve_placeholder_symbol(&mut self, symbol_index: u32, kind: SymbolKind, ty: TypeData, flags: SymbolFlags) -> TakResult<()> {
        let symbol = self.sym_table.get_mut(&symbol_index).ok_or(TakInternalError::UnknownSymbolIndex(symbol_index))?;
        symbol.kind = kind;
        symbol.ty = ty;
        symbol.flags = flags;
        Ok(())
    }

    #[must_use]
    pub fn lookup_symbol(&self, symbol_index: u32) -> Option<&Symbol> {
        self.sym_table.get(&symbol_index)
    }

    #[must_use]
    pub fn lookup_symbol_mut(&mut self, symbol_index: u32) -> Option<&mut Symbol> {
        self.sym_table.get_mut(&symbol_index)
    }

    /// Registers a monomorphized copy of a generic procedure under its
    /// mangled name (e.g. `id[I32]`), always at global scope since
    /// permutations are process-wide, not scoped to wherever they were
    /// first instantiated. Returns the existing permutation symbol's
    /// index if this exact mangling was already created.
    pub fn create_generic_proc_permutation(&mut self, base_canonical_name: &str, ty: TypeData, src_pos: u32, line_number: u32, file: impl Into<String>) -> TakResult<u32> {
        let base = self
            .lookup_scoped_symbol(base_canonical_name)
            .ok_or_else(|| TakInternalError::MissingGenericBase(base_canonical_name.to_string()))?;
        if !base.is_generic_base() {
            return Err(TakInternalError::MissingGenericBase(base_canonical_name.to_string()));
        }
        let base_leaf_name = base.name.clone();
        let base_symbol_index = base.symbol_index;

        let params = ty.parameters.clone().unwrap_or_default();
        let mangled_params = params.iter().map(TypeData::mangled_name).collect::<Vec<_>>().join(",");
        let mangled = format!("{base_leaf_name}[{mangled_params}]");

        if let Some(existing) = self.scope_stack[0].get(&mangled) {
            return Ok(*existing);
        }

        let mut ty = ty;
        ty.sym_ref = base_symbol_index;

        let index = self.next_symbol_index;
        self.next_symbol_index += 1;
        let symbol = Symbol {
            symbol_index: index,
            name: mangled.clone(),
            kind: SymbolKind::Procedure,
            ty,
            src_pos,
            line_number,
            file: file.into(),
            namespace: String::from("\\"),
            flags: SymbolFlags::GENERIC_PERMUTATION,
            generic_type_names: Vec::new(),
        };
        self.sym_table.insert(index, symbol);
        self.scope_stack[0].insert(mangled, index);
        Ok(index)
    }

    // ---- user types --------------------------------------------------

    #[must_use]
    pub fn type_exists(&self, canonical_name: &str) -> bool {
        self.type_table.contains_key(canonical_name)
    }

    pub fn create_type(&mut self, canonical_name: impl Into<String>, user_type: UserType) {
        self.type_table.insert(canonical_name.into(), user_type);
    }

    pub fn create_placeholder_type(&mut self, canonical_name: impl Into<String>, src_pos: u32, line_number: u32, file: impl Into<String>) {
        let mut placeholder = UserType::new(src_pos, line_number, file);
        placeholder.flags.insert(UserTypeFlags::PLACEHOLDER);
        self.type_table.insert(canonical_name.into(), placeholder);
    }

    pub fn resolve_placeholder_type(&mut self, canonical_name: &str, members: Vec<crate::user_type::MemberData>, flags: UserTypeFlags) -> TakResult<()> {
        let entry = self.type_table.get_mut(canonical_name).ok_or_else(|| TakInternalError::UnknownUserType(canonical_name.to_string()))?;
        entry.members = members;
        entry.flags = flags;
        Ok(())
    }

    #[must_use]
    pub fn lookup_type(&self, canonical_name: &str) -> Option<&UserType> {
        self.type_table.get(canonical_name)
    }

    #[must_use]
    pub fn lookup_type_mut(&mut self, canonical_name: &str) -> Option<&mut UserType> {
        self.type_table.get_mut(canonical_name)
    }

    pub fn delete_type(&mut self, canonical_name: &str) -> Option<UserType> {
        self.type_table.remove(canonical_name)
    }

    // ---- table-wide sweeps --------------------------------------------

    /// Every symbol still carrying `PLACEHOLDER`, in table-insertion order
    /// undefined (`sym_table` is hashed, not sequenced).
    #[must_use]
    pub fn placeholder_symbols(&self) -> Vec<&Symbol> {
        self.sym_table.values().filter(|s| s.is_placeholder()).collect()
    }

    /// Every type still carrying `PLACEHOLDER`, paired with its canonical
    /// name.
    #[must_use]
    pub fn placeholder_types(&self) -> Vec<(&String, &UserType)> {
        self.type_table.iter().filter(|(_, t)| t.is_placeholder()).collect()
    }

    /// Every symbol in the table, for tooling that needs to dump the
    /// whole table rather than look up one entry (`--dump-symbols`).
    #[must_use]
    pub fn all_symbols(&self) -> Vec<&Symbol> {
        self.sym_table.values().collect()
    }

    /// Every canonical type name and its definition, for `--dump-types`.
    #[must_use]
    pub fn all_types(&self) -> Vec<(&String, &UserType)> {
        self.type_table.iter().collect()
    }

    /// The symbol index of any one symbol matching `pred`, or `None` if
    /// none remain. Used to drive a clear-flag-then-rescan loop without
    /// requiring callers to hold a borrow across mutation.
    #[must_use]
    pub fn find_symbol_index(&self, pred: impl Fn(&Symbol) -> bool) -> Option<u32> {
        self.sym_table.values().find(|s| pred(s)).map(|s| s.symbol_index)
    }

    /// Canonical names of every type-table entry representing a generic
    /// base (has type parameter names of its own, as opposed to a
    /// concrete permutation).
    #[must_use]
    pub fn generic_base_type_names(&self) -> Vec<String> {
        self.type_table.iter().filter(|(_, t)| t.generic_type_names.is_some()).map(|(name, _)| name.clone()).collect()
    }

    /// The canonical name of any one type-table entry still awaiting
    /// generic-member substitution, or `None` once all are resolved.
    #[must_use]
    pub fn find_pending_generic_struct_permutation(&self) -> Option<String> {
        self.type_table.iter().find(|(_, t)| t.is_unresolved_generic_permutation()).map(|(name, _)| name.clone())
    }

    // ---- type aliases --------------------------------------------------

    pub fn create_type_alias(&mut self, name: impl Into<String>, aliased: TypeData) {
        self.type_aliases.insert(name.into(), aliased);
    }

    #[must_use]
    pub fn type_alias_exists(&self, name: &str) -> bool {
        self.type_aliases.contains_key(name)
    }

    #[must_use]
    pub fn lookup_type_alias(&self, name: &str) -> Option<&TypeData> {
        self.type_aliases.get(name)
    }

    pub fn delete_type_alias(&mut self, name: &str) -> Option<TypeData> {
        self.type_aliases.remove(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Primitive;

    #[test]
    fn global_scope_cannot_be_popped() {
        let mut table = EntityTable::new();
        assert!(matches!(table.pop_scope(), Err(TakInternalError::ScopeStackUnderflow)));
    }

    #[test]
    fn symbol_is_visible_through_nested_scopes() {
        let mut table = EntityTable::new();
        let idx = table.create_symbol("x", SymbolKind::Variable, TypeData::primitive(Primitive::I32), 0, 1, "a.tak", SymbolFlags::empty());
        table.push_scope();
        assert!(table.scoped_symbol_exists("\\x"));
        assert_eq!(table.lookup_scoped_symbol("\\x").unwrap().symbol_index, idx);
    }

    #[test]
    fn placeholder_resolves_in_place_keeping_index() {
        let mut table = EntityTable::new();
        let idx = table.create_placeholder_symbol("f", 0, 1, "a.tak");
        assert!(table.lookup_symbol(idx).unwrap().is_placeholder());
        table
            .resolve_placeholder_symbol(idx, SymbolKind::Procedure, TypeData::procedure(vec![], None), SymbolFlags::GLOBAL)
            .unwrap();
        assert!(!table.lookup_symbol(idx).unwrap().is_placeholder());
        assert_eq!(table.lookup_symbol(idx).unwrap().kind, SymbolKind::Procedure);
    }

    #[test]
    fn placeholder_created_inside_a_nested_scope_survives_that_scope_closing() {
        let mut table = EntityTable::new();
        table.push_scope();
        let idx = table.create_placeholder_symbol("g", 0, 1, "a.tak");
        table.pop_scope().unwrap();

        assert!(table.scoped_symbol_exists("\\g"));
        assert_eq!(table.lookup_scoped_symbol("\\g").unwrap().symbol_index, idx);
    }

    #[test]
    fn canonical_name_prefers_innermost_existing_declaration() {
        let mut table = EntityTable::new();
        table.push_namespace("A");
        table.create_symbol("x", SymbolKind::Variable, TypeData::primitive(Primitive::I32), 0, 1, "a.tak", SymbolFlags::empty());
        table.pop_namespace().unwrap();

        table.push_namespace("A");
        assert_eq!(table.get_canonical_sym_name("x"), "\\A\\x");
        table.pop_namespace().unwrap();

        assert_eq!(table.get_canonical_sym_name("y"), "\\y");
    }

    #[test]
    fn generic_proc_permutation_is_registered_at_global_scope() {
        let mut table = EntityTable::new();
        let base_ty = TypeData::procedure(vec![TypeData::primitive(Primitive::I32)], Some(TypeData::primitive(Primitive::I32)));
        table.create_symbol("id", SymbolKind::Procedure, base_ty, 0, 1, "a.tak", SymbolFlags::GENERIC_BASE);

        table.push_scope();
        let perm_ty = TypeData::procedure(vec![TypeData::primitive(Primitive::I32)], Some(TypeData::primitive(Primitive::I32)));
        let idx = table.create_generic_proc_permutation("\\id", perm_ty, 10, 2, "a.tak").unwrap();
        table.pop_scope().unwrap();

        assert!(table.scoped_symbol_exists("id[I32]"));
        assert_eq!(table.lookup_symbol(idx).unwrap().name, "id[I32]");
    }

    #[test]
    fn type_table_tracks_placeholder_then_resolved_members() {
        let mut table = EntityTable::new();
        table.create_placeholder_type("\\Point", 0, 1, "a.tak");
        assert!(table.lookup_type("\\Point").unwrap().is_placeholder());

        let members = vec![
            crate::user_type::MemberData { name: "x".to_string(), ty: TypeData::primitive(Primitive::I32) },
            crate::user_type::MemberData { name: "y".to_string(), ty: TypeData::primitive(Primitive::I32) },
        ];
        table.resolve_placeholder_type("\\Point", members, UserTypeFlags::empty()).unwrap();
        assert_eq!(table.lookup_type("\\Point").unwrap().members.len(), 2);
    }

    #[test]
    fn placeholder_sweeps_find_unresolved_entries_only() {
        let mut table = EntityTable::new();
        let placeholder_idx = table.create_placeholder_symbol("f", 0, 1, "a.tak");
        table.create_symbol("g", SymbolKind::Procedure, TypeData::procedure(vec![], None), 0, 1, "a.tak", SymbolFlags::empty());
        table.create_placeholder_type("\\Widget", 0, 1, "a.tak");
        table.create_type("\\Point", UserType::new(0, 1, "a.tak"));

        let syms = table.placeholder_symbols();
        assert_eq!(syms.len(), 1);
        assert_eq!(syms[0].symbol_index, placeholder_idx);

        let types = table.placeholder_types();
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].0, "\\Widget");
    }

    #[test]
    fn find_symbol_index_locates_first_match_by_predicate() {
        let mut table = EntityTable::new();
        let idx = table.create_symbol("id", SymbolKind::Procedure, TypeData::procedure(vec![], None), 0, 1, "a.tak", SymbolFlags::GENERIC_PERMUTATION);
        assert_eq!(table.find_symbol_index(|s| s.flags.contains(SymbolFlags::GENERIC_PERMUTATION)), Some(idx));
        assert_eq!(table.find_symbol_index(|s| s.flags.contains(SymbolFlags::FOREIGN)), None);
    }

    #[test]
    fn generic_base_type_names_excludes_concrete_types() {
        let mut table = EntityTable::new();
        let mut base = UserType::new(0, 1, "a.tak");
        base.generic_type_names = Some(vec!["T".to_string()]);
        table.create_type("\\Box", base);
        table.create_type("\\Point", UserType::new(0, 1, "a.tak"));

        assert_eq!(table.generic_base_type_names(), vec!["\\Box".to_string()]);
    }
}

//! Shared type, symbol, and entity-table model for the tak compiler
//! front end.
//!
//! [`table::EntityTable`] is the one piece of mutable state threaded
//! through parsing, post-parse monomorphization, and checking: it owns
//! every scope, namespace, symbol, user type, and type alias for a
//! compilation.

pub mod symbols;
pub mod table;
pub mod types;
pub mod user_type;

pub use symbols::{Symbol, SymbolFlags, SymbolKind};
pub use table::EntityTable;
pub use types::{Primitive, TypeData, TypeFlags, TypeKind, TypeName};
pub use user_type::{MemberData, UserType, UserTypeFlags};

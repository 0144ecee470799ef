//! Centralized limits for the tak compiler front end.
//!
//! Grounded in `tsz-common::limits`: a single place for recursion/iteration
//! ceilings rather than scattering magic numbers through the parser,
//! post-parser, and checker.

/// Default error-count ceiling before compilation aborts. The original's
/// `SemanticErrorHandler` uses 35; its `checker.hpp` has a stale duplicate
/// of 45 from an earlier revision. The newer `tak::` namespace form wins.
pub const DEFAULT_MAX_ERROR_COUNT: u32 = 35;

/// Maximum depth of nested braced-expression descent
/// (`{ { { ... } } }` initializers) before the checker bails out with an
/// internal error instead of overflowing its call stack.
pub const MAX_BRACED_EXPR_DEPTH: u32 = 256;

/// Maximum number of post-parser sweep iterations over the symbol table
/// while resolving `GENPERM` permutations. Bounds runaway mutual generic
/// recursion; exceeding it is an internal error, not a silently-truncated
/// result.
pub const MAX_GENERIC_MONOMORPHIZATION_ROUNDS: u32 = 10_000;

/// Maximum member-access chain length (`a.b.c.d...`) the checker will
/// descend through before giving up.
pub const MAX_MEMBER_ACCESS_DEPTH: u32 = 256;

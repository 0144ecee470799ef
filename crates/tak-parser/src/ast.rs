//! The abstract syntax tree: an arena of nodes addressed by [`NodeId`].
//!
//! Grounded in `tak::ast_node` / `AstProcdecl` / `AstIdentifier` (etc,
//! `include/ast_types.hpp`, `src/postparser/generic_procedures.cpp`) but
//! generalized from raw owning pointers to an arena + integer handle: a
//! parent owns its children, `parent` is a non-owning back-reference set
//! on insertion, and the whole arena drops at once at end of compilation
//! instead of walking per-node destructors.

use std::rc::Rc;

use tak_entity::TypeData;
use tak_lexer::TokenType;

/// A handle into an [`Ast`] arena. Never zero so it can double as an
/// "absent child" sentinel alongside `Option<NodeId>` where that reads
/// more clearly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LiteralKind {
    Integer,
    Float,
    String,
    Char,
    Bool,
    Nullptr,
}

/// One switch arm: `case <value> { … }`, or the `default` arm when
/// `value` is `None`.
#[derive(Clone, Debug)]
pub struct SwitchCase {
    pub value: Option<NodeId>,
    pub body: Vec<NodeId>,
}

/// One member in a struct/enum body or a braced initializer.
#[derive(Clone, Debug)]
pub struct FieldInit {
    pub name: Option<String>,
    pub value: NodeId,
}

#[derive(Clone, Debug)]
pub enum AstNodeData {
    NamespaceDecl { path: Vec<String>, body: Vec<NodeId> },

    ProcDecl {
        name: String,
        generic_type_names: Vec<String>,
        params: Vec<(String, TypeData)>,
        return_type: Option<TypeData>,
        symbol_index: u32,
        body: Vec<NodeId>,
        is_method_of: Option<String>,
    },

    VarDecl { name: String, declared_type: Option<TypeData>, symbol_index: u32, initializer: Option<NodeId> },

    Block { body: Vec<NodeId> },

    Branch { conditions: Vec<NodeId>, bodies: Vec<Vec<NodeId>>, else_body: Option<Vec<NodeId>> },

    Switch { target: NodeId, cases: Vec<SwitchCase> },

    While { condition: NodeId, body: Vec<NodeId> },

    DoWhile { condition: NodeId, body: Vec<NodeId> },

    For { init: Option<NodeId>, condition: Option<NodeId>, update: Option<NodeId>, body: Vec<NodeId> },

    Break,
    Continue,
    Fallthrough,

    Return { value: Option<NodeId> },

    Defer { body: Vec<NodeId> },
    DeferIf { condition: NodeId, body: Vec<NodeId> },

    Call { callee: NodeId, arguments: Vec<NodeId> },

    Subscript { target: NodeId, index: NodeId },

    MemberAccess { target: NodeId, path: Vec<String> },

    Cast { target_type: TypeData, operand: NodeId },

    Sizeof { operand_type: Option<TypeData>, operand: Option<NodeId> },

    UnaryExpr { operator: TokenType, operand: NodeId },

    BinaryExpr { operator: TokenType, left: NodeId, right: NodeId },

    Identifier { name: String, symbol_index: u32 },

    SingletonLiteral { kind: LiteralKind, value: Box<str> },

    BracedExpr { fields: Vec<FieldInit> },

    StructDef { name: String, generic_type_names: Vec<String>, members: Vec<(String, TypeData)> },

    EnumDef { name: String, underlying: TypeData, variants: Vec<(String, Option<i64>)> },

    Compose { target_struct: String, methods: Vec<NodeId> },
}

/// One AST node: uniform base fields (`type`, `parent`, `pos`, `line`,
/// `file`) plus its kind-specific data.
#[derive(Clone, Debug)]
pub struct AstNode {
    pub data: AstNodeData,
    pub parent: Option<NodeId>,
    pub pos: u32,
    pub line: u32,
    pub file: Rc<str>,
}

/// The arena owning every node of a compilation's AST forest.
#[derive(Debug, Default)]
pub struct Ast {
    nodes: Vec<AstNode>,
    /// Top-level declarations, in source order across every parsed file.
    pub toplevel: Vec<NodeId>,
}

impl Ast {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, data: AstNodeData, pos: u32, line: u32, file: Rc<str>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(AstNode { data, parent: None, pos, line, file });
        id
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> &AstNode {
        &self.nodes[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut AstNode {
        &mut self.nodes[id.0 as usize]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Sets `parent` on every id in `children`. Ownership is strictly
    /// tree-shaped: `parent` is the only back-reference and is non-owning.
    pub fn attach_children(&mut self, parent: NodeId, children: &[NodeId]) {
        for &child in children {
            self.nodes[child.0 as usize].parent = Some(parent);
        }
    }

    /// Kinds that never require a trailing `;`/`,` terminator when they
    /// appear as a standalone statement: procedure, struct, namespace,
    /// compose, branch, switch, loop, block, and defer bodies all end
    /// with their own closing brace.
    #[must_use]
    pub fn never_needs_terminal(data: &AstNodeData) -> bool {
        matches!(
            data,
            AstNodeData::NamespaceDecl { .. }
                | AstNodeData::ProcDecl { .. }
                | AstNodeData::StructDef { .. }
                | AstNodeData::EnumDef { .. }
                | AstNodeData::Compose { .. }
                | AstNodeData::Branch { .. }
                | AstNodeData::Switch { .. }
                | AstNodeData::While { .. }
                | AstNodeData::DoWhile { .. }
                | AstNodeData::For { .. }
                | AstNodeData::Block { .. }
                | AstNodeData::Defer { .. }
                | AstNodeData::DeferIf { .. }
        )
    }
}

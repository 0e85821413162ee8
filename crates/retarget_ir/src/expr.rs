//! IR expression definitions.
//!
//! These types represent the typed expression trees attached to function
//! bodies and variable initializers. The backend never evaluates them; it
//! walks them, dispatches them to per-target emitters, and rewrites
//! variable display names where scope flattening would make them collide.
//!
//! ## Variable identity
//!
//! Local variables are identified by a process-unique integer id assigned
//! by the front end. The display name is cosmetic: renaming passes may
//! rewrite it, but the id is the ground truth for referential equality,
//! so every reference to a renamed declaration stays resolvable.

use super::decl::TypePath;
use super::Span;

/// Process-unique identifier for a local variable.
pub type VarId = u32;

/// The (id, display-name) pair identifying a local variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Var {
    pub id: VarId,
    pub name: String,
}

impl Var {
    pub fn new(id: VarId, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }

    /// Copy of this identity carrying a different display name.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            id: self.id,
            name: name.into(),
        }
    }
}

/// A typed expression node.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedExpr {
    pub kind: ExprKind,
    pub span: Span,
}

impl TypedExpr {
    pub fn new(kind: ExprKind) -> Self {
        Self {
            kind,
            span: Span::default(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Peel transparent wrappers (metadata and parentheses).
    ///
    /// Wrappers never change what an expression *is*; passes that classify
    /// or pattern-match nodes look through them.
    pub fn skip_wrappers(&self) -> &TypedExpr {
        match &self.kind {
            ExprKind::Meta { expr, .. } => expr.skip_wrappers(),
            ExprKind::Paren(inner) => inner.skip_wrappers(),
            _ => self,
        }
    }
}

/// Expression kinds.
///
/// The variant set is fixed by the front end contract; every node the
/// front end can produce is listed here, and the backend is total over it.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Literal constant.
    Const(Constant),

    /// Reference to a local variable.
    Local(Var),

    /// Array/collection index access.
    ArrayAccess {
        object: Box<TypedExpr>,
        index: Box<TypedExpr>,
    },

    /// Local variable declaration with optional initializer.
    VarDecl {
        var: Var,
        init: Option<Box<TypedExpr>>,
    },

    /// Reference to a type by path.
    TypeRef(TypePath),

    /// Access to one parameter of a matched enum value.
    EnumParam {
        value: Box<TypedExpr>,
        variant: String,
        index: usize,
    },

    /// Access to the tag/index of an enum value.
    EnumIndex(Box<TypedExpr>),

    /// Free identifier left unresolved for the target to interpret.
    Ident(String),

    /// Binary operation.
    Binary {
        op: BinaryOp,
        left: Box<TypedExpr>,
        right: Box<TypedExpr>,
    },

    /// Call with ordered arguments.
    Call {
        func: Box<TypedExpr>,
        args: Vec<TypedExpr>,
    },

    /// Unary operation (prefix or postfix).
    Unary {
        op: UnaryOp,
        postfix: bool,
        operand: Box<TypedExpr>,
    },

    /// Checked or unchecked cast.
    Cast {
        expr: Box<TypedExpr>,
        to: Option<TypePath>,
    },

    /// Field access.
    Field {
        object: Box<TypedExpr>,
        field: String,
    },

    /// Anonymous object literal.
    ObjectLit(Vec<(String, TypedExpr)>),

    /// Array literal.
    ArrayLit(Vec<TypedExpr>),

    /// Object construction.
    New {
        class: TypePath,
        args: Vec<TypedExpr>,
    },

    /// Function literal.
    Function(Box<FunctionLit>),

    /// Ordered sequence of statements; the only scope boundary.
    Block(Vec<TypedExpr>),

    /// For-loop over an iterable.
    For {
        var: Var,
        iter: Box<TypedExpr>,
        body: Box<TypedExpr>,
    },

    /// Conditional with optional else branch.
    If {
        cond: Box<TypedExpr>,
        then_branch: Box<TypedExpr>,
        else_branch: Option<Box<TypedExpr>>,
    },

    /// While-loop.
    While {
        cond: Box<TypedExpr>,
        body: Box<TypedExpr>,
    },

    /// Switch over a subject expression.
    Switch {
        subject: Box<TypedExpr>,
        cases: Vec<SwitchCase>,
        default: Option<Box<TypedExpr>>,
    },

    /// Try with one or more catch clauses.
    Try {
        body: Box<TypedExpr>,
        catches: Vec<TryCatch>,
    },

    /// Return with optional value.
    Return(Option<Box<TypedExpr>>),

    /// Break out of the innermost loop.
    Break,

    /// Continue the innermost loop.
    Continue,

    /// Throw a value.
    Throw(Box<TypedExpr>),

    /// Metadata wrapper; transparent for classification and renaming.
    Meta {
        name: String,
        expr: Box<TypedExpr>,
    },

    /// Parenthesis wrapper; transparent for classification and renaming.
    Paren(Box<TypedExpr>),
}

/// Literal constants.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
    Null,
    This,
    Super,
}

/// A function literal: argument identities plus a body expression.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionLit {
    pub args: Vec<Var>,
    pub body: TypedExpr,
}

/// One case of a switch: the patterns it matches and its body.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub patterns: Vec<TypedExpr>,
    pub body: TypedExpr,
}

/// One catch clause of a try.
#[derive(Debug, Clone, PartialEq)]
pub struct TryCatch {
    pub var: Var,
    pub body: TypedExpr,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    Assign,
    AssignOp(AssignKind),
}

/// Compound-assignment flavors carried by `BinaryOp::AssignOp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignKind {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
    BitNot,
    Increment,
    Decrement,
}

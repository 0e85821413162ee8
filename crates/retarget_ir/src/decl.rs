//! IR declaration definitions
//!
//! A declaration is one top-level compiled unit handed over by the front
//! end: a class, an enum, a typedef, or an abstract. Declarations are
//! immutable for the duration of one compilation pass.

use super::expr::TypedExpr;
use super::Span;

/// Stable type-path identifier for a declaration.
///
/// The module segments name the declaration's owning module (its
/// namespace/file of origin in the front end); `name` is the declaration
/// name itself. `full()` is the fully-qualified form used by skip lists.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypePath {
    pub module: Vec<String>,
    pub name: String,
}

impl TypePath {
    pub fn new(module: Vec<String>, name: impl Into<String>) -> Self {
        Self {
            module,
            name: name.into(),
        }
    }

    /// A path with no owning module.
    pub fn top_level(name: impl Into<String>) -> Self {
        Self {
            module: Vec::new(),
            name: name.into(),
        }
    }

    /// Fully-qualified dotted path (e.g. `net.http.Request`).
    pub fn full(&self) -> String {
        if self.module.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.module.join("."), self.name)
        }
    }

    /// Dotted name of the owning module (empty string for top-level).
    pub fn module_name(&self) -> String {
        self.module.join(".")
    }
}

impl std::fmt::Display for TypePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.full())
    }
}

/// A top-level declaration.
#[derive(Debug, Clone)]
pub struct Declaration {
    pub kind: DeclKind,
    pub path: TypePath,
    /// Declared extern/foreign: implemented outside the compiled program.
    pub is_extern: bool,
    /// A generic type-parameter placeholder, never compiled on its own.
    pub is_type_param: bool,
    pub span: Span,
}

impl Declaration {
    pub fn new(kind: DeclKind, path: TypePath) -> Self {
        Self {
            kind,
            path,
            is_extern: false,
            is_type_param: false,
            span: Span::default(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn with_extern(mut self, is_extern: bool) -> Self {
        self.is_extern = is_extern;
        self
    }

    pub fn with_type_param(mut self, is_type_param: bool) -> Self {
        self.is_type_param = is_type_param;
        self
    }

    /// Short name of the declaration.
    pub fn name(&self) -> &str {
        &self.path.name
    }
}

/// Declaration kinds.
#[derive(Debug, Clone)]
pub enum DeclKind {
    Class(ClassDecl),
    Enum(EnumDecl),
    Typedef(TypedefDecl),
    Abstract(AbstractDecl),
}

/// A class declaration: variable and function members.
#[derive(Debug, Clone, Default)]
pub struct ClassDecl {
    pub fields: Vec<ClassField>,
    pub methods: Vec<ClassMethod>,
}

/// How a field is read or written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessMode {
    /// Plain storage access.
    #[default]
    Normal,
    /// Routed through a generated accessor.
    Accessor,
    /// Not permitted in this direction.
    Never,
}

/// A variable member of a class.
#[derive(Debug, Clone)]
pub struct ClassField {
    pub name: String,
    pub is_static: bool,
    pub read: AccessMode,
    pub write: AccessMode,
}

impl ClassField {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_static: false,
            read: AccessMode::Normal,
            write: AccessMode::Normal,
        }
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn with_access(mut self, read: AccessMode, write: AccessMode) -> Self {
        self.read = read;
        self.write = write;
        self
    }

    /// Whether the field is backed by real storage.
    ///
    /// Accessor-only fields (neither direction is a plain access) have no
    /// physical slot and some targets skip them entirely.
    pub fn is_physical(&self) -> bool {
        self.read == AccessMode::Normal || self.write == AccessMode::Normal
    }
}

/// Method dispatch kind as resolved by the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MethodKind {
    #[default]
    Normal,
    Inline,
    Dynamic,
}

/// A function member of a class.
#[derive(Debug, Clone)]
pub struct ClassMethod {
    pub name: String,
    pub is_static: bool,
    pub kind: MethodKind,
    /// Typed function body. Absent for extern or forward declarations.
    pub body: Option<TypedExpr>,
    pub span: Span,
}

impl ClassMethod {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_static: false,
            kind: MethodKind::Normal,
            body: None,
            span: Span::default(),
        }
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn with_kind(mut self, kind: MethodKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_body(mut self, body: TypedExpr) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

/// An enum declaration: ordered variants.
#[derive(Debug, Clone, Default)]
pub struct EnumDecl {
    pub variants: Vec<EnumVariant>,
}

/// One enum variant with its parameter names.
#[derive(Debug, Clone)]
pub struct EnumVariant {
    pub name: String,
    pub params: Vec<String>,
}

impl EnumVariant {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    pub fn with_params(mut self, params: Vec<String>) -> Self {
        self.params = params;
        self
    }
}

/// A typedef declaration: an alias for another type path.
#[derive(Debug, Clone)]
pub struct TypedefDecl {
    pub target: TypePath,
}

/// An abstract declaration: a compile-time wrapper over an underlying type.
#[derive(Debug, Clone)]
pub struct AbstractDecl {
    pub underlying: TypePath,
}

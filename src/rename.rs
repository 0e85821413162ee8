//! Hygienic variable renaming
//!
//! When nested lexical scopes are flattened or merged for output, two
//! distinct variables can end up sharing a display name. This pass
//! rewrites display names so that every variable declared in a block is
//! unique against its enclosing scope chain, while leaving variable ids
//! (the ground truth for referential equality) untouched. References to a
//! renamed declaration are rewritten through a substitution map keyed by
//! id, so reads and writes keep resolving to the same declaration.
//!
//! Scope frames live in an arena and link to their parent by index: a
//! child frame sees every name its ancestors claimed but cannot pollute
//! their namespaces. Every `Block` node, and only `Block` nodes, opens a
//! frame.
//!
//! The pass is deterministic (same collision sequence every run) and
//! idempotent: input that already satisfies the invariant comes back
//! structurally identical.

use std::collections::{HashMap, HashSet};

use retarget_ir::{ExprKind, FunctionLit, SwitchCase, TryCatch, TypedExpr, Var, VarId};

/// One lexical scope during renaming.
#[derive(Debug, Default)]
struct Frame {
    parent: Option<usize>,
    /// Display names owned by this scope.
    claimed: HashSet<String>,
    /// Active substitutions for variables declared in this scope.
    renames: HashMap<VarId, Var>,
}

/// Scope-chain renaming pass.
///
/// [`Renamer::claim_outer`] seeds names declared by enclosing scopes the
/// caller already flattened; [`Renamer::fix`] rewrites one expression
/// tree. The convenience entry [`fix_variable_names`] covers the common
/// case with no outer names.
#[derive(Debug)]
pub struct Renamer {
    frames: Vec<Frame>,
}

impl Renamer {
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::default()],
        }
    }

    /// Mark a name as taken by an enclosing scope chain.
    pub fn claim_outer(&mut self, name: impl Into<String>) {
        self.frames[0].claimed.insert(name.into());
    }

    /// Rewrite `expr` so every declaration in it is collision-free.
    pub fn fix(&mut self, expr: &TypedExpr) -> TypedExpr {
        let fixed = self.rewrite(expr, 0);
        #[cfg(debug_assertions)]
        {
            let mut scopes = vec![self.frames[0].claimed.clone()];
            assert_unique_names(&fixed, &mut scopes);
        }
        fixed
    }

    fn push_frame(&mut self, parent: usize) -> usize {
        self.frames.push(Frame {
            parent: Some(parent),
            ..Frame::default()
        });
        self.frames.len() - 1
    }

    fn is_claimed(&self, frame: usize, name: &str) -> bool {
        let mut current = Some(frame);
        while let Some(idx) = current {
            if self.frames[idx].claimed.contains(name) {
                return true;
            }
            current = self.frames[idx].parent;
        }
        false
    }

    /// Claim a collision-free name for `wanted` in `frame`.
    fn claim(&mut self, frame: usize, wanted: &str) -> String {
        let mut candidate = wanted.to_string();
        while self.is_claimed(frame, &candidate) {
            candidate = bump_name(&candidate);
        }
        self.frames[frame].claimed.insert(candidate.clone());
        candidate
    }

    fn lookup_rename(&self, frame: usize, id: VarId) -> Option<&Var> {
        let mut current = Some(frame);
        while let Some(idx) = current {
            if let Some(var) = self.frames[idx].renames.get(&id) {
                return Some(var);
            }
            current = self.frames[idx].parent;
        }
        None
    }

    fn rewrite(&mut self, expr: &TypedExpr, frame: usize) -> TypedExpr {
        let kind = match &expr.kind {
            ExprKind::Block(stmts) => {
                let child = self.push_frame(frame);
                ExprKind::Block(stmts.iter().map(|s| self.rewrite(s, child)).collect())
            }

            ExprKind::VarDecl { var, init } => {
                // The initializer runs before the declaration takes effect.
                let init = init.as_ref().map(|e| Box::new(self.rewrite(e, frame)));
                let unique = self.claim(frame, &var.name);
                let var = if unique == var.name {
                    var.clone()
                } else {
                    let renamed = var.renamed(unique);
                    self.frames[frame].renames.insert(var.id, renamed.clone());
                    renamed
                };
                ExprKind::VarDecl { var, init }
            }

            ExprKind::Local(var) => match self.lookup_rename(frame, var.id) {
                Some(renamed) => ExprKind::Local(renamed.clone()),
                None => ExprKind::Local(var.clone()),
            },

            ExprKind::Const(c) => ExprKind::Const(c.clone()),
            ExprKind::TypeRef(path) => ExprKind::TypeRef(path.clone()),
            ExprKind::Ident(name) => ExprKind::Ident(name.clone()),
            ExprKind::Break => ExprKind::Break,
            ExprKind::Continue => ExprKind::Continue,

            ExprKind::ArrayAccess { object, index } => ExprKind::ArrayAccess {
                object: Box::new(self.rewrite(object, frame)),
                index: Box::new(self.rewrite(index, frame)),
            },
            ExprKind::EnumParam { value, variant, index } => ExprKind::EnumParam {
                value: Box::new(self.rewrite(value, frame)),
                variant: variant.clone(),
                index: *index,
            },
            ExprKind::EnumIndex(value) => ExprKind::EnumIndex(Box::new(self.rewrite(value, frame))),
            ExprKind::Binary { op, left, right } => ExprKind::Binary {
                op: *op,
                left: Box::new(self.rewrite(left, frame)),
                right: Box::new(self.rewrite(right, frame)),
            },
            ExprKind::Call { func, args } => ExprKind::Call {
                func: Box::new(self.rewrite(func, frame)),
                args: args.iter().map(|a| self.rewrite(a, frame)).collect(),
            },
            ExprKind::Unary { op, postfix, operand } => ExprKind::Unary {
                op: *op,
                postfix: *postfix,
                operand: Box::new(self.rewrite(operand, frame)),
            },
            ExprKind::Cast { expr: inner, to } => ExprKind::Cast {
                expr: Box::new(self.rewrite(inner, frame)),
                to: to.clone(),
            },
            ExprKind::Field { object, field } => ExprKind::Field {
                object: Box::new(self.rewrite(object, frame)),
                field: field.clone(),
            },
            ExprKind::ObjectLit(fields) => ExprKind::ObjectLit(
                fields
                    .iter()
                    .map(|(name, value)| (name.clone(), self.rewrite(value, frame)))
                    .collect(),
            ),
            ExprKind::ArrayLit(items) => {
                ExprKind::ArrayLit(items.iter().map(|item| self.rewrite(item, frame)).collect())
            }
            ExprKind::New { class, args } => ExprKind::New {
                class: class.clone(),
                args: args.iter().map(|a| self.rewrite(a, frame)).collect(),
            },
            ExprKind::Function(func) => ExprKind::Function(Box::new(FunctionLit {
                args: func.args.clone(),
                body: self.rewrite(&func.body, frame),
            })),
            ExprKind::For { var, iter, body } => ExprKind::For {
                var: var.clone(),
                iter: Box::new(self.rewrite(iter, frame)),
                body: Box::new(self.rewrite(body, frame)),
            },
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => ExprKind::If {
                cond: Box::new(self.rewrite(cond, frame)),
                then_branch: Box::new(self.rewrite(then_branch, frame)),
                else_branch: else_branch.as_ref().map(|e| Box::new(self.rewrite(e, frame))),
            },
            ExprKind::While { cond, body } => ExprKind::While {
                cond: Box::new(self.rewrite(cond, frame)),
                body: Box::new(self.rewrite(body, frame)),
            },
            ExprKind::Switch {
                subject,
                cases,
                default,
            } => ExprKind::Switch {
                subject: Box::new(self.rewrite(subject, frame)),
                cases: cases
                    .iter()
                    .map(|case| SwitchCase {
                        patterns: case.patterns.iter().map(|p| self.rewrite(p, frame)).collect(),
                        body: self.rewrite(&case.body, frame),
                    })
                    .collect(),
                default: default.as_ref().map(|d| Box::new(self.rewrite(d, frame))),
            },
            ExprKind::Try { body, catches } => ExprKind::Try {
                body: Box::new(self.rewrite(body, frame)),
                catches: catches
                    .iter()
                    .map(|catch| TryCatch {
                        var: catch.var.clone(),
                        body: self.rewrite(&catch.body, frame),
                    })
                    .collect(),
            },
            ExprKind::Return(value) => ExprKind::Return(value.as_ref().map(|v| Box::new(self.rewrite(v, frame)))),
            ExprKind::Throw(value) => ExprKind::Throw(Box::new(self.rewrite(value, frame))),
            ExprKind::Meta { name, expr: inner } => ExprKind::Meta {
                name: name.clone(),
                expr: Box::new(self.rewrite(inner, frame)),
            },
            ExprKind::Paren(inner) => ExprKind::Paren(Box::new(self.rewrite(inner, frame))),
        };

        TypedExpr { kind, span: expr.span }
    }
}

impl Default for Renamer {
    fn default() -> Self {
        Self::new()
    }
}

/// Rewrite `expr` so every variable declaration is collision-free.
pub fn fix_variable_names(expr: &TypedExpr) -> TypedExpr {
    Renamer::new().fix(expr)
}

/// Next candidate after a collision.
///
/// A trailing decimal numeral is stripped and re-appended incremented by
/// one; otherwise the literal suffix `2` is appended. Digits not at the
/// very end of the name are left alone.
fn bump_name(name: &str) -> String {
    let stem_len = name.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    let (stem, digits) = name.split_at(stem_len);
    if digits.is_empty() {
        return format!("{name}2");
    }
    match digits.parse::<u64>().ok().and_then(|n| n.checked_add(1)) {
        Some(next) => format!("{stem}{next}"),
        // Digit run too large to parse; still deterministic.
        None => format!("{name}2"),
    }
}

/// Post-pass invariant check, debug builds only.
///
/// A collision here is an internal-consistency bug in the renamer, never
/// a recoverable user error.
#[cfg(debug_assertions)]
fn assert_unique_names(expr: &TypedExpr, scopes: &mut Vec<HashSet<String>>) {
    match &expr.kind {
        ExprKind::Block(stmts) => {
            scopes.push(HashSet::new());
            for stmt in stmts {
                assert_unique_names(stmt, scopes);
            }
            scopes.pop();
        }
        ExprKind::VarDecl { var, init } => {
            if let Some(init) = init {
                assert_unique_names(init, scopes);
            }
            for scope in scopes.iter() {
                assert!(
                    !scope.contains(&var.name),
                    "INVARIANT: renamer produced colliding name `{}`",
                    var.name
                );
            }
            if let Some(scope) = scopes.last_mut() {
                scope.insert(var.name.clone());
            }
        }
        _ => {
            for_each_child(expr, &mut |child| assert_unique_names(child, scopes));
        }
    }
}

/// Visit every direct child expression of `expr`.
#[cfg(debug_assertions)]
fn for_each_child<'e>(expr: &'e TypedExpr, visit: &mut dyn FnMut(&'e TypedExpr)) {
    match &expr.kind {
        ExprKind::Const(_)
        | ExprKind::Local(_)
        | ExprKind::TypeRef(_)
        | ExprKind::Ident(_)
        | ExprKind::Break
        | ExprKind::Continue => {}
        ExprKind::ArrayAccess { object, index } => {
            visit(object);
            visit(index);
        }
        ExprKind::VarDecl { init, .. } => {
            if let Some(init) = init {
                visit(init);
            }
        }
        ExprKind::EnumParam { value, .. } => visit(value),
        ExprKind::EnumIndex(value) => visit(value),
        ExprKind::Binary { left, right, .. } => {
            visit(left);
            visit(right);
        }
        ExprKind::Call { func, args } => {
            visit(func);
            args.iter().for_each(&mut *visit);
        }
        ExprKind::Unary { operand, .. } => visit(operand),
        ExprKind::Cast { expr: inner, .. } => visit(inner),
        ExprKind::Field { object, .. } => visit(object),
        ExprKind::ObjectLit(fields) => fields.iter().for_each(|(_, value)| visit(value)),
        ExprKind::ArrayLit(items) => items.iter().for_each(&mut *visit),
        ExprKind::New { args, .. } => args.iter().for_each(&mut *visit),
        ExprKind::Function(func) => visit(&func.body),
        ExprKind::Block(stmts) => stmts.iter().for_each(&mut *visit),
        ExprKind::For { iter, body, .. } => {
            visit(iter);
            visit(body);
        }
        ExprKind::If {
            cond,
            then_branch,
            else_branch,
        } => {
            visit(cond);
            visit(then_branch);
            if let Some(else_branch) = else_branch {
                visit(else_branch);
            }
        }
        ExprKind::While { cond, body } => {
            visit(cond);
            visit(body);
        }
        ExprKind::Switch {
            subject,
            cases,
            default,
        } => {
            visit(subject);
            for case in cases {
                case.patterns.iter().for_each(&mut *visit);
                visit(&case.body);
            }
            if let Some(default) = default {
                visit(default);
            }
        }
        ExprKind::Try { body, catches } => {
            visit(body);
            for catch in catches {
                visit(&catch.body);
            }
        }
        ExprKind::Return(value) => {
            if let Some(value) = value {
                visit(value);
            }
        }
        ExprKind::Throw(value) => visit(value),
        ExprKind::Meta { expr: inner, .. } => visit(inner),
        ExprKind::Paren(inner) => visit(inner),
    }
}

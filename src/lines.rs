//! Expression line formatter
//!
//! Groups a flat statement sequence into readable clusters before the
//! per-target emitter output is assembled into a body: statements of the
//! same category stay adjacent, and a single blank line is inserted at
//! every category boundary. Purely cosmetic; semantics are untouched.

use retarget_ir::{ExprKind, TypedExpr};

/// Classify a statement for line grouping.
///
/// The table is fixed: runs of the same category stay ungapped, and a
/// blank line separates consecutive statements whose categories differ.
/// Metadata and parenthesis wrappers take the category of their inner
/// node.
pub fn statement_category(expr: &TypedExpr) -> u8 {
    match &expr.skip_wrappers().kind {
        ExprKind::Const(_)
        | ExprKind::Local(_)
        | ExprKind::ArrayAccess { .. }
        | ExprKind::VarDecl { .. }
        | ExprKind::TypeRef(_)
        | ExprKind::EnumParam { .. }
        | ExprKind::EnumIndex(_)
        | ExprKind::Ident(_) => 0,
        ExprKind::Binary { .. }
        | ExprKind::Call { .. }
        | ExprKind::Unary { .. }
        | ExprKind::Cast { .. }
        | ExprKind::Field { .. } => 1,
        ExprKind::ObjectLit(_) => 2,
        ExprKind::ArrayLit(_) => 3,
        ExprKind::New { .. } => 4,
        ExprKind::Function(_) => 5,
        ExprKind::Block(_) => 6,
        ExprKind::For { .. } => 7,
        ExprKind::If { .. } => 8,
        ExprKind::While { .. } => 9,
        ExprKind::Switch { .. } => 10,
        ExprKind::Try { .. } => 11,
        ExprKind::Return(_) => 12,
        ExprKind::Break | ExprKind::Continue => 13,
        ExprKind::Throw(_) => 14,
        // Wrappers are peeled by skip_wrappers above.
        ExprKind::Meta { expr, .. } => statement_category(expr),
        ExprKind::Paren(inner) => statement_category(inner),
    }
}

/// Join already-emitted statement texts into body lines.
///
/// Each entry is the emitted text plus its [`statement_category`]. One
/// blank line appears exactly where the category changes between
/// consecutive statements.
pub fn group_statements<I>(parts: I) -> String
where
    I: IntoIterator<Item = (String, u8)>,
{
    let mut out = String::new();
    let mut last_category: Option<u8> = None;

    for (text, category) in parts {
        if let Some(prev) = last_category {
            if prev != category {
                out.push('\n');
            }
        }
        out.push_str(&text);
        out.push('\n');
        last_category = Some(category);
    }

    out
}

#[cfg(test)]
mod tests {
    use retarget_ir::{Constant, Var};

    use super::*;

    fn expr(kind: ExprKind) -> TypedExpr {
        TypedExpr::new(kind)
    }

    #[test]
    fn test_category_table() {
        assert_eq!(statement_category(&expr(ExprKind::Const(Constant::Int(1)))), 0);
        assert_eq!(statement_category(&expr(ExprKind::Local(Var::new(0, "x")))), 0);
        assert_eq!(
            statement_category(&expr(ExprKind::Call {
                func: Box::new(expr(ExprKind::Ident("f".into()))),
                args: Vec::new(),
            })),
            1
        );
        assert_eq!(statement_category(&expr(ExprKind::ArrayLit(Vec::new()))), 3);
        assert_eq!(statement_category(&expr(ExprKind::Return(None))), 12);
        assert_eq!(statement_category(&expr(ExprKind::Break)), 13);
        assert_eq!(statement_category(&expr(ExprKind::Continue)), 13);
    }

    #[test]
    fn test_category_sees_through_wrappers() {
        let wrapped = expr(ExprKind::Paren(Box::new(expr(ExprKind::Meta {
            name: "inline".into(),
            expr: Box::new(expr(ExprKind::Return(None))),
        }))));
        assert_eq!(statement_category(&wrapped), 12);
    }

    #[test]
    fn test_group_statements_boundaries() {
        let body = group_statements(vec![
            ("let a = 1;".to_string(), 0),
            ("let b = 2;".to_string(), 0),
            ("f();".to_string(), 1),
            ("if (a) {}".to_string(), 8),
            ("g();".to_string(), 1),
        ]);
        assert_eq!(body, "let a = 1;\nlet b = 2;\n\nf();\n\nif (a) {}\n\ng();\n");
    }

    #[test]
    fn test_group_statements_empty() {
        assert_eq!(group_statements(Vec::new()), "");
    }

    #[test]
    fn test_group_statements_single_run() {
        let body = group_statements(vec![("a;".to_string(), 1), ("b;".to_string(), 1)]);
        assert_eq!(body, "a;\nb;\n");
    }
}

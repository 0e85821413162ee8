//! End-to-end driver tests against a small pseudo-code emitter
//!
//! The emitter here renders a deliberately tiny pseudo language - just
//! enough surface to exercise filtering, body compilation, line
//! grouping, renaming, and failure semantics through the public API.

use retarget::ir::{
    AccessMode, BinaryOp, ClassDecl, ClassField, ClassMethod, Constant, DeclKind, Declaration, EnumDecl, EnumVariant,
    ExprKind, Span, TypePath, TypedExpr, TypedefDecl, Var,
};
use retarget::{CompileError, CompilerConfig, Driver, Emitter};

/// Minimal per-target hook for tests.
#[derive(Default)]
struct PseudoEmitter {
    /// Names of declarations that reached `emit_declaration`.
    emitted: Vec<String>,
}

impl PseudoEmitter {
    fn emit_block_inline(&mut self, driver: &mut Driver<'_>, expr: &TypedExpr) -> Result<String, CompileError> {
        match &expr.kind {
            ExprKind::Block(stmts) => {
                let mut parts = Vec::new();
                for stmt in stmts {
                    parts.push(driver.compile_expression_or_fail(self, stmt)?);
                }
                Ok(format!("{{ {} }}", parts.join(" ")))
            }
            _ => driver.compile_expression_or_fail(self, expr),
        }
    }
}

impl Emitter for PseudoEmitter {
    fn emit_declaration(
        &mut self,
        driver: &mut Driver<'_>,
        decl: &Declaration,
        fields: &[&ClassField],
        methods: &[&ClassMethod],
    ) -> Result<Option<String>, CompileError> {
        self.emitted.push(decl.name().to_string());
        match &decl.kind {
            DeclKind::Class(_) => {
                let mut out = format!("class {} {{\n", decl.name());
                for field in fields {
                    out.push_str(&format!("    var {};\n", field.name));
                }
                for method in methods {
                    out.push_str(&format!("    fn {}() {{\n", method.name));
                    if let Some(body) = &method.body {
                        let body_text = driver.compile_function_body(self, body)?;
                        for line in body_text.lines() {
                            if line.is_empty() {
                                out.push('\n');
                            } else {
                                out.push_str(&format!("        {line}\n"));
                            }
                        }
                    }
                    out.push_str("    }\n");
                }
                out.push_str("}\n");
                Ok(Some(out))
            }
            DeclKind::Enum(e) => {
                let variants: Vec<&str> = e.variants.iter().map(|v| v.name.as_str()).collect();
                Ok(Some(format!("enum {} {{ {} }}\n", decl.name(), variants.join(", "))))
            }
            // Typedefs and abstracts erase to nothing in the pseudo target.
            DeclKind::Typedef(_) | DeclKind::Abstract(_) => Ok(None),
        }
    }

    fn emit_expression(&mut self, driver: &mut Driver<'_>, expr: &TypedExpr) -> Result<Option<String>, CompileError> {
        let text = match &expr.kind {
            ExprKind::Const(Constant::Int(value)) => value.to_string(),
            ExprKind::Const(Constant::Bool(value)) => value.to_string(),
            ExprKind::Const(Constant::String(value)) => format!("\"{value}\""),
            ExprKind::Const(Constant::Null) => "null".to_string(),
            ExprKind::Local(var) => var.name.clone(),
            ExprKind::Ident(name) => name.clone(),
            ExprKind::VarDecl { var, init } => match init {
                Some(init) => {
                    let init = driver.compile_expression_or_fail(self, init)?;
                    format!("var {} = {};", var.name, init)
                }
                None => format!("var {};", var.name),
            },
            ExprKind::Binary {
                op: BinaryOp::Add,
                left,
                right,
            } => {
                let left = driver.compile_expression_or_fail(self, left)?;
                let right = driver.compile_expression_or_fail(self, right)?;
                format!("{left} + {right}")
            }
            ExprKind::Call { func, args } => {
                let func = driver.compile_expression_or_fail(self, func)?;
                let mut rendered = Vec::new();
                for arg in args {
                    rendered.push(driver.compile_expression_or_fail(self, arg)?);
                }
                format!("{}({})", func, rendered.join(", "))
            }
            ExprKind::If {
                cond, then_branch, ..
            } => {
                let cond = driver.compile_expression_or_fail(self, cond)?;
                let body = self.emit_block_inline(driver, then_branch)?;
                format!("if ({cond}) {body}")
            }
            ExprKind::Return(Some(value)) => {
                let value = driver.compile_expression_or_fail(self, value)?;
                format!("return {value};")
            }
            ExprKind::Return(None) => "return;".to_string(),
            // Everything else has no rendering in the pseudo target.
            _ => return Ok(None),
        };
        Ok(Some(text))
    }
}

fn class_at(module: &[&str], name: &str, decl: ClassDecl) -> Declaration {
    Declaration::new(
        DeclKind::Class(decl),
        TypePath::new(module.iter().map(|s| s.to_string()).collect(), name),
    )
}

fn int(value: i64) -> TypedExpr {
    TypedExpr::new(ExprKind::Const(Constant::Int(value)))
}

fn var_decl(id: u32, name: &str, init: TypedExpr) -> TypedExpr {
    TypedExpr::new(ExprKind::VarDecl {
        var: Var::new(id, name),
        init: Some(Box::new(init)),
    })
}

fn call(name: &str) -> TypedExpr {
    TypedExpr::new(ExprKind::Call {
        func: Box::new(TypedExpr::new(ExprKind::Ident(name.into()))),
        args: Vec::new(),
    })
}

#[test]
fn test_category_grouping_in_body() {
    // [assignment, assignment, call, conditional, call] puts a blank
    // line at each category boundary and nowhere else.
    let body = TypedExpr::new(ExprKind::Block(vec![
        var_decl(1, "a", int(1)),
        var_decl(2, "b", int(2)),
        call("f"),
        TypedExpr::new(ExprKind::If {
            cond: Box::new(TypedExpr::new(ExprKind::Const(Constant::Bool(true)))),
            then_branch: Box::new(TypedExpr::new(ExprKind::Block(vec![call("h")]))),
            else_branch: None,
        }),
        call("g"),
    ]));

    let mut driver = Driver::new(CompilerConfig::default());
    let text = driver
        .compile_function_body(&mut PseudoEmitter::default(), &body)
        .unwrap();
    assert_eq!(
        text,
        "var a = 1;\nvar b = 2;\n\nf()\n\nif (true) { h() }\n\ng()\n"
    );
}

#[test]
fn test_whole_declaration_snapshot() {
    let method = ClassMethod::new("run").with_body(TypedExpr::new(ExprKind::Block(vec![
        var_decl(1, "x", int(1)),
        var_decl(2, "x", int(2)),
        TypedExpr::new(ExprKind::Return(Some(Box::new(TypedExpr::new(ExprKind::Binary {
            op: BinaryOp::Add,
            left: Box::new(TypedExpr::new(ExprKind::Local(Var::new(1, "x")))),
            right: Box::new(TypedExpr::new(ExprKind::Local(Var::new(2, "x")))),
        }))))),
    ])));
    let decl = class_at(
        &["app"],
        "Counter",
        ClassDecl {
            fields: vec![ClassField::new("count")],
            methods: vec![method],
        },
    );

    let mut driver = Driver::new(CompilerConfig::default());
    let mut emitter = PseudoEmitter::default();
    driver.compile_program(&mut emitter, std::slice::from_ref(&decl)).unwrap();

    assert_eq!(driver.units().len(), 1);
    insta::assert_snapshot!(driver.units()[0].text.trim_end(), @r#"
    class Counter {
        var count;
        fn run() {
            var x = 1;
            var x2 = 2;

            return x + x2;
        }
    }
    "#);
}

#[test]
fn test_type_param_and_skip_list_never_reach_emitter() {
    let decls = vec![
        class_at(&[], "T", ClassDecl::default()).with_type_param(true),
        class_at(&[], "Hidden", ClassDecl::default()),
        class_at(&[], "Kept", ClassDecl::default()),
    ];
    let mut driver = Driver::new(CompilerConfig::default().with_skip_type("Hidden"));
    let mut emitter = PseudoEmitter::default();
    driver.compile_program(&mut emitter, &decls).unwrap();
    assert_eq!(emitter.emitted, vec!["Kept".to_string()]);
}

#[test]
fn test_extern_declarations_skipped_by_default() {
    let decls = vec![class_at(&[], "Native", ClassDecl::default()).with_extern(true)];
    let mut driver = Driver::new(CompilerConfig::default());
    let mut emitter = PseudoEmitter::default();
    driver.compile_program(&mut emitter, &decls).unwrap();
    assert!(driver.units().is_empty());

    let mut driver = Driver::new(CompilerConfig::default().with_externs());
    let mut emitter = PseudoEmitter::default();
    driver.compile_program(&mut emitter, &decls).unwrap();
    assert_eq!(driver.units().len(), 1);
}

#[test]
fn test_typedef_erases_without_error() {
    let decls = vec![
        Declaration::new(
            DeclKind::Typedef(TypedefDecl {
                target: TypePath::top_level("Real"),
            }),
            TypePath::top_level("Alias"),
        ),
        class_at(&[], "Kept", ClassDecl::default()),
    ];
    let mut driver = Driver::new(CompilerConfig::default());
    let mut emitter = PseudoEmitter::default();
    driver.compile_program(&mut emitter, &decls).unwrap();
    // The typedef was considered but produced no unit.
    assert_eq!(emitter.emitted, vec!["Alias".to_string(), "Kept".to_string()]);
    assert_eq!(driver.units().len(), 1);
    assert_eq!(driver.units()[0].decl.name(), "Kept");
}

#[test]
fn test_enum_declaration_compiles() {
    let decls = vec![Declaration::new(
        DeclKind::Enum(EnumDecl {
            variants: vec![EnumVariant::new("Red"), EnumVariant::new("Green")],
        }),
        TypePath::top_level("Color"),
    )];
    let mut driver = Driver::new(CompilerConfig::default());
    driver.compile_program(&mut PseudoEmitter::default(), &decls).unwrap();
    assert_eq!(driver.units()[0].text, "enum Color { Red, Green }\n");
}

#[test]
fn test_failing_declaration_aborts_only_itself() {
    let bad_body = TypedExpr::new(ExprKind::Block(vec![TypedExpr::new(ExprKind::Throw(Box::new(int(1))))
        .with_span(Span::new(5, 9))]));
    let decls = vec![
        class_at(
            &[],
            "Bad",
            ClassDecl {
                fields: Vec::new(),
                methods: vec![ClassMethod::new("boom").with_body(bad_body)],
            },
        ),
        class_at(&[], "Good", ClassDecl::default()),
    ];

    let mut driver = Driver::new(CompilerConfig::default());
    let errors = driver
        .compile_program(&mut PseudoEmitter::default(), &decls)
        .unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.iter().next().unwrap().span(), Span::new(5, 9));
    // The good declaration still compiled.
    assert_eq!(driver.units().len(), 1);
    assert_eq!(driver.units()[0].decl.name(), "Good");
}

#[test]
fn test_non_physical_fields_filtered_when_configured() {
    let decl_fields = vec![
        ClassField::new("stored"),
        ClassField::new("computed").with_access(AccessMode::Accessor, AccessMode::Accessor),
    ];
    let decls = vec![class_at(
        &[],
        "Config",
        ClassDecl {
            fields: decl_fields,
            methods: Vec::new(),
        },
    )];

    let mut driver = Driver::new(CompilerConfig::default());
    driver.compile_program(&mut PseudoEmitter::default(), &decls).unwrap();
    assert!(driver.units()[0].text.contains("computed"));

    let mut config = CompilerConfig::default();
    config.ignore_non_physical_fields = true;
    let mut driver = Driver::new(config);
    driver.compile_program(&mut PseudoEmitter::default(), &decls).unwrap();
    assert!(!driver.units()[0].text.contains("computed"));
    assert!(driver.units()[0].text.contains("stored"));
}

#[test]
fn test_fatal_on_missing_body() {
    let decls = vec![class_at(
        &[],
        "Incomplete",
        ClassDecl {
            fields: Vec::new(),
            methods: vec![ClassMethod::new("later").with_span(Span::new(1, 4))],
        },
    )];

    // Accepted by default; the emitter just renders an empty body.
    let mut driver = Driver::new(CompilerConfig::default());
    assert!(driver.compile_program(&mut PseudoEmitter::default(), &decls).is_ok());

    let mut config = CompilerConfig::default();
    config.fatal_on_missing_body = true;
    let mut driver = Driver::new(config);
    let errors = driver
        .compile_program(&mut PseudoEmitter::default(), &decls)
        .unwrap_err();
    assert!(matches!(
        errors.iter().next().unwrap(),
        CompileError::MissingFunctionBody { name, .. } if name == "later"
    ));
}

#[test]
fn test_injection_function_inside_body() {
    let body = TypedExpr::new(ExprKind::Block(vec![TypedExpr::new(ExprKind::Call {
        func: Box::new(TypedExpr::new(ExprKind::Ident("__raw".into()))),
        args: vec![TypedExpr::new(ExprKind::Const(Constant::String(
            "asm { nop }".into(),
        )))],
    })]));
    let decls = vec![class_at(
        &[],
        "LowLevel",
        ClassDecl {
            fields: Vec::new(),
            methods: vec![ClassMethod::new("spin").with_body(body)],
        },
    )];

    let mut driver = Driver::new(CompilerConfig::default().with_injection_function("__raw"));
    driver.compile_program(&mut PseudoEmitter::default(), &decls).unwrap();
    assert!(driver.units()[0].text.contains("asm { nop }"));
    // Without the marker configured, the call is compiled as a call.
    let mut driver = Driver::new(CompilerConfig::default());
    driver.compile_program(&mut PseudoEmitter::default(), &decls).unwrap();
    assert!(driver.units()[0].text.contains("__raw(\"asm { nop }\")"));
}

#[test]
fn test_accumulator_rebuilt_each_pass() {
    let decls_a = vec![class_at(&[], "A", ClassDecl::default())];
    let decls_b = vec![class_at(&[], "B", ClassDecl::default())];
    let mut driver = Driver::new(CompilerConfig::default());
    let mut emitter = PseudoEmitter::default();
    driver.compile_program(&mut emitter, &decls_a).unwrap();
    driver.compile_program(&mut emitter, &decls_b).unwrap();
    assert_eq!(driver.units().len(), 1);
    assert_eq!(driver.units()[0].decl.name(), "B");
}

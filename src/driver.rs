//! Compiler driver
//!
//! The driver decides *what* gets compiled and *when*, and leaves every
//! syntax decision to an injected per-target [`Emitter`]. For each
//! declaration the front end hands over, the driver applies the skip
//! policy, filters members, dispatches to the emitter, and accumulates
//! the returned text for the output manager.
//!
//! ## Emitter contract
//!
//! `Ok(Some(text))` is emitted output. `Ok(None)` means the declaration
//! or expression intentionally erases to nothing in the target language:
//! legitimate for whole declarations (typedefs and abstracts often
//! vanish), fatal for expressions compiled through
//! [`Driver::compile_expression_or_fail`] because an expression is
//! mandatory context. `Err` is an emission failure; it aborts only the
//! declaration under compilation, and the pass reports every failure it
//! collected at the end.
//!
//! The driver is synchronous and single-threaded: one declaration is
//! fully compiled (or fails) before the next begins.

use retarget_ir::{ClassField, ClassMethod, Constant, DeclKind, Declaration, ExprKind, TypedExpr};

use crate::config::CompilerConfig;
use crate::errors::{CompileError, CompileErrors};
use crate::lines;
use crate::rename;

/// Per-target emission hooks.
///
/// The only two required methods are the only places output-language
/// syntax is decided. The provided methods are overridable filters and a
/// bookkeeping hook; their defaults accept everything.
pub trait Emitter {
    /// Emit one declaration, or `None` if it erases to nothing.
    ///
    /// `fields` and `methods` are the class members that survived
    /// filtering; both are empty for non-class declarations.
    fn emit_declaration(
        &mut self,
        driver: &mut Driver<'_>,
        decl: &Declaration,
        fields: &[&ClassField],
        methods: &[&ClassMethod],
    ) -> Result<Option<String>, CompileError>;

    /// Emit one expression node, or `None` if this emitter has no
    /// rendering for it.
    fn emit_expression(&mut self, driver: &mut Driver<'_>, expr: &TypedExpr) -> Result<Option<String>, CompileError>;

    fn should_generate_class(&self, _decl: &Declaration) -> bool {
        true
    }

    fn should_generate_enum(&self, _decl: &Declaration) -> bool {
        true
    }

    fn should_generate_typedef(&self, _decl: &Declaration) -> bool {
        true
    }

    fn should_generate_abstract(&self, _decl: &Declaration) -> bool {
        true
    }

    fn should_generate_field(&self, _field: &ClassField) -> bool {
        true
    }

    fn should_generate_method(&self, _method: &ClassMethod) -> bool {
        true
    }

    /// Fired for every considered declaration, including ones the skip
    /// policy rejects. Side effect only; the driver ignores any state
    /// this touches.
    fn on_declaration(&mut self, _decl: &Declaration) {}
}

/// One accumulated (declaration, emitted text) pair.
#[derive(Debug, Clone)]
pub struct CompiledUnit<'a> {
    pub decl: &'a Declaration,
    pub text: String,
}

/// Top-level orchestrator for one compilation pass.
///
/// Owns the configuration and the compilation accumulator; borrows the
/// declaration set from the front end for the duration of the pass.
#[derive(Debug)]
pub struct Driver<'a> {
    config: CompilerConfig,
    units: Vec<CompiledUnit<'a>>,
}

impl<'a> Driver<'a> {
    pub fn new(config: CompilerConfig) -> Self {
        Self {
            config,
            units: Vec::new(),
        }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Accumulated output in declaration order.
    pub fn units(&self) -> &[CompiledUnit<'a>] {
        &self.units
    }

    pub fn into_units(self) -> Vec<CompiledUnit<'a>> {
        self.units
    }

    /// Compile every declaration in order.
    ///
    /// The accumulator is rebuilt from scratch on each call. A failing
    /// declaration is dropped from the output; all failures are returned
    /// together once the pass is complete.
    #[tracing::instrument(skip_all, fields(decl_count = declarations.len()))]
    pub fn compile_program<E: Emitter + ?Sized>(
        &mut self,
        emitter: &mut E,
        declarations: &'a [Declaration],
    ) -> Result<(), CompileErrors> {
        self.units.clear();
        let mut errors: Vec<CompileError> = Vec::new();

        for decl in declarations {
            emitter.on_declaration(decl);

            if !self.should_generate(emitter, decl) {
                tracing::debug!(path = %decl.path, "skipping declaration");
                continue;
            }

            match self.compile_declaration(emitter, decl) {
                Ok(Some(text)) => self.units.push(CompiledUnit { decl, text }),
                Ok(None) => tracing::debug!(path = %decl.path, "declaration erased to nothing"),
                Err(error) => errors.push(error),
            }
        }

        match CompileErrors::from_vec(errors) {
            Some(errors) => Err(errors),
            None => Ok(()),
        }
    }

    /// Default skip policy plus the emitter's per-kind filter.
    ///
    /// Type-parameter placeholders never compile. Externs compile only
    /// when the configuration allows them. Skip-listed paths never
    /// compile.
    pub fn should_generate<E: Emitter + ?Sized>(&self, emitter: &E, decl: &Declaration) -> bool {
        if decl.is_type_param {
            return false;
        }
        if decl.is_extern && self.config.ignore_externs {
            return false;
        }
        let full = decl.path.full();
        if self.config.skip_types.iter().any(|skip| *skip == full) {
            return false;
        }
        match &decl.kind {
            DeclKind::Class(_) => emitter.should_generate_class(decl),
            DeclKind::Enum(_) => emitter.should_generate_enum(decl),
            DeclKind::Typedef(_) => emitter.should_generate_typedef(decl),
            DeclKind::Abstract(_) => emitter.should_generate_abstract(decl),
        }
    }

    /// Member filter for variable members.
    pub fn should_generate_field<E: Emitter + ?Sized>(&self, emitter: &E, field: &ClassField) -> bool {
        if self.config.ignore_non_physical_fields && !field.is_physical() {
            return false;
        }
        emitter.should_generate_field(field)
    }

    /// Member filter for function members.
    pub fn should_generate_method<E: Emitter + ?Sized>(&self, emitter: &E, method: &ClassMethod) -> bool {
        emitter.should_generate_method(method)
    }

    fn compile_declaration<E: Emitter + ?Sized>(
        &mut self,
        emitter: &mut E,
        decl: &'a Declaration,
    ) -> Result<Option<String>, CompileError> {
        match &decl.kind {
            DeclKind::Class(class) => {
                let fields: Vec<&ClassField> = class
                    .fields
                    .iter()
                    .filter(|field| self.should_generate_field(&*emitter, field))
                    .collect();
                let methods: Vec<&ClassMethod> = class
                    .methods
                    .iter()
                    .filter(|method| self.should_generate_method(&*emitter, method))
                    .collect();

                if self.config.fatal_on_missing_body && !decl.is_extern {
                    if let Some(missing) = methods.iter().find(|method| method.body.is_none()) {
                        return Err(CompileError::MissingFunctionBody {
                            name: missing.name.clone(),
                            span: missing.span,
                        });
                    }
                }

                emitter.emit_declaration(self, decl, &fields, &methods)
            }
            DeclKind::Enum(_) | DeclKind::Typedef(_) | DeclKind::Abstract(_) => {
                emitter.emit_declaration(self, decl, &[], &[])
            }
        }
    }

    /// Compile one expression through the target hook.
    ///
    /// When an injection function is configured and the node is a call to
    /// it with a literal string argument, that literal is the output
    /// verbatim: the escape hatch for dropping target-native syntax
    /// inline.
    pub fn compile_expression<E: Emitter + ?Sized>(
        &mut self,
        emitter: &mut E,
        expr: &TypedExpr,
    ) -> Result<Option<String>, CompileError> {
        if let Some(code) = self.injected_code(expr) {
            return Ok(Some(code));
        }
        emitter.emit_expression(self, expr)
    }

    /// Like [`Self::compile_expression`], but an empty result is fatal.
    ///
    /// An expression is mandatory context, unlike a whole declaration
    /// which may legitimately erase to nothing.
    pub fn compile_expression_or_fail<E: Emitter + ?Sized>(
        &mut self,
        emitter: &mut E,
        expr: &TypedExpr,
    ) -> Result<String, CompileError> {
        match self.compile_expression(emitter, expr)? {
            Some(text) => Ok(text),
            None => Err(CompileError::MissingExpressionImpl { span: expr.span }),
        }
    }

    /// Compile a statement sequence into grouped body lines.
    ///
    /// Statements are classified by [`lines::statement_category`]; a
    /// blank line is emitted exactly where the category changes between
    /// consecutive statements.
    pub fn compile_expressions_into_lines<E: Emitter + ?Sized>(
        &mut self,
        emitter: &mut E,
        exprs: &[TypedExpr],
    ) -> Result<String, CompileError> {
        let mut parts = Vec::with_capacity(exprs.len());
        for expr in exprs {
            let text = self.compile_expression_or_fail(emitter, expr)?;
            parts.push((text, lines::statement_category(expr)));
        }
        Ok(lines::group_statements(parts))
    }

    /// Compile a function or initializer body.
    ///
    /// Runs the variable-renaming pass when `normalize_expressions` is
    /// enabled, flattens a top-level block into its statement list, and
    /// formats the result into grouped lines.
    pub fn compile_function_body<E: Emitter + ?Sized>(
        &mut self,
        emitter: &mut E,
        body: &TypedExpr,
    ) -> Result<String, CompileError> {
        let body = if self.config.normalize_expressions {
            rename::fix_variable_names(body)
        } else {
            body.clone()
        };
        match &body.kind {
            ExprKind::Block(stmts) => self.compile_expressions_into_lines(emitter, stmts),
            _ => self.compile_expressions_into_lines(emitter, std::slice::from_ref(&body)),
        }
    }

    /// Literal target code embedded via the injection function, if any.
    fn injected_code(&self, expr: &TypedExpr) -> Option<String> {
        let marker = self.config.injection_function.as_deref()?;
        let ExprKind::Call { func, args } = &expr.skip_wrappers().kind else {
            return None;
        };
        let ExprKind::Ident(name) = &func.skip_wrappers().kind else {
            return None;
        };
        if name != marker {
            return None;
        }
        let ExprKind::Const(Constant::String(code)) = &args.first()?.skip_wrappers().kind else {
            return None;
        };
        Some(code.clone())
    }
}

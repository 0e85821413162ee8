//! Error types for the retarget backend
//!
//! Two families, matching the two phases of a pass:
//!
//! - [`CompileError`] — emission failures while driving per-target hooks.
//!   A missing *expression* result is fatal for the declaration under
//!   compilation; a missing *declaration* result is not an error at all
//!   (the declaration erases to nothing by design).
//! - [`OutputError`] — configuration misuse and filesystem failures while
//!   realizing artifacts.
//!
//! Both come with aggregate wrappers so one pass can report every failure
//! it hit instead of stopping at the first.

use std::io;
use std::path::PathBuf;

use miette::Diagnostic;
use retarget_ir::Span;
use thiserror::Error;

/// Error while compiling a declaration or expression.
#[derive(Debug, Clone, Error, Diagnostic)]
pub enum CompileError {
    /// The expression emitter returned nothing for a mandatory node.
    #[error("expression emitter produced no output ({span})")]
    #[diagnostic(code(retarget::driver::missing_expression))]
    MissingExpressionImpl { span: Span },

    /// A non-extern function has no body and the config makes that fatal.
    #[error("function `{name}` has no body ({span})")]
    #[diagnostic(code(retarget::driver::missing_body))]
    MissingFunctionBody { name: String, span: Span },

    /// Failure reported by a per-target emitter.
    #[error("emission failed: {message} ({span})")]
    #[diagnostic(code(retarget::driver::emission))]
    Emission { message: String, span: Span },
}

impl CompileError {
    /// Source position the error originates from.
    pub fn span(&self) -> Span {
        match self {
            CompileError::MissingExpressionImpl { span } => *span,
            CompileError::MissingFunctionBody { span, .. } => *span,
            CompileError::Emission { span, .. } => *span,
        }
    }
}

/// Collection of compile errors from one pass.
///
/// A failing declaration aborts only itself; the pass keeps going and
/// every error ends up here, so hosts can show them all at once.
#[derive(Debug)]
pub struct CompileErrors(pub Vec<CompileError>);

impl std::fmt::Display for CompileErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} compilation error(s)", self.0.len())?;
        for error in &self.0 {
            write!(f, "\n  {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CompileErrors {}

impl CompileErrors {
    /// Wrap a single error.
    pub fn single(error: CompileError) -> Self {
        Self(vec![error])
    }

    /// `Some` when the vector is non-empty.
    pub fn from_vec(errors: Vec<CompileError>) -> Option<Self> {
        if errors.is_empty() { None } else { Some(Self(errors)) }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompileError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Error while writing generated output.
#[derive(Debug, Error, Diagnostic)]
pub enum OutputError {
    /// Output was requested before a destination was configured.
    #[error("output requested before an output directory was configured")]
    #[diagnostic(code(retarget::output::missing_dir))]
    MissingOutputDir,

    /// Creating the output directory failed.
    #[error("failed to create output directory `{path}`: {source}")]
    #[diagnostic(code(retarget::output::create_dir))]
    CreateDir { path: PathBuf, source: io::Error },

    /// Writing one artifact failed. Remaining artifacts are still
    /// attempted.
    #[error("failed to write `{path}`: {source}")]
    #[diagnostic(code(retarget::output::write))]
    Write { path: PathBuf, source: io::Error },

    /// Deleting a stale artifact failed.
    #[error("failed to delete stale output `{path}`: {source}")]
    #[diagnostic(code(retarget::output::delete))]
    Delete { path: PathBuf, source: io::Error },

    /// Reading or writing the manifest failed.
    #[error("failed to access manifest `{path}`: {source}")]
    #[diagnostic(code(retarget::output::manifest))]
    Manifest { path: PathBuf, source: io::Error },
}

/// Collection of output errors from one pass.
///
/// Presence of any entry marks the pass failed: the manifest is not
/// advanced, but artifacts written before the failure stay on disk.
#[derive(Debug)]
pub struct OutputErrors(pub Vec<OutputError>);

impl std::fmt::Display for OutputErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} output error(s)", self.0.len())?;
        for error in &self.0 {
            write!(f, "\n  {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for OutputErrors {}

impl OutputErrors {
    /// Wrap a single error.
    pub fn single(error: OutputError) -> Self {
        Self(vec![error])
    }

    /// `Some` when the vector is non-empty.
    pub fn from_vec(errors: Vec<OutputError>) -> Option<Self> {
        if errors.is_empty() { None } else { Some(Self(errors)) }
    }

    pub fn iter(&self) -> impl Iterator<Item = &OutputError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

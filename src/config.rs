//! Compilation configuration for the retarget backend
//!
//! One plain-data struct read by the driver and the output manager. The
//! flags marked *informational* are carried for per-target emitters to
//! consult; the core never branches on them.

use std::path::PathBuf;

/// How generated text is partitioned into files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputStrategy {
    /// No filesystem action; the host consumes the accumulator itself.
    Manual,
    /// Everything concatenated into one file.
    SingleFile,
    /// One file per owning module.
    FilePerModule,
    /// One file per declaration.
    #[default]
    FilePerClass,
}

/// Compilation configuration.
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// Output partitioning strategy.
    pub strategy: OutputStrategy,
    /// Suffix appended to every generated file name (e.g. `.out`).
    pub file_extension: String,
    /// Destination directory. Required before any non-`Manual` write.
    pub output_dir: Option<PathBuf>,
    /// File stem used by the `SingleFile` strategy.
    pub single_file_name: String,
    /// Fully-qualified type paths that are never compiled.
    pub skip_types: Vec<String>,
    /// Name of the inline target-code-injection function, if enabled.
    ///
    /// A call to this identifier with a literal string argument is
    /// replaced by that literal verbatim instead of being dispatched to
    /// the expression emitter.
    pub injection_function: Option<String>,
    /// Informational: emitters should treat nullable types strictly.
    pub strict_nullability: bool,
    /// Informational: emitters should resolve typedefs to their targets.
    pub unwrap_typedefs: bool,
    /// Run the variable-renaming pre-pass on function bodies.
    pub normalize_expressions: bool,
    /// Informational: the front end ran dead-code elimination.
    pub eliminate_dead_code: bool,
    /// Delete files recorded in the previous manifest but not produced by
    /// this pass.
    pub delete_old_output: bool,
    /// Treat a bodiless non-extern function as a compilation error.
    pub fatal_on_missing_body: bool,
    /// Skip extern/foreign declarations.
    pub ignore_externs: bool,
    /// Skip accessor-only fields with no physical storage.
    pub ignore_non_physical_fields: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            strategy: OutputStrategy::FilePerClass,
            file_extension: String::new(),
            output_dir: None,
            single_file_name: "output".to_string(),
            skip_types: Vec::new(),
            injection_function: None,
            strict_nullability: false,
            unwrap_typedefs: false,
            normalize_expressions: true,
            eliminate_dead_code: false,
            delete_old_output: true,
            fatal_on_missing_body: false,
            ignore_externs: true,
            ignore_non_physical_fields: false,
        }
    }
}

impl CompilerConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output strategy
    pub fn with_strategy(mut self, strategy: OutputStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the generated-file suffix
    pub fn with_file_extension(mut self, ext: impl Into<String>) -> Self {
        self.file_extension = ext.into();
        self
    }

    /// Set the output directory
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Set the file stem used by `SingleFile`
    pub fn with_single_file_name(mut self, name: impl Into<String>) -> Self {
        self.single_file_name = name.into();
        self
    }

    /// Add a fully-qualified type path to the skip list
    pub fn with_skip_type(mut self, path: impl Into<String>) -> Self {
        self.skip_types.push(path.into());
        self
    }

    /// Enable the inline target-code-injection function
    pub fn with_injection_function(mut self, name: impl Into<String>) -> Self {
        self.injection_function = Some(name.into());
        self
    }

    /// Allow extern declarations through the default filter
    pub fn with_externs(mut self) -> Self {
        self.ignore_externs = false;
        self
    }
}

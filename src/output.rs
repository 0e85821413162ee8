//! Output manager - realizes accumulated text as files on disk
//!
//! Consumes the driver's (declaration, text) pairs and partitions them
//! into artifacts under the configured strategy. Tracks the previous
//! pass's artifact paths in a manifest so orphaned files can be deleted
//! when a declaration stops producing output.
//!
//! Writing is all-or-nothing only at the manifest level: every artifact
//! is attempted even after one fails, but the manifest is advanced only
//! when the whole pass succeeded, so a failed pass never loses track of
//! files it actually wrote earlier.

use std::collections::HashSet;
use std::fs;
use std::io;

use crate::config::{CompilerConfig, OutputStrategy};
use crate::driver::CompiledUnit;
use crate::errors::{OutputError, OutputErrors};

/// Manifest file name, relative to the output directory.
///
/// One artifact path per line, `/`-separated, sorted. Read at the start
/// of a pass to compute stale-output deletions.
pub const MANIFEST_FILE: &str = ".retarget-manifest";

/// Realizes one pass's compiled units as files.
#[derive(Debug)]
pub struct OutputManager<'c> {
    config: &'c CompilerConfig,
}

impl<'c> OutputManager<'c> {
    pub fn new(config: &'c CompilerConfig) -> Self {
        Self { config }
    }

    /// Partition units into (relative path, content) artifacts.
    ///
    /// Pure: no filesystem access. `Manual` yields no artifacts since the
    /// host consumes the accumulator itself.
    pub fn artifacts(&self, units: &[CompiledUnit<'_>]) -> Vec<(String, String)> {
        match self.config.strategy {
            OutputStrategy::Manual => Vec::new(),
            OutputStrategy::SingleFile => {
                let name = format!("{}{}", self.config.single_file_name, self.config.file_extension);
                vec![(name, concat_texts(units.iter().map(|u| u.text.as_str())))]
            }
            OutputStrategy::FilePerModule => {
                // Group in first-seen module order; concatenation keeps
                // declaration order within each group.
                let mut order: Vec<String> = Vec::new();
                let mut groups: Vec<Vec<&str>> = Vec::new();
                for unit in units {
                    let stem = module_file_stem(&unit.decl.path.module);
                    match order.iter().position(|existing| *existing == stem) {
                        Some(idx) => groups[idx].push(&unit.text),
                        None => {
                            order.push(stem);
                            groups.push(vec![&unit.text]);
                        }
                    }
                }
                order
                    .into_iter()
                    .zip(groups)
                    .map(|(stem, texts)| {
                        let name = format!("{}{}", stem, self.config.file_extension);
                        (name, concat_texts(texts.into_iter()))
                    })
                    .collect()
            }
            OutputStrategy::FilePerClass => units
                .iter()
                .map(|unit| {
                    let name = format!("{}{}", unit.decl.name(), self.config.file_extension);
                    (name, concat_texts(std::iter::once(unit.text.as_str())))
                })
                .collect(),
        }
    }

    /// Write this pass's artifacts and reconcile stale output.
    ///
    /// Every artifact is attempted; every failure is reported with its
    /// path. The manifest is rewritten only when nothing failed.
    #[tracing::instrument(skip_all)]
    pub fn write(&self, units: &[CompiledUnit<'_>]) -> Result<(), OutputErrors> {
        if self.config.strategy == OutputStrategy::Manual {
            return Ok(());
        }

        let dir = match &self.config.output_dir {
            Some(dir) => dir.clone(),
            None => return Err(OutputErrors::single(OutputError::MissingOutputDir)),
        };
        if let Err(source) = fs::create_dir_all(&dir) {
            return Err(OutputErrors::single(OutputError::CreateDir { path: dir, source }));
        }

        let mut errors: Vec<OutputError> = Vec::new();

        let manifest_path = dir.join(MANIFEST_FILE);
        let previous = match fs::read_to_string(&manifest_path) {
            Ok(contents) => contents
                .lines()
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>(),
            Err(source) if source.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(source) => {
                errors.push(OutputError::Manifest {
                    path: manifest_path.clone(),
                    source,
                });
                Vec::new()
            }
        };

        let artifacts = self.artifacts(units);
        let mut written: Vec<String> = Vec::with_capacity(artifacts.len());
        for (name, content) in &artifacts {
            let path = dir.join(name);
            tracing::debug!(path = %path.display(), "writing artifact");
            match fs::write(&path, content) {
                Ok(()) => written.push(name.clone()),
                Err(source) => errors.push(OutputError::Write { path, source }),
            }
        }

        if self.config.delete_old_output && self.config.strategy != OutputStrategy::SingleFile {
            let current: HashSet<&str> = artifacts.iter().map(|(name, _)| name.as_str()).collect();
            for stale in previous.iter().filter(|old| !current.contains(old.as_str())) {
                let path = dir.join(stale);
                tracing::debug!(path = %path.display(), "deleting stale output");
                match fs::remove_file(&path) {
                    Ok(()) => {}
                    Err(source) if source.kind() == io::ErrorKind::NotFound => {}
                    Err(source) => errors.push(OutputError::Delete { path, source }),
                }
            }
        }

        if let Some(errors) = OutputErrors::from_vec(errors) {
            // Failed pass: keep the old manifest so nothing written
            // earlier is orphaned untracked.
            return Err(errors);
        }

        written.sort();
        let mut manifest = written.join("\n");
        if !manifest.is_empty() {
            manifest.push('\n');
        }
        fs::write(&manifest_path, manifest).map_err(|source| {
            OutputErrors::single(OutputError::Manifest {
                path: manifest_path.clone(),
                source,
            })
        })?;

        Ok(())
    }
}

/// File stem for a module's artifact under `FilePerModule`.
fn module_file_stem(module: &[String]) -> String {
    if module.is_empty() {
        "root".to_string()
    } else {
        module.join("_")
    }
}

/// Concatenate unit texts with a blank line between units, normalizing
/// each to end in a newline.
fn concat_texts<'t>(texts: impl Iterator<Item = &'t str>) -> String {
    let mut out = String::new();
    for text in texts {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(text);
        if !text.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

//! Build orchestration: reference accumulation, compilation, and staging.
//!
//! A [`ScriptBuilder`] owns the state of one build session. Callers set
//! the fragment and markup, register extra references (each triggering one
//! dependency walk) and dependency directories, then request a build. The
//! build assembles the source, invokes the compiler, and stages every
//! resolved reference and dependency directory next to the output binary.
//! Staging runs unconditionally after compilation: a failed compile still
//! produces a fully staged output directory.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::assemble;
use crate::compile::{CompileOutcome, CompileRequest, Compiler, CscCompiler};
use crate::encode::{self, MarkupError};
use crate::locate::Locator;
use crate::metadata::{ReferenceScanner, SidecarScanner};
use crate::refset::ReferenceSet;
use crate::walker::{WalkError, walk};

/// Base runtime assemblies referenced by every build, resolvable from the
/// compiler's own search path.
const BASE_REFERENCES: [&str; 2] = ["System.dll", "System.Linq.dll"];

/// UI framework assemblies, resolved under the framework directory.
const FRAMEWORK_REFERENCES: [&str; 4] = [
    "System.Xaml.dll",
    "WindowsBase.dll",
    "PresentationCore.dll",
    "PresentationFramework.dll",
];

/// Extension assembly resolved from the commons directory when one is
/// configured.
const COMMONS_EXTENSION: &str = "Sharpc.Extension.dll";

/// One file that could not be staged.
#[derive(Debug, Clone)]
pub struct StagingFailure {
    /// Source path of the file that failed to stage.
    pub path: PathBuf,
    /// What went wrong.
    pub message: String,
}

/// Outcome of the staging stage: what was copied and what failed.
///
/// Staging failures are collected per file rather than aborting the stage;
/// a partially staged output is usually still usable.
#[derive(Debug, Clone, Default)]
pub struct StagingReport {
    /// Destination paths of everything staged successfully.
    pub staged: Vec<PathBuf>,
    /// Per-file failures.
    pub failures: Vec<StagingFailure>,
}

impl StagingReport {
    /// True iff nothing failed to stage.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn copy_file(&mut self, from: &Path, to: &Path) {
        match std::fs::copy(from, to) {
            Ok(_) => self.staged.push(to.to_path_buf()),
            Err(e) => {
                warn!(from = %from.display(), to = %to.display(), error = %e, "staging copy failed");
                self.failures.push(StagingFailure {
                    path: from.to_path_buf(),
                    message: e.to_string(),
                });
            }
        }
    }
}

/// What a build produced: the assembled source, the compiler outcome, and
/// the staging report.
#[derive(Debug, Clone)]
pub struct BuildResult {
    /// The fully assembled program source handed to the compiler.
    pub source: String,
    /// Compiler outcome; `success == false` carries diagnostics.
    pub outcome: CompileOutcome,
    /// What staging copied and what it failed to copy.
    pub staging: StagingReport,
}

/// Owns one build session: the reference set, dependency directories,
/// fragment, markup, and collaborator seams.
pub struct ScriptBuilder {
    refs: ReferenceSet,
    dependency_dirs: Vec<PathBuf>,
    fragment: String,
    markup: String,
    commons: Option<PathBuf>,
    framework_dir: PathBuf,
    host_references: HashSet<String>,
    locator: Locator,
    scanner: Box<dyn ReferenceScanner>,
    compiler: Box<dyn Compiler>,
}

impl std::fmt::Debug for ScriptBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptBuilder")
            .field("refs", &self.refs)
            .field("dependency_dirs", &self.dependency_dirs)
            .field("commons", &self.commons)
            .field("framework_dir", &self.framework_dir)
            .field("host_references", &self.host_references)
            .finish_non_exhaustive()
    }
}

impl Default for ScriptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptBuilder {
    /// New session with environment-derived defaults and the default
    /// reference population already applied.
    pub fn new() -> Self {
        let mut builder = Self {
            refs: ReferenceSet::new(),
            dependency_dirs: Vec::new(),
            fragment: String::new(),
            markup: String::new(),
            commons: None,
            framework_dir: crate::paths::framework_dir(),
            host_references: HashSet::new(),
            locator: Locator::from_env(),
            scanner: Box::new(SidecarScanner),
            compiler: Box::new(CscCompiler::from_env()),
        };
        builder.apply_default_references();
        builder
    }

    /// Replace the locator (store root / pointer width).
    pub fn with_locator(mut self, locator: Locator) -> Self {
        self.locator = locator;
        self
    }

    /// Replace the reference scanner.
    pub fn with_scanner(mut self, scanner: Box<dyn ReferenceScanner>) -> Self {
        self.scanner = scanner;
        self
    }

    /// Replace the compiler backend.
    pub fn with_compiler(mut self, compiler: Box<dyn Compiler>) -> Self {
        self.compiler = compiler;
        self
    }

    /// Use `dir` as the framework reference-assembly directory and
    /// re-resolve the default framework references against it.
    pub fn with_framework_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.framework_dir = dir.into();
        self.refs = ReferenceSet::new();
        self.apply_default_references();
        self
    }

    /// Set the user source fragment.
    pub fn set_fragment(&mut self, fragment: impl Into<String>) {
        self.fragment = fragment.into();
    }

    /// The current user source fragment.
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// Set the embedded markup payload (stored encoded).
    pub fn set_markup(&mut self, markup: &str) {
        self.markup = encode::encode_markup(markup);
    }

    /// Decode and return the embedded markup payload.
    ///
    /// # Errors
    ///
    /// Returns a [`MarkupError`] if the stored payload is corrupt.
    pub fn markup(&self) -> Result<String, MarkupError> {
        encode::decode_markup(&self.markup)
    }

    /// Configure the commons directory and re-apply the default reference
    /// population (idempotent: existing identities are left untouched).
    pub fn configure_commons(&mut self, dir: impl Into<PathBuf>) {
        self.commons = Some(dir.into());
        self.apply_default_references();
    }

    /// Names of assemblies the hosting process itself already references;
    /// dependencies matching one of these are treated as satisfied and
    /// never re-resolved.
    pub fn set_host_references(&mut self, names: impl IntoIterator<Item = String>) {
        self.host_references = names.into_iter().collect();
    }

    /// The accumulated reference set, in registration order.
    pub fn references(&self) -> &ReferenceSet {
        &self.refs
    }

    /// The registered dependency directories, in registration order.
    pub fn dependency_dirs(&self) -> &[PathBuf] {
        &self.dependency_dirs
    }

    /// Register an external reference and resolve its direct dependencies
    /// (one walker pass). A reference whose identity is already present is
    /// a no-op.
    ///
    /// # Errors
    ///
    /// Returns a [`WalkError`] if the reference's metadata cannot be read
    /// or a dependency location is ambiguous; the reference set is left
    /// exactly as it was before the call.
    pub fn register_reference(&mut self, path: impl Into<PathBuf>) -> Result<(), WalkError> {
        let path = path.into();
        if self.refs.contains(&path) {
            debug!(path = %path.display(), "reference already present");
            return Ok(());
        }

        // Stage into a copy so a failed walk leaves prior state untouched.
        let mut staged = self.refs.clone();
        staged.add_if_absent(&path);
        walk(
            &path,
            &mut staged,
            &self.host_references,
            self.scanner.as_ref(),
            &self.locator,
        )?;

        info!(
            path = %path.display(),
            added = staged.len() - self.refs.len(),
            "registered reference"
        );
        self.refs = staged;
        Ok(())
    }

    /// Async variant of [`register_reference`](Self::register_reference);
    /// same semantics, executed off the caller's line of control. Must run
    /// on the multi-threaded tokio runtime.
    pub async fn register_reference_async(
        &mut self,
        path: impl Into<PathBuf> + Send,
    ) -> Result<(), WalkError> {
        let path = path.into();
        tokio::task::block_in_place(|| self.register_reference(path))
    }

    /// Register a directory to be mirrored into the output directory at
    /// build time. Duplicate paths are ignored.
    pub fn register_dependency_dir(&mut self, dir: impl Into<PathBuf>) {
        let dir = dir.into();
        if !self.dependency_dirs.contains(&dir) {
            self.dependency_dirs.push(dir);
        }
    }

    /// Async variant of
    /// [`register_dependency_dir`](Self::register_dependency_dir). Must
    /// run on the multi-threaded tokio runtime.
    pub async fn register_dependency_dir_async(&mut self, dir: impl Into<PathBuf> + Send) {
        let dir = dir.into();
        tokio::task::block_in_place(|| self.register_dependency_dir(dir));
    }

    /// Assemble, compile, and stage.
    ///
    /// 1. Wrap the fragment in the program skeleton.
    /// 2. Invoke the compiler with the full reference list; the outcome
    ///    (including failure diagnostics) goes into the result.
    /// 3. Copy every reference that exists on disk flat into the output
    ///    directory, overwriting; bare-name fallbacks with no file are
    ///    skipped silently.
    /// 4. Mirror every registered dependency directory recursively into
    ///    the output directory, overwriting.
    ///
    /// Staging always runs, even when compilation fails; per-file staging
    /// failures are collected in the report.
    ///
    /// # Errors
    ///
    /// Returns an error only when the output directory cannot be created
    /// or the compiler cannot be invoked at all.
    pub fn build(&self, output: &Path, executable: bool) -> Result<BuildResult> {
        let out_dir = match output.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&out_dir)
            .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;

        let source = assemble::assemble(&self.fragment, &self.markup);

        let outcome = self.compiler.compile(&CompileRequest {
            source: &source,
            references: self.refs.as_slice(),
            output,
            executable,
        })?;
        if outcome.success {
            info!(output = %output.display(), "compiled");
        } else {
            warn!(
                output = %output.display(),
                diagnostics = outcome.diagnostics.len(),
                "compilation failed; staging proceeds"
            );
        }

        let mut staging = StagingReport::default();
        self.stage_references(&out_dir, &mut staging);
        self.mirror_dependency_dirs(&out_dir, &mut staging);

        Ok(BuildResult {
            source,
            outcome,
            staging,
        })
    }

    /// Async variant of [`build`](Self::build); same pipeline, delivered
    /// as a future. Must run on the multi-threaded tokio runtime.
    pub async fn build_async(&self, output: &Path, executable: bool) -> Result<BuildResult> {
        tokio::task::block_in_place(|| self.build(output, executable))
    }

    /// Copy every on-disk reference flat into the output directory.
    fn stage_references(&self, out_dir: &Path, report: &mut StagingReport) {
        for reference in &self.refs {
            if !reference.is_file() {
                // Bare-name fallbacks and logically known references have
                // nothing to copy.
                debug!(path = %reference.display(), "skipping reference with no file on disk");
                continue;
            }
            let Some(file_name) = reference.file_name() else {
                continue;
            };
            report.copy_file(reference, &out_dir.join(file_name));
        }
    }

    /// Recursively mirror every registered dependency directory into the
    /// output directory, preserving subdirectory structure.
    fn mirror_dependency_dirs(&self, out_dir: &Path, report: &mut StagingReport) {
        for dir in &self.dependency_dirs {
            if !dir.is_dir() {
                debug!(path = %dir.display(), "skipping missing dependency directory");
                continue;
            }

            for entry in WalkDir::new(dir).min_depth(1) {
                let entry = match entry {
                    Ok(e) => e,
                    Err(e) => {
                        report.failures.push(StagingFailure {
                            path: dir.clone(),
                            message: e.to_string(),
                        });
                        continue;
                    }
                };

                let Ok(rel) = entry.path().strip_prefix(dir) else {
                    continue;
                };
                let dest = out_dir.join(rel);

                if entry.file_type().is_dir() {
                    if let Err(e) = std::fs::create_dir_all(&dest) {
                        report.failures.push(StagingFailure {
                            path: entry.path().to_path_buf(),
                            message: e.to_string(),
                        });
                    }
                } else {
                    report.copy_file(entry.path(), &dest);
                }
            }
        }
    }

    /// (Re-)apply the default reference population. Idempotent: every
    /// entry goes through `add_if_absent`.
    fn apply_default_references(&mut self) {
        for name in BASE_REFERENCES {
            self.refs.add_if_absent(name);
        }
        if let Some(commons) = &self.commons {
            self.refs.add_if_absent(commons.join(COMMONS_EXTENSION));
        }
        for name in FRAMEWORK_REFERENCES {
            self.refs.add_if_absent(self.framework_dir.join(name));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_populated_once() {
        let builder = ScriptBuilder::new();
        let count = builder.references().len();
        assert_eq!(count, BASE_REFERENCES.len() + FRAMEWORK_REFERENCES.len());
    }

    #[test]
    fn configure_commons_adds_extension_idempotently() {
        let mut builder = ScriptBuilder::new();
        let before = builder.references().len();

        builder.configure_commons("/opt/commons");
        assert_eq!(builder.references().len(), before + 1);
        assert!(
            builder
                .references()
                .contains(Path::new(COMMONS_EXTENSION))
        );

        // Reconfiguring re-applies the defaults without duplicating.
        builder.configure_commons("/opt/other-commons");
        assert_eq!(builder.references().len(), before + 1);
    }

    #[test]
    fn markup_round_trips_through_storage() {
        let mut builder = ScriptBuilder::new();
        builder.set_markup("<Window/>");
        assert_eq!(builder.markup().unwrap(), "<Window/>");

        builder.set_markup("");
        assert_eq!(builder.markup().unwrap(), "");
    }

    #[test]
    fn dependency_dirs_deduplicate_by_path() {
        let mut builder = ScriptBuilder::new();
        builder.register_dependency_dir("/deps/a");
        builder.register_dependency_dir("/deps/a");
        builder.register_dependency_dir("/deps/b");
        assert_eq!(builder.dependency_dirs().len(), 2);
    }
}

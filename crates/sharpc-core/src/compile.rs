//! Binding to the external compiler.

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use tracing::debug;

/// One compilation request: assembled source plus the accumulated
/// reference list and output configuration.
#[derive(Debug)]
pub struct CompileRequest<'a> {
    /// Fully assembled program source.
    pub source: &'a str,
    /// References in registration order.
    pub references: &'a [PathBuf],
    /// Path of the binary to produce.
    pub output: &'a Path,
    /// Produce an executable rather than a library.
    pub executable: bool,
}

/// Result of one compiler invocation.
///
/// Failed diagnostics are data, not an error: the pipeline continues into
/// staging either way, and the caller inspects `success`.
#[derive(Debug, Clone)]
pub struct CompileOutcome {
    /// Whether the compiler reported success.
    pub success: bool,
    /// Captured diagnostic lines (errors and warnings).
    pub diagnostics: Vec<String>,
    /// The produced binary, present on success.
    pub binary: Option<PathBuf>,
}

/// The external compiler backend.
pub trait Compiler: Send + Sync {
    /// Compile `request.source` against `request.references` into
    /// `request.output`.
    ///
    /// # Errors
    ///
    /// Returns an error only when the compiler cannot be run at all;
    /// compilation failures are reported through
    /// [`CompileOutcome::success`].
    fn compile(&self, request: &CompileRequest<'_>) -> Result<CompileOutcome>;
}

/// Default backend: invokes the external C# compiler executable with a
/// fixed windowed-desktop flag set (`/platform:x86`, `winexe`/`library`
/// target).
#[derive(Debug, Clone)]
pub struct CscCompiler {
    program: PathBuf,
}

impl CscCompiler {
    /// Compiler invoking the given executable.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Compiler invoking [`crate::paths::compiler_program`] (`SHARPC_CSC`
    /// or `csc` on `PATH`).
    pub fn from_env() -> Self {
        Self::new(crate::paths::compiler_program())
    }
}

impl Compiler for CscCompiler {
    fn compile(&self, request: &CompileRequest<'_>) -> Result<CompileOutcome> {
        // The compiler wants a file, not stdin; scratch file lives for the
        // duration of the invocation.
        let mut source_file = tempfile::Builder::new()
            .prefix("sharpc-")
            .suffix(".cs")
            .tempfile()
            .context("Failed to create compiler scratch file")?;
        source_file
            .write_all(request.source.as_bytes())
            .context("Failed to write assembled source")?;

        let target = if request.executable {
            "/target:winexe"
        } else {
            "/target:library"
        };

        let mut cmd = Command::new(&self.program);
        cmd.arg("/nologo")
            .arg("/platform:x86")
            .arg(target)
            .arg(format!("/out:{}", request.output.display()));
        for reference in request.references {
            cmd.arg(format!("/reference:{}", reference.display()));
        }
        cmd.arg(source_file.path());

        debug!(program = %self.program.display(), output = %request.output.display(), "invoking compiler");

        let output = match cmd.output() {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                anyhow::bail!(
                    "'{}' not found. Install a C# compiler or set SHARPC_CSC.",
                    self.program.display()
                );
            }
            Err(e) => return Err(e).context("Failed to spawn compiler"),
        };

        let diagnostics: Vec<String> = String::from_utf8_lossy(&output.stdout)
            .lines()
            .chain(String::from_utf8_lossy(&output.stderr).lines())
            .filter(|l| !l.trim().is_empty())
            .map(str::to_string)
            .collect();

        let success = output.status.success();
        Ok(CompileOutcome {
            success,
            diagnostics,
            binary: success.then(|| request.output.to_path_buf()),
        })
    }
}

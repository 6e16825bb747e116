//! `sharpc` - compile a C# script fragment into a standalone WPF binary.
//!
//! Reads a source fragment (and optionally an embedded markup file),
//! resolves the reference closure of every registered assembly, invokes
//! the external compiler, and stages all resolved assemblies and
//! dependency directories next to the output binary.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sharpc_core::ScriptBuilder;

#[derive(Parser, Debug)]
#[command(author, version, about = "Script-fragment compiler and packager", long_about = None)]
struct Args {
    /// Path to the source fragment to embed in the program skeleton.
    fragment: PathBuf,

    /// Path of the binary to produce.
    #[arg(short, long, default_value = "out/app.exe")]
    output: PathBuf,

    /// Markup file to embed into the generated window (optional).
    #[arg(short, long)]
    markup: Option<PathBuf>,

    /// Extra assembly references; each is walked for direct dependencies.
    #[arg(short, long = "reference")]
    references: Vec<PathBuf>,

    /// Directories mirrored recursively into the output directory.
    #[arg(short, long = "deps-dir")]
    deps_dirs: Vec<PathBuf>,

    /// Commons directory providing the extension assembly.
    #[arg(long)]
    commons: Option<PathBuf>,

    /// Assembly names the hosting process already provides
    /// (never re-resolved).
    #[arg(long = "host-reference")]
    host_references: Vec<String>,

    /// Produce a library instead of an executable.
    #[arg(long, default_value_t = false)]
    library: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let fragment = std::fs::read_to_string(&args.fragment)
        .with_context(|| format!("Failed to read fragment {}", args.fragment.display()))?;

    let mut builder = ScriptBuilder::new();
    builder.set_fragment(fragment);

    if let Some(markup_path) = &args.markup {
        let markup = std::fs::read_to_string(markup_path)
            .with_context(|| format!("Failed to read markup {}", markup_path.display()))?;
        builder.set_markup(&markup);
    }

    if let Some(commons) = &args.commons {
        builder.configure_commons(commons);
    }

    builder.set_host_references(args.host_references.iter().cloned());

    for reference in &args.references {
        builder
            .register_reference_async(reference.clone())
            .await
            .with_context(|| format!("Failed to register reference {}", reference.display()))?;
    }

    for dir in &args.deps_dirs {
        builder.register_dependency_dir(dir);
    }

    let result = builder.build_async(&args.output, !args.library).await?;

    for line in &result.outcome.diagnostics {
        eprintln!("{line}");
    }
    for failure in &result.staging.failures {
        eprintln!("stage failed: {}: {}", failure.path.display(), failure.message);
    }

    if result.outcome.success {
        println!(
            "{} ({} references, {} files staged)",
            args.output.display(),
            builder.references().len(),
            result.staging.staged.len()
        );
        Ok(())
    } else {
        anyhow::bail!("Compilation failed with {} diagnostics", result.outcome.diagnostics.len());
    }
}

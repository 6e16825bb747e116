//! End-to-end pipeline tests: registration, resolution, compilation
//! (stubbed), and staging into a real temporary output directory.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::TempDir;

use sharpc_core::{
    CompileOutcome, CompileRequest, Compiler, Locator, ScriptBuilder, WalkError,
};
use sharpc_schema::PointerWidth;

/// Test context: isolated store, framework, and output directories.
struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.temp_dir.path().join(rel)
    }

    /// Create an (empty) file, creating parents as needed.
    fn touch(&self, rel: &str) -> PathBuf {
        let path = self.path(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"stub").unwrap();
        path
    }

    fn write(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.path(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// Builder wired to this context: framework assemblies on disk, an
    /// isolated store root, and a stub compiler.
    fn builder(&self) -> ScriptBuilder {
        for name in [
            "System.Xaml.dll",
            "WindowsBase.dll",
            "PresentationCore.dll",
            "PresentationFramework.dll",
        ] {
            self.touch(&format!("framework/{name}"));
        }

        ScriptBuilder::new()
            .with_framework_dir(self.path("framework"))
            .with_locator(Locator::new(self.path("store"), PointerWidth::Bits64))
            .with_compiler(Box::new(StubCompiler::default()))
    }
}

/// Compiler stand-in: records the request and writes the output binary.
#[derive(Default)]
struct StubCompiler {
    succeed: bool,
    seen: Mutex<Vec<(String, Vec<PathBuf>)>>,
}

impl StubCompiler {
    fn succeeding() -> Self {
        Self {
            succeed: true,
            seen: Mutex::new(Vec::new()),
        }
    }
}

impl Compiler for StubCompiler {
    fn compile(&self, request: &CompileRequest<'_>) -> anyhow::Result<CompileOutcome> {
        self.seen
            .lock()
            .unwrap()
            .push((request.source.to_string(), request.references.to_vec()));

        if self.succeed {
            std::fs::write(request.output, b"binary").unwrap();
        }

        Ok(CompileOutcome {
            success: self.succeed,
            diagnostics: if self.succeed {
                vec![]
            } else {
                vec!["error CS0000: stub failure".to_string()]
            },
            binary: self.succeed.then(|| request.output.to_path_buf()),
        })
    }
}

#[test]
fn end_to_end_build_stages_default_references() {
    let ctx = TestContext::new();
    let builder = {
        let mut b = ctx.builder().with_compiler(Box::new(StubCompiler::succeeding()));
        b.set_fragment("");
        b
    };

    let output = ctx.path("out/app.exe");
    let result = builder.build(&output, true).unwrap();

    assert!(result.outcome.success);
    assert!(output.is_file());
    // Framework assemblies exist on disk and get staged flat; the bare
    // System.dll / System.Linq.dll names have no file and are skipped.
    for name in ["System.Xaml.dll", "PresentationFramework.dll"] {
        assert!(ctx.path(&format!("out/{name}")).is_file(), "{name} staged");
    }
    assert!(!ctx.path("out/System.dll").exists());
    assert!(result.staging.is_clean());
}

#[test]
fn registration_is_idempotent() {
    let ctx = TestContext::new();
    let dll = ctx.touch("lib/Widget.dll");
    ctx.write("lib/Widget.deps.json", r#"{"references":[{"name":"Gadget"}]}"#);

    let mut builder = ctx.builder();
    let before = builder.references().len();

    builder.register_reference(&dll).unwrap();
    let after_first = builder.references().len();
    builder.register_reference(&dll).unwrap();

    assert_eq!(after_first, before + 2); // Widget itself + Gadget
    assert_eq!(builder.references().len(), after_first);
}

#[test]
fn colocated_dependency_wins_and_is_staged() {
    let ctx = TestContext::new();
    let dll = ctx.touch("lib/Widget.dll");
    ctx.touch("lib/Gadget.dll");
    ctx.write("lib/Widget.deps.json", r#"{"references":[{"name":"Gadget"}]}"#);
    // Same-named assembly in the store should lose to the co-located copy.
    ctx.touch("store/GAC_64/Gadget/1.0/Gadget.dll");

    let mut builder = ctx.builder();
    builder.register_reference(&dll).unwrap();

    assert!(builder.references().contains(Path::new("Gadget.dll")));
    let resolved: Vec<_> = builder
        .references()
        .iter()
        .filter(|p| p.ends_with("Gadget.dll"))
        .collect();
    assert_eq!(resolved, [&ctx.path("lib/Gadget.dll")]);
}

#[test]
fn walking_is_single_hop() {
    let ctx = TestContext::new();
    let dll = ctx.touch("lib/Widget.dll");
    ctx.touch("lib/Gadget.dll");
    ctx.write("lib/Widget.deps.json", r#"{"references":[{"name":"Gadget"}]}"#);
    // Gadget has its own manifest; its references must NOT be walked.
    ctx.write("lib/Gadget.deps.json", r#"{"references":[{"name":"Deep"}]}"#);

    let mut builder = ctx.builder();
    builder.register_reference(&dll).unwrap();

    assert!(builder.references().contains(Path::new("Gadget.dll")));
    assert!(!builder.references().contains(Path::new("Deep.dll")));

    // A session that registers Gadget at top level does walk its
    // references: depth comes from explicit registration, not recursion.
    let mut direct = ctx.builder();
    direct.register_reference(ctx.path("lib/Gadget.dll")).unwrap();
    assert!(direct.references().contains(Path::new("Deep.dll")));
}

#[test]
fn failed_registration_leaves_prior_state_untouched() {
    let ctx = TestContext::new();
    let dll = ctx.touch("lib/NoManifest.dll");

    let mut builder = ctx.builder();
    let before = builder.references().len();

    let err = builder.register_reference(&dll).unwrap_err();
    assert!(matches!(err, WalkError::Metadata(_)));
    assert_eq!(builder.references().len(), before);
    assert!(!builder.references().contains(&dll));
}

#[test]
fn missing_references_do_not_fail_the_build() {
    let ctx = TestContext::new();
    let existing = ctx.touch("lib/A.dll");
    ctx.write("lib/A.deps.json", r#"{"references":[]}"#);

    let mut builder = ctx.builder();
    builder.register_reference(&existing).unwrap();
    // B.dll is registered while on disk, then vanishes before the build.
    let b = ctx.touch("gone/B.dll");
    ctx.write("gone/B.deps.json", r#"{"references":[]}"#);
    builder.register_reference(&b).unwrap();
    std::fs::remove_file(&b).unwrap();

    let result = builder.build(&ctx.path("out/app.exe"), true).unwrap();

    assert!(ctx.path("out/A.dll").is_file());
    assert!(!ctx.path("out/B.dll").exists());
    assert!(result.staging.is_clean());
}

#[test]
fn dependency_directories_are_mirrored_recursively() {
    let ctx = TestContext::new();
    ctx.write("deps/sub/file.txt", "payload");
    ctx.write("deps/top.txt", "top");

    let mut builder = ctx.builder();
    builder.register_dependency_dir(ctx.path("deps"));

    builder.build(&ctx.path("out/app.exe"), true).unwrap();

    assert_eq!(
        std::fs::read_to_string(ctx.path("out/sub/file.txt")).unwrap(),
        "payload"
    );
    assert_eq!(std::fs::read_to_string(ctx.path("out/top.txt")).unwrap(), "top");
}

#[test]
fn staging_proceeds_when_compilation_fails() {
    let ctx = TestContext::new();
    ctx.write("deps/data.txt", "still staged");

    let mut builder = ctx.builder(); // StubCompiler::default() fails
    builder.register_dependency_dir(ctx.path("deps"));

    let result = builder.build(&ctx.path("out/app.exe"), true).unwrap();

    assert!(!result.outcome.success);
    assert_eq!(result.outcome.diagnostics.len(), 1);
    assert!(ctx.path("out/data.txt").is_file());
}

#[test]
fn staging_overwrites_previous_outputs() {
    let ctx = TestContext::new();
    ctx.write("deps/data.txt", "new contents");
    ctx.write("out/data.txt", "old contents");

    let mut builder = ctx.builder();
    builder.register_dependency_dir(ctx.path("deps"));
    builder.build(&ctx.path("out/app.exe"), true).unwrap();

    assert_eq!(
        std::fs::read_to_string(ctx.path("out/data.txt")).unwrap(),
        "new contents"
    );
}

#[test]
fn assembled_source_embeds_fragment_and_markup() {
    let ctx = TestContext::new();
    let mut builder = ctx.builder();
    builder.set_fragment("public void Initialize() { }");
    builder.set_markup("<Window/>");

    let result = builder.build(&ctx.path("out/app.exe"), true).unwrap();

    assert!(result.source.contains("public void Initialize() { }"));
    assert!(result.source.contains("XamlReader.Parse"));
    assert_eq!(builder.markup().unwrap(), "<Window/>");
}

#[tokio::test(flavor = "multi_thread")]
async fn async_tier_matches_sync_semantics() {
    let ctx = TestContext::new();
    let dll = ctx.touch("lib/Widget.dll");
    ctx.write("lib/Widget.deps.json", r#"{"references":[{"name":"Gadget"}]}"#);

    let mut builder = ctx.builder().with_compiler(Box::new(StubCompiler::succeeding()));
    builder.register_reference_async(&dll).await.unwrap();
    assert!(builder.references().contains(Path::new("Gadget.dll")));

    let result = builder.build_async(&ctx.path("out/app.exe"), true).await.unwrap();
    assert!(result.outcome.success);
    assert!(ctx.path("out/app.exe").is_file());
}

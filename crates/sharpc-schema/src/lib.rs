//! Shared types for the sharpc build pipeline.
//!
//! This crate defines the vocabulary the resolver and orchestrator speak:
//! pointer-width / store-partition handling, validated public-key tokens,
//! assembly identities, and the sidecar reference manifest wire format.

pub mod arch;
pub mod identity;
pub mod token;

// Re-exports
pub use arch::PointerWidth;
pub use identity::{AssemblyIdentity, ReferenceManifest};
pub use token::{PublicKeyToken, TokenError};

/// File extension shared by every assembly the pipeline handles.
pub const ASSEMBLY_EXT: &str = "dll";

/// Sidecar manifest suffix, appended to an assembly's file stem
/// (`Foo.dll` declares its references in `Foo.deps.json`).
pub const MANIFEST_SUFFIX: &str = ".deps.json";

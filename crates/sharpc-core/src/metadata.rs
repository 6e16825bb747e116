//! Reading an assembly's declared references.
//!
//! The pipeline treats dependency metadata as opaque: it only needs the
//! list of [`AssemblyIdentity`] values an assembly declares. The
//! [`ReferenceScanner`] trait is that seam; the shipped implementation
//! reads a sidecar manifest (`<stem>.deps.json`) rather than parsing
//! in-binary metadata.

use std::path::{Path, PathBuf};

use sharpc_schema::{AssemblyIdentity, ReferenceManifest};

/// An assembly's dependency metadata could not be read.
///
/// Always a failure of the one registration that triggered the read;
/// previously accumulated reference state is unaffected.
#[derive(thiserror::Error, Debug)]
pub enum MetadataError {
    /// No reference manifest exists for the assembly.
    #[error("No reference manifest found for {}", .path.display())]
    Missing {
        /// The assembly whose manifest was looked up.
        path: PathBuf,
    },

    /// The manifest exists but could not be read.
    #[error("Failed to read reference manifest {}: {source}", .path.display())]
    Io {
        /// The manifest file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest exists but is not valid JSON for the expected shape.
    #[error("Malformed reference manifest {}: {source}", .path.display())]
    Parse {
        /// The manifest file.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}

/// Extracts the declared references of an assembly.
pub trait ReferenceScanner: Send + Sync {
    /// Return the identities the assembly at `assembly` declares it
    /// requires, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns a [`MetadataError`] when the metadata cannot be read or
    /// parsed.
    fn references(&self, assembly: &Path) -> Result<Vec<AssemblyIdentity>, MetadataError>;
}

/// Sidecar manifest path for an assembly (`Foo.dll` -> `Foo.deps.json`).
pub fn manifest_path(assembly: &Path) -> PathBuf {
    let stem = assembly
        .file_stem()
        .map_or_else(String::new, |s| s.to_string_lossy().into_owned());
    assembly.with_file_name(format!("{stem}{}", sharpc_schema::MANIFEST_SUFFIX))
}

/// Default scanner: reads the `<stem>.deps.json` sidecar manifest next to
/// the assembly.
#[derive(Debug, Clone, Copy, Default)]
pub struct SidecarScanner;

impl ReferenceScanner for SidecarScanner {
    fn references(&self, assembly: &Path) -> Result<Vec<AssemblyIdentity>, MetadataError> {
        let manifest = manifest_path(assembly);
        let text = match std::fs::read_to_string(&manifest) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(MetadataError::Missing { path: assembly.to_path_buf() });
            }
            Err(e) => {
                return Err(MetadataError::Io { path: manifest, source: e });
            }
        };

        let parsed: ReferenceManifest = serde_json::from_str(&text)
            .map_err(|e| MetadataError::Parse { path: manifest, source: e })?;
        Ok(parsed.references)
    }
}

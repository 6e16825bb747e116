//! Locating a required assembly on disk.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use sharpc_schema::{AssemblyIdentity, PointerWidth};

/// A required assembly could not be located unambiguously.
#[derive(thiserror::Error, Debug)]
pub enum LocateError {
    /// Several global-store candidates match the fingerprint but none
    /// encodes an architecture partition, so no deterministic choice
    /// exists.
    #[error(
        "Ambiguous global-store location for '{name}': {} candidates, none in an architecture partition",
        .candidates.len()
    )]
    Ambiguous {
        /// The assembly name being located.
        name: String,
        /// The candidate paths that survived fingerprint filtering.
        candidates: Vec<PathBuf>,
    },
}

/// Locates required assemblies, in strict precedence order: next to the
/// declaring assembly, already provided by the host, the global store,
/// then a bare-name fallback.
#[derive(Debug, Clone)]
pub struct Locator {
    store_root: PathBuf,
    width: PointerWidth,
}

impl Locator {
    /// Locator over an explicit store root and pointer width.
    pub fn new(store_root: impl Into<PathBuf>, width: PointerWidth) -> Self {
        Self {
            store_root: store_root.into(),
            width,
        }
    }

    /// Locator over the configured store root
    /// ([`crate::paths::store_root`]) and the running process's width.
    pub fn from_env() -> Self {
        Self::new(crate::paths::store_root(), PointerWidth::current())
    }

    /// Resolve `identity`, declared by the assembly at `declaring`, to a
    /// reference path.
    ///
    /// Returns `Ok(None)` when the host process already references the
    /// assembly (nothing needs to be added), and `Ok(Some(..))` otherwise:
    /// a co-located file, a global-store hit, or -- when nothing is found
    /// anywhere -- the bare `<name>.dll` left for the compiler's own
    /// search path. "Not found" is never an error.
    ///
    /// # Errors
    ///
    /// Returns [`LocateError::Ambiguous`] when several fingerprint-matching
    /// store candidates exist and none encodes an architecture partition.
    pub fn locate(
        &self,
        declaring: &Path,
        identity: &AssemblyIdentity,
        host_references: &HashSet<String>,
    ) -> Result<Option<PathBuf>, LocateError> {
        let bare = identity.bare_file_name();

        // Co-located assemblies always win. Same-directory placement is
        // trusted: no fingerprint check.
        let colocated = declaring
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(&bare);
        if colocated.is_file() {
            debug!(name = %identity.name, path = %colocated.display(), "resolved next to declaring assembly");
            return Ok(Some(colocated));
        }

        // Already referenced by the hosting process: nothing to add.
        if host_references
            .iter()
            .any(|r| r.eq_ignore_ascii_case(&identity.name))
        {
            debug!(name = %identity.name, "already provided by host");
            return Ok(None);
        }

        match self.search_store(identity, &bare)? {
            Some(hit) => Ok(Some(hit)),
            None => {
                // Leave a bare name for the compiler's default search path.
                debug!(name = %identity.name, "not found; falling back to bare name");
                Ok(Some(PathBuf::from(bare)))
            }
        }
    }

    /// Search the global store for `<name>.dll`, filtered by fingerprint
    /// and disambiguated by architecture partition.
    fn search_store(
        &self,
        identity: &AssemblyIdentity,
        bare: &str,
    ) -> Result<Option<PathBuf>, LocateError> {
        let mut candidates: Vec<PathBuf> = WalkDir::new(&self.store_root)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.file_name().to_string_lossy().eq_ignore_ascii_case(bare))
            .map(walkdir::DirEntry::into_path)
            .collect();

        // The store embeds the signer's token (lowercase hex) in its
        // directory names; a signed identity only accepts matching paths.
        if let Some(token) = &identity.public_key_token {
            let hex = token.to_hex();
            candidates.retain(|p| p.to_string_lossy().to_lowercase().contains(&hex));
        }

        // Deterministic selection regardless of directory traversal order.
        candidates.sort();

        match candidates.len() {
            0 => Ok(None),
            1 => {
                let hit = candidates.remove(0);
                debug!(name = %identity.name, path = %hit.display(), "resolved from global store");
                Ok(Some(hit))
            }
            _ => {
                let marker = self.width.store_marker();
                let matching: Vec<PathBuf> = candidates
                    .iter()
                    .filter(|p| p.to_string_lossy().contains(marker))
                    .cloned()
                    .collect();

                match matching.into_iter().next() {
                    Some(hit) => {
                        debug!(
                            name = %identity.name,
                            path = %hit.display(),
                            %marker,
                            "resolved from architecture partition"
                        );
                        Ok(Some(hit))
                    }
                    None => Err(LocateError::Ambiguous {
                        name: identity.name.clone(),
                        candidates,
                    }),
                }
            }
        }
    }
}

//! Single-hop dependency walking.

use std::collections::HashSet;
use std::path::Path;

use tracing::debug;

use crate::locate::{LocateError, Locator};
use crate::metadata::{MetadataError, ReferenceScanner};
use crate::refset::ReferenceSet;

/// A dependency walk failed.
#[derive(thiserror::Error, Debug)]
pub enum WalkError {
    /// The declaring assembly's metadata could not be read.
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// A required assembly could not be located unambiguously.
    #[error(transparent)]
    Locate(#[from] LocateError),
}

/// Resolve the direct references of `assembly` into `refs`.
///
/// For each identity the scanner reports that is not already present (by
/// file-name identity of its bare `<name>.dll`), ask the locator for a
/// path and add it if absent. Identities the host process already
/// references resolve to nothing and are skipped.
///
/// Only one level of dependencies is examined per call: references of the
/// newly added assemblies are not walked. Callers wanting a deeper closure
/// register each discovered assembly explicitly.
///
/// # Errors
///
/// Returns a [`WalkError`] if the metadata read or a location attempt
/// fails; "not found" degrades to a bare-name reference instead.
pub fn walk(
    assembly: &Path,
    refs: &mut ReferenceSet,
    host_references: &HashSet<String>,
    scanner: &dyn ReferenceScanner,
    locator: &Locator,
) -> Result<(), WalkError> {
    for identity in scanner.references(assembly)? {
        if refs.contains(Path::new(&identity.bare_file_name())) {
            continue;
        }

        if let Some(path) = locator.locate(assembly, &identity, host_references)? {
            debug!(
                declaring = %assembly.display(),
                dependency = %identity,
                resolved = %path.display(),
                "adding resolved dependency"
            );
            refs.add_if_absent(path);
        }
    }

    Ok(())
}

//! Assembly identities and the sidecar reference manifest.

use serde::{Deserialize, Serialize};

use crate::token::PublicKeyToken;

/// The declared identity of a required assembly.
///
/// Two identities denote "the same" assembly when their names compare equal
/// case-insensitively; the token only narrows candidates inside the global
/// store (unsigned assemblies carry no token).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyIdentity {
    /// Logical assembly name, without directory or extension
    /// (e.g. `"System.Xml"`).
    pub name: String,

    /// Public-key fingerprint of the assembly's signer, if signed.
    #[serde(
        rename = "publicKeyToken",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub public_key_token: Option<PublicKeyToken>,
}

impl AssemblyIdentity {
    /// Identity with a name only (unsigned assembly).
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            public_key_token: None,
        }
    }

    /// Identity with a name and signer token.
    pub fn signed(name: impl Into<String>, token: PublicKeyToken) -> Self {
        Self {
            name: name.into(),
            public_key_token: Some(token),
        }
    }

    /// The bare file name this identity resolves to when no concrete file
    /// is found (`<name>.dll`).
    pub fn bare_file_name(&self) -> String {
        format!("{}.{}", self.name, crate::ASSEMBLY_EXT)
    }
}

impl std::fmt::Display for AssemblyIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.public_key_token {
            Some(token) => write!(f, "{} ({token})", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Sidecar manifest declaring which assemblies a binary requires.
///
/// Stored next to the assembly as `<stem>.deps.json`. This is the wire
/// format the default reference scanner reads in place of in-binary
/// metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceManifest {
    /// Direct references of the declaring assembly, in declaration order.
    #[serde(default)]
    pub references: Vec<AssemblyIdentity>,
}

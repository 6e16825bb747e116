//! Pointer-width detection for global-store disambiguation.

/// Pointer width of a running process.
///
/// The global assembly store is partitioned by architecture; when the same
/// assembly is registered for both widths, the partition matching the
/// running process decides which copy is referenced.
///
/// # Example
///
/// ```
/// use sharpc_schema::PointerWidth;
///
/// let current = PointerWidth::current();
/// println!("Running as: {}", current);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum PointerWidth {
    /// 64-bit process.
    #[default]
    Bits64,
    /// 32-bit process.
    Bits32,
}

impl PointerWidth {
    /// Get the width of the running process.
    pub fn current() -> Self {
        #[cfg(target_pointer_width = "64")]
        {
            Self::Bits64
        }
        #[cfg(not(target_pointer_width = "64"))]
        {
            Self::Bits32
        }
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bits64 => "64",
            Self::Bits32 => "32",
        }
    }

    /// Partition marker encoded in global-store paths (`GAC_64` / `GAC_32`).
    ///
    /// A store path "belongs" to this width when it contains the marker as
    /// a substring; the store mirrors the layout of the machine-wide
    /// assembly cache it models.
    pub fn store_marker(&self) -> &'static str {
        match self {
            Self::Bits64 => "GAC_64",
            Self::Bits32 => "GAC_32",
        }
    }
}

impl std::fmt::Display for PointerWidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-bit", self.as_str())
    }
}

impl std::str::FromStr for PointerWidth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "64" | "x64" | "64-bit" => Ok(Self::Bits64),
            "32" | "x86" | "32-bit" => Ok(Self::Bits32),
            _ => Err(format!("Unknown pointer width: {s}")),
        }
    }
}

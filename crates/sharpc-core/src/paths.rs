//! Well-known locations, overridable through the environment.

use std::path::PathBuf;

/// Root of the global, architecture-partitioned assembly store.
///
/// `SHARPC_STORE_ROOT` overrides the platform default. The default is the
/// machine-wide cache: `%WINDIR%\assembly` on Windows, the Mono GAC on
/// everything else.
pub fn store_root() -> PathBuf {
    if let Ok(val) = std::env::var("SHARPC_STORE_ROOT") {
        return PathBuf::from(val);
    }

    #[cfg(windows)]
    {
        PathBuf::from(std::env::var("WINDIR").unwrap_or_else(|_| r"C:\Windows".to_string()))
            .join("assembly")
    }
    #[cfg(not(windows))]
    {
        PathBuf::from("/usr/lib/mono/gac")
    }
}

/// Directory holding the framework reference assemblies
/// (`System.Xaml.dll`, `PresentationFramework.dll`, ...).
///
/// `SHARPC_FRAMEWORK_DIR` overrides the platform default.
pub fn framework_dir() -> PathBuf {
    if let Ok(val) = std::env::var("SHARPC_FRAMEWORK_DIR") {
        return PathBuf::from(val);
    }

    #[cfg(windows)]
    {
        PathBuf::from(
            std::env::var("ProgramFiles").unwrap_or_else(|_| r"C:\Program Files".to_string()),
        )
        .join(r"Reference Assemblies\Microsoft\Framework\.NETFramework\v4.5")
    }
    #[cfg(not(windows))]
    {
        PathBuf::from("/usr/lib/mono/4.5")
    }
}

/// External compiler executable. `SHARPC_CSC` overrides the default `csc`
/// on `PATH`.
pub fn compiler_program() -> PathBuf {
    std::env::var("SHARPC_CSC").map_or_else(|_| PathBuf::from("csc"), PathBuf::from)
}

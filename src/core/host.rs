//! Host environment probing.
//!
//! A single `detect()` pass captures everything later stages branch on:
//! OS family, whether a pacman-family package manager is on PATH, whether
//! we are running under a Windows compatibility layer, and whether the C
//! runtime is musl. Probing never fails: a capability we cannot confirm
//! is reported as absent, not as an error.

use std::process::Command;

/// Environment variable set by MSYS2-style Windows compatibility layers.
///
/// Only its presence matters; the value is ignored.
pub const WINDOWS_COMPAT_MARKER: &str = "MSYSTEM";

/// Operating system family, as far as the bootstrap cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Linux,
    MacOs,
    Other,
}

impl OsFamily {
    fn current() -> Self {
        match std::env::consts::OS {
            "linux" => OsFamily::Linux,
            "macos" => OsFamily::MacOs,
            _ => OsFamily::Other,
        }
    }
}

/// Immutable snapshot of the host taken once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostEnvironment {
    /// Operating system family.
    pub os_family: OsFamily,

    /// Whether a pacman binary is on PATH.
    pub has_pacman: bool,

    /// Whether a Windows compatibility layer marker is present.
    pub is_windows_compat: bool,

    /// Whether the dynamic linker reports a musl C runtime.
    pub uses_musl: bool,
}

impl HostEnvironment {
    /// Probe the host. Infallible; absent capabilities read as `false`.
    pub fn detect() -> Self {
        HostEnvironment {
            os_family: OsFamily::current(),
            has_pacman: which::which("pacman").is_ok(),
            is_windows_compat: std::env::var_os(WINDOWS_COMPAT_MARKER).is_some(),
            uses_musl: detect_musl(),
        }
    }
}

/// Check whether the C runtime is musl by asking the dynamic linker.
///
/// musl's `ldd` prints its banner to stderr; glibc prints to stdout, so
/// both streams are searched. A missing `ldd` means "not musl".
fn detect_musl() -> bool {
    let Ok(output) = Command::new("ldd").arg("--version").output() else {
        return false;
    };

    banner_is_musl(&String::from_utf8_lossy(&output.stdout))
        || banner_is_musl(&String::from_utf8_lossy(&output.stderr))
}

fn banner_is_musl(banner: &str) -> bool {
    banner
        .lines()
        .take(2)
        .any(|line| line.to_ascii_lowercase().contains("musl"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_musl_banner_detected() {
        assert!(banner_is_musl("musl libc (x86_64)\nVersion 1.2.4"));
    }

    #[test]
    fn test_glibc_banner_not_musl() {
        assert!(!banner_is_musl(
            "ldd (Ubuntu GLIBC 2.39-0ubuntu8) 2.39\nCopyright (C) 2024"
        ));
    }

    #[test]
    fn test_musl_mentioned_late_is_ignored() {
        // Only the banner lines count, not arbitrary later output.
        assert!(!banner_is_musl("ldd (GNU libc) 2.39\nsecond\nmusl mention"));
    }

    #[test]
    fn test_detect_does_not_panic() {
        let host = HostEnvironment::detect();
        // Nothing to assert about the values; probing must simply succeed.
        let _ = host.os_family;
    }
}

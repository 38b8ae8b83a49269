//! pacman repository configuration.
//!
//! devkitPro publishes one package repository shared by every host
//! (`dkp-libs`) and one per host flavor. Exactly one host variant is
//! appended per run, selected from the probed environment; appends are
//! idempotent and never touch existing configuration content.

use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};

use crate::core::host::HostEnvironment;
use crate::util::fs::append_to_file;
use crate::util::process::ProcessBuilder;

/// The pacman configuration file mutated by this tool.
pub const PACMAN_CONF: &str = "/etc/pacman.conf";

/// A named repository section with its server URL template.
///
/// The `$arch` placeholder is substituted by pacman itself, never here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepositoryEntry {
    pub name: &'static str,
    pub server: &'static str,
}

/// Package repository shared by every host flavor.
pub const LIBRARY_REPO: RepositoryEntry = RepositoryEntry {
    name: "dkp-libs",
    server: "https://pkg.devkitpro.org/packages",
};

const WINDOWS_REPO: RepositoryEntry = RepositoryEntry {
    name: "dkp-windows",
    server: "https://pkg.devkitpro.org/packages/windows/$arch/",
};

const MUSL_REPO: RepositoryEntry = RepositoryEntry {
    name: "dkp-musl",
    server: "https://pkg.devkitpro.org/packages/musl/$arch/",
};

const LINUX_REPO: RepositoryEntry = RepositoryEntry {
    name: "dkp-linux",
    server: "https://pkg.devkitpro.org/packages/linux/$arch/",
};

impl RepositoryEntry {
    /// Render the configuration block appended to pacman.conf.
    pub fn config_block(&self) -> String {
        format!("\n[{}]\nServer = {}\n", self.name, self.server)
    }
}

/// Pick the host-specific repository variant.
///
/// A Windows compatibility layer wins over musl detection; plain Linux is
/// the fallback.
pub fn select_variant(host: &HostEnvironment) -> RepositoryEntry {
    if host.is_windows_compat {
        WINDOWS_REPO
    } else if host.uses_musl {
        MUSL_REPO
    } else {
        LINUX_REPO
    }
}

/// Outcome of `ensure_repo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendResult {
    Appended,
    AlreadyPresent,
}

/// Append the repository block unless its section is already configured.
///
/// Presence means the `[name]` header exists with a `Server =` line inside
/// that section. The file is only ever appended to; content is never
/// truncated or reordered.
pub fn ensure_repo(config: &Path, entry: &RepositoryEntry) -> Result<AppendResult> {
    let contents = match std::fs::read_to_string(config) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
        Err(e) => {
            return Err(e)
                .with_context(|| format!("failed to read config: {}", config.display()))
        }
    };

    if section_has_server(&contents, entry.name) {
        return Ok(AppendResult::AlreadyPresent);
    }

    append_block(config, &entry.config_block())?;
    Ok(AppendResult::Appended)
}

/// Check whether section `[name]` exists and defines a server.
fn section_has_server(contents: &str, name: &str) -> bool {
    let header = format!("[{}]", name);
    let mut in_section = false;

    for line in contents.lines() {
        let line = line.trim();
        if line.starts_with('[') {
            in_section = line == header;
        } else if in_section && line.starts_with("Server") {
            return true;
        }
    }

    false
}

/// Append a block, escalating privileges when the file is not writable.
fn append_block(config: &Path, block: &str) -> Result<()> {
    match append_to_file(config, block) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            tracing::debug!("direct append denied, retrying via tee");
            ProcessBuilder::privileged("tee")
                .arg("-a")
                .arg(config)
                .stdin(block)
                .exec_and_check()
                .with_context(|| format!("failed to append to {}", config.display()))?;
            Ok(())
        }
        Err(e) => {
            Err(e).with_context(|| format!("failed to append to {}", config.display()))
        }
    }
}

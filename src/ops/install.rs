//! Toolchain installation orchestration.
//!
//! Resolves the install plan to one of three modes and drives the package
//! operations for it. Prerequisite and bootstrap-installer failures abort
//! the run because nothing downstream can succeed without them; trust and
//! keyring failures do not, because previously established trust may
//! still carry the later steps.

use std::path::Path;

use anyhow::{Context, Result};

use crate::core::host::HostEnvironment;
use crate::core::plan::InstallPlan;
use crate::error::BootstrapError;
use crate::ops::{keyring, repos, trust};
use crate::util::http;
use crate::util::interrupt::ScratchDir;
use crate::util::process::{find_executable, ProcessBuilder};
use crate::util::prompt::Prompter;
use crate::util::shell::{Shell, Status};

/// Bootstrap installer that sets up dkp-pacman on non-pacman hosts.
pub const INSTALLER_URL: &str = "https://apt.devkitpro.org/install-devkitpro-pacman";

/// Packages required before the guided installer can run.
pub const PREREQUISITE_PACKAGES: [&str; 2] = ["wget", "git"];

/// The curated development package set for lantern's targets.
pub const CURATED_PACKAGES: [&str; 3] = ["3ds-dev", "switch-dev", "wiiu-dev"];

/// Install mode, resolved once from the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallMode {
    /// No package operations at all.
    Skip,
    /// Configure the host's own pacman; leave package installs to the
    /// operator.
    ManualConfig,
    /// Run the devkitPro bootstrap installer end to end.
    GuidedInstall,
}

impl InstallMode {
    /// Pure resolution from the plan. Skipping wins over everything.
    pub fn from_plan(plan: &InstallPlan) -> Self {
        if plan.no_install {
            InstallMode::Skip
        } else if plan.use_system_pacman {
            InstallMode::ManualConfig
        } else {
            InstallMode::GuidedInstall
        }
    }
}

/// Run the install phase of the bootstrap.
pub fn run(
    plan: &InstallPlan,
    host: &HostEnvironment,
    shell: &Shell,
    prompter: &Prompter,
) -> Result<()> {
    match InstallMode::from_plan(plan) {
        InstallMode::Skip => {
            shell.status(Status::Skipped, "package installation (--no-install)");
            Ok(())
        }
        InstallMode::ManualConfig => manual_config(host, shell),
        InstallMode::GuidedInstall => guided_install(host, shell, prompter),
    }
}

/// Configure the host's own pacman for devkitPro.
///
/// Trust and keyring steps are best-effort; the repository append and the
/// curated set are left as a suggested manual command.
fn manual_config(host: &HostEnvironment, shell: &Shell) -> Result<()> {
    if !host.has_pacman {
        return Err(BootstrapError::missing_tool("pacman").into());
    }

    trust::establish_trust(shell);
    keyring::install_keyring(shell);

    let config = Path::new(repos::PACMAN_CONF);
    for entry in [repos::LIBRARY_REPO, repos::select_variant(host)] {
        match repos::ensure_repo(config, &entry)? {
            repos::AppendResult::Appended => {
                shell.status(Status::Configured, format!("repository [{}]", entry.name))
            }
            repos::AppendResult::AlreadyPresent => {
                shell.note(format!("repository [{}] already configured", entry.name))
            }
        }
    }

    let upgrade = ProcessBuilder::privileged("pacman").args(["-Syu"]);
    shell.status(Status::Installing, "full system upgrade");
    match upgrade.status() {
        Ok(status) if status.success() => {}
        Ok(status) => shell.warn(format!(
            "system upgrade exited with {:?}; continuing",
            status.code()
        )),
        Err(e) => shell.warn(format!("system upgrade failed: {:#}; continuing", e)),
    }

    shell.note(format!(
        "install the toolchain packages with: sudo pacman -S --needed {}",
        CURATED_PACKAGES.join(" ")
    ));
    Ok(())
}

/// Download and run the devkitPro bootstrap installer, then install the
/// curated package set.
fn guided_install(host: &HostEnvironment, shell: &Shell, prompter: &Prompter) -> Result<()> {
    install_prerequisites(host, shell)?;

    // Scratch dir is removed on every exit path, interrupt included.
    let scratch = ScratchDir::new()?;
    let installer = scratch.path().join("install-devkitpro-pacman");

    shell.status(Status::Fetching, INSTALLER_URL);
    http::download(INSTALLER_URL, &installer, shell)
        .context("failed to download the devkitPro bootstrap installer")?;
    make_executable(&installer)?;

    shell.status(Status::Installing, "devkitPro pacman");
    let run = ProcessBuilder::privileged(&installer);
    let status = run.status()?;
    if !status.success() {
        return Err(BootstrapError::Subprocess {
            command: run.display_command(),
            code: status.code(),
        }
        .into());
    }

    if !prompter.confirm("Install the 3DS, Switch, and Wii U development packages now?", true)? {
        shell.status(Status::Skipped, "toolchain package installation");
        return Ok(());
    }

    let pacman = dkp_pacman()?;
    let install = ProcessBuilder::privileged(&pacman)
        .args(["-S", "--needed", "--noconfirm"])
        .args(CURATED_PACKAGES);
    let status = install.status()?;
    if !status.success() {
        shell.error("toolchain package installation failed");
        shell.note(format!(
            "retry with: sudo {} -S --needed {}",
            pacman,
            CURATED_PACKAGES.join(" ")
        ));
        return Err(BootstrapError::Subprocess {
            command: install.display_command(),
            code: status.code(),
        }
        .into());
    }

    shell.status(Status::Installed, CURATED_PACKAGES.join(" "));
    Ok(())
}

/// Install the prerequisite packages with whatever package manager the
/// host offers. Required: later steps cannot run without them.
fn install_prerequisites(host: &HostEnvironment, shell: &Shell) -> Result<()> {
    shell.status(
        Status::Installing,
        format!("prerequisites: {}", PREREQUISITE_PACKAGES.join(" ")),
    );

    let install = if host.has_pacman {
        ProcessBuilder::privileged("pacman")
            .args(["-S", "--needed", "--noconfirm"])
            .args(PREREQUISITE_PACKAGES)
    } else if find_executable("apt-get").is_some() {
        ProcessBuilder::privileged("apt-get")
            .args(["install", "-y"])
            .args(PREREQUISITE_PACKAGES)
    } else {
        return Err(BootstrapError::missing_tool("pacman or apt-get").into());
    };

    let status = install.status()?;
    if !status.success() {
        return Err(BootstrapError::Subprocess {
            command: install.display_command(),
            code: status.code(),
        }
        .into());
    }
    Ok(())
}

/// Name of the devkitPro-aware pacman binary after the installer ran.
fn dkp_pacman() -> Result<String> {
    for candidate in ["dkp-pacman", "pacman"] {
        if find_executable(candidate).is_some() {
            return Ok(candidate.to_string());
        }
    }
    Err(BootstrapError::missing_tool("dkp-pacman").into())
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms)
        .with_context(|| format!("failed to mark {} executable", path.display()))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

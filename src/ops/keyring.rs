//! devkitPro keyring installation.

use crate::util::process::ProcessBuilder;
use crate::util::shell::{Shell, Status};

/// Signed keyring package published alongside the repositories.
pub const KEYRING_PACKAGE_URL: &str = "https://pkg.devkitpro.org/devkitpro-keyring.pkg.tar.xz";

/// Outcome of the keyring installation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyringResult {
    /// The keyring package was installed from the remote URL.
    Installed,
    /// The package failed, but the local trust store was populated.
    Populated,
    /// Both steps failed; a pre-existing keyring may still suffice.
    Failed,
}

/// Install the keyring package, falling back to a local populate.
///
/// Best-effort on both paths: a failure is reported and the run
/// continues, because package operations can still succeed against trust
/// established by a prior run.
pub fn install_keyring(shell: &Shell) -> KeyringResult {
    shell.status(Status::Installing, "devkitpro-keyring");

    let install = ProcessBuilder::privileged("pacman").args([
        "-U",
        "--noconfirm",
        KEYRING_PACKAGE_URL,
    ]);
    match install.status() {
        Ok(status) if status.success() => return KeyringResult::Installed,
        Ok(status) => shell.warn(format!(
            "keyring package install exited with {:?}; populating locally",
            status.code()
        )),
        Err(e) => shell.warn(format!("keyring package install failed: {:#}", e)),
    }

    let populate = ProcessBuilder::privileged("pacman-key").args(["--populate", "devkitpro"]);
    match populate.status() {
        Ok(status) if status.success() => KeyringResult::Populated,
        Ok(status) => {
            shell.warn(format!(
                "keyring populate exited with {:?}; continuing with existing trust",
                status.code()
            ));
            KeyringResult::Failed
        }
        Err(e) => {
            shell.warn(format!(
                "keyring populate failed: {:#}; continuing with existing trust",
                e
            ));
            KeyringResult::Failed
        }
    }
}

//! Shell environment profile for the toolchain.
//!
//! Writes a profile.d descriptor exporting the devkitPro path variables.
//! This mutates system-wide shell configuration, so it is the only step
//! in the whole flow whose confirmation defaults to "no".

use std::io::ErrorKind;
use std::path::Path;

use anyhow::Result;

use crate::util::process::ProcessBuilder;
use crate::util::prompt::Prompter;
use crate::util::shell::Shell;

/// Default location of the environment descriptor.
pub const PROFILE_PATH: &str = "/etc/profile.d/devkitpro.sh";

/// Outcome of the profile write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileOutcome {
    Written,
    AlreadyExists,
    Declined,
    NoPermission,
}

/// Write the environment profile if absent and the operator agrees.
pub fn maybe_write_profile(
    base: &Path,
    profile: &Path,
    prompter: &Prompter,
    shell: &Shell,
) -> Result<ProfileOutcome> {
    if profile.exists() {
        return Ok(ProfileOutcome::AlreadyExists);
    }

    let question = format!("Write the toolchain environment to {}?", profile.display());
    if !prompter.confirm(&question, false)? {
        return Ok(ProfileOutcome::Declined);
    }

    let contents = render_profile(base);
    match std::fs::write(profile, &contents) {
        Ok(()) => Ok(ProfileOutcome::Written),
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            tracing::debug!("direct write denied, retrying via tee");
            write_privileged(profile, &contents, shell)
        }
        Err(e) => {
            shell.warn(format!(
                "could not write {}: {}",
                profile.display(),
                e
            ));
            Ok(ProfileOutcome::NoPermission)
        }
    }
}

fn write_privileged(profile: &Path, contents: &str, shell: &Shell) -> Result<ProfileOutcome> {
    let tee = ProcessBuilder::privileged("tee").arg(profile).stdin(contents);
    match tee.exec() {
        Ok(output) if output.status.success() => Ok(ProfileOutcome::Written),
        Ok(output) => {
            shell.warn(format!(
                "privileged write of {} exited with {:?}",
                profile.display(),
                output.status.code()
            ));
            Ok(ProfileOutcome::NoPermission)
        }
        Err(e) => {
            shell.warn(format!(
                "privileged write of {} failed: {:#}",
                profile.display(),
                e
            ));
            Ok(ProfileOutcome::NoPermission)
        }
    }
}

/// Render the profile contents for the given toolchain prefix.
///
/// The PATH line is emitted only if the tools directory exists at write
/// time; no re-validation happens later.
pub fn render_profile(base: &Path) -> String {
    let base_display = base.display();
    let mut contents = format!(
        "export DEVKITPRO={base}\n\
         export DEVKITARM={base}/devkitARM\n\
         export DEVKITPPC={base}/devkitPPC\n",
        base = base_display
    );

    if base.join("tools/bin").is_dir() {
        contents.push_str(&format!("export PATH={}/tools/bin:$PATH\n", base_display));
    }

    contents
}

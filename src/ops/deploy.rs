//! Asset deployment into lovebrew.
//!
//! Mirrors the checkout's asset subtree into the bundler's romfs layout.
//! Deployment replaces the destination wholesale; a file that exists only
//! at the destination is gone after a deploy.

use std::path::Path;

use anyhow::Result;

use crate::ops::sync::PROJECT_NAME;
use crate::util::fs::{ensure_dir, mirror_dir};
use crate::util::process::{find_executable, ProcessBuilder};
use crate::util::prompt::Prompter;
use crate::util::shell::{Shell, Status};

/// Asset subtree inside the project checkout.
pub const ASSETS_DIR: &str = "assets";

/// romfs directory inside the lovebrew tree.
pub const ROMFS_DIR: &str = "romfs";

/// Build descriptor that marks a lovebrew tree as buildable.
pub const BUILD_DESCRIPTOR: &str = "lovebrew.toml";

/// Marker file so a placeholder asset directory is not empty.
const PLACEHOLDER_FILE: &str = ".gitkeep";

/// Outcome of the deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployOutcome {
    Deployed { files: usize },
    SkippedNoSource,
    SkippedDeclined,
}

/// Mirror the checkout's assets into `<target>/romfs/<project>`.
pub fn deploy(
    checkout: &Path,
    target_base: &Path,
    prompter: &Prompter,
    shell: &Shell,
) -> Result<DeployOutcome> {
    let source = checkout.join(ASSETS_DIR);

    if !source.is_dir() {
        shell.warn(format!(
            "no {} directory in {}",
            ASSETS_DIR,
            checkout.display()
        ));
        if !prompter.confirm("Create an empty assets directory?", true)? {
            shell.status(Status::Skipped, "asset deployment (no source)");
            return Ok(DeployOutcome::SkippedNoSource);
        }
        ensure_dir(&source)?;
        std::fs::write(source.join(PLACEHOLDER_FILE), "")?;
    }

    let dest = target_base.join(ROMFS_DIR).join(PROJECT_NAME);
    let question = format!(
        "Mirror assets into {}? This replaces its current contents.",
        dest.display()
    );
    if !prompter.confirm(&question, true)? {
        shell.status(Status::Skipped, "asset deployment");
        return Ok(DeployOutcome::SkippedDeclined);
    }

    let files = mirror_dir(&source, &dest)?;
    shell.status(
        Status::Deployed,
        format!("{} file(s) to {}", files, dest.display()),
    );

    trigger_build(target_base, shell);

    Ok(DeployOutcome::Deployed { files })
}

/// Run the lovebrew build if the tree is buildable. Informational only.
fn trigger_build(target_base: &Path, shell: &Shell) {
    if !target_base.join(BUILD_DESCRIPTOR).exists() {
        shell.note(format!(
            "no {} at {}; skipping lovebrew build",
            BUILD_DESCRIPTOR,
            target_base.display()
        ));
        return;
    }

    let Some(lovebrew) = find_executable("lovebrew") else {
        shell.note("lovebrew not found on PATH; skipping build");
        return;
    };

    shell.status(Status::Installing, "lovebrew build");
    let build = ProcessBuilder::new(lovebrew).arg("build").cwd(target_base);
    match build.status() {
        Ok(status) if status.success() => {}
        Ok(status) => shell.warn(format!(
            "lovebrew build exited with {:?}",
            status.code()
        )),
        Err(e) => shell.warn(format!("lovebrew build failed: {:#}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_deploy_mirrors_and_removes_stale_files() {
        let tmp = TempDir::new().unwrap();
        let checkout = tmp.path().join("checkout");
        let target = tmp.path().join("lovebrew");

        std::fs::create_dir_all(checkout.join("assets/sprites")).unwrap();
        std::fs::write(checkout.join("assets/sprites/hero.png"), "png").unwrap();

        let dest = target.join("romfs/lantern");
        std::fs::create_dir_all(&dest).unwrap();
        std::fs::write(dest.join("stale.bin"), "old").unwrap();

        let shell = Shell::default();
        let prompter = Prompter::assume(true);

        let outcome = deploy(&checkout, &target, &prompter, &shell).unwrap();

        assert_eq!(outcome, DeployOutcome::Deployed { files: 1 });
        assert!(dest.join("sprites/hero.png").exists());
        assert!(!dest.join("stale.bin").exists());
    }

    #[test]
    fn test_missing_source_declined_skips() {
        let tmp = TempDir::new().unwrap();
        let checkout = tmp.path().join("checkout");
        let target = tmp.path().join("lovebrew");
        std::fs::create_dir_all(&checkout).unwrap();

        let shell = Shell::default();
        let prompter = Prompter::scripted([false]);

        let outcome = deploy(&checkout, &target, &prompter, &shell).unwrap();

        assert_eq!(outcome, DeployOutcome::SkippedNoSource);
        assert!(!checkout.join("assets").exists());
        assert!(!target.exists());
    }

    #[test]
    fn test_missing_source_creates_placeholder() {
        let tmp = TempDir::new().unwrap();
        let checkout = tmp.path().join("checkout");
        let target = tmp.path().join("lovebrew");
        std::fs::create_dir_all(&checkout).unwrap();

        let shell = Shell::default();
        let prompter = Prompter::scripted([true, true]);

        let outcome = deploy(&checkout, &target, &prompter, &shell).unwrap();

        assert_eq!(outcome, DeployOutcome::Deployed { files: 1 });
        assert!(checkout.join("assets/.gitkeep").exists());
        assert!(target.join("romfs/lantern/.gitkeep").exists());
    }

    #[test]
    fn test_deployment_declined() {
        let tmp = TempDir::new().unwrap();
        let checkout = tmp.path().join("checkout");
        let target = tmp.path().join("lovebrew");
        std::fs::create_dir_all(checkout.join("assets")).unwrap();
        std::fs::write(checkout.join("assets/file.txt"), "x").unwrap();

        let shell = Shell::default();
        let prompter = Prompter::scripted([false]);

        let outcome = deploy(&checkout, &target, &prompter, &shell).unwrap();

        assert_eq!(outcome, DeployOutcome::SkippedDeclined);
        assert!(!target.exists());
    }
}

//! Project checkout synchronization.
//!
//! Clones the lantern repository to its fixed destination, or brings an
//! existing checkout forward. Only fast-forward updates are ever applied;
//! a diverged history is reported and left exactly as found.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use git2::build::CheckoutBuilder;
use git2::Repository;
use url::Url;

use crate::core::plan::InstallPlan;
use crate::error::BootstrapError;
use crate::util::fs::ensure_dir;
use crate::util::shell::{Shell, Status};

/// Project name segment used to recognize a checkout by path.
pub const PROJECT_NAME: &str = "lantern";

/// Canonical HTTPS form of the project remote.
pub const REMOTE_HTTPS: &str = "https://github.com/caldera-games/lantern";

/// Canonical SSH form of the project remote.
pub const REMOTE_SSH: &str = "git@github.com:caldera-games/lantern.git";

/// A recognized or freshly created project checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoCheckout {
    pub dest: PathBuf,
    pub remote: String,
    pub already_exists: bool,
    pub is_current_work_tree: bool,
}

/// Default destination: `~/code/<repo>`.
pub fn default_checkout_dir() -> Option<PathBuf> {
    let home = directories::BaseDirs::new()?.home_dir().to_path_buf();
    Some(home.join("code").join(checkout_dir_name()))
}

/// Directory name derived from the remote URL's last path segment.
fn checkout_dir_name() -> String {
    Url::parse(REMOTE_HTTPS)
        .ok()
        .and_then(|url| {
            url.path_segments()
                .and_then(|segments| segments.last().map(|s| s.to_string()))
        })
        .unwrap_or_else(|| PROJECT_NAME.to_string())
}

/// Check a remote URL against both canonical forms, ignoring a `.git`
/// suffix.
pub fn remote_matches(url: &str) -> bool {
    let strip = |u: &str| u.trim_end_matches(".git").trim_end_matches('/').to_string();
    let url = strip(url);
    url == strip(REMOTE_HTTPS) || url == strip(REMOTE_SSH)
}

/// Check whether a path contains the project name as a segment.
pub fn path_mentions_project(path: &Path) -> bool {
    path.components()
        .any(|c| c.as_os_str() == PROJECT_NAME)
}

/// Whether `dir` is inside a work tree of the project.
///
/// True when the surrounding repository's origin remote matches either
/// canonical URL form, or when the work tree path contains the project
/// name segment.
pub fn is_project_checkout(dir: &Path) -> bool {
    let Ok(repo) = Repository::discover(dir) else {
        return false;
    };
    if repo.is_bare() {
        return false;
    }

    let origin_matches = repo
        .find_remote("origin")
        .ok()
        .and_then(|remote| remote.url().map(remote_matches))
        .unwrap_or(false);

    origin_matches || repo.workdir().map(path_mentions_project).unwrap_or(false)
}

/// Synchronize the project checkout according to the plan.
///
/// Returns the checkout to deploy from, or `None` when no checkout is
/// available and none was requested.
pub fn sync(plan: &InstallPlan, cwd: &Path, shell: &Shell) -> Result<Option<RepoCheckout>> {
    if is_project_checkout(cwd) {
        shell.note(format!(
            "current directory is already a {} checkout",
            PROJECT_NAME
        ));
        return Ok(Some(RepoCheckout {
            dest: cwd.to_path_buf(),
            remote: REMOTE_HTTPS.to_string(),
            already_exists: true,
            is_current_work_tree: true,
        }));
    }

    if !plan.clone_repo {
        return Ok(None);
    }

    let dest = default_checkout_dir().context("could not determine the home directory")?;

    if dest.join(".git").exists() {
        shell.status(Status::Syncing, dest.display());
        if let Err(e) = fast_forward(&dest, shell) {
            // The existing checkout is still usable.
            shell.warn(format!("pull failed: {:#}; existing checkout left as is", e));
        }
        return Ok(Some(RepoCheckout {
            dest,
            remote: REMOTE_HTTPS.to_string(),
            already_exists: true,
            is_current_work_tree: false,
        }));
    }

    if let Some(parent) = dest.parent() {
        ensure_dir(parent)?;
    }

    shell.status(Status::Syncing, format!("cloning {}", REMOTE_HTTPS));
    Repository::clone(REMOTE_HTTPS, &dest).map_err(|e| {
        anyhow::Error::new(e).context(BootstrapError::CloneFailed {
            remote: REMOTE_HTTPS.to_string(),
            dest: dest.clone(),
        })
    })?;
    shell.status(Status::Cloned, dest.display());

    Ok(Some(RepoCheckout {
        dest,
        remote: REMOTE_HTTPS.to_string(),
        already_exists: false,
        is_current_work_tree: false,
    }))
}

/// Fetch origin and apply a fast-forward if possible.
///
/// A diverged history produces a warning and no mutation at all.
pub fn fast_forward(dest: &Path, shell: &Shell) -> Result<()> {
    let repo = Repository::open(dest)
        .with_context(|| format!("failed to open checkout at {}", dest.display()))?;

    let mut remote = repo
        .find_remote("origin")
        .context("checkout has no origin remote")?;
    remote
        .fetch(&[] as &[&str], None, None)
        .context("failed to fetch from origin")?;

    let fetch_head = repo.find_reference("FETCH_HEAD")?;
    let fetch_commit = repo.reference_to_annotated_commit(&fetch_head)?;
    let (analysis, _) = repo.merge_analysis(&[&fetch_commit])?;

    if analysis.is_up_to_date() {
        shell.note("checkout already up to date");
        return Ok(());
    }

    if !analysis.is_fast_forward() {
        shell.warn("local history has diverged from origin; leaving checkout untouched");
        return Ok(());
    }

    let head_name = repo
        .head()?
        .name()
        .context("HEAD is not a named reference")?
        .to_string();
    let mut reference = repo.find_reference(&head_name)?;
    reference.set_target(fetch_commit.id(), "fast-forward")?;
    repo.set_head(&head_name)?;
    repo.checkout_head(Some(CheckoutBuilder::default().force()))?;

    shell.note("fast-forwarded checkout to origin");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;
    use tempfile::TempDir;

    fn commit_file(repo: &Repository, name: &str, contents: &str) -> git2::Oid {
        let workdir = repo.workdir().unwrap();
        std::fs::write(workdir.join(name), contents).unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(Path::new(name)).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();

        let sig = Signature::now("test", "test@example.com").unwrap();
        let parents = match repo.head() {
            Ok(head) => vec![head.peel_to_commit().unwrap()],
            Err(_) => vec![],
        };
        let parent_refs: Vec<_> = parents.iter().collect();

        repo.commit(Some("HEAD"), &sig, &sig, name, &tree, &parent_refs)
            .unwrap()
    }

    #[test]
    fn test_remote_matches_both_forms() {
        assert!(remote_matches("https://github.com/caldera-games/lantern"));
        assert!(remote_matches("https://github.com/caldera-games/lantern.git"));
        assert!(remote_matches("git@github.com:caldera-games/lantern.git"));
        assert!(remote_matches("git@github.com:caldera-games/lantern"));
        assert!(!remote_matches("https://github.com/other/lantern"));
        assert!(!remote_matches("https://github.com/caldera-games/other"));
    }

    #[test]
    fn test_path_mentions_project() {
        assert!(path_mentions_project(Path::new("/home/me/code/lantern/src")));
        assert!(!path_mentions_project(Path::new("/home/me/code/other")));
        // Substring of a segment does not count.
        assert!(!path_mentions_project(Path::new("/home/me/lanterns")));
    }

    #[test]
    fn test_checkout_recognized_by_origin_url() {
        let tmp = TempDir::new().unwrap();
        let repo = Repository::init(tmp.path()).unwrap();
        repo.remote("origin", REMOTE_SSH).unwrap();

        assert!(is_project_checkout(tmp.path()));
    }

    #[test]
    fn test_checkout_recognized_by_path_segment() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("lantern");
        Repository::init(&dir).unwrap();

        assert!(is_project_checkout(&dir));
    }

    #[test]
    fn test_unrelated_repo_not_recognized() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("unrelated");
        let repo = Repository::init(&dir).unwrap();
        repo.remote("origin", "https://github.com/other/project").unwrap();

        assert!(!is_project_checkout(&dir));
    }

    #[test]
    fn test_plain_directory_not_recognized() {
        let tmp = TempDir::new().unwrap();
        assert!(!is_project_checkout(tmp.path()));
    }

    #[test]
    fn test_fast_forward_applies_upstream_commit() {
        let tmp = TempDir::new().unwrap();
        let upstream_dir = tmp.path().join("upstream");
        let local_dir = tmp.path().join("local");

        let upstream = Repository::init(&upstream_dir).unwrap();
        commit_file(&upstream, "a.txt", "one");
        Repository::clone(upstream_dir.to_str().unwrap(), &local_dir).unwrap();

        let new_tip = commit_file(&upstream, "b.txt", "two");

        let shell = Shell::default();
        fast_forward(&local_dir, &shell).unwrap();

        let local = Repository::open(&local_dir).unwrap();
        assert_eq!(local.head().unwrap().target().unwrap(), new_tip);
        assert!(local_dir.join("b.txt").exists());
    }

    #[test]
    fn test_up_to_date_checkout_is_untouched() {
        let tmp = TempDir::new().unwrap();
        let upstream_dir = tmp.path().join("upstream");
        let local_dir = tmp.path().join("local");

        let upstream = Repository::init(&upstream_dir).unwrap();
        let tip = commit_file(&upstream, "a.txt", "one");
        Repository::clone(upstream_dir.to_str().unwrap(), &local_dir).unwrap();

        let shell = Shell::default();
        fast_forward(&local_dir, &shell).unwrap();

        let local = Repository::open(&local_dir).unwrap();
        assert_eq!(local.head().unwrap().target().unwrap(), tip);
    }

    #[test]
    fn test_diverged_history_is_never_rewritten() {
        let tmp = TempDir::new().unwrap();
        let upstream_dir = tmp.path().join("upstream");
        let local_dir = tmp.path().join("local");

        let upstream = Repository::init(&upstream_dir).unwrap();
        commit_file(&upstream, "a.txt", "one");
        Repository::clone(upstream_dir.to_str().unwrap(), &local_dir).unwrap();

        // Histories diverge on both sides.
        commit_file(&upstream, "b.txt", "upstream");
        let local = Repository::open(&local_dir).unwrap();
        let local_tip = commit_file(&local, "c.txt", "local");

        let shell = Shell::default();
        fast_forward(&local_dir, &shell).unwrap();

        let local = Repository::open(&local_dir).unwrap();
        assert_eq!(local.head().unwrap().target().unwrap(), local_tip);
        assert!(local_dir.join("c.txt").exists());
        assert!(!local_dir.join("b.txt").exists());
    }

    #[test]
    fn test_sync_without_clone_flag_is_none() {
        let tmp = TempDir::new().unwrap();
        let plan = InstallPlan::default();
        let shell = Shell::default();

        let checkout = sync(&plan, tmp.path(), &shell).unwrap();
        assert!(checkout.is_none());
    }

    #[test]
    fn test_sync_recognizes_current_work_tree() {
        let tmp = TempDir::new().unwrap();
        let repo = Repository::init(tmp.path()).unwrap();
        repo.remote("origin", REMOTE_HTTPS).unwrap();

        let plan = InstallPlan::default();
        let shell = Shell::default();

        let checkout = sync(&plan, tmp.path(), &shell).unwrap().unwrap();
        assert!(checkout.is_current_work_tree);
        assert!(checkout.already_exists);
        assert_eq!(checkout.dest, tmp.path());
    }
}

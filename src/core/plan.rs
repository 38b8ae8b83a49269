//! The resolved install plan.

use std::path::PathBuf;

/// Default devkitPro installation prefix.
pub const DEFAULT_DEVKITPRO_PATH: &str = "/opt/devkitpro";

/// Configuration resolved once from operator-supplied flags.
///
/// Immutable for the rest of the run; every operation receives a reference
/// rather than re-reading flags or environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPlan {
    /// Clone (or fast-forward) the lantern checkout.
    pub clone_repo: bool,

    /// Path to a lovebrew tree for asset deployment; empty means "prompt
    /// interactively if a checkout is detected".
    pub lovebrew_path: Option<PathBuf>,

    /// Skip all package operations.
    pub no_install: bool,

    /// Configure the host's own pacman instead of running the guided
    /// devkitPro installer.
    pub use_system_pacman: bool,

    /// devkitPro installation prefix.
    pub devkitpro_path: PathBuf,
}

impl Default for InstallPlan {
    fn default() -> Self {
        InstallPlan {
            clone_repo: false,
            lovebrew_path: None,
            no_install: false,
            use_system_pacman: false,
            devkitpro_path: PathBuf::from(DEFAULT_DEVKITPRO_PATH),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_defaults() {
        let plan = InstallPlan::default();
        assert!(!plan.clone_repo);
        assert!(plan.lovebrew_path.is_none());
        assert!(!plan.no_install);
        assert!(!plan.use_system_pacman);
        assert_eq!(plan.devkitpro_path, PathBuf::from("/opt/devkitpro"));
    }
}

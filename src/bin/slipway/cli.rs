//! CLI definitions using clap.

use std::path::PathBuf;

use clap::Parser;

use slipway::core::plan::{InstallPlan, DEFAULT_DEVKITPRO_PATH};

/// Accept an explicit `--lovebrew-path` value, including an empty string
/// (which `into_plan` treats as "unset, prompt instead").
fn parse_lovebrew_path(s: &str) -> Result<PathBuf, std::convert::Infallible> {
    Ok(PathBuf::from(s))
}

/// Slipway - bootstrap the devkitPro environment for the lantern project
#[derive(Parser)]
#[command(name = "slipway")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Clone (or fast-forward) the lantern checkout to ~/code
    #[arg(long)]
    pub clone_repo: bool,

    /// Path to a lovebrew tree for asset deployment
    #[arg(long, value_name = "PATH", value_parser = parse_lovebrew_path)]
    pub lovebrew_path: Option<PathBuf>,

    /// Skip all package operations
    #[arg(long)]
    pub no_install: bool,

    /// Configure the host's pacman instead of running the guided installer
    #[arg(long)]
    pub use_system_pacman: bool,

    /// devkitPro installation prefix
    #[arg(long, value_name = "PATH", default_value = DEFAULT_DEVKITPRO_PATH)]
    pub devkitpro_path: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Resolve the flags into the immutable install plan.
    pub fn into_plan(self) -> InstallPlan {
        InstallPlan {
            clone_repo: self.clone_repo,
            lovebrew_path: self
                .lovebrew_path
                .filter(|p| !p.as_os_str().is_empty()),
            no_install: self.no_install,
            use_system_pacman: self.use_system_pacman,
            devkitpro_path: self.devkitpro_path,
        }
    }
}

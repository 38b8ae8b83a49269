//! Slipway CLI - devkitPro environment bootstrap for lantern

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::Cli;
use slipway::core::host::HostEnvironment;
use slipway::core::plan::InstallPlan;
use slipway::ops;
use slipway::ops::profile::{ProfileOutcome, PROFILE_PATH};
use slipway::util::interrupt;
use slipway::util::prompt::Prompter;
use slipway::util::shell::{Shell, Status};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("slipway=debug")
    } else {
        EnvFilter::new("slipway=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    interrupt::install_handler();

    let shell = Shell::from_flags(cli.verbose, cli.no_color);
    let prompter = Prompter::interactive();

    // Capture all mutable ambient state once, up front.
    let plan = cli.into_plan();
    let host = HostEnvironment::detect();
    tracing::debug!(?host, "probed host environment");

    ops::install::run(&plan, &host, &shell, &prompter)?;

    write_profile(&plan, &prompter, &shell)?;

    let cwd = std::env::current_dir()?;
    let checkout = ops::sync::sync(&plan, &cwd, &shell)?;

    if let Some(checkout) = checkout {
        match resolve_lovebrew_path(&plan, &prompter)? {
            Some(target) => {
                ops::deploy::deploy(&checkout.dest, &target, &prompter, &shell)?;
            }
            None => shell.status(Status::Skipped, "asset deployment (no lovebrew path)"),
        }
    }

    Ok(())
}

fn write_profile(plan: &InstallPlan, prompter: &Prompter, shell: &Shell) -> Result<()> {
    if plan.no_install {
        shell.status(Status::Skipped, "environment profile (--no-install)");
        return Ok(());
    }

    let profile = Path::new(PROFILE_PATH);
    match ops::profile::maybe_write_profile(&plan.devkitpro_path, profile, prompter, shell)? {
        ProfileOutcome::Written => shell.status(Status::Written, profile.display()),
        ProfileOutcome::AlreadyExists => {
            shell.note(format!("{} already exists", profile.display()))
        }
        ProfileOutcome::Declined => shell.status(Status::Skipped, "environment profile"),
        ProfileOutcome::NoPermission => shell.warn(format!(
            "could not write {}; rerun with sufficient privileges to add it",
            profile.display()
        )),
    }
    Ok(())
}

/// Resolve the lovebrew tree to deploy into, prompting when the flag was
/// not given.
fn resolve_lovebrew_path(plan: &InstallPlan, prompter: &Prompter) -> Result<Option<PathBuf>> {
    if let Some(path) = &plan.lovebrew_path {
        return Ok(Some(path.clone()));
    }

    let answer = prompter.input("Path to your lovebrew tree (empty to skip deployment)")?;
    Ok(answer.map(PathBuf::from))
}

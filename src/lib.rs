//! Slipway - devkitPro environment bootstrap for the lantern project
//!
//! This crate provides the core library functionality for Slipway,
//! including host probing, pacman repository configuration, toolchain
//! installation, and asset deployment into lovebrew.

pub mod core;
pub mod error;
pub mod ops;
pub mod util;

pub use crate::core::{host::HostEnvironment, plan::InstallPlan};
pub use error::BootstrapError;
pub use util::shell::Shell;
